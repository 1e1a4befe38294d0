// JSON interchange format
use super::{SubtitleFormatter, SubtitleParser};
use crate::caption::{CaptionCollection, CaptionEntry, CaptionId};
use crate::error::{CaptionError, Result};
use crate::timecode::TimecodeFormat;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub struct JsonFormatter {
    pub generator: String,
    /// Fixed export time; `None` stamps the current time.
    pub exported_at: Option<DateTime<Utc>>,
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self {
            generator: format!("captionkit {}", env!("CARGO_PKG_VERSION")),
            exported_at: None,
        }
    }
}

#[derive(Serialize)]
struct JsonOutput {
    metadata: JsonMetadata,
    captions: Vec<JsonCaption>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonMetadata {
    generator: String,
    exported_at: String,
    caption_count: usize,
    total_duration: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonCaption {
    index: usize,
    id: String,
    text: String,
    start: f64,
    end: f64,
    duration: f64,
    start_formatted: String,
    end_formatted: String,
    language: Option<String>,
    confidence: Option<f32>,
}

impl SubtitleFormatter for JsonFormatter {
    fn format(&self, captions: &CaptionCollection) -> String {
        let exported_at = self.exported_at.unwrap_or_else(Utc::now);

        let output = JsonOutput {
            metadata: JsonMetadata {
                generator: self.generator.clone(),
                exported_at: exported_at.to_rfc3339_opts(SecondsFormat::Secs, true),
                caption_count: captions.len(),
                total_duration: round_ms(captions.total_duration()),
            },
            captions: captions
                .iter()
                .enumerate()
                .map(|(i, e)| JsonCaption {
                    index: i + 1,
                    id: e.id().to_string(),
                    text: e.text().to_string(),
                    start: round_ms(e.start()),
                    end: round_ms(e.end()),
                    duration: round_ms(e.duration()),
                    start_formatted: TimecodeFormat::Vtt.format(e.start()),
                    end_formatted: TimecodeFormat::Vtt.format(e.end()),
                    language: e.language().map(str::to_string),
                    confidence: e.confidence(),
                })
                .collect(),
        };

        serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
    }

    fn extension(&self) -> &'static str {
        "json"
    }

    fn mime_type(&self) -> &'static str {
        "application/json"
    }
}

fn round_ms(seconds: f64) -> f64 {
    (seconds * 1000.0).round() / 1000.0
}

/// A caption time given either as seconds or as a time-code string.
#[derive(Deserialize)]
#[serde(untagged)]
enum TimeValue {
    Seconds(f64),
    Code(String),
}

impl TimeValue {
    fn seconds(&self) -> f64 {
        match self {
            TimeValue::Seconds(s) => *s,
            TimeValue::Code(code) => TimecodeFormat::Vtt.parse(code),
        }
    }
}

#[derive(Deserialize)]
struct JsonCaptionInput {
    text: String,
    start: TimeValue,
    end: TimeValue,
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    confidence: Option<f32>,
}

pub struct JsonParser;

impl SubtitleParser for JsonParser {
    fn parse(&self, input: &str) -> Result<Vec<CaptionEntry>> {
        let root: serde_json::Value = serde_json::from_str(input.trim_start_matches('\u{feff}'))?;

        let captions = root
            .get("captions")
            .and_then(|c| c.as_array())
            .ok_or_else(|| {
                CaptionError::InvalidFormat("JSON root must contain a \"captions\" array".to_string())
            })?;

        let mut entries = Vec::with_capacity(captions.len());
        for (i, value) in captions.iter().enumerate() {
            let caption: JsonCaptionInput = match serde_json::from_value(value.clone()) {
                Ok(caption) => caption,
                Err(e) => {
                    warn!("Skipping JSON caption {}: {}", i, e);
                    continue;
                }
            };

            let mut entry =
                CaptionEntry::new(caption.start.seconds(), caption.end.seconds(), caption.text);
            if let Some(id) = caption.id.as_ref().and_then(|v| v.as_str()).and_then(CaptionId::parse) {
                entry = entry.with_id(id);
            }
            if let Some(language) = caption.language {
                entry = entry.with_language(language);
            }
            if let Some(confidence) = caption.confidence {
                entry = entry.with_confidence(confidence);
            }
            entries.push(entry);
        }

        Ok(entries)
    }
}
