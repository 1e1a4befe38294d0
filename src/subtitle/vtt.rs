// WebVTT subtitle format
use super::{cue_payload, normalize_input, unescape_html, StyleConfig, SubtitleFormatter, SubtitleParser};
use crate::caption::{CaptionCollection, CaptionEntry};
use crate::error::Result;
use crate::timecode::TimecodeFormat;
use tracing::warn;

/// WebVTT encoder. Without a style, cues carry no settings and no `STYLE`
/// block is written.
#[derive(Default)]
pub struct VttFormatter {
    pub style: Option<StyleConfig>,
}

impl VttFormatter {
    pub fn with_style(style: StyleConfig) -> Self {
        Self { style: Some(style) }
    }
}

impl SubtitleFormatter for VttFormatter {
    fn format(&self, captions: &CaptionCollection) -> String {
        let mut output = String::from("WEBVTT\n\n");

        if let Some(ref style) = self.style {
            output.push_str(&style.vtt_style_block());
        }
        let settings = self.style.as_ref().map_or("", |s| s.vtt_cue_settings());

        let mut index = 0;
        for entry in captions {
            let text = cue_payload(entry.text());
            if text.is_empty() {
                continue;
            }

            index += 1;
            output.push_str(&format!(
                "{}\n{} --> {}{}\n{}\n\n",
                index,
                TimecodeFormat::Vtt.format(entry.start()),
                TimecodeFormat::Vtt.format(entry.end()),
                settings,
                text
            ));
        }

        output
    }

    fn extension(&self) -> &'static str {
        "vtt"
    }

    fn mime_type(&self) -> &'static str {
        "text/vtt"
    }
}

pub struct VttParser;

impl SubtitleParser for VttParser {
    /// Everything before the first timing line (header, `STYLE`, `NOTE`
    /// blocks) is ignored. Each timing line takes the non-blank lines that
    /// follow it as its text.
    fn parse(&self, input: &str) -> Result<Vec<CaptionEntry>> {
        let input = normalize_input(input);
        let mut lines = input.lines();
        let mut entries = Vec::new();

        while let Some(line) = lines.next() {
            let Some((left, right)) = line.split_once("-->") else {
                continue;
            };

            let mut text_lines = Vec::new();
            for text_line in lines.by_ref() {
                if text_line.trim().is_empty() {
                    break;
                }
                text_lines.push(text_line);
            }

            let start_code = left.trim();
            let end_code = right.split_whitespace().next().unwrap_or_default();
            if start_code.is_empty() || end_code.is_empty() {
                warn!("Skipping WebVTT cue with incomplete timing: {:?}", line);
                continue;
            }

            entries.push(CaptionEntry::new(
                TimecodeFormat::Vtt.parse(start_code),
                TimecodeFormat::Vtt.parse(end_code),
                unescape_html(&text_lines.join("\n")),
            ));
        }

        Ok(entries)
    }
}
