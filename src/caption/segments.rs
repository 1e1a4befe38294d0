use super::CaptionDraft;
use serde::{Deserialize, Serialize};

/// A raw timed segment as delivered by a speech recogniser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
    pub confidence: Option<f32>,
    pub language: Option<String>,
    pub speaker: Option<String>,
}

/// Convert transcript segments to caption drafts ready for
/// [`CaptionEditor::extend`](super::CaptionEditor::extend).
pub fn segments_to_drafts(segments: Vec<TranscriptSegment>) -> Vec<CaptionDraft> {
    segments
        .into_iter()
        .map(|segment| CaptionDraft {
            id: None,
            start: segment.start,
            end: segment.end,
            text: format_text_with_speaker(&segment.text, segment.speaker.as_deref()),
            confidence: segment.confidence,
            language: segment.language,
        })
        .collect()
}

/// Format text with optional speaker label prefix.
fn format_text_with_speaker(text: &str, speaker: Option<&str>) -> String {
    match speaker {
        Some(s) if !s.trim().is_empty() => format!("[{}] {}", s.trim(), text.trim()),
        _ => text.trim().to_string(),
    }
}
