use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque caption identity, assigned once at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaptionId(Uuid);

impl CaptionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an id written by a previous export. Returns `None` for anything
    /// that is not a UUID so the caller can assign a fresh one.
    pub fn parse(text: &str) -> Option<Self> {
        Uuid::parse_str(text.trim()).ok().map(Self)
    }
}

impl Default for CaptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CaptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One timed caption record.
///
/// Timing fields are private: they only change through
/// [`CaptionEditor`](super::CaptionEditor) operations, which keep
/// `end > start` and the collection ordering intact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionEntry {
    id: CaptionId,
    start: f64,
    end: f64,
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    confidence: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<String>,
}

impl CaptionEntry {
    /// Create an entry with a fresh id. Negative or NaN times are read as
    /// zero; `end` is never allowed below `start`.
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        let start = non_negative(start);
        Self {
            id: CaptionId::new(),
            start,
            end: non_negative(end).max(start),
            text: text.into(),
            confidence: None,
            language: None,
        }
    }

    pub fn with_id(mut self, id: CaptionId) -> Self {
        self.id = id;
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence.clamp(0.0, 1.0));
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn id(&self) -> CaptionId {
        self.id
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn confidence(&self) -> Option<f32> {
        self.confidence
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Whether `time` falls inside `[start, end)`.
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time < self.end
    }

    pub(crate) fn set_id(&mut self, id: CaptionId) {
        self.id = id;
    }

    pub(crate) fn set_timing(&mut self, start: f64, end: f64) {
        self.start = start;
        self.end = end;
    }

    pub(crate) fn set_text(&mut self, text: String) {
        self.text = text;
    }
}

/// Caller-supplied caption data for [`CaptionEditor::add`](super::CaptionEditor::add).
/// Only `id` is optional; one is assigned when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptionDraft {
    pub id: Option<CaptionId>,
    pub start: f64,
    pub end: f64,
    pub text: String,
    pub confidence: Option<f32>,
    pub language: Option<String>,
}

impl CaptionDraft {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
            ..Default::default()
        }
    }

    /// Build the entry, flooring its duration at `min_duration`.
    pub(crate) fn into_entry(self, min_duration: f64) -> CaptionEntry {
        let start = non_negative(self.start);
        let end = non_negative(self.end).max(start + min_duration);

        let mut entry = CaptionEntry::new(start, end, self.text);
        if let Some(id) = self.id {
            entry.id = id;
        }
        entry.confidence = self.confidence.map(|c| c.clamp(0.0, 1.0));
        entry.language = self.language;
        entry
    }
}

impl From<&CaptionEntry> for CaptionDraft {
    fn from(entry: &CaptionEntry) -> Self {
        Self {
            id: Some(entry.id),
            start: entry.start,
            end: entry.end,
            text: entry.text.clone(),
            confidence: entry.confidence,
            language: entry.language.clone(),
        }
    }
}

pub(crate) fn non_negative(seconds: f64) -> f64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_clamps_timing() {
        let entry = CaptionEntry::new(-2.0, -1.0, "Hi");
        assert_eq!(entry.start(), 0.0);
        assert_eq!(entry.end(), 0.0);

        let entry = CaptionEntry::new(f64::NAN, 3.0, "Hi");
        assert_eq!(entry.start(), 0.0);
        assert_eq!(entry.end(), 3.0);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = CaptionEntry::new(0.0, 1.0, "a");
        let b = CaptionEntry::new(0.0, 1.0, "b");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_id_parse() {
        let id = CaptionId::new();
        assert_eq!(CaptionId::parse(&id.to_string()), Some(id));
        assert_eq!(CaptionId::parse("17"), None);
    }

    #[test]
    fn test_draft_floors_duration() {
        let entry = CaptionDraft::new(2.0, 2.0, "x").into_entry(0.1);
        assert_eq!(entry.start(), 2.0);
        assert!((entry.duration() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_draft_keeps_supplied_id() {
        let id = CaptionId::new();
        let draft = CaptionDraft {
            id: Some(id),
            confidence: Some(1.7),
            language: Some("en".to_string()),
            ..CaptionDraft::new(0.0, 1.0, "x")
        };
        let entry = draft.into_entry(0.1);
        assert_eq!(entry.id(), id);
        assert_eq!(entry.confidence(), Some(1.0));
        assert_eq!(entry.language(), Some("en"));
    }

    #[test]
    fn test_contains_is_half_open() {
        let entry = CaptionEntry::new(1.0, 2.0, "x");
        assert!(entry.contains(1.0));
        assert!(entry.contains(1.5));
        assert!(!entry.contains(2.0));
    }
}
