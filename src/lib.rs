pub mod caption;
pub mod config;
pub mod error;
pub mod subtitle;
pub mod timecode;

pub use caption::{
    CaptionCollection, CaptionDraft, CaptionEditor, CaptionEntry, CaptionId, EditEvent,
    EditHistory, EditPolicy, Edge, ImportSummary,
};
pub use config::{Config, OutputFormat};
pub use error::{CaptionError, Result};
pub use subtitle::{export, import, ExportedSubtitles, StyleConfig};
pub use timecode::{code_to_seconds, seconds_to_code, TimecodeFormat};
