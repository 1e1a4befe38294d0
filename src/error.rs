use crate::caption::CaptionId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptionError {
    #[error("Caption not found: {0}")]
    NotFound(CaptionId),

    #[error("Invalid split at {time:.3}s: must fall inside ({start:.3}s, {end:.3}s) leaving both halves long enough")]
    InvalidSplit { time: f64, start: f64, end: f64 },

    #[error("Merge needs at least two captions, got {0}")]
    InsufficientSelection(usize),

    #[error("Merge selection spans captions that are not selected")]
    NonContiguousSelection,

    #[error("Caption {0} would collapse below the minimum duration")]
    WouldCollapseEntry(CaptionId),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("Caption invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CaptionError>;
