//! Caption timeline model: entries, the ordered collection, timing policy,
//! undo history and the editing session that ties them together.

pub mod collection;
pub mod editor;
pub mod entry;
pub mod events;
pub mod history;
pub mod overlap;
pub mod segments;

pub use collection::{CaptionCollection, ImportSummary};
pub use editor::{CaptionEditor, Edge};
pub use entry::{CaptionDraft, CaptionEntry, CaptionId};
pub use events::EditEvent;
pub use history::{EditHistory, Snapshot};
pub use overlap::EditPolicy;
pub use segments::{segments_to_drafts, TranscriptSegment};
