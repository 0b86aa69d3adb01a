//! Core domain logic for meeting notes.
//!
//! This crate contains the fundamental types and logic for:
//! - Notes and the `{ code, msg, data }` list envelope sources respond with
//! - Time formatting: parsing `create_time` and rendering display labels
//! - Segmentation: grouping notes into day segments, most recent first
//! - Fold state: per-day collapsed/expanded overrides that survive rebuilds

pub mod fold;
pub mod note;
pub mod segment;
pub mod time;
pub mod types;

pub use fold::{FoldStateStore, FoldedSegment};
pub use note::{ApiResponse, ListNotesResponse, Note, NoteList, PageInfo, ResponseError};
pub use segment::{EnrichedNote, NoteError, RejectedNote, Segment, SegmentBuilder};
pub use time::{TimeError, TimeFormatter};
pub use types::{NoteId, SourceName, ValidationError};
