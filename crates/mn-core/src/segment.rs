//! Grouping notes into day segments.
//!
//! A single pass over a flat note list produces one [`Segment`] per local
//! calendar day, ordered most recent day first. Notes inside a segment keep
//! the order they were fed in; callers who want chronological order within a
//! day must supply it.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;

use chrono::{DateTime, Local, NaiveDate, TimeDelta, TimeZone, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::note::Note;
use crate::time::{TimeError, TimeFormatter};
use crate::types::NoteId;

/// Why a note could not be placed in a segment.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NoteError {
    #[error(transparent)]
    Time(#[from] TimeError),
    #[error("duration cannot be negative, got {seconds}s")]
    NegativeDuration { seconds: i64 },
    #[error("duration of {seconds}s overflows the end time")]
    DurationOutOfRange { seconds: i64 },
}

/// A note skipped during a build, reported to the diagnostic callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedNote {
    pub id: NoteId,
    pub error: NoteError,
}

/// A note with its derived display fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichedNote {
    #[serde(flatten)]
    pub note: Note,
    pub created_at: DateTime<Utc>,
    /// Milliseconds since the epoch; only used for ordering.
    pub created_epoch_ms: i64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// e.g. `07:01 pm - 08:17 pm`
    pub time_range_label: String,
}

impl EnrichedNote {
    pub const fn id(&self) -> &NoteId {
        &self.note.id
    }

    pub fn title(&self) -> &str {
        &self.note.title
    }
}

/// All notes created on one local calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    /// Local midnight of the day, as an instant. Segments sort on this.
    pub day_key: DateTime<Utc>,
    /// e.g. `Monday, Feb 28`. Fold overrides are keyed on this.
    pub day_label: String,
    /// Fold state used when the user has not toggled this day.
    pub default_folded: bool,
    pub notes: Vec<EnrichedNote>,
}

/// Builds day segments from flat note lists.
#[derive(Debug, Clone, Copy)]
pub struct SegmentBuilder<Tz: TimeZone = Local> {
    formatter: TimeFormatter<Tz>,
}

impl Default for SegmentBuilder<Local> {
    fn default() -> Self {
        Self::new(TimeFormatter::local())
    }
}

impl<Tz> SegmentBuilder<Tz>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    pub const fn new(formatter: TimeFormatter<Tz>) -> Self {
        Self { formatter }
    }

    pub const fn formatter(&self) -> &TimeFormatter<Tz> {
        &self.formatter
    }

    /// Derives the display fields for a single note.
    pub fn enrich(&self, note: &Note) -> Result<EnrichedNote, NoteError> {
        if note.duration < 0 {
            return Err(NoteError::NegativeDuration {
                seconds: note.duration,
            });
        }
        let created_at = self.formatter.parse(&note.create_time)?;
        let start = created_at;
        let end = TimeDelta::try_seconds(note.duration)
            .and_then(|duration| start.checked_add_signed(duration))
            .ok_or(NoteError::DurationOutOfRange {
                seconds: note.duration,
            })?;

        Ok(EnrichedNote {
            note: note.clone(),
            created_at,
            created_epoch_ms: created_at.timestamp_millis(),
            start,
            end,
            time_range_label: self.formatter.time_range_label(&start, &end),
        })
    }

    /// Builds segments, logging and skipping notes that cannot be parsed.
    pub fn build(&self, notes: &[Note]) -> Vec<Segment> {
        self.build_with(notes, |rejected| {
            tracing::warn!(
                note_id = %rejected.id,
                error = %rejected.error,
                "skipping note with invalid timing"
            );
        })
    }

    /// Builds segments, handing each skipped note to `on_reject`.
    ///
    /// A bad note never aborts the build; the rest of the list still renders.
    pub fn build_with<F>(&self, notes: &[Note], mut on_reject: F) -> Vec<Segment>
    where
        F: FnMut(RejectedNote),
    {
        let mut segments: Vec<Segment> = Vec::new();
        let mut by_day: HashMap<NaiveDate, usize> = HashMap::new();

        for note in notes {
            let enriched = match self.enrich(note) {
                Ok(enriched) => enriched,
                Err(error) => {
                    on_reject(RejectedNote {
                        id: note.id.clone(),
                        error,
                    });
                    continue;
                }
            };

            let day = self.formatter.day_of(&enriched.created_at);
            match by_day.entry(day) {
                Entry::Occupied(slot) => segments[*slot.get()].notes.push(enriched),
                Entry::Vacant(slot) => {
                    let day_key = self.formatter.midnight(day);
                    slot.insert(segments.len());
                    segments.push(Segment {
                        day_key,
                        day_label: self.formatter.day_label(&day_key),
                        default_folded: false,
                        notes: vec![enriched],
                    });
                }
            }
        }

        // Stable, so equal keys keep first-seen order.
        segments.sort_by(|a, b| b.day_key.cmp(&a.day_key));
        tracing::debug!(
            notes = notes.len(),
            segments = segments.len(),
            "built day segments"
        );
        segments
    }
}
