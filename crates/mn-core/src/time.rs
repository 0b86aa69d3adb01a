//! Timestamp parsing and display formatting.
//!
//! Notes carry unzoned `yyyy-MM-dd HH:mm:ss` strings. A [`TimeFormatter`]
//! pins them to a time zone so they can be compared as absolute instants,
//! truncated to local midnight, and rendered as labels.

use std::fmt;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

/// Format of `create_time` on the wire.
pub const CREATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `07:01 pm`
const TIME_LABEL_FORMAT: &str = "%I:%M %P";

/// `Monday, Feb 28`
const DAY_LABEL_FORMAT: &str = "%A, %b %d";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimeError {
    #[error("invalid timestamp {value:?}: {source}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    /// The wall-clock time falls in a DST gap.
    #[error("timestamp {value:?} does not exist in the local time zone")]
    NonexistentLocalTime { value: String },
}

/// Parses and formats note timestamps in a fixed time zone.
#[derive(Debug, Clone, Copy)]
pub struct TimeFormatter<Tz: TimeZone = Local> {
    tz: Tz,
}

impl TimeFormatter<Local> {
    /// A formatter for the system's local time zone.
    pub const fn local() -> Self {
        Self { tz: Local }
    }
}

impl Default for TimeFormatter<Local> {
    fn default() -> Self {
        Self::local()
    }
}

impl<Tz> TimeFormatter<Tz>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    pub const fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Parses a `create_time` string into an absolute instant.
    ///
    /// Ambiguous wall-clock times (DST fall-back) resolve to the earlier instant.
    pub fn parse(&self, create_time: &str) -> Result<DateTime<Utc>, TimeError> {
        let naive = NaiveDateTime::parse_from_str(create_time, CREATE_TIME_FORMAT).map_err(
            |source| TimeError::InvalidTimestamp {
                value: create_time.to_string(),
                source,
            },
        )?;
        self.tz
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| TimeError::NonexistentLocalTime {
                value: create_time.to_string(),
            })
    }

    /// The local calendar day an instant falls on.
    pub fn day_of(&self, instant: &DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }

    /// First instant of a local calendar day.
    ///
    /// Normally local midnight. If midnight falls in a DST gap, the first
    /// whole hour that exists is used instead.
    pub fn midnight(&self, day: NaiveDate) -> DateTime<Utc> {
        (0..24)
            .find_map(|hour| {
                let wall = day.and_hms_opt(hour, 0, 0)?;
                self.tz.from_local_datetime(&wall).earliest()
            })
            .map_or_else(
                || day.and_time(chrono::NaiveTime::default()).and_utc(),
                |dt| dt.with_timezone(&Utc),
            )
    }

    /// Twelve-hour clock label, e.g. `07:01 pm`.
    pub fn time_label(&self, instant: &DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.tz)
            .format(TIME_LABEL_FORMAT)
            .to_string()
    }

    /// Day heading label, e.g. `Monday, Feb 28`.
    pub fn day_label(&self, instant: &DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.tz)
            .format(DAY_LABEL_FORMAT)
            .to_string()
    }

    /// `<start> - <end>` using [`Self::time_label`] for both ends.
    pub fn time_range_label(&self, start: &DateTime<Utc>, end: &DateTime<Utc>) -> String {
        format!("{} - {}", self.time_label(start), self.time_label(end))
    }
}
