//! JSON booking record exchanged with the REST backend.
//!
//! Timestamps travel as RFC 3339 in UTC and are rendered in local time.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::model::*;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireBooking {
    pub id: Option<Ulid>,
    #[serde(default)]
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub blocked: bool,
    #[serde(default)]
    pub canceled: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub enum WireError {
    /// Timestamp outside what `chrono` can represent.
    TimestampOutOfRange(Ms),
    /// `start` is not before `end`.
    EmptySpan { start: Ms, end: Ms },
}

impl std::fmt::Display for WireError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WireError::TimestampOutOfRange(t) => write!(f, "timestamp out of range: {t}"),
            WireError::EmptySpan { start, end } => {
                write!(f, "booking span [{start}, {end}) is empty or reversed")
            }
        }
    }
}

impl std::error::Error for WireError {}

pub fn to_datetime(t: Ms) -> Result<DateTime<Utc>, WireError> {
    DateTime::from_timestamp_millis(t).ok_or(WireError::TimestampOutOfRange(t))
}

impl TryFrom<&Booking> for WireBooking {
    type Error = WireError;

    fn try_from(b: &Booking) -> Result<Self, Self::Error> {
        Ok(Self {
            id: b.id,
            name: b.name.clone(),
            start: to_datetime(b.span.start)?,
            end: to_datetime(b.span.end)?,
            blocked: b.blocked,
            canceled: b.canceled,
        })
    }
}

impl TryFrom<WireBooking> for Booking {
    type Error = WireError;

    fn try_from(w: WireBooking) -> Result<Self, Self::Error> {
        let (start, end) = (w.start.timestamp_millis(), w.end.timestamp_millis());
        let span = Span::try_new(start, end).ok_or(WireError::EmptySpan { start, end })?;
        Ok(Self {
            id: w.id,
            name: w.name,
            span,
            blocked: w.blocked,
            canceled: w.canceled,
        })
    }
}

/// `HH:MM - HH:MM` in the local time zone.
pub fn local_time_label(span: &Span) -> String {
    let fmt = |t: Ms| {
        DateTime::from_timestamp_millis(t)
            .map(|dt| dt.with_timezone(&Local).format("%H:%M").to_string())
            .unwrap_or_else(|| "??:??".to_string())
    };
    format!("{} - {}", fmt(span.start), fmt(span.end))
}
