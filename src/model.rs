use ulid::Ulid;

use crate::limits::MINUTE_MS;

/// Unix milliseconds (UTC). The only time type inside the engine.
pub type Ms = i64;

/// Truncate a timestamp to the start of its minute. Saturates at `Ms::MIN`.
pub fn truncate_to_minute(t: Ms) -> Ms {
    t.saturating_sub(t.rem_euclid(MINUTE_MS))
}

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: Ms,
    pub end: Ms,
}

impl Span {
    pub fn new(start: Ms, end: Ms) -> Self {
        debug_assert!(start < end, "Span start must be before end");
        Self { start, end }
    }

    /// Build a span only if `start < end`.
    pub fn try_new(start: Ms, end: Ms) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    /// Touching spans (`self.end == other.start`) do not overlap.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A booking as the store knows it. `id` is `None` until the store assigns one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub id: Option<Ulid>,
    pub name: String,
    pub span: Span,
    pub blocked: bool,
    pub canceled: bool,
}

impl Booking {
    pub fn state(&self) -> BookingState {
        match (self.id, self.canceled) {
            (None, _) => BookingState::Proposed,
            (Some(_), true) => BookingState::Canceled,
            (Some(_), false) => BookingState::Active,
        }
    }

    /// Counts towards overlap checks.
    pub fn is_active(&self) -> bool {
        !self.canceled
    }

    pub fn title(&self) -> &str {
        if self.blocked { "BLOCKED" } else { &self.name }
    }

    /// Calendar color; `None` means the default theme color.
    pub fn color(&self) -> Option<&'static str> {
        if self.canceled {
            Some("#c5c5c5")
        } else if self.blocked {
            Some("#d00000")
        } else {
            None
        }
    }
}

/// Where a booking sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingState {
    /// Exists only in the edit session, no id yet.
    Proposed,
    /// Persisted, counts towards overlap checks.
    Active,
    /// Soft-removed, kept for history.
    Canceled,
    /// Hard-removed blocked booking.
    Deleted,
}

impl BookingState {
    pub fn is_terminal(self) -> bool {
        matches!(self, BookingState::Canceled | BookingState::Deleted)
    }
}

/// Edit-session copy of a booking. Timestamps may be missing while the user is typing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BookingDraft {
    pub id: Option<Ulid>,
    pub name: String,
    pub start: Option<Ms>,
    pub end: Option<Ms>,
    pub blocked: bool,
    pub canceled: bool,
}

impl BookingDraft {
    /// A new booking covering `[start, start + span_ms)`. `end` is left empty
    /// if the sum overflows.
    pub fn proposed(start: Ms, span_ms: Ms) -> Self {
        Self {
            start: Some(start),
            end: start.checked_add(span_ms),
            ..Self::default()
        }
    }

    pub fn state(&self) -> BookingState {
        match (self.id, self.canceled) {
            (None, _) => BookingState::Proposed,
            (Some(_), true) => BookingState::Canceled,
            (Some(_), false) => BookingState::Active,
        }
    }

    pub fn span(&self) -> Option<Span> {
        Span::try_new(self.start?, self.end?)
    }

    /// The persisted shape, if both timestamps are present and ordered.
    pub fn to_booking(&self) -> Option<Booking> {
        Some(Booking {
            id: self.id,
            name: self.name.clone(),
            span: self.span()?,
            blocked: self.blocked,
            canceled: self.canceled,
        })
    }
}

impl From<&Booking> for BookingDraft {
    fn from(b: &Booking) -> Self {
        Self {
            id: b.id,
            name: b.name.clone(),
            start: Some(b.span.start),
            end: Some(b.span.end),
            blocked: b.blocked,
            canceled: b.canceled,
        }
    }
}

/// Immutable snapshot of the fetched bookings, sorted by `span.start`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingSet {
    bookings: Vec<Booking>,
}

impl BookingSet {
    pub fn new(mut bookings: Vec<Booking>) -> Self {
        bookings.sort_by_key(|b| b.span.start);
        Self { bookings }
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Booking> {
        self.bookings.iter()
    }

    pub fn get(&self, id: Ulid) -> Option<&Booking> {
        self.bookings.iter().find(|b| b.id == Some(id))
    }

    /// Bookings whose span intersects `query`, canceled ones included.
    /// Binary search skips everything starting at or after `query.end`.
    pub fn overlapping(&self, query: &Span) -> impl Iterator<Item = &Booking> {
        let right_bound = self
            .bookings
            .partition_point(|b| b.span.start < query.end);
        self.bookings[..right_bound]
            .iter()
            .filter(move |b| b.span.end > query.start)
    }
}
