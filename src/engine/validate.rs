use ulid::Ulid;

use crate::limits::*;
use crate::model::*;

use super::conflict::find_conflict;

/// Fields of a booking that carry validation feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Start,
    End,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Name, Field::Start, Field::End];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Start => "start",
            Field::End => "end",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    Required,
    TooLong,
    /// Outside the supported timestamp range.
    Invalid,
    /// `start == end`.
    MustDiffer,
    /// `start > end`.
    OutOfOrder,
    /// Intersects another active booking.
    Overlaps(Option<Ulid>),
}

impl FieldError {
    /// User-facing message for this error on `field`.
    pub fn message(self, field: Field) -> &'static str {
        match (self, field) {
            (FieldError::Required, Field::Name) => "Name is required",
            (FieldError::Required, Field::Start) => "Start date is required",
            (FieldError::Required, Field::End) => "End date is required",
            (FieldError::TooLong, _) => "Name is too long",
            (FieldError::Invalid, Field::End) => "End date is invalid",
            (FieldError::Invalid, _) => "Start date is invalid",
            (FieldError::MustDiffer, Field::End) => "End date must be different than start date",
            (FieldError::MustDiffer, _) => "Start date must be different than end date",
            (FieldError::OutOfOrder, Field::End) => "End date must be after start date",
            (FieldError::OutOfOrder, _) => "Start date must be before end date",
            (FieldError::Overlaps(_), _) => "Event overlaps with another event",
        }
    }
}

/// One error slot per validated field. An empty slot means the field is fine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidationReport {
    pub name: Option<FieldError>,
    pub start: Option<FieldError>,
    pub end: Option<FieldError>,
}

impl ValidationReport {
    pub fn has_error(&self) -> bool {
        self.name.is_some() || self.start.is_some() || self.end.is_some()
    }

    pub fn get(&self, field: Field) -> Option<FieldError> {
        match field {
            Field::Name => self.name,
            Field::Start => self.start,
            Field::End => self.end,
        }
    }

    /// Message for `field`, or `""` when it has no error.
    pub fn message(&self, field: Field) -> &'static str {
        self.get(field).map_or("", |e| e.message(field))
    }

    fn set(&mut self, field: Field, err: FieldError) {
        match field {
            Field::Name => self.name = Some(err),
            Field::Start => self.start = Some(err),
            Field::End => self.end = Some(err),
        }
    }

    fn set_both_times(&mut self, err: FieldError) {
        self.set(Field::Start, err);
        self.set(Field::End, err);
    }
}

/// Minute-truncated, trimmed copy of `draft`. The input is left untouched.
pub fn normalize(draft: &BookingDraft) -> BookingDraft {
    BookingDraft {
        name: draft.name.trim().to_string(),
        start: draft.start.map(truncate_to_minute),
        end: draft.end.map(truncate_to_minute),
        ..draft.clone()
    }
}

/// Check `candidate` against the field rules and the active bookings in `existing`.
///
/// Every rule runs, so all violations show up together. Later rules overwrite
/// earlier ones on the same field.
pub fn validate(candidate: &BookingDraft, existing: &BookingSet) -> ValidationReport {
    let mut report = ValidationReport::default();

    if !candidate.blocked {
        if candidate.name.trim().is_empty() {
            report.set(Field::Name, FieldError::Required);
        } else if candidate.name.chars().count() > MAX_NAME_LEN {
            report.set(Field::Name, FieldError::TooLong);
        }
    }

    let start = check_timestamp(candidate.start);
    let end = check_timestamp(candidate.end);
    if let Err(e) = start {
        report.set(Field::Start, e);
    }
    if let Err(e) = end {
        report.set(Field::End, e);
    }

    if let (Ok(start), Ok(end)) = (start, end) {
        if start == end {
            report.set_both_times(FieldError::MustDiffer);
        }
        if start > end {
            report.set_both_times(FieldError::OutOfOrder);
        }
        if let Some(span) = Span::try_new(start, end)
            && let Some(other) = find_conflict(candidate.id, &span, existing)
        {
            report.set_both_times(FieldError::Overlaps(other.id));
        }
    }

    report
}

fn check_timestamp(value: Option<Ms>) -> Result<Ms, FieldError> {
    let t = value.ok_or(FieldError::Required)?;
    if !(MIN_VALID_TIMESTAMP_MS..=MAX_VALID_TIMESTAMP_MS).contains(&t) {
        return Err(FieldError::Invalid);
    }
    Ok(t)
}
