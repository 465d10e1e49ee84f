use ulid::Ulid;

use crate::model::*;

/// First active booking in `existing` that intersects `span`.
///
/// Canceled bookings never conflict, and a booking never conflicts with
/// itself (`candidate_id`), so an in-place edit may keep its own slot.
pub fn find_conflict<'a>(
    candidate_id: Option<Ulid>,
    span: &Span,
    existing: &'a BookingSet,
) -> Option<&'a Booking> {
    existing.overlapping(span).find(|b| {
        b.is_active() && !(candidate_id.is_some() && b.id == candidate_id) && b.span.overlaps(span)
    })
}

pub fn overlaps(candidate_id: Option<Ulid>, span: &Span, existing: &BookingSet) -> bool {
    find_conflict(candidate_id, span, existing).is_some()
}
