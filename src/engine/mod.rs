//! Booking rules: overlap detection, field validation and the lifecycle controller.

mod conflict;
mod error;
mod lifecycle;
mod validate;

pub use conflict::{find_conflict, overlaps};
pub use error::LifecycleError;
pub use lifecycle::{Controller, DraftEdit, EditSession, Intent, SessionMode, View};
pub use validate::{normalize, validate, Field, FieldError, ValidationReport};
