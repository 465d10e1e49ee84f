use ulid::Ulid;

use crate::model::BookingState;

/// An intent that the current lifecycle state does not permit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// Submit, Remove or Edit without an open edit session.
    NoSession,
    /// The booking is canceled or deleted.
    ReadOnly(BookingState),
    /// Remove on a booking that was never persisted.
    NotPersisted,
    NotFound(Ulid),
    /// The blocked flag can only be chosen before the booking is created.
    BlockedFlagLocked,
}

impl std::fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleError::NoSession => write!(f, "no booking is being edited"),
            LifecycleError::ReadOnly(state) => {
                write!(f, "booking is {state:?} and can no longer be changed")
            }
            LifecycleError::NotPersisted => write!(f, "booking has not been created yet"),
            LifecycleError::NotFound(id) => write!(f, "booking not found: {id}"),
            LifecycleError::BlockedFlagLocked => {
                write!(f, "blocked flag cannot change after creation")
            }
        }
    }
}

impl std::error::Error for LifecycleError {}
