use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info};
use ulid::Ulid;

use crate::limits::DEFAULT_PROPOSAL_SPAN_MS;
use crate::model::*;
use crate::notify::{Notice, NotifyHub};
use crate::observability::{self, *};
use crate::store::{BookingStore, StoreError};

use super::validate::{normalize, validate, ValidationReport};
use super::LifecycleError;

/// Input from the calendar front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// User picked an empty slot starting at `start`.
    SelectRange { start: Ms },
    /// User picked an existing booking.
    SelectEvent { id: Ulid },
    Edit(DraftEdit),
    Submit,
    Remove,
    Close,
    /// Re-fetch the booking set without touching the session.
    Refresh,
}

/// A single field change on the edited draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftEdit {
    Name(String),
    Start(Option<Ms>),
    End(Option<Ms>),
    Blocked(bool),
}

/// How the edit session presents the booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Create,
    Update,
    /// Canceled booking, read-only.
    View,
}

impl BookingState {
    pub fn on_submit(self) -> Result<BookingState, LifecycleError> {
        match self {
            BookingState::Proposed | BookingState::Active => Ok(BookingState::Active),
            terminal => Err(LifecycleError::ReadOnly(terminal)),
        }
    }

    /// Blocked bookings are deleted outright, everything else is canceled.
    pub fn on_remove(self, blocked: bool) -> Result<BookingState, LifecycleError> {
        match self {
            BookingState::Proposed => Err(LifecycleError::NotPersisted),
            BookingState::Active if blocked => Ok(BookingState::Deleted),
            BookingState::Active => Ok(BookingState::Canceled),
            terminal => Err(LifecycleError::ReadOnly(terminal)),
        }
    }

    pub fn on_edit(self) -> Result<(), LifecycleError> {
        if self.is_terminal() {
            return Err(LifecycleError::ReadOnly(self));
        }
        Ok(())
    }
}

/// The booking currently open for editing, plus its last validation result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    draft: BookingDraft,
    report: ValidationReport,
}

impl EditSession {
    fn new(draft: BookingDraft) -> Self {
        Self {
            draft,
            report: ValidationReport::default(),
        }
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn report(&self) -> &ValidationReport {
        &self.report
    }

    pub fn state(&self) -> BookingState {
        self.draft.state()
    }

    pub fn mode(&self) -> SessionMode {
        match self.state() {
            BookingState::Proposed => SessionMode::Create,
            BookingState::Active => SessionMode::Update,
            BookingState::Canceled | BookingState::Deleted => SessionMode::View,
        }
    }

    /// Label of the save action. Read-only sessions offer none.
    pub fn save_label(&self) -> Option<&'static str> {
        match self.mode() {
            SessionMode::Create => Some("Create"),
            SessionMode::Update => Some("Update"),
            SessionMode::View => None,
        }
    }

    /// Label of the remove action, if one is offered.
    pub fn remove_label(&self) -> Option<&'static str> {
        match self.mode() {
            SessionMode::Update if self.draft.blocked => Some("Delete"),
            SessionMode::Update => Some("Cancel"),
            SessionMode::Create | SessionMode::View => None,
        }
    }
}

/// What the front end renders after each intent.
#[derive(Debug, Clone)]
pub struct View {
    pub bookings: Arc<BookingSet>,
    pub session: Option<EditSession>,
}

/// Owns the booking snapshot and the edit session; turns intents into store calls.
///
/// `dispatch` takes `&mut self`, so a mutation is always finished (success or
/// failure) before the next intent can be issued.
pub struct Controller {
    store: Arc<dyn BookingStore>,
    notify: Arc<NotifyHub>,
    bookings: Arc<BookingSet>,
    session: Option<EditSession>,
}

impl Controller {
    pub fn new(store: Arc<dyn BookingStore>, notify: Arc<NotifyHub>) -> Self {
        Self {
            store,
            notify,
            bookings: Arc::new(BookingSet::default()),
            session: None,
        }
    }

    pub fn view(&self) -> View {
        View {
            bookings: self.bookings.clone(),
            session: self.session.clone(),
        }
    }

    pub fn bookings(&self) -> &Arc<BookingSet> {
        &self.bookings
    }

    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    pub fn notify(&self) -> &Arc<NotifyHub> {
        &self.notify
    }

    pub async fn dispatch(&mut self, intent: Intent) -> Result<View, LifecycleError> {
        let label = observability::intent_label(&intent);
        let result = match intent {
            Intent::SelectRange { start } => {
                self.session = Some(EditSession::new(BookingDraft::proposed(
                    start,
                    DEFAULT_PROPOSAL_SPAN_MS,
                )));
                Ok(())
            }
            Intent::SelectEvent { id } => self.select_event(id),
            Intent::Edit(edit) => self.edit(edit),
            Intent::Submit => self.submit().await,
            Intent::Remove => self.remove().await,
            Intent::Close => {
                self.session = None;
                Ok(())
            }
            Intent::Refresh => {
                self.refresh().await;
                Ok(())
            }
        };

        let status = if result.is_ok() { "ok" } else { "rejected" };
        metrics::counter!(INTENTS_TOTAL, "intent" => label, "status" => status).increment(1);
        if let Err(e) = &result {
            debug!(intent = label, "intent rejected: {e}");
        }
        result.map(|()| self.view())
    }

    /// Re-fetch the whole booking set. A failed fetch leaves an empty calendar.
    pub async fn refresh(&mut self) -> View {
        let bookings = match timed("list", self.store.list_bookings()).await {
            Ok(list) => BookingSet::new(list),
            Err(e) => {
                self.notify.send(Notice::Alert(format!("Failed to load bookings: {e}")));
                BookingSet::default()
            }
        };
        let count = bookings.len();
        self.bookings = Arc::new(bookings);
        metrics::gauge!(BOOKINGS_LOADED).set(count as f64);
        self.notify.send(Notice::Refreshed { count });
        self.view()
    }

    fn select_event(&mut self, id: Ulid) -> Result<(), LifecycleError> {
        let booking = self.bookings.get(id).ok_or(LifecycleError::NotFound(id))?;
        self.session = Some(EditSession::new(BookingDraft::from(booking)));
        Ok(())
    }

    fn edit(&mut self, edit: DraftEdit) -> Result<(), LifecycleError> {
        let session = self.session.as_mut().ok_or(LifecycleError::NoSession)?;
        let state = session.state();
        state.on_edit()?;
        let draft = &mut session.draft;
        match edit {
            DraftEdit::Name(name) => draft.name = name,
            DraftEdit::Start(start) => draft.start = start,
            DraftEdit::End(end) => draft.end = end,
            DraftEdit::Blocked(blocked) => {
                if state != BookingState::Proposed {
                    return Err(LifecycleError::BlockedFlagLocked);
                }
                draft.blocked = blocked;
            }
        }
        Ok(())
    }

    async fn submit(&mut self) -> Result<(), LifecycleError> {
        let session = self.session.as_mut().ok_or(LifecycleError::NoSession)?;
        session.state().on_submit()?;

        let candidate = normalize(&session.draft);
        let report = validate(&candidate, &self.bookings);
        let booking = match candidate.to_booking() {
            Some(b) if !report.has_error() => b,
            _ => {
                metrics::counter!(VALIDATION_REJECTIONS_TOTAL).increment(1);
                debug!(?report, "submission rejected by validation");
                session.report = report;
                return Ok(());
            }
        };

        let (op, action) = match booking.id {
            Some(_) => ("update", "updating"),
            None => ("create", "creating"),
        };
        match timed(op, self.store.create_or_update(&booking)).await {
            Ok(()) => info!(id = ?booking.id, name = %booking.name, "booking {op}d"),
            Err(_) => self.alert(action),
        }
        self.session = None;
        self.refresh().await;
        Ok(())
    }

    async fn remove(&mut self) -> Result<(), LifecycleError> {
        let session = self.session.as_ref().ok_or(LifecycleError::NoSession)?;
        let draft = &session.draft;
        let next = draft.state().on_remove(draft.blocked)?;
        let id = draft.id.ok_or(LifecycleError::NotPersisted)?;

        let (result, action) = if next == BookingState::Deleted {
            (timed("delete", self.store.delete_booking(id)).await, "deleting")
        } else {
            (timed("cancel", self.store.cancel_booking(id)).await, "canceling")
        };
        match result {
            Ok(()) => info!(%id, "booking {next:?}"),
            Err(_) => self.alert(action),
        }
        self.session = None;
        self.refresh().await;
        Ok(())
    }

    fn alert(&self, action: &str) {
        self.notify.send(Notice::Alert(format!(
            "An error occurred while {action} the event"
        )));
    }
}

/// Run a store call, recording latency and logging failures.
async fn timed<T>(
    op: &'static str,
    call: impl Future<Output = Result<T, StoreError>>,
) -> Result<T, StoreError> {
    let started = Instant::now();
    let result = call.await;
    metrics::histogram!(STORE_DURATION_SECONDS, "op" => op)
        .record(started.elapsed().as_secs_f64());
    if let Err(e) = &result {
        metrics::counter!(STORE_ERRORS_TOTAL, "op" => op).increment(1);
        error!(op, "store call failed: {e}");
    }
    result
}
