use async_trait::async_trait;
use dashmap::DashMap;
use ulid::Ulid;

use crate::model::*;

/// Remote side of the calendar: the authoritative booking list and its mutations.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Fetch the full current set.
    async fn list_bookings(&self) -> Result<Vec<Booking>, StoreError>;

    /// Create when `booking.id` is `None`, otherwise update that booking.
    async fn create_or_update(&self, booking: &Booking) -> Result<(), StoreError>;

    /// Soft-remove: the booking stays listed with `canceled = true`.
    async fn cancel_booking(&self, id: Ulid) -> Result<(), StoreError>;

    /// Hard-remove a blocked booking.
    async fn delete_booking(&self, id: Ulid) -> Result<(), StoreError>;
}

#[derive(Debug)]
pub enum StoreError {
    /// The request never produced a response.
    Transport(String),
    /// The backend answered with a non-success status.
    Status(u16),
    /// The response body could not be understood.
    Decode(String),
    NotFound(Ulid),
    NotBlocked(Ulid),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Transport(e) => write!(f, "transport error: {e}"),
            StoreError::Status(code) => write!(f, "backend returned status {code}"),
            StoreError::Decode(e) => write!(f, "decode error: {e}"),
            StoreError::NotFound(id) => write!(f, "booking not found: {id}"),
            StoreError::NotBlocked(id) => {
                write!(f, "booking {id} is not blocked and cannot be deleted")
            }
        }
    }
}

impl std::error::Error for StoreError {}

/// Process-local store. Assigns ids on create; used when no backend is configured.
pub struct InMemoryStore {
    bookings: DashMap<Ulid, Booking>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            bookings: DashMap::new(),
        }
    }

    /// Seed the store; bookings without an id get a fresh one.
    pub fn with_bookings(bookings: impl IntoIterator<Item = Booking>) -> Self {
        let store = Self::new();
        for mut b in bookings {
            let id = *b.id.get_or_insert_with(Ulid::new);
            store.bookings.insert(id, b);
        }
        store
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }

    pub fn get(&self, id: &Ulid) -> Option<Booking> {
        self.bookings.get(id).map(|e| e.value().clone())
    }
}

#[async_trait]
impl BookingStore for InMemoryStore {
    async fn list_bookings(&self) -> Result<Vec<Booking>, StoreError> {
        Ok(self.bookings.iter().map(|e| e.value().clone()).collect())
    }

    async fn create_or_update(&self, booking: &Booking) -> Result<(), StoreError> {
        match booking.id {
            Some(id) => {
                let mut entry = self.bookings.get_mut(&id).ok_or(StoreError::NotFound(id))?;
                *entry = booking.clone();
            }
            None => {
                let id = Ulid::new();
                self.bookings.insert(
                    id,
                    Booking {
                        id: Some(id),
                        ..booking.clone()
                    },
                );
            }
        }
        Ok(())
    }

    async fn cancel_booking(&self, id: Ulid) -> Result<(), StoreError> {
        let mut entry = self.bookings.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        entry.canceled = true;
        Ok(())
    }

    async fn delete_booking(&self, id: Ulid) -> Result<(), StoreError> {
        let blocked = self
            .bookings
            .get(&id)
            .map(|e| e.blocked)
            .ok_or(StoreError::NotFound(id))?;
        if !blocked {
            return Err(StoreError::NotBlocked(id));
        }
        self.bookings.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft_booking(name: &str, start: Ms, end: Ms, blocked: bool) -> Booking {
        Booking {
            id: None,
            name: name.into(),
            span: Span::new(start, end),
            blocked,
            canceled: false,
        }
    }

    #[tokio::test]
    async fn create_assigns_id() {
        let store = InMemoryStore::new();
        store
            .create_or_update(&draft_booking("a", 0, 100, false))
            .await
            .unwrap();

        let listed = store.list_bookings().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].id.is_some());
        assert_eq!(listed[0].name, "a");
    }

    #[tokio::test]
    async fn update_replaces_in_place() {
        let store = InMemoryStore::with_bookings([draft_booking("a", 0, 100, false)]);
        let mut b = store.list_bookings().await.unwrap().remove(0);
        b.name = "renamed".into();
        store.create_or_update(&b).await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&b.id.unwrap()).unwrap().name, "renamed");
    }

    #[tokio::test]
    async fn update_unknown_id_fails() {
        let store = InMemoryStore::new();
        let mut b = draft_booking("a", 0, 100, false);
        b.id = Some(Ulid::new());
        let result = store.create_or_update(&b).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn cancel_keeps_booking() {
        let store = InMemoryStore::with_bookings([draft_booking("a", 0, 100, false)]);
        let id = store.list_bookings().await.unwrap()[0].id.unwrap();
        store.cancel_booking(id).await.unwrap();

        let b = store.get(&id).unwrap();
        assert!(b.canceled);
    }

    #[tokio::test]
    async fn delete_requires_blocked() {
        let store = InMemoryStore::with_bookings([
            draft_booking("a", 0, 100, false),
            draft_booking("", 200, 300, true),
        ]);
        let listed = store.list_bookings().await.unwrap();
        let normal = listed.iter().find(|b| !b.blocked).unwrap().id.unwrap();
        let blocked = listed.iter().find(|b| b.blocked).unwrap().id.unwrap();

        assert!(matches!(
            store.delete_booking(normal).await,
            Err(StoreError::NotBlocked(_))
        ));
        store.delete_booking(blocked).await.unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.get(&blocked).is_none());
    }

    #[tokio::test]
    async fn cancel_unknown_is_not_found() {
        let store = InMemoryStore::new();
        let err = store.cancel_booking(Ulid::new()).await.unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
