use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use tracing::{debug, warn};
use ulid::Ulid;

use crate::model::Booking;
use crate::store::{BookingStore, StoreError};
use crate::wire::WireBooking;

/// `BookingStore` backed by the calendar REST API.
///
/// Routes: `GET /bookings`, `POST /bookings` (create), `POST /bookings/{id}`
/// (update), `POST /bookings/{id}/cancel`, `DELETE /bookings/{id}`.
#[derive(Clone)]
pub struct HttpBookingStore {
    client: Client,
    base_url: String,
}

impl HttpBookingStore {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send and turn transport failures and non-2xx statuses into `StoreError`.
    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        let status = response.status();
        debug!(url = %response.url(), %status, "backend response");
        if !status.is_success() {
            return Err(StoreError::Status(status.as_u16()));
        }
        Ok(response)
    }
}

#[async_trait]
impl BookingStore for HttpBookingStore {
    async fn list_bookings(&self) -> Result<Vec<Booking>, StoreError> {
        let response = self.send(self.client.get(self.url("/bookings"))).await?;
        let records: Vec<WireBooking> = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        let mut bookings = Vec::with_capacity(records.len());
        for record in records {
            if record.id.is_none() {
                warn!(name = %record.name, "skipping listed booking without id");
                continue;
            }
            match Booking::try_from(record) {
                Ok(b) => bookings.push(b),
                Err(e) => warn!("skipping listed booking: {e}"),
            }
        }
        Ok(bookings)
    }

    async fn create_or_update(&self, booking: &Booking) -> Result<(), StoreError> {
        let body = WireBooking::try_from(booking).map_err(|e| StoreError::Decode(e.to_string()))?;
        let path = match booking.id {
            Some(id) => format!("/bookings/{id}"),
            None => "/bookings".to_string(),
        };
        self.send(self.client.post(self.url(&path)).json(&body)).await?;
        Ok(())
    }

    async fn cancel_booking(&self, id: Ulid) -> Result<(), StoreError> {
        let url = self.url(&format!("/bookings/{id}/cancel"));
        self.send(self.client.post(url)).await?;
        Ok(())
    }

    async fn delete_booking(&self, id: Ulid) -> Result<(), StoreError> {
        let url = self.url(&format!("/bookings/{id}"));
        self.send(self.client.delete(url)).await?;
        Ok(())
    }
}
