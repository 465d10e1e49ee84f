use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use ulid::Ulid;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use calbook::client::HttpBookingStore;
use calbook::engine::{Controller, DraftEdit, Intent};
use calbook::model::{Booking, Span};
use calbook::notify::{Notice, NotifyHub};
use calbook::store::{BookingStore, StoreError};

const NINE: i64 = 1_717_232_400_000; // 2024-06-01T09:00:00Z
const HOUR: i64 = 3_600_000;

fn store(server: &MockServer) -> HttpBookingStore {
    HttpBookingStore::new(server.uri(), Duration::from_secs(5)).unwrap()
}

fn listed(id: Ulid, name: &str, start: &str, end: &str) -> serde_json::Value {
    json!({
        "id": id.to_string(),
        "name": name,
        "start": start,
        "end": end,
        "blocked": false,
        "canceled": false,
    })
}

#[tokio::test]
async fn list_decodes_and_skips_records_without_id() {
    let server = MockServer::start().await;
    let id = Ulid::new();
    Mock::given(method("GET"))
        .and(path("/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            listed(id, "Dentist", "2024-06-01T09:00:00Z", "2024-06-01T10:00:00Z"),
            { "id": null, "name": "ghost", "start": "2024-06-01T11:00:00Z", "end": "2024-06-01T12:00:00Z" },
        ])))
        .mount(&server)
        .await;

    let bookings = store(&server).list_bookings().await.unwrap();
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].id, Some(id));
    assert_eq!(bookings[0].span, Span::new(NINE, NINE + HOUR));
}

#[tokio::test]
async fn create_posts_to_collection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bookings"))
        .and(body_partial_json(json!({
            "id": null,
            "name": "Dentist",
            "start": "2024-06-01T09:00:00Z",
            "end": "2024-06-01T10:00:00Z",
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let booking = Booking {
        id: None,
        name: "Dentist".into(),
        span: Span::new(NINE, NINE + HOUR),
        blocked: false,
        canceled: false,
    };
    store(&server).create_or_update(&booking).await.unwrap();
}

#[tokio::test]
async fn update_posts_to_booking() {
    let server = MockServer::start().await;
    let id = Ulid::new();
    Mock::given(method("POST"))
        .and(path(format!("/bookings/{id}")))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let booking = Booking {
        id: Some(id),
        name: "Dentist".into(),
        span: Span::new(NINE, NINE + HOUR),
        blocked: false,
        canceled: false,
    };
    store(&server).create_or_update(&booking).await.unwrap();
}

#[tokio::test]
async fn cancel_and_delete_routes() {
    let server = MockServer::start().await;
    let id = Ulid::new();
    Mock::given(method("POST"))
        .and(path(format!("/bookings/{id}/cancel")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("/bookings/{id}")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let s = store(&server);
    s.cancel_booking(id).await.unwrap();
    s.delete_booking(id).await.unwrap();
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;

    let result = store(&server).cancel_booking(Ulid::new()).await;
    assert!(matches!(result, Err(StoreError::Status(409))));
}

#[tokio::test]
async fn garbage_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = store(&server).list_bookings().await;
    assert!(matches!(result, Err(StoreError::Decode(_))));
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let s = HttpBookingStore::new("http://127.0.0.1:1", Duration::from_secs(1)).unwrap();
    let result = s.list_bookings().await;
    assert!(matches!(result, Err(StoreError::Transport(_))));
}

#[tokio::test]
async fn controller_over_http_rejects_overlap_before_sending() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([listed(
            Ulid::new(),
            "Existing",
            "2024-06-01T09:00:00Z",
            "2024-06-01T10:00:00Z"
        )])))
        .mount(&server)
        .await;
    // Only the back-to-back booking may reach the backend
    Mock::given(method("POST"))
        .and(path("/bookings"))
        .and(body_partial_json(json!({ "start": "2024-06-01T10:00:00Z" })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let mut ctl = Controller::new(Arc::new(store(&server)), Arc::new(NotifyHub::new()));
    ctl.refresh().await;
    let mut rx = ctl.notify().subscribe();

    ctl.dispatch(Intent::SelectRange { start: NINE + HOUR / 2 }).await.unwrap();
    ctl.dispatch(Intent::Edit(DraftEdit::Name("New".into()))).await.unwrap();
    let view = ctl.dispatch(Intent::Submit).await.unwrap();
    assert!(view.session.unwrap().report().has_error());

    ctl.dispatch(Intent::Edit(DraftEdit::Start(Some(NINE + HOUR)))).await.unwrap();
    ctl.dispatch(Intent::Edit(DraftEdit::End(Some(NINE + 2 * HOUR)))).await.unwrap();
    let view = ctl.dispatch(Intent::Submit).await.unwrap();
    assert!(view.session.is_none());
    assert_eq!(rx.recv().await.unwrap(), Notice::Refreshed { count: 1 });
}

#[tokio::test]
async fn controller_over_http_alerts_on_server_error() {
    let server = MockServer::start().await;
    let id = Ulid::new();
    Mock::given(method("GET"))
        .and(path("/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([listed(
            id,
            "Existing",
            "2024-06-01T09:00:00Z",
            "2024-06-01T10:00:00Z"
        )])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/bookings/{id}/cancel")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut ctl = Controller::new(Arc::new(store(&server)), Arc::new(NotifyHub::new()));
    ctl.refresh().await;
    let mut rx = ctl.notify().subscribe();

    ctl.dispatch(Intent::SelectEvent { id }).await.unwrap();
    let view = ctl.dispatch(Intent::Remove).await.unwrap();
    assert!(view.session.is_none());
    assert_eq!(
        rx.recv().await.unwrap(),
        Notice::Alert("An error occurred while canceling the event".into())
    );
    assert_eq!(rx.recv().await.unwrap(), Notice::Refreshed { count: 1 });
}
