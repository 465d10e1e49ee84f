use std::net::SocketAddr;

use crate::engine::Intent;

/// Counter: intents handled by the lifecycle controller. Labels: intent, status.
pub const INTENTS_TOTAL: &str = "calbook_intents_total";

/// Counter: submissions rejected by the validator.
pub const VALIDATION_REJECTIONS_TOTAL: &str = "calbook_validation_rejections_total";

/// Counter: failed store calls. Labels: op.
pub const STORE_ERRORS_TOTAL: &str = "calbook_store_errors_total";

/// Histogram: store call latency in seconds. Labels: op.
pub const STORE_DURATION_SECONDS: &str = "calbook_store_duration_seconds";

/// Gauge: bookings in the last fetched snapshot.
pub const BOOKINGS_LOADED: &str = "calbook_bookings_loaded";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) -> Result<(), metrics_exporter_prometheus::BuildError> {
    let Some(port) = port else { return Ok(()) };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
    Ok(())
}

/// Map an Intent variant to a short label for metrics.
pub fn intent_label(intent: &Intent) -> &'static str {
    match intent {
        Intent::SelectRange { .. } => "select_range",
        Intent::SelectEvent { .. } => "select_event",
        Intent::Edit(_) => "edit",
        Intent::Submit => "submit",
        Intent::Remove => "remove",
        Intent::Close => "close",
        Intent::Refresh => "refresh",
    }
}
