use axum::{
    body::Body,
    extract::Request,
    routing::{delete, get, patch, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;

use crate::api::handlers::{health, reservation, slot, staff};
use crate::state::AppState;
use tower_http::{classify::ServerErrorsFailureClass, trace::TraceLayer};
use tracing::{error, info, info_span, Span};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Slots
        .route("/api/v1/slots/grid", get(slot::grid))
        .route("/api/v1/slots/batch", post(slot::batch_edit))
        .route("/api/v1/slots/open", get(slot::open_slots))
        .route("/api/v1/slots/selectable", get(slot::selectable_slots))

        // Reservations
        .route("/api/v1/reservations", post(reservation::create_reservation))
        .route("/api/v1/reservations/{reservation_id}/staff", patch(reservation::reassign_staff))
        .route("/api/v1/reservations/{reservation_id}", delete(reservation::delete_reservation))
        .route("/api/v1/customers/{customer_id}/reservation", get(reservation::get_customer_reservation))

        // Customer-facing booking flow
        .route("/api/v1/book", post(reservation::book))

        // Staff directory
        .route("/api/v1/staff", get(staff::list_staff))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
