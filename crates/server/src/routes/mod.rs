//! HTTP routes.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                   - Health check
//!
//! # Auth
//! POST   /api/auth/register        - Create an account
//! POST   /api/auth/login           - Log in (sets session cookie)
//! POST   /api/auth/logout          - Log out
//! GET    /api/auth/me              - Current user (requires auth)
//!
//! # Printers
//! GET    /api/printers             - Listing (?available=true)
//! POST   /api/printers             - List a printer (requires auth)
//! GET    /api/printers/{id}        - Printer detail
//! PUT    /api/printers/{id}        - Partial update (owner only)
//! DELETE /api/printers/{id}        - Delete (owner only)
//!
//! # Orders (all require auth)
//! GET    /api/orders               - Listing (?filter=customer|owner)
//! POST   /api/orders               - Place an order
//! GET    /api/orders/{id}          - Order detail (customer or printer owner)
//! PUT    /api/orders/{id}          - Change status/paymentStatus
//! ```

pub mod auth;
pub mod orders;
pub mod printers;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use serde::de::DeserializeOwned;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::error::{AppError, Result};
use crate::middleware::{
    api_rate_limiter, auth_rate_limiter, create_session_layer, request_id_middleware,
    security_headers_middleware,
};
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the printer routes router.
pub fn printer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(printers::index).post(printers::create))
        .route(
            "/{id}",
            get(printers::show)
                .put(printers::update)
                .delete(printers::destroy),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index).post(orders::create))
        .route("/{id}", get(orders::show).put(orders::update))
}

/// Create all routes, without rate limiting.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api/auth", auth_routes())
        .nest("/api/printers", printer_routes())
        .nest("/api/orders", order_routes())
}

/// Create all routes with per-IP rate limiting.
///
/// The limiters need a client IP, so the server must be started with
/// `into_make_service_with_connect_info` or sit behind a proxy that sets
/// `X-Forwarded-For`.
pub fn rate_limited_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api/auth", auth_routes().layer(auth_rate_limiter()))
        .nest("/api/printers", printer_routes().layer(api_rate_limiter()))
        .nest("/api/orders", order_routes().layer(api_rate_limiter()))
}

/// Wrap `routes` with the session, security, request ID, tracing and Sentry
/// layers, and attach `state`.
pub fn app(routes: Router<AppState>, state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    routes
        .layer(axum_middleware::from_fn(security_headers_middleware))
        .layer(session_layer)
        .layer(axum_middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Decode a JSON request body that was read as raw bytes.
///
/// Update handlers take the body as bytes so the target's existence and the
/// caller's permission are checked before the body is looked at.
pub(crate) fn json_body<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use printshare_core::OrderStatus;

    use super::*;
    use crate::models::OrderPatch;

    #[test]
    fn test_json_body_decodes() {
        let patch: OrderPatch = json_body(br#"{"status":"approved"}"#).unwrap();
        assert_eq!(patch.status, Some(OrderStatus::Approved));
        assert!(patch.payment_status.is_none());
    }

    #[test]
    fn test_json_body_rejects_garbage() {
        let bodies: [&[u8]; 3] = [b"", b"{\"status\":", b"{\"status\":\"shipped\"}"];
        for body in bodies {
            assert!(matches!(
                json_body::<OrderPatch>(body),
                Err(AppError::BadRequest(_))
            ));
        }
    }
}
