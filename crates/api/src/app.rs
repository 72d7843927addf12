use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{
        header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE},
        Method, StatusCode,
    },
    middleware,
    routing::{get, patch, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::GovernorLayer;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::domains::{admin, bookings, payments, rooms};
use crate::error::AppError;
use crate::middleware::jwt::jwt_middleware;
use crate::state::AppState;

/// Build the REST router. Expects to be served with
/// `into_make_service_with_connect_info::<SocketAddr>()` so the rate limiter
/// can key on the peer address.
pub fn build_router(state: AppState) -> Router {
    // Booking creation: 10 requests burst, then one every 6 seconds per IP.
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(6)
        .burst_size(10)
        .finish()
        .expect("static governor configuration is valid");

    let rate_limited_routes = Router::new()
        .route("/api/bookings", post(bookings::handlers::create))
        .route(
            "/api/payment/create-checkout",
            post(payments::handlers::create_checkout),
        )
        .layer(GovernorLayer::new(Arc::new(governor_conf)));

    let admin_routes = Router::new()
        .route(
            "/rooms",
            get(admin::handlers::list_rooms).post(admin::handlers::create_room),
        )
        .route(
            "/rooms/{id}",
            put(admin::handlers::update_room).delete(admin::handlers::delete_room),
        )
        .route("/rooms/{id}/toggle", patch(admin::handlers::toggle_room))
        .route("/bookings", get(admin::handlers::list_bookings))
        .route("/bookings/{id}", put(admin::handlers::modify_booking))
        .route(
            "/bookings/{id}/status",
            patch(admin::handlers::update_booking_status),
        )
        .route("/bookings/{id}/cancel", patch(admin::handlers::cancel_booking))
        .route("/statistics", get(admin::handlers::statistics));

    Router::new()
        .route("/health", get(health))
        .route("/api/rooms", get(rooms::handlers::list))
        .route("/api/rooms/{id}", get(rooms::handlers::get))
        .route(
            "/api/rooms/{id}/availability",
            get(rooms::handlers::availability),
        )
        .route("/api/bookings/my-bookings", get(bookings::handlers::my_bookings))
        .route(
            "/api/bookings/{id}",
            get(bookings::handlers::get).patch(bookings::handlers::modify),
        )
        .route("/api/bookings/{id}/cancel", patch(bookings::handlers::cancel))
        .route(
            "/api/payment/verify/{session_id}",
            get(payments::handlers::verify),
        )
        .route(
            "/api/payment/calculate-refund",
            post(payments::handlers::calculate_refund),
        )
        .route("/api/payment/refund", post(payments::handlers::refund))
        .nest("/api/admin", admin_routes)
        .merge(rate_limited_routes)
        .fallback(not_found)
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(state, jwt_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer({
            let allowed_origins = std::env::var("ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000".to_string());

            let origins: Vec<HeaderValue> = allowed_origins
                .split(',')
                .filter_map(|o| o.trim().parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([CONTENT_TYPE, AUTHORIZATION])
                .allow_credentials(true)
        })
}

/// Liveness plus a quick database round trip.
async fn health(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let _one: i32 = sqlx::query_scalar("SELECT 1").fetch_one(&state.db).await?;
    Ok(Json(json!({ "success": true, "data": { "status": "ok" } })))
}

async fn not_found() -> AppError {
    AppError::not_found("NOT_FOUND", "Route not found")
}
