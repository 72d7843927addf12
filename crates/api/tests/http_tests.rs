mod common;

use api::app::build_router;
use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use common::{admin_token, customer, lazy_state, request, send};

#[tokio::test]
async fn my_bookings_requires_a_token() {
    let state = lazy_state();
    let app = build_router(state);

    let (status, body) = send(app, request("GET", "/api/bookings/my-bookings", None, None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn invalid_token_is_rejected() {
    let state = lazy_state();
    let app = build_router(state);

    let (status, body) = send(
        app,
        request("GET", "/api/rooms", Some("not.a.jwt"), None),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "Invalid or expired token");
}

#[tokio::test]
async fn customers_cannot_reach_admin_routes() {
    let state = lazy_state();
    let (_, token) = customer(&state);
    let app = build_router(state);

    let (status, body) = send(
        app,
        request("GET", "/api/admin/statistics", Some(&token), None),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn invalid_booking_reports_field_details() {
    let state = lazy_state();
    let (_, token) = customer(&state);
    let app = build_router(state);

    let payload = json!({
        "roomId": "not-a-uuid",
        "date": "2026-02-30",
        "startTime": "10:00",
        "endTime": "09:00",
        "customerName": "A",
        "customerEmail": "nope",
        "numberOfPeople": 0
    });
    let (status, body) = send(
        app,
        request("POST", "/api/bookings", Some(&token), Some(payload)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["message"], "Invalid input data");

    let details = &body["error"]["details"];
    for field in ["roomId", "date", "customerName", "customerEmail", "numberOfPeople"] {
        assert!(details[field].is_string(), "expected details for {field}: {body}");
    }
}

#[tokio::test]
async fn malformed_json_is_invalid_input() {
    let state = lazy_state();
    let (_, token) = customer(&state);
    let app = build_router(state);

    let mut req = request("POST", "/api/bookings", Some(&token), None);
    req.headers_mut().insert(
        axum::http::header::CONTENT_TYPE,
        "application/json".parse().unwrap(),
    );
    *req.body_mut() = axum::body::Body::from("{\"roomId\": ");

    let (status, body) = send(app, req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn non_uuid_path_is_invalid_input() {
    let state = lazy_state();
    let (_, token) = customer(&state);
    let app = build_router(state);

    let (status, body) = send(
        app,
        request("GET", "/api/bookings/42", Some(&token), None),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn availability_rejects_bad_dates() {
    let state = lazy_state();
    let app = build_router(state);
    let uri = format!("/api/rooms/{}/availability?date=03-04-2026", Uuid::new_v4());

    let (status, body) = send(app, request("GET", &uri, None, None)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["details"]["date"].is_string());
}

#[tokio::test]
async fn checkout_without_stripe_is_unavailable() {
    let state = lazy_state();
    let (_, token) = customer(&state);
    let app = build_router(state);

    let payload = json!({
        "bookingData": {
            "roomId": Uuid::new_v4(),
            "date": "2099-01-01",
            "startTime": "10:00",
            "endTime": "11:00",
            "customerName": "Jeanne Martin",
            "customerEmail": "jeanne@example.com",
            "numberOfPeople": 2
        }
    });
    let (status, body) = send(
        app,
        request("POST", "/api/payment/create-checkout", Some(&token), Some(payload)),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "PAYMENT_UNAVAILABLE");
}

#[tokio::test]
async fn admin_status_must_be_known() {
    let state = lazy_state();
    let token = admin_token(&state);
    let app = build_router(state);
    let uri = format!("/api/admin/bookings/{}/status", Uuid::new_v4());

    let (status, body) = send(
        app,
        request("PATCH", &uri, Some(&token), Some(json!({ "status": "bogus" }))),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_STATUS");
}

#[tokio::test]
async fn admin_cannot_force_refunded_status() {
    let state = lazy_state();
    let token = admin_token(&state);
    let app = build_router(state);
    let uri = format!("/api/admin/bookings/{}/status", Uuid::new_v4());

    let (status, body) = send(
        app,
        request("PATCH", &uri, Some(&token), Some(json!({ "status": "refunded" }))),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_STATUS");
}

#[tokio::test]
async fn unknown_routes_use_the_error_envelope() {
    let state = lazy_state();
    let app = build_router(state);

    let (status, body) = send(app, request("GET", "/api/nope", None, None)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}
