use axum::extract::State;

use crate::auth::AuthUser;
use crate::domains::bookings::handlers::cancellation_response;
use crate::domains::bookings::service::{self as booking_service, Acting};
use crate::domains::bookings::types::CancellationResult;
use crate::domains::payments::service;
use crate::domains::payments::types::{
    CheckoutResponse, CreateCheckoutRequest, RefundCalculation, RefundRequest, VerifyResponse,
};
use crate::error::AppError;
use crate::extract::{ApiJson, ApiPath};
use crate::response::ApiResponse;
use crate::AppState;

/// `POST /api/payment/create-checkout`
pub async fn create_checkout(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(req): ApiJson<CreateCheckoutRequest>,
) -> Result<ApiResponse<CheckoutResponse>, AppError> {
    let checkout = service::create_checkout(&state, &user, &req).await?;
    Ok(ApiResponse::created(checkout))
}

/// `GET /api/payment/verify/{session_id}`
pub async fn verify(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(session_id): ApiPath<String>,
) -> Result<ApiResponse<VerifyResponse>, AppError> {
    Ok(ApiResponse::ok(service::verify_session(&state, &user, &session_id).await?))
}

/// `POST /api/payment/calculate-refund`
pub async fn calculate_refund(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(req): ApiJson<RefundRequest>,
) -> Result<ApiResponse<RefundCalculation>, AppError> {
    Ok(ApiResponse::ok(
        service::calculate_refund(&state, &user, req.booking_id).await?,
    ))
}

/// `POST /api/payment/refund`: cancels the booking and refunds what its timing allows.
pub async fn refund(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(req): ApiJson<RefundRequest>,
) -> Result<ApiResponse<CancellationResult>, AppError> {
    let acting = if user.is_admin() {
        Acting::Admin
    } else {
        Acting::Customer
    };
    let outcome =
        booking_service::cancel_booking(&state, req.booking_id, &user, acting, req.reason).await?;
    Ok(cancellation_response(outcome))
}
