use chrono::{DateTime, Utc};
use infra::repos::BookingStatus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domains::bookings::types::{Booking, CreateBookingRequest};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutRequest {
    pub booking_data: CreateBookingRequest,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub booking_id: Uuid,
    /// Absent when nothing is due and the booking was confirmed straight away.
    pub session_id: Option<String>,
    pub session_url: Option<String>,
    pub total_price_cents: i32,
    pub status: BookingStatus,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub booking: Booking,
    pub payment_status: String,
    pub session_status: Option<String>,
    pub paid: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundRequest {
    pub booking_id: Uuid,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundCalculation {
    pub booking_id: Uuid,
    pub total_price_cents: i32,
    pub refund_percentage: i32,
    /// What a cancellation right now would give back.
    pub refund_amount_cents: i32,
    pub hours_until_start: i64,
    pub paid_online: bool,
    pub can_cancel: bool,
    pub can_refund: bool,
}
