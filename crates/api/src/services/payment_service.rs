use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use url::Url;
use uuid::Uuid;

use crate::config::AppConfig;

const DEFAULT_API_BASE: &str = "https://api.stripe.com/v1/";

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment gateway is not configured")]
    NotConfigured,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Stripe API error (status {status}): {body}")]
    Api { status: u16, body: String },
    #[error("Unexpected Stripe response: {0}")]
    Decode(String),
}

#[derive(Clone, Debug)]
pub struct StripeConfig {
    pub secret_key: String,
    pub currency: String,
    pub api_base: Url,
    pub frontend_base_url: String,
}

impl StripeConfig {
    /// `Ok(None)` when no secret key is configured.
    pub fn from_env(app: &AppConfig) -> anyhow::Result<Option<Self>> {
        let Some(secret_key) = std::env::var("STRIPE_SECRET_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty())
        else {
            return Ok(None);
        };

        let api_base = std::env::var("STRIPE_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.into());

        Ok(Some(Self {
            secret_key,
            currency: std::env::var("STRIPE_CURRENCY")
                .unwrap_or_else(|_| "eur".to_string())
                .to_lowercase(),
            api_base: parse_api_base(&api_base)?,
            frontend_base_url: app.frontend_base_url.clone(),
        }))
    }
}

/// Parses a base URL and makes sure relative joins keep its path.
pub fn parse_api_base(raw: &str) -> anyhow::Result<Url> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Ok(Url::parse(&normalized)?)
}

/// Subset of a Stripe Checkout Session the booking flow relies on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(alias = "payment_status")]
    pub payment_status: String,
    #[serde(default, alias = "payment_intent")]
    pub payment_intent: Option<String>,
    #[serde(default, alias = "customer_email")]
    pub customer_email: Option<String>,
    #[serde(default, alias = "amount_total")]
    pub amount_total: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default, alias = "client_reference_id")]
    pub client_reference_id: Option<String>,
}

impl CheckoutSession {
    pub fn is_paid(&self) -> bool {
        self.payment_status == "paid"
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeRefund {
    pub id: String,
    pub amount: i64,
    #[serde(default)]
    pub status: Option<String>,
}

/// Line item and customer data for a new checkout session.
#[derive(Debug, Clone)]
pub struct NewCheckout {
    pub booking_id: Uuid,
    pub product_name: String,
    pub description: String,
    pub amount_cents: i32,
    pub customer_email: String,
    pub expires_at: DateTime<Utc>,
}

/// Thin client over the Stripe REST API (form-encoded requests, bearer auth).
#[derive(Clone)]
pub struct StripeGateway {
    config: StripeConfig,
    client: reqwest::Client,
}

impl StripeGateway {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn currency(&self) -> &str {
        &self.config.currency
    }

    fn endpoint(&self, path: &str) -> Result<Url, PaymentError> {
        self.config
            .api_base
            .join(path)
            .map_err(|e| PaymentError::Decode(format!("invalid endpoint {path}: {e}")))
    }

    async fn read<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<T, PaymentError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::Api {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|e| PaymentError::Decode(e.to_string()))
    }

    pub async fn create_checkout_session(
        &self,
        checkout: &NewCheckout,
    ) -> Result<CheckoutSession, PaymentError> {
        let base = &self.config.frontend_base_url;
        let success_url = format!("{base}/booking/success?session_id={{CHECKOUT_SESSION_ID}}");
        let cancel_url = format!("{base}/booking/cancel?booking_id={}", checkout.booking_id);
        let booking_id = checkout.booking_id.to_string();

        let form: Vec<(&str, String)> = vec![
            ("mode", "payment".into()),
            ("payment_method_types[0]", "card".into()),
            ("line_items[0][quantity]", "1".into()),
            ("line_items[0][price_data][currency]", self.config.currency.clone()),
            (
                "line_items[0][price_data][unit_amount]",
                checkout.amount_cents.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]",
                checkout.product_name.clone(),
            ),
            (
                "line_items[0][price_data][product_data][description]",
                checkout.description.clone(),
            ),
            ("customer_email", checkout.customer_email.clone()),
            ("client_reference_id", booking_id.clone()),
            ("metadata[booking_id]", booking_id.clone()),
            ("payment_intent_data[metadata][booking_id]", booking_id),
            ("expires_at", checkout.expires_at.timestamp().to_string()),
            ("success_url", success_url),
            ("cancel_url", cancel_url),
        ];

        let response = self
            .client
            .post(self.endpoint("checkout/sessions")?)
            .bearer_auth(&self.config.secret_key)
            .form(&form)
            .send()
            .await
            .map_err(|e| PaymentError::Network(e.to_string()))?;

        let session: CheckoutSession = Self::read(response).await?;
        info!(
            "Created checkout session {} for booking {}",
            session.id, checkout.booking_id
        );
        Ok(session)
    }

    pub async fn retrieve_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSession, PaymentError> {
        let mut url = self.endpoint("checkout/sessions/")?;
        url.path_segments_mut()
            .map_err(|_| PaymentError::Decode("api base cannot carry a path".into()))?
            .pop_if_empty()
            .push(session_id);

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.config.secret_key)
            .send()
            .await
            .map_err(|e| PaymentError::Network(e.to_string()))?;

        Self::read(response).await
    }

    /// Closes an open session so it can no longer be paid.
    pub async fn expire_session(&self, session_id: &str) -> Result<CheckoutSession, PaymentError> {
        let mut url = self.endpoint("checkout/sessions/")?;
        url.path_segments_mut()
            .map_err(|_| PaymentError::Decode("api base cannot carry a path".into()))?
            .pop_if_empty()
            .push(session_id)
            .push("expire");

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.secret_key)
            .send()
            .await
            .map_err(|e| PaymentError::Network(e.to_string()))?;

        Self::read(response).await
    }

    /// Refunds part of a payment intent. The idempotency key is derived from the
    /// booking so concurrent cancellations cannot refund twice.
    pub async fn create_refund(
        &self,
        payment_intent: &str,
        amount_cents: i32,
        booking_id: Uuid,
    ) -> Result<StripeRefund, PaymentError> {
        let form = [
            ("payment_intent", payment_intent.to_string()),
            ("amount", amount_cents.to_string()),
            ("reason", "requested_by_customer".to_string()),
            ("metadata[booking_id]", booking_id.to_string()),
        ];

        let response = self
            .client
            .post(self.endpoint("refunds")?)
            .bearer_auth(&self.config.secret_key)
            .header("Idempotency-Key", format!("booking-refund-{booking_id}"))
            .form(&form)
            .send()
            .await
            .map_err(|e| PaymentError::Network(e.to_string()))?;

        let refund: StripeRefund = Self::read(response).await?;
        info!(
            "Refunded {} cents for booking {} (refund {})",
            refund.amount, booking_id, refund.id
        );
        Ok(refund)
    }
}
