use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::{AuthConfig, JwtService};
use crate::config::AppConfig;
use crate::services::email_service::{EmailConfig, EmailService};
use crate::services::payment_service::{PaymentError, StripeConfig, StripeGateway};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    config: Arc<AppConfig>,
    auth_config: AuthConfig,
    jwt_service: JwtService,
    email_service: Option<EmailService>,
    payment_gateway: Option<StripeGateway>,
}

impl AppState {
    pub fn new(db: PgPool, config: AppConfig, auth_config: AuthConfig) -> Self {
        let jwt_service = JwtService::new(&auth_config);

        Self {
            db,
            config: Arc::new(config),
            auth_config,
            jwt_service,
            email_service: None,
            payment_gateway: None,
        }
    }

    /// Builds the state from environment variables. Email and Stripe stay disabled
    /// when their credentials are absent.
    pub fn from_env(db: PgPool) -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        let auth_config = AuthConfig::from_env()?;

        let email = EmailConfig::from_env(&config);
        if email.is_none() {
            tracing::warn!("Email credentials not configured; notifications are disabled");
        }

        let stripe = StripeConfig::from_env(&config)?;
        if stripe.is_none() {
            tracing::warn!("STRIPE_SECRET_KEY not set; online payment is disabled");
        }

        let mut state = Self::new(db, config, auth_config);
        state.email_service = email.map(EmailService::new);
        state.payment_gateway = stripe.map(StripeGateway::new);
        Ok(state)
    }

    pub fn with_email_service(mut self, service: EmailService) -> Self {
        self.email_service = Some(service);
        self
    }

    pub fn with_payment_gateway(mut self, gateway: StripeGateway) -> Self {
        self.payment_gateway = Some(gateway);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn auth_config(&self) -> &AuthConfig {
        &self.auth_config
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    pub fn email_service(&self) -> Option<&EmailService> {
        self.email_service.as_ref()
    }

    pub fn payment_gateway(&self) -> Result<&StripeGateway, PaymentError> {
        self.payment_gateway.as_ref().ok_or(PaymentError::NotConfigured)
    }
}
