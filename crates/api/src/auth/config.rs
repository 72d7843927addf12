use anyhow::{anyhow, Result};
use std::env;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// Shared secret used to verify session tokens issued by the identity provider.
    pub jwt_secret: String,
    pub access_token_expiration_minutes: u64,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            access_token_expiration_minutes: 60,
        }
    }

    pub fn from_env() -> Result<Self> {
        let jwt_secret = env::var("JWT_SECRET").map_err(|_| anyhow!("JWT_SECRET must be set"))?;

        Ok(Self {
            jwt_secret,
            access_token_expiration_minutes: env::var("ACCESS_TOKEN_EXPIRATION_MINUTES")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap_or(60),
        })
    }
}
