use std::env;

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret shared with the external identity provider that issues
    /// the bearer tokens this service validates.
    pub jwt_secret: String,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        Self {
            jwt_secret: env::var("LEADWIRE_JWT_SECRET")
                .unwrap_or_else(|_| "dev-secret-change-me".to_string()),
        }
    }
}
