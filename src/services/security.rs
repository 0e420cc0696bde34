//! JWT validation for tokens issued by the external identity provider.
//!
//! This service holds no user records of its own; a bearer token is the only
//! proof of identity it sees. Claims carry the caller's id, email and role.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::CONFIG;
use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the identity provider's user id.
    pub sub: String,
    pub email: Option<String>,
    /// Role name; "admin" unlocks the privileged actions.
    pub role: Option<String>,
    pub exp: i64,
}

pub fn decode_token(token: &str) -> Result<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(CONFIG.auth.jwt_secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// Issue a token locally. Production tokens come from the identity provider;
/// this exists for operational tooling and tests, signed with the same secret.
pub fn encode_token(user_id: i64, email: &str, role: &str) -> Result<String> {
    let claims = Claims {
        sub: user_id.to_string(),
        email: Some(email.to_string()),
        role: Some(role.to_string()),
        exp: (chrono::Utc::now() + chrono::Duration::hours(12)).timestamp(),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(CONFIG.auth.jwt_secret.as_bytes()),
    )?;
    Ok(token)
}
