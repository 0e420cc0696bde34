//! Opaque invite-token generation.
//!
//! Tokens correlate inbound tracking callbacks to an invite row, so they only
//! need to be unguessable and collision-free at the expected scale. A 24-char
//! alphanumeric suffix gives a 62^24 keyspace; the birthday bound at 100k
//! issued tokens is far below one in a billion. Uniqueness is still enforced
//! by the unique column constraint, not by the generator.

use rand::{distr::Alphanumeric, Rng};

pub const TOKEN_PREFIX: &str = "ea_";
pub const TOKEN_RANDOM_LEN: usize = 24;

/// Generate a fresh invite token: a literal prefix plus random alphanumerics.
pub fn generate_token() -> String {
    let suffix: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(TOKEN_RANDOM_LEN)
        .map(char::from)
        .collect();
    format!("{}{}", TOKEN_PREFIX, suffix)
}
