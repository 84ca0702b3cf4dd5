//! Invitation token issuer.

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Issue a fresh capability token.
///
/// The token is the hex SHA-256 of the seed, the current time and 32 random
/// bytes, so it is URL-safe and carries 256 bits of entropy regardless of the
/// seed. Failure of the OS randomness source aborts the process inside `rand`.
pub fn issue(seed: &str) -> String {
    let mut nonce = [0u8; 32];
    rand::rng().fill_bytes(&mut nonce);

    let mut hasher = Sha256::new();
    hasher.update(seed.as_bytes());
    hasher.update(
        Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or_default()
            .to_le_bytes(),
    );
    hasher.update(nonce);
    hex::encode(hasher.finalize())
}

pub fn expiry_from(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    now + ttl
}

/// Shortened form for log lines.
pub fn redact(token: &str) -> String {
    let prefix: String = token.chars().take(8).collect();
    format!("{prefix}…")
}
