//! bcrypt password hashing, run on the blocking pool.

use anyhow::{Context, Result};

/// Fixed bcrypt work factor.
pub const BCRYPT_COST: u32 = 10;

/// Hash a password with a fresh salt.
///
/// # Errors
/// Returns an error if bcrypt fails or the blocking task panics.
pub async fn hash_password(password: &str) -> Result<String> {
    let password = password.to_string();

    tokio::task::spawn_blocking(move || bcrypt::hash(password, BCRYPT_COST))
        .await
        .context("Password hashing task failed")?
        .context("Failed to hash password")
}

/// Compare a password with a stored bcrypt hash.
///
/// # Errors
/// Returns an error if the stored hash is malformed or the blocking task panics.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let password = password.to_string();
    let hash = hash.to_string();

    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .context("Password verification task failed")?
        .context("Failed to verify password")
}
