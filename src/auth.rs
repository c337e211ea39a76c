//! Password hashing and API token helpers.

use crate::error::AppError;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tracing::{debug, error, instrument};

/// Length of an API token key in hex characters.
pub const TOKEN_KEY_LEN: usize = 40;

/// Hash a plain-text password with Argon2 (default parameters, random salt).
#[instrument(name = "auth::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String, AppError> {
    if password.is_empty() {
        return Err(AppError::BadRequest("password cannot be empty".into()));
    }
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!(error = %e, "argon2 hashing failed");
            AppError::Internal(format!("password hashing failed: {}", e))
        })
}

/// `Ok(false)` on mismatch; errors only for unreadable stored hashes.
#[instrument(name = "auth::verify_password", skip_all, err(Display))]
pub fn verify_password(stored_hash: &str, provided: &str) -> Result<bool, AppError> {
    if provided.is_empty() {
        return Ok(false);
    }
    let parsed = PasswordHash::new(stored_hash).map_err(|e| {
        error!(error = %e, "stored password hash is unreadable");
        AppError::Internal(format!("invalid stored password hash: {}", e))
    })?;
    match Argon2::default().verify_password(provided.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => {
            debug!("password mismatch");
            Ok(false)
        }
        Err(e) => Err(AppError::Internal(format!("password verification failed: {}", e))),
    }
}

/// New random token key: 40 lowercase hex characters.
pub fn generate_token_key() -> String {
    let mut key = format!(
        "{}{}",
        uuid::Uuid::new_v4().simple(),
        uuid::Uuid::new_v4().simple()
    );
    key.truncate(TOKEN_KEY_LEN);
    key
}

/// Token key from an `Authorization` header value: `Token <key>` or `Bearer <key>`.
pub fn token_from_authorization(value: &str) -> Option<&str> {
    let (scheme, rest) = value.trim().split_once(' ')?;
    if !(scheme.eq_ignore_ascii_case("token") || scheme.eq_ignore_ascii_case("bearer")) {
        return None;
    }
    let key = rest.trim();
    if key.is_empty() || key.contains(' ') {
        None
    } else {
        Some(key)
    }
}
