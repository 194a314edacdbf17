/// Password Hashing and Verification
///
/// Passwords are hashed with bcrypt. Each hash embeds its own random salt and
/// cost, so the stored string is all that is needed to verify later.

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::AuthError;

/// Hash a password using bcrypt
///
/// # Errors
/// Returns `HashingFailed` if bcrypt rejects the input
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    hash_with_cost(password, DEFAULT_COST)
}

fn hash_with_cost(password: &str, cost: u32) -> Result<String, AuthError> {
    hash(password, cost).map_err(|e| AuthError::HashingFailed(e.to_string()))
}

/// Verify a password against its stored hash
///
/// A wrong password is `Ok(false)`, not an error.
///
/// # Errors
/// Returns `ComparisonFailed` only when the stored hash is malformed
pub fn verify_password(password: &str, hashed: &str) -> Result<bool, AuthError> {
    verify(password, hashed).map_err(|e| AuthError::ComparisonFailed(e.to_string()))
}
