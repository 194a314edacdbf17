/// Refresh Token Management
///
/// Refresh tokens are:
/// - 32 bytes from the operating system's CSPRNG, hex-encoded (64 chars)
/// - Stored only as a SHA-256 fingerprint, never in plaintext
/// - Active until they expire or are revoked; both end states are terminal
/// - Not consumed by use: refreshing leaves the token untouched

use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{AuthError, DatabaseError};
use crate::store::Store;

const TOKEN_BYTES: usize = 32;

/// A persisted refresh token row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshToken {
    /// SHA-256 fingerprint of the plaintext token
    pub token_hash: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

/// Lifecycle of a refresh token
///
/// `Active -> Expired` when `expires_at` passes, `Active -> Revoked` on an
/// explicit revoke. Neither end state leads back to `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTokenState {
    Active,
    Expired,
    Revoked,
}

impl RefreshToken {
    /// Revocation wins over expiry when both apply
    pub fn state_at(&self, now: DateTime<Utc>) -> RefreshTokenState {
        if self.revoked_at.is_some() {
            RefreshTokenState::Revoked
        } else if self.expires_at <= now {
            RefreshTokenState::Expired
        } else {
            RefreshTokenState::Active
        }
    }
}

/// Generate a new cryptographically secure refresh token
///
/// # Errors
/// Returns `EntropyFailure` if the OS random source is unavailable
pub fn generate_refresh_token() -> Result<String, AuthError> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AuthError::EntropyFailure(e.to_string()))?;

    Ok(hex::encode(bytes))
}

/// SHA-256 fingerprint under which a token is stored
pub fn fingerprint(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Persist a new refresh token for `user_id`
///
/// # Errors
/// A fingerprint collision surfaces as `UniqueConstraintViolation`; the
/// caller decides whether to regenerate.
pub async fn save_refresh_token(
    store: &dyn Store,
    token: &str,
    user_id: Uuid,
    expires_at: DateTime<Utc>,
) -> Result<RefreshToken, DatabaseError> {
    store
        .create_refresh_token(&fingerprint(token), user_id, expires_at)
        .await
}

/// Look up a refresh token by its plaintext value
///
/// The row is returned whatever its state; see `RefreshToken::state_at`.
pub async fn lookup_refresh_token(store: &dyn Store, token: &str) -> Result<RefreshToken, DatabaseError> {
    store.get_refresh_token(&fingerprint(token)).await
}

/// Revoke a refresh token by its plaintext value
///
/// # Errors
/// Returns `NotFound` for a token the store has never seen
pub async fn revoke_refresh_token(store: &dyn Store, token: &str) -> Result<RefreshToken, DatabaseError> {
    let revoked = store.revoke_refresh_token(&fingerprint(token)).await?;
    tracing::info!(user_id = %revoked.user_id, "Refresh token revoked");
    Ok(revoked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::collections::HashSet;

    fn row(expires_in: Duration, revoked: bool) -> RefreshToken {
        let now = Utc::now();
        RefreshToken {
            token_hash: fingerprint("token"),
            user_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            expires_at: now + expires_in,
            revoked_at: revoked.then_some(now),
        }
    }

    #[test]
    fn test_generate_refresh_token() {
        let token = generate_refresh_token().unwrap();

        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_generated_tokens_do_not_repeat() {
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            assert!(seen.insert(generate_refresh_token().unwrap()));
        }
    }

    #[test]
    fn test_fingerprint() {
        let token = generate_refresh_token().unwrap();

        assert_eq!(fingerprint(&token), fingerprint(&token));
        assert_ne!(fingerprint(&token), token);
        assert_eq!(fingerprint(&token).len(), 64);
        // Known SHA-256 vector, lowercase hex
        assert_eq!(
            fingerprint("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_ne!(fingerprint("a"), fingerprint("b"));
    }

    #[test]
    fn test_state_machine() {
        let now = Utc::now();

        assert_eq!(row(Duration::days(60), false).state_at(now), RefreshTokenState::Active);
        assert_eq!(row(Duration::seconds(-1), false).state_at(now), RefreshTokenState::Expired);
        assert_eq!(row(Duration::days(60), true).state_at(now), RefreshTokenState::Revoked);
        assert_eq!(row(Duration::seconds(-1), true).state_at(now), RefreshTokenState::Revoked);
    }

    #[test]
    fn test_expiry_is_terminal() {
        let token = row(Duration::hours(1), false);

        assert_eq!(token.state_at(Utc::now()), RefreshTokenState::Active);
        assert_eq!(
            token.state_at(Utc::now() + Duration::hours(2)),
            RefreshTokenState::Expired
        );
    }
}
