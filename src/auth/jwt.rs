/// Access Token Codec
///
/// Stateless HS256 tokens. Validity is decided entirely by the signature,
/// the issuer and the expiry; nothing is persisted.

use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::{Claims, ISSUER};
use crate::error::AuthError;

/// Issue a signed access token for `user_id`, valid for `ttl`
///
/// # Errors
/// Returns `SigningFailed` if the token cannot be encoded
pub fn issue_access_token(user_id: Uuid, secret: &str, ttl: Duration) -> Result<String, AuthError> {
    let claims = Claims::new(user_id, ttl);

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::SigningFailed(e.to_string()))
}

/// Verify an access token and return the user id it was issued for
///
/// # Errors
/// Every failure (bad signature, wrong issuer, malformed structure, expiry,
/// unparsable subject) is `InvalidToken`. Callers cannot tell them apart.
pub fn verify_access_token(token: &str, secret: &str) -> Result<Uuid, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);
    validation.leeway = 0;

    let claims = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!(reason = ?e.kind(), "Access token rejected");
            AuthError::InvalidToken
        })?;

    // jsonwebtoken only rejects exp < now; a token expiring this second is spent too.
    if claims.is_expired() {
        return Err(AuthError::InvalidToken);
    }

    claims.user_id()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-characters-long";

    #[test]
    fn test_issue_and_verify_token() {
        let user_id = Uuid::new_v4();

        let token = issue_access_token(user_id, SECRET, Duration::hours(1)).expect("Failed to issue token");
        let verified = verify_access_token(&token, SECRET).expect("Failed to verify token");

        assert_eq!(verified, user_id);
    }

    #[test]
    fn test_invalid_token() {
        let result = verify_access_token("invalid.token.here", SECRET);
        assert_eq!(result, Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_tampered_token() {
        let token = issue_access_token(Uuid::new_v4(), SECRET, Duration::hours(1)).unwrap();

        let tampered = format!("{}X", token);
        assert_eq!(verify_access_token(&tampered, SECRET), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_wrong_secret() {
        let token = issue_access_token(Uuid::new_v4(), SECRET, Duration::hours(1)).unwrap();

        let result = verify_access_token(&token, "a-completely-different-secret-value");
        assert_eq!(result, Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_expired_token_is_indistinguishable_from_forged() {
        let user_id = Uuid::new_v4();
        let expired = issue_access_token(user_id, SECRET, Duration::seconds(-120)).unwrap();
        let forged = issue_access_token(user_id, "other-secret", Duration::hours(1)).unwrap();

        assert_eq!(verify_access_token(&expired, SECRET), verify_access_token(&forged, SECRET));
        assert_eq!(verify_access_token(&expired, SECRET), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_wrong_issuer() {
        let claims = Claims {
            iss: "someone-else".to_string(),
            sub: Uuid::new_v4().to_string(),
            iat: chrono::Utc::now().timestamp(),
            exp: chrono::Utc::now().timestamp() + 3600,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(verify_access_token(&token, SECRET), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_non_uuid_subject() {
        let mut claims = Claims::new(Uuid::new_v4(), Duration::hours(1));
        claims.sub = "not-a-uuid".to_string();
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(verify_access_token(&token, SECRET), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_back_to_back_tokens_differ() {
        let user_id = Uuid::new_v4();
        let a = issue_access_token(user_id, SECRET, Duration::hours(1)).unwrap();
        let b = issue_access_token(user_id, SECRET, Duration::hours(1)).unwrap();

        assert_ne!(a, b);
    }
}
