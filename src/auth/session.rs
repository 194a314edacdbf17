/// Session Orchestrator
///
/// Composes password verification, access tokens and refresh tokens into
/// the login, refresh, revoke and authenticate flows. All state lives in the
/// injected `Store`; the service itself is immutable and shared across workers.

use actix_web::http::header::HeaderMap;
use chrono::Utc;
use lazy_static::lazy_static;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::bearer::extract_bearer;
use crate::auth::jwt::{issue_access_token, verify_access_token};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::refresh_token::{
    generate_refresh_token, lookup_refresh_token, revoke_refresh_token, save_refresh_token,
    RefreshTokenState,
};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError, DatabaseError, ErrorContext};
use crate::store::{Store, User};

const MAX_GENERATE_ATTEMPTS: usize = 3;

lazy_static! {
    // Verified against when the email is unknown so both login failures cost one bcrypt run.
    static ref DUMMY_HASH: Option<String> = hash_password("chirpy-dummy-password").ok();
}

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

pub struct SessionService {
    store: Arc<dyn Store>,
    jwt: JwtSettings,
}

impl SessionService {
    pub fn new(store: Arc<dyn Store>, jwt: JwtSettings) -> Self {
        lazy_static::initialize(&DUMMY_HASH);
        Self { store, jwt }
    }

    /// Verify email and password, then mint one access token and one refresh token
    ///
    /// The email is trimmed the same way registration trims it.
    ///
    /// # Errors
    /// - `InvalidCredentials` for an unknown email or a wrong password alike
    /// - internal kinds for hashing, signing, entropy or store failures
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginSession, AppError> {
        let context = ErrorContext::new("login");
        let email = email.trim();

        let user = match self.store.get_user_by_email(email).await {
            Ok(user) => Some(user),
            Err(DatabaseError::NotFound(_)) => None,
            Err(e) => return Err(e.into()),
        };

        let password_matches = match (&user, DUMMY_HASH.as_deref()) {
            (Some(user), _) => verify_password(password, &user.hashed_password)?,
            (None, Some(dummy)) => verify_password(password, dummy).map(|_| false)?,
            (None, None) => false,
        };

        let user = match user {
            Some(user) if password_matches => user,
            _ => {
                let err = AppError::Auth(AuthError::InvalidCredentials);
                context.log_error(&err);
                return Err(err);
            }
        };

        let access_token = issue_access_token(user.id, &self.jwt.secret, self.jwt.access_token_ttl())?;
        let refresh_token = self.mint_refresh_token(user.id).await?;

        tracing::info!(
            request_id = %context.request_id,
            user_id = %user.id,
            "User logged in successfully"
        );

        Ok(LoginSession {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Issue a new access token for the user bound to an active refresh token
    ///
    /// The refresh token is neither consumed nor rotated, so concurrent
    /// refreshes with one token each succeed independently.
    ///
    /// # Errors
    /// `RefreshTokenRejected` if the token is unknown, expired or revoked
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AppError> {
        let record = match lookup_refresh_token(self.store.as_ref(), refresh_token).await {
            Ok(record) => record,
            Err(DatabaseError::NotFound(_)) => {
                tracing::warn!("Refresh attempted with unknown token");
                return Err(AuthError::RefreshTokenRejected.into());
            }
            Err(e) => return Err(e.into()),
        };

        let state = record.state_at(Utc::now());
        if state != RefreshTokenState::Active {
            tracing::warn!(user_id = %record.user_id, state = ?state, "Refresh attempted with inactive token");
            return Err(AuthError::RefreshTokenRejected.into());
        }

        let access_token =
            issue_access_token(record.user_id, &self.jwt.secret, self.jwt.access_token_ttl())?;

        tracing::info!(user_id = %record.user_id, "Access token refreshed");
        Ok(access_token)
    }

    /// Mark a refresh token revoked
    ///
    /// # Errors
    /// `NotFound` if the store has never seen the token
    pub async fn revoke(&self, refresh_token: &str) -> Result<(), AppError> {
        revoke_refresh_token(self.store.as_ref(), refresh_token).await?;
        Ok(())
    }

    /// Resolve an access token to the user it was issued for
    pub fn authenticate(&self, access_token: &str) -> Result<Uuid, AuthError> {
        verify_access_token(access_token, &self.jwt.secret)
    }

    /// Bearer extraction followed by `authenticate`
    pub fn authenticate_headers(&self, headers: &HeaderMap) -> Result<Uuid, AuthError> {
        let token = extract_bearer(headers)?;
        self.authenticate(&token)
    }

    async fn mint_refresh_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let expires_at = Utc::now() + self.jwt.refresh_token_ttl();

        for attempt in 1..=MAX_GENERATE_ATTEMPTS {
            let token = generate_refresh_token()?;
            match save_refresh_token(self.store.as_ref(), &token, user_id, expires_at).await {
                Ok(_) => return Ok(token),
                Err(DatabaseError::UniqueConstraintViolation(_)) => {
                    tracing::warn!(attempt, "Refresh token collided with an existing one");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(AuthError::EntropyFailure("refresh token collided repeatedly".to_string()).into())
    }
}
