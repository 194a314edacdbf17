/// Persistence layer
///
/// Everything the service reads or writes goes through `Store`. The
/// Postgres implementation is used in production; the in-memory one backs
/// the test suite and local runs without a database.

mod memory;
mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::RefreshToken;
use crate::error::DatabaseError;

/// A registered user, including the stored password hash
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Chirp {
    pub id: Uuid,
    pub body: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data store contract
///
/// Implementations fail only with `NotFound`, `UniqueConstraintViolation`
/// or an infrastructure error. Refresh tokens are addressed by fingerprint.
#[async_trait]
pub trait Store: Send + Sync {
    async fn create_user(&self, email: &str, hashed_password: &str) -> Result<User, DatabaseError>;

    async fn get_user_by_email(&self, email: &str) -> Result<User, DatabaseError>;

    async fn update_user(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<User, DatabaseError>;

    /// Removes every user together with their refresh tokens and chirps
    async fn delete_all_users(&self) -> Result<(), DatabaseError>;

    async fn create_refresh_token(
        &self,
        token_hash: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshToken, DatabaseError>;

    async fn get_refresh_token(&self, token_hash: &str) -> Result<RefreshToken, DatabaseError>;

    /// Sets `revoked_at`; `NotFound` if no such token exists
    async fn revoke_refresh_token(&self, token_hash: &str) -> Result<RefreshToken, DatabaseError>;

    async fn create_chirp(&self, body: &str, user_id: Uuid) -> Result<Chirp, DatabaseError>;

    /// All chirps, oldest first
    async fn list_chirps(&self) -> Result<Vec<Chirp>, DatabaseError>;

    async fn get_chirp(&self, id: Uuid) -> Result<Chirp, DatabaseError>;
}
