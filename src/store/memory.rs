use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::{Chirp, Store, User};
use crate::auth::RefreshToken;
use crate::error::DatabaseError;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    refresh_tokens: HashMap<String, RefreshToken>,
    chirps: Vec<Chirp>,
}

/// Process-local `Store` with the same constraints as the Postgres schema:
/// unique emails, unique token fingerprints, cascading user deletes.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, DatabaseError> {
        self.tables
            .lock()
            .map_err(|_| DatabaseError::UnexpectedError("in-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn create_user(&self, email: &str, hashed_password: &str) -> Result<User, DatabaseError> {
        let mut tables = self.tables()?;
        if tables.users.values().any(|u| u.email == email) {
            return Err(DatabaseError::UniqueConstraintViolation("users.email".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, DatabaseError> {
        self.tables()?
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound("user".to_string()))
    }

    async fn update_user(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<User, DatabaseError> {
        let mut tables = self.tables()?;
        if tables.users.values().any(|u| u.email == email && u.id != id) {
            return Err(DatabaseError::UniqueConstraintViolation("users.email".to_string()));
        }

        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::NotFound("user".to_string()))?;
        user.email = email.to_string();
        user.hashed_password = hashed_password.to_string();
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn delete_all_users(&self) -> Result<(), DatabaseError> {
        let mut tables = self.tables()?;
        tables.users.clear();
        tables.refresh_tokens.clear();
        tables.chirps.clear();
        Ok(())
    }

    async fn create_refresh_token(
        &self,
        token_hash: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshToken, DatabaseError> {
        let mut tables = self.tables()?;
        if !tables.users.contains_key(&user_id) {
            return Err(DatabaseError::UnexpectedError(
                "refresh_tokens.user_id violates foreign key".to_string(),
            ));
        }
        if tables.refresh_tokens.contains_key(token_hash) {
            return Err(DatabaseError::UniqueConstraintViolation(
                "refresh_tokens.token_hash".to_string(),
            ));
        }

        let now = Utc::now();
        let token = RefreshToken {
            token_hash: token_hash.to_string(),
            user_id,
            created_at: now,
            updated_at: now,
            expires_at,
            revoked_at: None,
        };
        tables
            .refresh_tokens
            .insert(token_hash.to_string(), token.clone());
        Ok(token)
    }

    async fn get_refresh_token(&self, token_hash: &str) -> Result<RefreshToken, DatabaseError> {
        self.tables()?
            .refresh_tokens
            .get(token_hash)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound("refresh token".to_string()))
    }

    async fn revoke_refresh_token(&self, token_hash: &str) -> Result<RefreshToken, DatabaseError> {
        let mut tables = self.tables()?;
        let token = tables
            .refresh_tokens
            .get_mut(token_hash)
            .ok_or_else(|| DatabaseError::NotFound("refresh token".to_string()))?;

        let now = Utc::now();
        token.revoked_at = Some(now);
        token.updated_at = now;
        Ok(token.clone())
    }

    async fn create_chirp(&self, body: &str, user_id: Uuid) -> Result<Chirp, DatabaseError> {
        let mut tables = self.tables()?;
        if !tables.users.contains_key(&user_id) {
            return Err(DatabaseError::UnexpectedError(
                "chirps.user_id violates foreign key".to_string(),
            ));
        }

        let now = Utc::now();
        let chirp = Chirp {
            id: Uuid::new_v4(),
            body: body.to_string(),
            user_id,
            created_at: now,
            updated_at: now,
        };
        tables.chirps.push(chirp.clone());
        Ok(chirp)
    }

    async fn list_chirps(&self) -> Result<Vec<Chirp>, DatabaseError> {
        // Insertion order is creation order
        Ok(self.tables()?.chirps.clone())
    }

    async fn get_chirp(&self, id: Uuid) -> Result<Chirp, DatabaseError> {
        self.tables()?
            .chirps
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound("chirp".to_string()))
    }
}
