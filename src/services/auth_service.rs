//! Domain service for user registration and credential checks.
//!
//! Passwords are only ever stored as salted Argon2id hashes. Credential
//! failures never reveal whether the username exists.

use serde::Serialize;
use thiserror::Error;

use crate::db::User;
use crate::domain::UserId;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("username taken")]
    DuplicateUsername,

    /// Used for both unknown usernames and wrong passwords.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("Database error: {0}")]
    Database(String),
}

/// Store failures arrive as `anyhow` errors.
impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

/// Public view of a user; never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserInfo {
    pub id: UserId,
    pub username: String,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates a user and returns its identity.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidInput`] if either field is empty
    /// - [`AuthError::DuplicateUsername`] if the username (case-sensitive) exists
    async fn register(&self, username: &str, password: &str) -> Result<UserId, AuthError>;

    /// Checks a username/password pair.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown user or a wrong password alike.
    async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UserInfo, AuthError>;

    /// Resolves the principal behind a session.
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserInfo>, AuthError>;
}
