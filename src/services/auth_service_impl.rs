//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::config::SecurityConfig;
use crate::db::Store;
use crate::domain::UserId;
use crate::services::auth_service::{AuthError, AuthService, UserInfo};

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, username: &str, password: &str) -> Result<UserId, AuthError> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidInput(
                "username and password required".to_string(),
            ));
        }

        let user = self
            .store
            .create_user(username, password, &self.security)
            .await?
            .ok_or(AuthError::DuplicateUsername)?;

        info!(user_id = %user.id, "Registered new user");
        Ok(user.id)
    }

    async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UserInfo, AuthError> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        self.store
            .verify_user_password(username, password, &self.security)
            .await?
            .map(UserInfo::from)
            .ok_or(AuthError::InvalidCredentials)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<UserInfo>, AuthError> {
        Ok(self.store.get_user(id).await?.map(UserInfo::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn service() -> SeaOrmAuthService {
        let store = Store::with_pool_options("sqlite::memory:", 1, 1)
            .await
            .expect("in-memory store");
        let security = SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
        };
        SeaOrmAuthService::new(store, security)
    }

    #[tokio::test]
    async fn register_then_verify() {
        let auth = service().await;

        let id = auth.register("alice", "pw123").await.unwrap();
        let user = auth.verify_credentials("alice", "pw123").await.unwrap();

        assert_eq!(user.id, id);
        assert_eq!(user.username, "alice");
        assert_eq!(auth.find_by_id(id).await.unwrap(), Some(user));
    }

    #[tokio::test]
    async fn duplicate_username_fails_regardless_of_password() {
        let auth = service().await;
        auth.register("alice", "pw123").await.unwrap();

        let err = auth.register("alice", "something-else").await.unwrap_err();
        assert!(matches!(err, AuthError::DuplicateUsername));
    }

    #[tokio::test]
    async fn empty_fields_are_invalid_input() {
        let auth = service().await;

        assert!(matches!(
            auth.register("", "pw").await,
            Err(AuthError::InvalidInput(_))
        ));
        assert!(matches!(
            auth.register("alice", "").await,
            Err(AuthError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_are_indistinguishable() {
        let auth = service().await;
        auth.register("alice", "pw123").await.unwrap();

        let wrong_password = auth.verify_credentials("alice", "nope").await.unwrap_err();
        let unknown_user = auth.verify_credentials("mallory", "pw123").await.unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_user, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[tokio::test]
    async fn unknown_id_resolves_to_none() {
        let auth = service().await;
        assert_eq!(auth.find_by_id(UserId::new(999)).await.unwrap(), None);
    }
}
