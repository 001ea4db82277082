use anyhow::Result;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, SqlErr};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::domain::{Symbol, UserId, WatchItemId};

pub mod migrator;
pub mod repositories;

pub use repositories::user::User;
pub use repositories::watchlist::WatchItem;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:").trim_start_matches("//");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn watchlist_repo(&self) -> repositories::watchlist::WatchlistRepository {
        repositories::watchlist::WatchlistRepository::new(self.conn.clone())
    }

    // ========== User Repository Methods ==========

    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        security: &SecurityConfig,
    ) -> Result<Option<User>> {
        self.user_repo().create(username, password, security).await
    }

    pub async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn verify_user_password(
        &self,
        username: &str,
        password: &str,
        security: &SecurityConfig,
    ) -> Result<Option<User>> {
        self.user_repo()
            .verify_password(username, password, security)
            .await
    }

    // ========== Watchlist Repository Methods ==========

    pub async fn list_watch_items(&self, user_id: UserId) -> Result<Vec<WatchItem>> {
        self.watchlist_repo().list_for_user(user_id).await
    }

    pub async fn watched_symbols(&self, user_id: UserId) -> Result<HashSet<String>> {
        self.watchlist_repo().symbols_for_user(user_id).await
    }

    pub async fn add_watch_item(
        &self,
        user_id: UserId,
        symbol: &Symbol,
        name: &str,
    ) -> Result<Option<WatchItem>> {
        self.watchlist_repo().add(user_id, symbol, name).await
    }

    pub async fn remove_watch_item(&self, user_id: UserId, item_id: WatchItemId) -> Result<bool> {
        self.watchlist_repo().remove(user_id, item_id).await
    }
}

/// Whether a write failed because a UNIQUE constraint rejected it.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_store() -> Store {
        Store::with_pool_options("sqlite::memory:", 1, 1)
            .await
            .expect("in-memory store")
    }

    fn cheap_security() -> SecurityConfig {
        SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
        }
    }

    /// A file-backed store so that several pooled connections share one database.
    async fn file_store() -> (Store, std::path::PathBuf) {
        let path = std::env::temp_dir().join(format!("stockwatch-{}.db", uuid::Uuid::new_v4()));
        let url = format!("sqlite://{}?mode=rwc", path.display());
        let store = Store::with_pool_options(&url, 4, 2)
            .await
            .expect("file-backed store");
        (store, path)
    }

    fn remove_db_files(path: &std::path::Path) {
        for suffix in ["", "-wal", "-shm"] {
            let mut name = path.as_os_str().to_owned();
            name.push(suffix);
            std::fs::remove_file(name).ok();
        }
    }

    #[tokio::test]
    async fn migrations_apply_on_fresh_database() {
        let store = memory_store().await;
        assert!(store.list_watch_items(UserId::new(1)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_username_is_reported_in_band() {
        let store = memory_store().await;
        let security = cheap_security();

        let first = store.create_user("alice", "pw123", &security).await.unwrap();
        assert!(first.is_some());

        let second = store.create_user("alice", "other", &security).await.unwrap();
        assert!(second.is_none());

        // Case-sensitive: a different casing is a different user.
        let upper = store.create_user("Alice", "pw123", &security).await.unwrap();
        assert!(upper.is_some());
    }

    #[tokio::test]
    async fn password_verification() {
        let store = memory_store().await;
        let user = store
            .create_user("bob", "hunter2", &cheap_security())
            .await
            .unwrap()
            .unwrap();

        let security = cheap_security();
        let ok = store
            .verify_user_password("bob", "hunter2", &security)
            .await
            .unwrap();
        assert_eq!(ok.map(|u| u.id), Some(user.id));

        assert!(
            store
                .verify_user_password("bob", "nope", &security)
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            store
                .verify_user_password("nobody", "hunter2", &security)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn unknown_username_still_runs_argon2() {
        let store = memory_store().await;
        // Parameters Argon2 refuses: the only way to fail is to actually hash.
        let unusable = SecurityConfig {
            argon2_memory_cost_kib: 1,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
        };

        let result = store
            .verify_user_password("nobody", "hunter2", &unusable)
            .await;

        assert!(result.is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_adds_of_one_symbol_store_a_single_row() {
        let (store, path) = file_store().await;
        let alice = store
            .create_user("alice", "pw", &cheap_security())
            .await
            .unwrap()
            .unwrap();
        let symbol = Symbol::parse("TSLA").unwrap();

        let (first, second) = tokio::join!(
            store.add_watch_item(alice.id, &symbol, "Tesla"),
            store.add_watch_item(alice.id, &symbol, "Tesla"),
        );
        let outcomes = [first.unwrap(), second.unwrap()];

        assert_eq!(outcomes.iter().filter(|o| o.is_some()).count(), 1);
        assert_eq!(store.list_watch_items(alice.id).await.unwrap().len(), 1);

        store.conn.close().await.ok();
        remove_db_files(&path);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_registrations_of_one_username_create_a_single_user() {
        let (store, path) = file_store().await;
        let security = cheap_security();

        let (first, second) = tokio::join!(
            store.create_user("alice", "pw-one", &security),
            store.create_user("alice", "pw-two", &security),
        );
        let outcomes = [first.unwrap(), second.unwrap()];
        let winners: Vec<&User> = outcomes.iter().flatten().collect();

        assert_eq!(winners.len(), 1);
        // The loser's insert never landed: a second registration is still refused.
        assert!(store.create_user("alice", "pw-three", &security).await.unwrap().is_none());
        assert!(store.get_user(winners[0].id).await.unwrap().is_some());

        store.conn.close().await.ok();
        remove_db_files(&path);
    }

    #[tokio::test]
    async fn watch_items_are_unique_per_user_and_ordered() {
        let store = memory_store().await;
        let security = cheap_security();
        let alice = store.create_user("alice", "pw", &security).await.unwrap().unwrap();
        let bob = store.create_user("bob", "pw", &security).await.unwrap().unwrap();

        let tsla = Symbol::parse("tsla").unwrap();
        let aapl = Symbol::parse("AAPL").unwrap();

        let first = store.add_watch_item(alice.id, &tsla, "Tesla").await.unwrap().unwrap();
        assert_eq!(first.symbol, "TSLA");
        assert!(store.add_watch_item(alice.id, &tsla, "").await.unwrap().is_none());
        store.add_watch_item(alice.id, &aapl, "").await.unwrap().unwrap();

        // Another user may hold the same symbol.
        assert!(store.add_watch_item(bob.id, &tsla, "").await.unwrap().is_some());

        let items = store.list_watch_items(alice.id).await.unwrap();
        let symbols: Vec<&str> = items.iter().map(|i| i.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["TSLA", "AAPL"]);

        let watched = store.watched_symbols(alice.id).await.unwrap();
        assert!(watched.contains("TSLA") && watched.contains("AAPL"));
    }

    #[tokio::test]
    async fn remove_is_scoped_to_owner() {
        let store = memory_store().await;
        let security = cheap_security();
        let alice = store.create_user("alice", "pw", &security).await.unwrap().unwrap();
        let bob = store.create_user("bob", "pw", &security).await.unwrap().unwrap();

        let symbol = Symbol::parse("msft").unwrap();
        let item = store.add_watch_item(alice.id, &symbol, "").await.unwrap().unwrap();

        assert!(!store.remove_watch_item(bob.id, item.id).await.unwrap());
        assert_eq!(store.list_watch_items(alice.id).await.unwrap().len(), 1);

        assert!(store.remove_watch_item(alice.id, item.id).await.unwrap());
        assert!(store.list_watch_items(alice.id).await.unwrap().is_empty());
        assert!(!store.remove_watch_item(alice.id, item.id).await.unwrap());
    }
}
