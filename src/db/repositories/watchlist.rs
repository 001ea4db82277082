use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use std::collections::HashSet;

use crate::db::is_unique_violation;
use crate::domain::{Symbol, UserId, WatchItemId};
use crate::entities::watch_items;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchItem {
    pub id: WatchItemId,
    pub user_id: UserId,
    pub symbol: String,
    pub name: String,
    pub created_at: String,
}

impl From<watch_items::Model> for WatchItem {
    fn from(model: watch_items::Model) -> Self {
        Self {
            id: WatchItemId::new(model.id),
            user_id: UserId::new(model.user_id),
            symbol: model.symbol,
            name: model.name,
            created_at: model.created_at,
        }
    }
}

pub struct WatchlistRepository {
    conn: DatabaseConnection,
}

impl WatchlistRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// All items owned by the user, in insertion (id) order.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<WatchItem>> {
        let rows = watch_items::Entity::find()
            .filter(watch_items::Column::UserId.eq(user_id.value()))
            .order_by_asc(watch_items::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list watch items")?;

        Ok(rows.into_iter().map(WatchItem::from).collect())
    }

    pub async fn symbols_for_user(&self, user_id: UserId) -> Result<HashSet<String>> {
        let symbols: Vec<String> = watch_items::Entity::find()
            .select_only()
            .column(watch_items::Column::Symbol)
            .filter(watch_items::Column::UserId.eq(user_id.value()))
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to list watched symbols")?;

        Ok(symbols.into_iter().collect())
    }

    /// Inserts a new item.
    ///
    /// Returns `Ok(None)` when the user already watches the symbol. The
    /// `(user_id, symbol)` unique index decides, so racing adds cannot both win.
    pub async fn add(
        &self,
        user_id: UserId,
        symbol: &Symbol,
        name: &str,
    ) -> Result<Option<WatchItem>> {
        let active = watch_items::ActiveModel {
            user_id: Set(user_id.value()),
            symbol: Set(symbol.as_str().to_string()),
            name: Set(name.to_string()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        match active.insert(&self.conn).await {
            Ok(model) => Ok(Some(WatchItem::from(model))),
            Err(err) if is_unique_violation(&err) => Ok(None),
            Err(err) => Err(err).context("Failed to insert watch item"),
        }
    }

    /// Deletes an item only if it belongs to `user_id`. Returns whether a row was removed.
    pub async fn remove(&self, user_id: UserId, item_id: WatchItemId) -> Result<bool> {
        let result = watch_items::Entity::delete_many()
            .filter(watch_items::Column::Id.eq(item_id.value()))
            .filter(watch_items::Column::UserId.eq(user_id.value()))
            .exec(&self.conn)
            .await
            .context("Failed to delete watch item")?;

        Ok(result.rows_affected > 0)
    }
}
