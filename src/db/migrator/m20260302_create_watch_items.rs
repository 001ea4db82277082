use crate::entities::{prelude::*, watch_items};
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

const USER_SYMBOL_INDEX: &str = "idx_watch_items_user_symbol";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(WatchItems)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // A user can hold a symbol at most once, even under concurrent adds.
        manager
            .create_index(
                Index::create()
                    .name(USER_SYMBOL_INDEX)
                    .table(WatchItems)
                    .col(watch_items::Column::UserId)
                    .col(watch_items::Column::Symbol)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(USER_SYMBOL_INDEX)
                    .table(WatchItems)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(WatchItems).to_owned())
            .await?;

        Ok(())
    }
}
