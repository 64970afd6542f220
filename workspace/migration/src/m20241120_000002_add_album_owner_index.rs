use crate::entity_iden::EntityIden;
use model::entities::album;
use model::entities::prelude::*;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Albums are looked up and cascaded by owner
        manager
            .create_index(
                Index::create()
                    .name(Album::index_name(album::Column::UserId))
                    .table(Album::table())
                    .col(Album::column(album::Column::UserId))
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
                    .name(Album::index_name(album::Column::UserId))
                    .table(Album::table())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
