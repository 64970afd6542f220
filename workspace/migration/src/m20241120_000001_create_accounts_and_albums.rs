use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create accounts table
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(pk_auto(Accounts::Id))
                    .col(string_len(Accounts::Email, 100).unique_key())
                    .col(string_len(Accounts::PasswordHash, 255))
                    .col(string_len(Accounts::FirstName, 20))
                    .col(string_len(Accounts::LastName, 20))
                    .col(text_null(Accounts::Bio))
                    .col(timestamp_with_time_zone(Accounts::CreatedAt))
                    .col(timestamp_with_time_zone_null(Accounts::LastLogin))
                    .col(string_len(Accounts::Role, 20).default("member"))
                    .col(boolean(Accounts::IsStaff).default(false))
                    .col(boolean(Accounts::IsSuperuser).default(false))
                    .col(boolean(Accounts::IsActive).default(true))
                    .to_owned(),
            )
            .await?;

        // Create albums table, owned by an account
        manager
            .create_table(
                Table::create()
                    .table(Albums::Table)
                    .if_not_exists()
                    .col(pk_auto(Albums::Id))
                    .col(string_len(Albums::Name, 255))
                    .col(text_null(Albums::Description))
                    .col(string_len_null(Albums::CoverImage, 100))
                    .col(integer_null(Albums::UserId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_albums_user")
                            .from(Albums::Table, Albums::UserId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order to avoid foreign key constraints
        manager
            .drop_table(Table::drop().table(Albums::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Accounts {
    Table,
    Id,
    Email,
    PasswordHash,
    FirstName,
    LastName,
    Bio,
    CreatedAt,
    LastLogin,
    Role,
    IsStaff,
    IsSuperuser,
    IsActive,
}

#[derive(DeriveIden)]
enum Albums {
    Table,
    Id,
    Name,
    Description,
    CoverImage,
    UserId,
}
