pub use sea_orm_migration::prelude::*;

mod m20241120_000001_create_accounts_and_albums;
mod m20241120_000002_add_album_owner_index;
pub mod entity_iden;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241120_000001_create_accounts_and_albums::Migration),
            Box::new(m20241120_000002_add_album_owner_index::Migration),
        ]
    }
}
