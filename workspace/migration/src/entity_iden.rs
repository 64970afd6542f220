use model::entities::prelude::*;
use sea_orm::entity::prelude::*;
use sea_orm_migration::prelude::Alias;

/// Table and column identifiers taken from the SeaORM entities, so that
/// migrations written after the initial schema stay in sync with the model.
pub trait EntityIden: EntityTrait {
    fn table() -> Alias {
        Alias::new(Self::default().table_name())
    }

    fn column(column: Self::Column) -> Alias {
        Alias::new(column.as_str())
    }

    /// Conventional name for a single-column index, e.g. `idx_albums_user_id`.
    fn index_name(column: Self::Column) -> String {
        format!("idx_{}_{}", Self::default().table_name(), column.as_str())
    }
}

impl EntityIden for Account {}
impl EntityIden for Album {}
