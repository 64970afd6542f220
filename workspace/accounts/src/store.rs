//! Persistence interface consumed by the account manager, and its SeaORM
//! implementation.

use async_trait::async_trait;
use model::entities::account;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    SqlErr,
};
use tracing::{debug, instrument, trace};

use crate::Account;

/// Predicate selecting account rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountFilter {
    Id(i32),
    /// Matches the stored (normalized) email exactly.
    Email(String),
}

impl AccountFilter {
    fn condition(&self) -> Condition {
        match self {
            AccountFilter::Id(id) => Condition::all().add(account::Column::Id.eq(*id)),
            AccountFilter::Email(email) => {
                Condition::all().add(account::Column::Email.eq(email.as_str()))
            }
        }
    }
}

/// Row-level access to account records.
///
/// Implementations must enforce email uniqueness themselves (a unique
/// constraint or equivalent) and report a violation as an error that
/// [`is_unique_violation`] recognises.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_one(&self, filter: AccountFilter) -> Result<Option<Account>, DbErr>;

    async fn find_all(&self) -> Result<Vec<Account>, DbErr>;

    async fn insert(&self, record: account::ActiveModel) -> Result<Account, DbErr>;

    /// Write the changed columns of an existing row.
    /// Returns `None` when the row no longer exists; it is never re-created.
    async fn update(&self, record: account::ActiveModel) -> Result<Option<Account>, DbErr>;

    /// Remove matching rows and return how many were removed.
    async fn delete(&self, filter: AccountFilter) -> Result<u64, DbErr>;
}

/// Whether a store error means the email is already taken.
///
/// Relies on the driver classifying the error; `email` is the only unique
/// column besides the primary key.
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// [`AccountStore`] backed by a SeaORM connection.
#[derive(Debug, Clone)]
pub struct SeaOrmAccountStore {
    db: DatabaseConnection,
}

impl SeaOrmAccountStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl AccountStore for SeaOrmAccountStore {
    #[instrument(skip(self))]
    async fn find_one(&self, filter: AccountFilter) -> Result<Option<Account>, DbErr> {
        trace!("Looking up account");
        account::Entity::find()
            .filter(filter.condition())
            .one(&self.db)
            .await
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<Account>, DbErr> {
        let accounts = account::Entity::find().all(&self.db).await?;
        debug!("Retrieved {} accounts from database", accounts.len());
        Ok(accounts)
    }

    #[instrument(skip_all)]
    async fn insert(&self, record: account::ActiveModel) -> Result<Account, DbErr> {
        trace!("Inserting account row");
        record.insert(&self.db).await
    }

    #[instrument(skip_all)]
    async fn update(&self, record: account::ActiveModel) -> Result<Option<Account>, DbErr> {
        trace!("Updating account row");
        match record.update(&self.db).await {
            Ok(model) => Ok(Some(model)),
            Err(DbErr::RecordNotUpdated) | Err(DbErr::RecordNotFound(_)) => {
                debug!("Account row vanished before update");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self))]
    async fn delete(&self, filter: AccountFilter) -> Result<u64, DbErr> {
        let result = account::Entity::delete_many()
            .filter(filter.condition())
            .exec(&self.db)
            .await?;
        debug!("Deleted {} account rows", result.rows_affected);
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use model::entities::account::Role;
    use sea_orm::{RuntimeErr, Set};

    use super::*;
    use crate::testing::setup_db;

    fn new_row(email: &str) -> account::ActiveModel {
        account::ActiveModel {
            email: Set(email.to_string()),
            password_hash: Set("hash".to_string()),
            first_name: Set("A".to_string()),
            last_name: Set("B".to_string()),
            bio: Set(None),
            created_at: Set(Utc::now()),
            last_login: Set(None),
            role: Set(Role::Member),
            is_staff: Set(false),
            is_superuser: Set(false),
            is_active: Set(true),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_update_of_removed_row_returns_none() -> Result<(), DbErr> {
        let store = SeaOrmAccountStore::new(setup_db().await?);
        let stored = store.insert(new_row("a@b.com")).await?;

        let mut record: account::ActiveModel = stored.clone().into();
        record.first_name = Set("Ghost".to_string());
        assert_eq!(store.delete(AccountFilter::Id(stored.id)).await?, 1);

        assert_eq!(store.update(record).await?, None);
        assert!(store.find_all().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_a_unique_violation() -> Result<(), DbErr> {
        let store = SeaOrmAccountStore::new(setup_db().await?);
        store.insert(new_row("a@b.com")).await?;

        let err = store.insert(new_row("a@b.com")).await.unwrap_err();
        assert!(is_unique_violation(&err));
        Ok(())
    }

    #[test]
    fn test_other_errors_are_not_unique_violations() {
        let mentions_constraint = DbErr::Custom("unique constraint on album name".to_string());
        assert!(!is_unique_violation(&mentions_constraint));

        let lost = DbErr::Conn(RuntimeErr::Internal("connection lost".to_string()));
        assert!(!is_unique_violation(&lost));
        assert!(!is_unique_violation(&DbErr::RecordNotUpdated));
    }
}
