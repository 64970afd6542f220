//! This file serves as the root for all SeaORM entity modules.
//! An account owns albums; an album has no behaviour of its own and is
//! removed together with its owner.

pub mod account;
pub mod album;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::account::Entity as Account;
    pub use super::album::Entity as Album;
}

#[cfg(test)]
mod test {
    use chrono::{TimeZone, Utc};
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{
        ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr,
        EntityTrait, ModelTrait, PaginatorTrait, QueryFilter, Set,
    };

    use super::*;
    use prelude::*;

    async fn setup_db() -> Result<DatabaseConnection, DbErr> {
        // Connect to the SQLite database
        let db = Database::connect("sqlite::memory:").await?;

        // Enable foreign keys
        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

        Migrator::up(&db, None).await.expect("Migrations failed.");
        Ok(db)
    }

    fn new_account(email: &str) -> account::ActiveModel {
        account::ActiveModel {
            email: Set(email.to_string()),
            password_hash: Set("$argon2id$v=19$m=8,t=1,p=1$c2FsdA$aGFzaA".to_string()),
            first_name: Set("Ada".to_string()),
            last_name: Set("Lovelace".to_string()),
            bio: Set(None),
            created_at: Set(Utc.with_ymd_and_hms(2024, 11, 20, 22, 11, 0).unwrap()),
            last_login: Set(None),
            role: Set(account::Role::Member),
            is_staff: Set(false),
            is_superuser: Set(false),
            is_active: Set(true),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_entity_integration() -> Result<(), DbErr> {
        let db = setup_db().await?;

        let owner = new_account("ada@example.com").insert(&db).await?;
        let other = new_account("grace@example.com").insert(&db).await?;

        for (name, owner_id) in [("Holidays", owner.id), ("Cats", owner.id), ("Boats", other.id)] {
            album::ActiveModel {
                name: Set(name.to_string()),
                description: Set(None),
                cover_image: Set(Some(format!("{}{}.jpg", album::COVER_UPLOAD_DIR, name))),
                user_id: Set(Some(owner_id)),
                ..Default::default()
            }
            .insert(&db)
            .await?;
        }

        // Verify the relation from the account side
        let owned = owner.find_related(Album).all(&db).await?;
        assert_eq!(owned.len(), 2);
        assert!(owned.iter().all(|a| a.user_id == Some(owner.id)));

        // Role round-trips through its string column
        let stored = Account::find_by_id(owner.id).one(&db).await?.unwrap();
        assert_eq!(stored.role, account::Role::Member);
        assert_eq!(stored.created_at, owner.created_at);

        // Deleting the owner cascades to its albums only
        Account::delete_by_id(owner.id).exec(&db).await?;
        let remaining = Album::find().all(&db).await?;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "Boats");

        Ok(())
    }

    #[tokio::test]
    async fn test_email_is_unique() -> Result<(), DbErr> {
        let db = setup_db().await?;

        new_account("ada@example.com").insert(&db).await?;
        let duplicate = new_account("ada@example.com").insert(&db).await;
        assert!(duplicate.is_err());

        let count = Account::find()
            .filter(account::Column::Email.eq("ada@example.com"))
            .count(&db)
            .await?;
        assert_eq!(count, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_created_at_is_immutable() -> Result<(), DbErr> {
        let db = setup_db().await?;

        let stored = new_account("ada@example.com").insert(&db).await?;

        let mut active: account::ActiveModel = stored.clone().into();
        active.created_at = Set(Utc::now());
        assert!(active.update(&db).await.is_err());

        let mut active: account::ActiveModel = stored.clone().into();
        active.first_name = Set("Augusta".to_string());
        let updated = active.update(&db).await?;
        assert_eq!(updated.first_name, "Augusta");
        assert_eq!(updated.created_at, stored.created_at);

        Ok(())
    }

    #[test]
    fn test_representation_excludes_secrets() {
        let model = account::Model {
            id: 3,
            email: "a@b.com".to_string(),
            password_hash: "$argon2id$whatever".to_string(),
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            bio: Some("private".to_string()),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            last_login: None,
            role: account::Role::Member,
            is_staff: false,
            is_superuser: false,
            is_active: true,
        };

        let repr = model.to_representation();
        assert_eq!(repr.id, 3);
        assert_eq!(repr.email, "a@b.com");
        assert_eq!(repr.created_at, 1_704_067_200);
        assert!(model.has_usable_password());

        let unusable = account::Model {
            password_hash: format!("{}abc", account::UNUSABLE_PASSWORD_PREFIX),
            ..model
        };
        assert!(!unusable.has_usable_password());
    }
}
