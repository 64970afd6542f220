use common::AccountRepresentation;
use sea_orm::entity::prelude::*;

/// Hashes starting with this prefix can never be verified.
/// Used for accounts provisioned without a password.
pub const UNUSABLE_PASSWORD_PREFIX: &str = "!";

/// Privilege role of an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum Role {
    #[default]
    #[sea_orm(string_value = "member")]
    Member,
    #[sea_orm(string_value = "admin")]
    Admin,
}

/// A user account. The email is the sole authentication identifier.
///
/// Records are written only through the account manager, which enforces
/// the length limits declared on the columns below before anything
/// reaches the database.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Normalized (trimmed, lower-cased) email address.
    #[sea_orm(unique, column_type = "String(StringLen::N(100))")]
    pub email: String,
    /// PHC string produced by the password service, or an unusable marker.
    #[sea_orm(column_type = "String(StringLen::N(255))")]
    pub password_hash: String,
    #[sea_orm(column_type = "String(StringLen::N(20))")]
    pub first_name: String,
    #[sea_orm(column_type = "String(StringLen::N(20))")]
    pub last_name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub bio: Option<String>,
    pub created_at: DateTimeUtc,
    pub last_login: Option<DateTimeUtc>,
    pub role: Role,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// An account owns any number of albums. They are removed with it.
    #[sea_orm(has_many = "super::album::Entity")]
    Album,
}

impl Related<super::album::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Album.def()
    }
}

impl Model {
    /// The transport form of this account, without password or bio.
    pub fn to_representation(&self) -> AccountRepresentation {
        AccountRepresentation {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            created_at: self.created_at.timestamp(),
        }
    }

    pub fn has_usable_password(&self) -> bool {
        !self.password_hash.starts_with(UNUSABLE_PASSWORD_PREFIX)
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    /// `id` and `created_at` are fixed once the row exists.
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if !insert && (self.id.is_set() || self.created_at.is_set()) {
            tracing::error!("Rejected update touching immutable account columns");
            return Err(DbErr::Custom(
                "account id and created_at cannot be changed".to_string(),
            ));
        }
        Ok(self)
    }
}
