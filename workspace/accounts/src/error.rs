use thiserror::Error;

/// Hard failures of the account layer.
///
/// Expected negative outcomes (an account that does not exist, a rejected
/// field on `create`, a lost uniqueness race) are not errors: they come back
/// as `None` or `false` from the manager.
#[derive(Error, Debug)]
pub enum AccountError {
    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// The lowest creation primitive was called without an email
    #[error("The email must be set")]
    MissingEmail,

    /// A privilege invariant was violated, e.g. a superuser without staff rights
    #[error("Policy violation: {0}")]
    PolicyViolation(String),

    /// One or more fields failed their length or shape checks
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// Another account already uses this email
    #[error("An account with email '{0}' already exists")]
    DuplicateEmail(String),

    /// The password service could not produce a hash
    #[error("Password hashing error: {0}")]
    PasswordHash(String),
}

/// Type alias for Result with AccountError
pub type Result<T> = std::result::Result<T, AccountError>;
