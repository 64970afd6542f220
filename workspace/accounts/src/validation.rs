//! Field rules for account records.
//!
//! Lengths are counted in Unicode scalar values, not bytes.

use std::collections::HashSet;
use std::fmt;

use model::entities::account::Role;
use validator::{Validate, ValidationError};

/// Canonical form of an email: surrounding whitespace removed, lower-cased.
/// Two emails that normalize to the same string belong to the same account.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// An email must split into exactly one local part and one domain.
///
/// Only the separator count is checked: either part may be empty, so `@`
/// and `a@` pass. Deliverability is not this layer's concern.
pub fn validate_email_shape(email: &str) -> Result<(), ValidationError> {
    if email.split('@').count() == 2 {
        Ok(())
    } else {
        Err(ValidationError::new("email_separator"))
    }
}

/// Everything needed to create an account apart from the password.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct NewAccount {
    #[validate(length(max = 100), custom(function = "validate_email_shape"))]
    pub email: String,
    #[validate(length(max = 20))]
    pub first_name: String,
    #[validate(length(max = 20))]
    pub last_name: String,
    #[validate(length(max = 500))]
    pub bio: Option<String>,
    pub role: Role,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
}

impl NewAccount {
    /// An unprivileged, active account.
    pub fn new(
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            bio: None,
            role: Role::Member,
            is_staff: false,
            is_superuser: false,
            is_active: true,
        }
    }

    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = Some(bio.into());
        self
    }
}

/// A partial profile update. Only supplied fields are considered.
#[derive(Clone, Default, Validate)]
pub struct AccountUpdate {
    #[validate(length(max = 20))]
    pub first_name: Option<String>,
    #[validate(length(max = 20))]
    pub last_name: Option<String>,
    pub password: Option<String>,
    #[validate(length(max = 500))]
    pub bio: Option<String>,
}

impl AccountUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.password.is_none()
            && self.bio.is_none()
    }

    /// Names of the supplied fields that break their length rule.
    pub fn rejected_fields(&self) -> HashSet<String> {
        match self.validate() {
            Ok(()) => HashSet::new(),
            Err(errors) => errors
                .field_errors()
                .keys()
                .map(|field| field.to_string())
                .collect(),
        }
    }
}

impl fmt::Debug for AccountUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountUpdate")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("bio", &self.bio)
            .finish()
    }
}

/// Extra fields accepted when creating a superuser.
///
/// The privilege flags default to `true`; supplying `Some(false)` for
/// `is_staff` or `is_superuser` is a policy violation.
#[derive(Debug, Clone, Default)]
pub struct SuperuserFields {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<Role>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
    pub is_active: Option<bool>,
}
