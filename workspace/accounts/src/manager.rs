//! The account manager: creation policy, validation and lookups.
//!
//! It is the only writer of account records. Two outcome kinds are kept
//! apart on purpose:
//! - expected negative outcomes (invalid input on `create`/`update`, an
//!   absent account, a lost uniqueness race) come back as `None`/`false`;
//! - misuse and infrastructure failures come back as [`AccountError`].

use std::collections::HashSet;
use std::sync::Arc;

use model::entities::account::{self, Role};
use sea_orm::{ActiveValue, Set, Value};
use tracing::{debug, error, info, instrument, trace, warn};
use validator::Validate;

use crate::clock::Clock;
use crate::error::{AccountError, Result};
use crate::password::{make_unusable_password, PasswordService};
use crate::store::{is_unique_violation, AccountFilter, AccountStore, SeaOrmAccountStore};
use crate::validation::{normalize_email, AccountUpdate, NewAccount, SuperuserFields};
use crate::Account;

/// Upper bound of the `password_hash` column.
const PASSWORD_HASH_MAX_LEN: usize = 255;

pub struct AccountManager<S: AccountStore = SeaOrmAccountStore> {
    store: S,
    passwords: Arc<dyn PasswordService>,
    clock: Arc<dyn Clock>,
}

impl<S: AccountStore> AccountManager<S> {
    pub fn new(store: S, passwords: Arc<dyn PasswordService>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            passwords,
            clock,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn password_service(&self) -> &dyn PasswordService {
        self.passwords.as_ref()
    }

    /// Create an unprivileged, active account.
    ///
    /// Returns `Ok(None)` without writing anything when a name is longer
    /// than 20 characters, the email is longer than 100 characters or does
    /// not contain exactly one `@`, or the email is already taken (also
    /// when another caller wins a concurrent race for it).
    #[instrument(skip(self, password, first_name, last_name))]
    pub async fn create(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<Option<Account>> {
        trace!("Entering create function");
        let new_account = NewAccount::new(email, first_name, last_name);

        match self.create_user(new_account, Some(password)).await {
            Ok(account) => Ok(Some(account)),
            Err(AccountError::MissingEmail) => {
                info!("Account not created: empty email");
                Ok(None)
            }
            Err(AccountError::Validation(errors)) => {
                info!("Account not created: {}", errors);
                Ok(None)
            }
            Err(AccountError::DuplicateEmail(email)) => {
                info!("Account not created: email '{}' is taken", email);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Lowest creation primitive: validate, hash and persist.
    ///
    /// Every failure is an error here. A `None` password stores an
    /// unusable marker so the account cannot log in until one is set.
    #[instrument(skip(self, new_account, password), fields(email = %new_account.email))]
    pub async fn create_user(
        &self,
        mut new_account: NewAccount,
        password: Option<&str>,
    ) -> Result<Account> {
        if new_account.email.trim().is_empty() {
            error!("Refusing to create an account without an email");
            return Err(AccountError::MissingEmail);
        }
        new_account.email = normalize_email(&new_account.email);
        new_account.validate()?;

        trace!("Checking whether email is already taken");
        if self
            .store
            .find_one(AccountFilter::Email(new_account.email.clone()))
            .await?
            .is_some()
        {
            debug!("Email '{}' already registered", new_account.email);
            return Err(AccountError::DuplicateEmail(new_account.email));
        }

        let password_hash = match password {
            Some(password) => self.hash_password(password)?,
            None => make_unusable_password(),
        };

        let record = account::ActiveModel {
            email: Set(new_account.email.clone()),
            password_hash: Set(password_hash),
            first_name: Set(new_account.first_name),
            last_name: Set(new_account.last_name),
            bio: Set(new_account.bio),
            created_at: Set(self.clock.now()),
            last_login: Set(None),
            role: Set(new_account.role),
            is_staff: Set(new_account.is_staff),
            is_superuser: Set(new_account.is_superuser),
            is_active: Set(new_account.is_active),
            ..Default::default()
        };

        // The unique constraint settles races the check above cannot see
        match self.store.insert(record).await {
            Ok(account) => {
                info!("Account created with ID: {}", account.id);
                Ok(account)
            }
            Err(e) if is_unique_violation(&e) => {
                warn!("Lost creation race for email '{}'", new_account.email);
                Err(AccountError::DuplicateEmail(new_account.email))
            }
            Err(e) => {
                error!("Failed to insert account: {}", e);
                Err(e.into())
            }
        }
    }

    /// Create a staff superuser with an admin role.
    ///
    /// The flags default to `true`. Explicitly passing `is_staff` or
    /// `is_superuser` as `false` is rejected before anything is written.
    #[instrument(skip(self, password, extra))]
    pub async fn create_superuser(
        &self,
        email: &str,
        password: Option<&str>,
        extra: SuperuserFields,
    ) -> Result<Account> {
        let is_staff = extra.is_staff.unwrap_or(true);
        let is_superuser = extra.is_superuser.unwrap_or(true);

        if !is_staff {
            error!("Superuser creation attempted with is_staff=false");
            return Err(AccountError::PolicyViolation(
                "Superuser must have is_staff=true.".to_string(),
            ));
        }
        if !is_superuser {
            error!("Superuser creation attempted with is_superuser=false");
            return Err(AccountError::PolicyViolation(
                "Superuser must have is_superuser=true.".to_string(),
            ));
        }

        let new_account = NewAccount {
            email: email.to_string(),
            first_name: extra.first_name.unwrap_or_default(),
            last_name: extra.last_name.unwrap_or_default(),
            bio: extra.bio,
            role: extra.role.unwrap_or(Role::Admin),
            is_staff,
            is_superuser,
            is_active: extra.is_active.unwrap_or(true),
        };

        self.create_user(new_account, password).await
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: i32) -> Result<Option<Account>> {
        Ok(self.store.find_one(AccountFilter::Id(id)).await?)
    }

    /// Lookup by email; the argument is normalized first.
    #[instrument(skip(self))]
    pub async fn get_by_email(&self, email: &str) -> Result<Option<Account>> {
        Ok(self
            .store
            .find_one(AccountFilter::Email(normalize_email(email)))
            .await?)
    }

    /// Remove an account and, through the schema, its albums.
    /// Returns `false` if there was nothing to remove.
    #[instrument(skip(self))]
    pub async fn delete_by_id(&self, id: i32) -> Result<bool> {
        let removed = self.store.delete(AccountFilter::Id(id)).await?;
        if removed == 0 {
            debug!("No account with ID {} to delete", id);
            return Ok(false);
        }
        info!("Deleted account with ID: {}", id);
        Ok(true)
    }

    /// Apply a partial profile update to the stored copy of `account`.
    ///
    /// The record is re-read by email. A supplied field that breaks its
    /// length rule is skipped and the remaining fields are still applied.
    /// A password is always hashed before it is stored. Returns whether a
    /// write happened: `false` when nothing applicable was supplied or the
    /// account no longer exists.
    // TODO: confirm with product whether one invalid field should reject the whole update
    #[instrument(skip(self, account, changes), fields(account_id = account.id))]
    pub async fn update(&self, account: &Account, changes: AccountUpdate) -> Result<bool> {
        let current = match self
            .store
            .find_one(AccountFilter::Email(account.email.clone()))
            .await?
        {
            Some(current) => current,
            None => {
                warn!("Account '{}' no longer exists, skipping update", account.email);
                return Ok(false);
            }
        };

        let rejected = changes.rejected_fields();
        let mut record: account::ActiveModel = current.into();
        let mut changed = false;

        changed |= apply_field(&mut record.first_name, changes.first_name, "first_name", &rejected);
        changed |= apply_field(&mut record.last_name, changes.last_name, "last_name", &rejected);
        changed |= apply_field(&mut record.bio, changes.bio.map(Some), "bio", &rejected);
        if let Some(password) = changes.password {
            record.password_hash = Set(self.hash_password(&password)?);
            changed = true;
        }

        if !changed {
            debug!("Nothing to update");
            return Ok(false);
        }

        match self.store.update(record).await? {
            Some(updated) => {
                info!("Updated account with ID: {}", updated.id);
                Ok(true)
            }
            None => {
                warn!("Account '{}' was removed during update", account.email);
                Ok(false)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn get_all(&self) -> Result<Vec<Account>> {
        Ok(self.store.find_all().await?)
    }

    /// Check credentials and stamp `last_login`.
    ///
    /// Returns the refreshed account on success and `None` for an unknown
    /// email, an inactive account or a wrong password. Issues no session.
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Option<Account>> {
        let account = match self.get_by_email(email).await? {
            Some(account) => account,
            None => {
                debug!("Authentication failed: unknown email");
                return Ok(None);
            }
        };

        if !account.is_active {
            info!("Authentication refused for inactive account {}", account.id);
            return Ok(None);
        }
        if !self.passwords.verify(password, &account.password_hash) {
            info!("Authentication failed for account {}", account.id);
            return Ok(None);
        }

        let mut record: account::ActiveModel = account.into();
        record.last_login = Set(Some(self.clock.now()));
        Ok(self.store.update(record).await?)
    }

    fn hash_password(&self, password: &str) -> Result<String> {
        let hash = self.passwords.hash(password)?;
        if hash.chars().count() > PASSWORD_HASH_MAX_LEN {
            error!("Password service produced a {} character hash", hash.len());
            return Err(AccountError::PasswordHash(format!(
                "hash exceeds {} characters",
                PASSWORD_HASH_MAX_LEN
            )));
        }
        Ok(hash)
    }
}

/// Set `slot` to `value` if one was supplied and it passed validation.
fn apply_field<T>(
    slot: &mut ActiveValue<T>,
    value: Option<T>,
    field: &str,
    rejected: &HashSet<String>,
) -> bool
where
    T: Into<Value>,
{
    match value {
        Some(_) if rejected.contains(field) => {
            warn!("Skipping {}: value exceeds its length limit", field);
            false
        }
        Some(value) => {
            *slot = Set(value);
            true
        }
        None => false,
    }
}
