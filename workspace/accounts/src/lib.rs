//! Account repository: identity, password handling and profile CRUD over
//! the SeaORM entities in the `model` crate.

pub mod clock;
pub mod error;
pub mod manager;
pub mod password;
pub mod store;
pub mod validation;

#[cfg(test)]
mod testing;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{AccountError, Result};
pub use manager::AccountManager;
pub use password::{Argon2PasswordService, PasswordService};
pub use store::{AccountFilter, AccountStore, SeaOrmAccountStore};
pub use validation::{AccountUpdate, NewAccount, SuperuserFields};

/// An account as stored; the manager hands these out.
pub type Account = model::entities::account::Model;
