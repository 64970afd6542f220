//! Account administration commands.
//!
//! Results go to stdout; diagnostics go through tracing.

use std::convert::Infallible;
use std::str::FromStr;

use accounts::{Account, AccountManager, AccountStore, AccountUpdate, SuperuserFields};
use anyhow::{Result, bail};
use common::AccountRepresentation;
use tracing::{info, warn};

/// How an account is named on the command line: a numeric id or an email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountRef {
    Id(i32),
    Email(String),
}

impl FromStr for AccountRef {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<i32>() {
            Ok(id) => AccountRef::Id(id),
            Err(_) => AccountRef::Email(s.to_string()),
        })
    }
}

async fn find<S: AccountStore>(manager: &AccountManager<S>, account: &AccountRef) -> Result<Account> {
    let found = match account {
        AccountRef::Id(id) => manager.get_by_id(*id).await?,
        AccountRef::Email(email) => manager.get_by_email(email).await?,
    };
    match found {
        Some(found) => Ok(found),
        None => bail!("No account matches {:?}", account),
    }
}

pub async fn create_user<S: AccountStore>(
    manager: &AccountManager<S>,
    email: &str,
    password: &str,
    first_name: &str,
    last_name: &str,
) -> Result<AccountRepresentation> {
    match manager.create(email, password, first_name, last_name).await? {
        Some(account) => {
            let repr = account.to_representation();
            println!("Created {}", repr);
            Ok(repr)
        }
        None => {
            warn!("Account for '{}' was not created", email);
            bail!(
                "Account not created: the email is taken or malformed, or a name is longer than 20 characters"
            )
        }
    }
}

pub async fn create_superuser<S: AccountStore>(
    manager: &AccountManager<S>,
    email: &str,
    password: Option<&str>,
    first_name: Option<String>,
    last_name: Option<String>,
) -> Result<AccountRepresentation> {
    let extra = SuperuserFields {
        first_name,
        last_name,
        ..Default::default()
    };
    let account = manager.create_superuser(email, password, extra).await?;
    if !account.has_usable_password() {
        warn!("Superuser {} has no usable password", account.id);
    }

    let repr = account.to_representation();
    println!("Created superuser {}", repr);
    Ok(repr)
}

pub async fn list_users<S: AccountStore>(
    manager: &AccountManager<S>,
    json: bool,
) -> Result<Vec<AccountRepresentation>> {
    let accounts: Vec<AccountRepresentation> = manager
        .get_all()
        .await?
        .iter()
        .map(Account::to_representation)
        .collect();
    info!("Listing {} accounts", accounts.len());

    if json {
        println!("{}", serde_json::to_string_pretty(&accounts)?);
    } else {
        for account in &accounts {
            println!("{}", account);
        }
    }
    Ok(accounts)
}

pub async fn show_user<S: AccountStore>(
    manager: &AccountManager<S>,
    account: &AccountRef,
) -> Result<Account> {
    let account = find(manager, account).await?;

    println!("{}", account.to_representation());
    println!("  bio: {}", account.bio.as_deref().unwrap_or("-"));
    println!("  role: {:?}", account.role);
    println!(
        "  staff: {}, superuser: {}, active: {}",
        account.is_staff, account.is_superuser, account.is_active
    );
    match account.last_login {
        Some(at) => println!("  last login: {}", at.to_rfc3339()),
        None => println!("  last login: never"),
    }
    Ok(account)
}

pub async fn update_user<S: AccountStore>(
    manager: &AccountManager<S>,
    account: &AccountRef,
    changes: AccountUpdate,
) -> Result<bool> {
    if changes.is_empty() {
        bail!("Nothing to update: pass at least one of --first-name, --last-name, --bio, --password");
    }

    let rejected = changes.rejected_fields();
    let account = find(manager, account).await?;
    let written = manager.update(&account, changes).await?;

    for field in rejected {
        println!("Skipped {}: value too long", field);
    }
    if written {
        println!("Updated account {}", account.id);
    } else {
        println!("Account {} left unchanged", account.id);
    }
    Ok(written)
}

pub async fn delete_user<S: AccountStore>(manager: &AccountManager<S>, id: i32) -> Result<bool> {
    let deleted = manager.delete_by_id(id).await?;
    if deleted {
        println!("Deleted account {}", id);
    } else {
        println!("No account with id {}", id);
    }
    Ok(deleted)
}

pub async fn check_password<S: AccountStore>(
    manager: &AccountManager<S>,
    email: &str,
    password: &str,
) -> Result<bool> {
    let valid = manager.authenticate(email, password).await?.is_some();
    if valid {
        println!("Password accepted for {}", email);
    } else {
        println!("Invalid credentials for {}", email);
    }
    Ok(valid)
}
