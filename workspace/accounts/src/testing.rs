//! Fixtures shared by the account tests.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::clock::FixedClock;
use crate::manager::AccountManager;
use crate::password::Argon2PasswordService;
use crate::store::SeaOrmAccountStore;

/// The instant every test account is created at.
pub fn creation_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 11, 20, 22, 11, 0).unwrap()
}

/// In-memory SQLite with migrations applied.
///
/// The pool is pinned to one connection: every new in-memory connection
/// would otherwise open a separate, empty database.
pub async fn setup_db() -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await?;

    // Enable foreign keys
    db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

    Migrator::up(&db, None).await.expect("Migrations failed.");
    Ok(db)
}

/// Argon2 at its minimum cost, so tests do not spend time hashing.
pub fn fast_password_service() -> Argon2PasswordService {
    Argon2PasswordService::with_params(8, 1, 1).expect("valid Argon2 parameters")
}

pub fn test_manager(db: DatabaseConnection) -> AccountManager {
    AccountManager::new(
        SeaOrmAccountStore::new(db),
        Arc::new(fast_password_service()),
        Arc::new(FixedClock(creation_time())),
    )
}

/// Route logs to stderr for the duration of a test.
/// The level comes from RUST_LOG and defaults to WARN.
pub fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
    let log_level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|level| level.parse::<Level>().ok())
        .unwrap_or(Level::WARN);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_default(subscriber)
}
