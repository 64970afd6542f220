use anyhow::{Context, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use tracing::{debug, error, info, trace};

/// Apply every pending migration to the database at `database_url`.
pub async fn init_database(database_url: &str) -> Result<()> {
    trace!("Entering init_database function");
    debug!("Database URL: {}", database_url);

    let db: DatabaseConnection = Database::connect(database_url)
        .await
        .with_context(|| format!("Failed to connect to database '{}'", database_url))?;
    info!("Successfully connected to database");

    apply_migrations(&db).await?;

    println!("Database is up to date.");
    Ok(())
}

/// Bring the schema up to date and report what was applied.
pub async fn apply_migrations(db: &DatabaseConnection) -> Result<usize> {
    let pending = Migrator::get_pending_migrations(db).await?;
    if pending.is_empty() {
        info!("No pending migrations");
        return Ok(0);
    }

    for migration in &pending {
        debug!("Pending migration: {}", migration.name());
    }

    if let Err(e) = Migrator::up(db, None).await {
        error!("Failed to run database migrations: {}", e);
        return Err(e.into());
    }

    info!("Applied {} migrations", pending.len());
    Ok(pending.len())
}
