use accounts::password::{DEFAULT_ITERATIONS, DEFAULT_MEMORY_KIB, DEFAULT_PARALLELISM};
use accounts::{AccountManager, Argon2PasswordService, SeaOrmAccountStore, SystemClock};
use anyhow::{Context, Result};
use ::config::{Config, ConfigBuilder, Environment, builder::DefaultState};
use sea_orm::{Database, DatabaseConnection};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Creates the SQLite file on first use.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://photoshelf.db?mode=rwc";

/// Prefix of the environment variables read into [`Settings`],
/// e.g. `PHOTOSHELF_PASSWORD_PEPPER`.
pub const ENV_PREFIX: &str = "PHOTOSHELF";

/// Application settings.
///
/// Sources, lowest priority first: built-in defaults, `PHOTOSHELF_*`
/// environment variables (a `.env` file is loaded into the environment
/// beforehand), then the `--database-url` / `DATABASE_URL` override.
#[derive(Clone, Deserialize)]
pub struct Settings {
    pub database_url: String,
    /// Server-side secret mixed into every password hash.
    #[serde(default)]
    pub password_pepper: Option<String>,
    pub argon2_memory_kib: u32,
    pub argon2_iterations: u32,
    pub argon2_parallelism: u32,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("database_url", &self.database_url)
            .field("password_pepper", &self.password_pepper.as_ref().map(|_| "<redacted>"))
            .field("argon2_memory_kib", &self.argon2_memory_kib)
            .field("argon2_iterations", &self.argon2_iterations)
            .field("argon2_parallelism", &self.argon2_parallelism)
            .finish()
    }
}

impl Settings {
    /// Load settings from the process environment, which already holds
    /// the `.env` values loaded at startup.
    pub fn load(database_url: Option<String>) -> Result<Self> {
        Self::from_environment(
            Environment::with_prefix(ENV_PREFIX).try_parsing(true),
            database_url,
        )
    }

    /// Load settings from an explicit environment source.
    pub fn from_environment(environment: Environment, database_url: Option<String>) -> Result<Self> {
        let settings: Settings = defaults()?
            .add_source(environment)
            .set_override_option("database_url", database_url)?
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;

        debug!(?settings, "Configuration loaded");
        Ok(settings)
    }

    pub fn password_service(&self) -> Result<Argon2PasswordService> {
        let service = Argon2PasswordService::with_params(
            self.argon2_memory_kib,
            self.argon2_iterations,
            self.argon2_parallelism,
        )?;
        Ok(match &self.password_pepper {
            Some(pepper) => service.with_pepper(pepper.as_bytes()),
            None => service,
        })
    }

    pub async fn connect(&self) -> Result<DatabaseConnection> {
        info!("Connecting to database: {}", self.database_url);
        Database::connect(&self.database_url)
            .await
            .with_context(|| format!("Failed to connect to database '{}'", self.database_url))
    }

    /// Build the account manager the CLI commands work with.
    pub async fn account_manager(&self) -> Result<AccountManager> {
        let db = self.connect().await?;
        Ok(AccountManager::new(
            SeaOrmAccountStore::new(db),
            Arc::new(self.password_service()?),
            Arc::new(SystemClock),
        ))
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>> {
    let builder = Config::builder()
        .set_default("database_url", DEFAULT_DATABASE_URL)?
        .set_default("argon2_memory_kib", i64::from(DEFAULT_MEMORY_KIB))?
        .set_default("argon2_iterations", i64::from(DEFAULT_ITERATIONS))?
        .set_default("argon2_parallelism", i64::from(DEFAULT_PARALLELISM))?;
    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn environment(vars: &[(&str, &str)]) -> Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .source(Some(source))
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_environment(environment(&[]), None).unwrap();

        assert_eq!(settings.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(settings.password_pepper, None);
        assert_eq!(settings.argon2_memory_kib, DEFAULT_MEMORY_KIB);
        assert_eq!(settings.argon2_iterations, DEFAULT_ITERATIONS);
        assert_eq!(settings.argon2_parallelism, DEFAULT_PARALLELISM);
    }

    #[test]
    fn test_environment_and_override() {
        let env = environment(&[
            ("PHOTOSHELF_DATABASE_URL", "sqlite://from-env.db"),
            ("PHOTOSHELF_PASSWORD_PEPPER", "pepper"),
            ("PHOTOSHELF_ARGON2_ITERATIONS", "3"),
        ]);
        let settings = Settings::from_environment(env, None).unwrap();
        assert_eq!(settings.database_url, "sqlite://from-env.db");
        assert_eq!(settings.password_pepper.as_deref(), Some("pepper"));
        assert_eq!(settings.argon2_iterations, 3);

        let env = environment(&[("PHOTOSHELF_DATABASE_URL", "sqlite://from-env.db")]);
        let settings =
            Settings::from_environment(env, Some("sqlite::memory:".to_string())).unwrap();
        assert_eq!(settings.database_url, "sqlite::memory:");
    }

    #[test]
    fn test_debug_redacts_pepper() {
        let env = environment(&[("PHOTOSHELF_PASSWORD_PEPPER", "pepper-value")]);
        let settings = Settings::from_environment(env, None).unwrap();
        let rendered = format!("{:?}", settings);
        assert!(!rendered.contains("pepper-value"));
    }

    #[test]
    fn test_invalid_argon2_cost_is_rejected() {
        let env = environment(&[("PHOTOSHELF_ARGON2_ITERATIONS", "0")]);
        let settings = Settings::from_environment(env, None).unwrap();
        assert!(settings.password_service().is_err());
    }
}
