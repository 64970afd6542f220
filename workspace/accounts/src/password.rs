//! Password hashing.
//!
//! The manager never stores or logs plaintext; it hands it to a
//! [`PasswordService`] and keeps only the returned PHC string.

use std::fmt;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use model::entities::account::UNUSABLE_PASSWORD_PREFIX;
use rand_core::OsRng;
use tracing::{error, warn};

use crate::error::{AccountError, Result};

/// Salted one-way password hashing with constant-time verification.
pub trait PasswordService: Send + Sync {
    /// Hash a plaintext password into an opaque, self-describing string.
    fn hash(&self, plaintext: &str) -> Result<String>;

    /// Check a plaintext password against a previously produced hash.
    /// Malformed or unusable hashes never verify.
    fn verify(&self, plaintext: &str, hash: &str) -> bool;
}

/// Default Argon2 memory cost in KiB.
pub const DEFAULT_MEMORY_KIB: u32 = Params::DEFAULT_M_COST;
/// Default number of Argon2 iterations.
pub const DEFAULT_ITERATIONS: u32 = Params::DEFAULT_T_COST;
/// Default Argon2 parallelism.
pub const DEFAULT_PARALLELISM: u32 = Params::DEFAULT_P_COST;

/// A hash value that no password will ever match.
pub fn make_unusable_password() -> String {
    let filler = SaltString::generate(&mut OsRng);
    format!("{}{}", UNUSABLE_PASSWORD_PREFIX, filler.as_str())
}

/// Argon2id hashing with a random salt per password and an optional pepper.
#[derive(Clone)]
pub struct Argon2PasswordService {
    params: Params,
    pepper: Option<Vec<u8>>,
}

impl Argon2PasswordService {
    /// Argon2id with the crate's recommended default cost.
    pub fn new() -> Self {
        Self {
            params: Params::default(),
            pepper: None,
        }
    }

    /// Argon2id with explicit memory (KiB), iteration and parallelism costs.
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| AccountError::PasswordHash(format!("Invalid Argon2 parameters: {}", e)))?;
        Ok(Self {
            params,
            pepper: None,
        })
    }

    /// Mix a server-side secret into every hash.
    /// Hashes produced with a pepper only verify with the same pepper.
    pub fn with_pepper(mut self, pepper: impl Into<Vec<u8>>) -> Self {
        let pepper = pepper.into();
        self.pepper = if pepper.is_empty() { None } else { Some(pepper) };
        self
    }

    fn hasher(&self) -> Result<Argon2<'_>> {
        match &self.pepper {
            Some(pepper) => Argon2::new_with_secret(
                pepper,
                Algorithm::Argon2id,
                Version::V0x13,
                self.params.clone(),
            )
            .map_err(|e| AccountError::PasswordHash(format!("Failed to initialize Argon2 with pepper: {}", e))),
            None => Ok(Argon2::new(
                Algorithm::Argon2id,
                Version::V0x13,
                self.params.clone(),
            )),
        }
    }
}

impl Default for Argon2PasswordService {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Argon2PasswordService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Argon2PasswordService")
            .field("m_cost", &self.params.m_cost())
            .field("t_cost", &self.params.t_cost())
            .field("p_cost", &self.params.p_cost())
            .field("peppered", &self.pepper.is_some())
            .finish()
    }
}

impl PasswordService for Argon2PasswordService {
    fn hash(&self, plaintext: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .hasher()?
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| {
                error!("Failed to hash password: {}", e);
                AccountError::PasswordHash(e.to_string())
            })?;
        Ok(hash.to_string())
    }

    fn verify(&self, plaintext: &str, hash: &str) -> bool {
        if hash.starts_with(UNUSABLE_PASSWORD_PREFIX) {
            return false;
        }

        let parsed = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Stored password hash could not be parsed: {}", e);
                return false;
            }
        };

        match self.hasher() {
            Ok(hasher) => hasher.verify_password(plaintext.as_bytes(), &parsed).is_ok(),
            Err(e) => {
                error!("Password verification unavailable: {}", e);
                false
            }
        }
    }
}
