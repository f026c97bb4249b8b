use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password must not be empty")]
    Empty,

    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Hash and verify capability used by signup, login and profile edits.
pub trait PasswordScheme: Send + Sync {
    /// Produce a salted, self-describing hash of `raw`.
    fn hash(&self, raw: &str) -> Result<String, PasswordError>;

    /// Check `raw` against a value produced by [`PasswordScheme::hash`].
    /// A stored value that is not a valid hash never verifies.
    fn verify(&self, raw: &str, stored: &str) -> bool;
}

/// Argon2id with the crate's default parameters, PHC string output.
#[derive(Debug, Default, Clone)]
pub struct Argon2Scheme {
    argon2: Argon2<'static>,
}

impl PasswordScheme for Argon2Scheme {
    fn hash(&self, raw: &str) -> Result<String, PasswordError> {
        if raw.is_empty() {
            return Err(PasswordError::Empty);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(raw.as_bytes(), &salt)
            .map_err(|e| PasswordError::Hash(e.to_string()))?;

        Ok(hash.to_string())
    }

    fn verify(&self, raw: &str, stored: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored) else {
            return false;
        };

        self.argon2.verify_password(raw.as_bytes(), &parsed).is_ok()
    }
}
