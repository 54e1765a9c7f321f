//! Password hashing using bcrypt
//!
//! One-way salted hashing with a configurable work factor. Verification is
//! mismatch-tolerant: a wrong password is `Ok(false)`, never an error.
//!
//! Neither plaintext nor hash is ever logged.

use thiserror::Error;

/// Hashing failure
#[derive(Debug, Error)]
pub enum HashingError {
    #[error("Password cannot be empty")]
    EmptyPassword,
    #[error("Password hashing failed: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("Hashing task failed: {0}")]
    Background(String),
}

impl From<HashingError> for crate::error::ApiError {
    fn from(err: HashingError) -> Self {
        crate::error::ApiError::Internal(err.into())
    }
}

/// Password hashing service with a fixed cost
///
/// bcrypt is intentionally CPU-heavy; in async contexts use the `_async`
/// variants, which run on the blocking thread pool.
#[derive(Debug, Clone, Copy)]
pub struct PasswordService {
    cost: u32,
}

impl PasswordService {
    /// Create a service with the given bcrypt cost
    ///
    /// The cost is validated lazily by bcrypt itself: an out-of-range value
    /// surfaces as `HashingError` on the first `hash` call.
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash a password (blocking operation)
    pub fn hash(&self, password: &str) -> Result<String, HashingError> {
        if password.is_empty() {
            return Err(HashingError::EmptyPassword);
        }
        Ok(bcrypt::hash(password, self.cost)?)
    }

    /// Hash a password on the blocking thread pool
    pub async fn hash_async(&self, password: String) -> Result<String, HashingError> {
        let service = *self;
        tokio::task::spawn_blocking(move || service.hash(&password))
            .await
            .map_err(|e| HashingError::Background(e.to_string()))?
    }

    /// Verify a password against a stored hash (blocking operation)
    ///
    /// Returns `Ok(false)` on mismatch; errors only on a malformed hash.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, HashingError> {
        Ok(bcrypt::verify(password, hash)?)
    }

    /// Verify a password on the blocking thread pool
    pub async fn verify_async(&self, password: String, hash: String) -> Result<bool, HashingError> {
        let service = *self;
        tokio::task::spawn_blocking(move || service.verify(&password, &hash))
            .await
            .map_err(|e| HashingError::Background(e.to_string()))?
    }
}

impl Default for PasswordService {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}
