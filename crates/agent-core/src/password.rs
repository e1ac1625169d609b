//! Admin password hashing.

use crate::error::AgentError;

/// Hash and verify admin passwords.
pub trait PasswordVerifier: Send + Sync {
    /// Produce a digest for `secret`.
    fn hash(&self, secret: &str) -> Result<String, AgentError>;

    /// Check `secret` against a stored `digest`. Malformed digests verify as false.
    fn verify(&self, secret: &str, digest: &str) -> bool;
}

/// bcrypt-backed verifier.
#[derive(Debug, Clone, Copy)]
pub struct BcryptVerifier {
    cost: u32,
}

impl BcryptVerifier {
    /// Create a verifier with an explicit bcrypt cost.
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptVerifier {
    fn default() -> Self {
        Self::with_cost(bcrypt::DEFAULT_COST)
    }
}

impl PasswordVerifier for BcryptVerifier {
    fn hash(&self, secret: &str) -> Result<String, AgentError> {
        bcrypt::hash(secret, self.cost).map_err(|e| AgentError::Hashing(e.to_string()))
    }

    fn verify(&self, secret: &str, digest: &str) -> bool {
        bcrypt::verify(secret, digest).unwrap_or(false)
    }
}
