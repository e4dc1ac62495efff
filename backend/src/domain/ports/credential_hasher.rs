//! Port abstraction for credential hashing.
//!
//! The domain stores and compares only opaque hash strings; the algorithm
//! lives behind this port.

use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by credential hashing adapters.
    pub enum CredentialHashError {
        /// Hashing failed (salt generation, parameter errors).
        Hash { message: String } => "credential hashing failed: {message}",
        /// The stored hash could not be parsed for verification.
        MalformedHash { message: String } => "stored credential hash is malformed: {message}",
    }
}

/// Hash and verify plaintext credentials.
///
/// Synchronous by design: hashing is CPU-bound and adapters choose their own
/// work factors.
pub trait CredentialHasher: Send + Sync {
    /// Hash a plaintext password into opaque storable material.
    fn hash(&self, password: &str) -> Result<String, CredentialHashError>;

    /// Verify a plaintext password against stored hash material.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, CredentialHashError>;
}
