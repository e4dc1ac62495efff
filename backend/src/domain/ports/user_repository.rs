//! Port abstraction for user persistence adapters and their errors.

use async_trait::async_trait;

use crate::domain::user::{NewUser, User, UserId, Username};

use super::macros::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Username already registered.
        DuplicateUsername { username: String } => "username already registered: {username}",
        /// Email already registered.
        DuplicateEmail { email: String } => "email already registered: {email}",
        /// The referenced user does not exist.
        NotFound { id: String } => "user not found: {id}",
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account.
    ///
    /// Fails with `DuplicateUsername`/`DuplicateEmail` on uniqueness
    /// violations.
    async fn create(&self, new_user: &NewUser) -> Result<User, UserPersistenceError>;

    /// Fetch a user by external identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by username (login path).
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Atomically add `delta` to the user's balance and return the new value.
    ///
    /// This is the sole sanctioned credit mutation entry point: the adapter
    /// must implement it as a single serialised read-modify-write (an SQL
    /// `credits = credits + delta` increment or equivalent), never a raw
    /// read-then-write in application code.
    async fn adjust_credits(&self, id: &UserId, delta: i32) -> Result<i32, UserPersistenceError>;

    /// Administrative deletion. Cascades to the user's reports and their
    /// verification records.
    async fn delete(&self, id: &UserId) -> Result<(), UserPersistenceError>;
}
