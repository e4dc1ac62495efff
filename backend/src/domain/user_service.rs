//! User registry services: registration, login, and credit adjustment.

use std::sync::Arc;

use tracing::info;

use super::error::Error;
use super::ports::{
    CredentialHashError, CredentialHasher, UserPersistenceError, UserRepository,
};
use super::user::{
    EmailAddress, NewUser, PasswordHash, PhoneNumber, User, UserId, Username, UserValidationError,
};

/// Registration payload accepted from inbound adapters.
#[derive(Debug, Clone)]
pub struct RegisterUser {
    pub username: Username,
    pub email: EmailAddress,
    pub phone_number: Option<PhoneNumber>,
    pub password: String,
    pub is_staff: bool,
}

fn map_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateUsername { username } => {
            Error::conflict(format!("username already registered: {username}"))
        }
        UserPersistenceError::DuplicateEmail { email } => {
            Error::conflict(format!("email already registered: {email}"))
        }
        UserPersistenceError::NotFound { id } => Error::not_found(format!("user {id} not found")),
    }
}

fn map_hash_error(error: CredentialHashError) -> Error {
    Error::internal(error.to_string())
}

/// Application service over the user registry.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn CredentialHasher>,
}

impl UserService {
    /// Create a new service over a user repository and a credential hasher.
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self { users, hasher }
    }

    /// Register a new account, hashing the supplied password.
    ///
    /// Duplicate usernames or emails surface as conflict errors.
    pub async fn register(&self, request: RegisterUser) -> Result<User, Error> {
        let hash_material = self
            .hasher
            .hash(&request.password)
            .map_err(map_hash_error)?;
        let password_hash =
            PasswordHash::new(hash_material).map_err(map_user_validation_error)?;

        let new_user = NewUser {
            username: request.username,
            email: request.email,
            phone_number: request.phone_number,
            password_hash,
            is_staff: request.is_staff,
        };

        let user = self
            .users
            .create(&new_user)
            .await
            .map_err(map_persistence_error)?;
        info!(user_id = %user.id, staff = user.is_staff, "user registered");
        Ok(user)
    }

    /// Authenticate by username and password.
    ///
    /// Unknown usernames and wrong passwords both map to the same
    /// unauthorized error so the response does not leak which part failed.
    pub async fn login(&self, username: &Username, password: &str) -> Result<User, Error> {
        let user = self
            .users
            .find_by_username(username)
            .await
            .map_err(map_persistence_error)?
            .ok_or_else(|| Error::unauthorized("invalid credentials"))?;

        let verified = self
            .hasher
            .verify(password, user.password_hash.expose())
            .map_err(map_hash_error)?;
        if !verified {
            return Err(Error::unauthorized("invalid credentials"));
        }
        Ok(user)
    }

    /// Fetch a profile by external identifier.
    pub async fn profile(&self, id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_persistence_error)?
            .ok_or_else(|| Error::not_found(format!("user {id} not found")))
    }

    /// Manual credit award path (administrative; callers are trusted).
    ///
    /// Unconditionally applies `amount` through the repository's atomic
    /// increment and returns the new balance. The reason is recorded in the
    /// structured log, not persisted.
    pub async fn award_credits(
        &self,
        id: &UserId,
        amount: i32,
        reason: &str,
    ) -> Result<i32, Error> {
        let balance = self
            .users
            .adjust_credits(id, amount)
            .await
            .map_err(map_persistence_error)?;
        info!(user_id = %id, amount, reason, balance, "manual credit award");
        Ok(balance)
    }

    /// Administrative deletion; cascades to reports and verification records.
    pub async fn delete_user(&self, id: &UserId) -> Result<(), Error> {
        self.users
            .delete(id)
            .await
            .map_err(map_persistence_error)?;
        info!(user_id = %id, "user deleted");
        Ok(())
    }
}

fn map_user_validation_error(error: UserValidationError) -> Error {
    Error::internal(format!("credential hash rejected: {error}"))
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;
