//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Credit adjustment is a single SQL increment with `RETURNING`, so
//! concurrent awards against the same user serialise on the row without an
//! application-side read-modify-write.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::user::{NewUser, User, UserId, Username};

use super::error_mapping::{
    classify_constraint, map_basic_diesel_error, map_pool_error, ViolatedConstraint,
};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_checkout_error(error: PoolError) -> UserPersistenceError {
    map_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn map_create_error(error: diesel::result::Error, new_user: &NewUser) -> UserPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    if let DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) = &error {
        return match classify_constraint(info.constraint_name(), info.message()) {
            ViolatedConstraint::Username => {
                UserPersistenceError::duplicate_username(new_user.username.as_ref())
            }
            ViolatedConstraint::Email => {
                UserPersistenceError::duplicate_email(new_user.email.as_ref())
            }
            _ => UserPersistenceError::query("unique constraint violation"),
        };
    }
    map_diesel_error(error)
}

fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    User::try_from(row).map_err(|err| UserPersistenceError::query(err.to_string()))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, new_user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_checkout_error)?;

        let new_row = NewUserRow {
            user_id: *UserId::random().as_uuid(),
            username: new_user.username.as_ref(),
            email: new_user.email.as_ref(),
            phone_number: new_user.phone_number.as_ref().map(AsRef::as_ref),
            password_hash: new_user.password_hash.expose(),
            is_staff: new_user.is_staff,
        };

        let row: UserRow = diesel::insert_into(users::table)
            .values(&new_row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_create_error(err, new_user))?;

        row_to_user(row)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_checkout_error)?;

        let row = users::table
            .filter(users::user_id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_checkout_error)?;

        let row = users::table
            .filter(users::username.eq(username.as_ref()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn adjust_credits(&self, id: &UserId, delta: i32) -> Result<i32, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_checkout_error)?;

        diesel::update(users::table.filter(users::user_id.eq(id.as_uuid())))
            .set(users::credits.eq(users::credits + delta))
            .returning(users::credits)
            .get_result::<i32>(&mut conn)
            .await
            .map_err(|err| match err {
                diesel::result::Error::NotFound => {
                    UserPersistenceError::not_found(id.to_string())
                }
                other => map_diesel_error(other),
            })
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_checkout_error)?;

        let deleted = diesel::delete(users::table.filter(users::user_id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if deleted == 0 {
            return Err(UserPersistenceError::not_found(id.to_string()));
        }
        Ok(())
    }
}
