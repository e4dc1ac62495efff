//! Regression coverage for registration, login, and credit award mapping.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use rstest::rstest;

use super::*;
use crate::domain::ErrorCode;

/// Plaintext-prefix hasher so tests can verify without real argon2 work.
struct StubHasher;

impl CredentialHasher for StubHasher {
    fn hash(&self, password: &str) -> Result<String, CredentialHashError> {
        Ok(format!("hashed:{password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, CredentialHashError> {
        Ok(hash == format!("hashed:{password}"))
    }
}

#[derive(Default)]
struct StubState {
    users: HashMap<UserId, User>,
    fail_connection: bool,
}

#[derive(Default)]
struct StubUserRepository {
    state: Mutex<StubState>,
}

impl StubUserRepository {
    fn with_connection_failure() -> Self {
        Self {
            state: Mutex::new(StubState {
                fail_connection: true,
                ..StubState::default()
            }),
        }
    }

    fn credits_of(&self, id: &UserId) -> i32 {
        let state = self.state.lock().expect("state lock");
        state.users.get(id).map(|u| u.credits).unwrap_or_default()
    }
}

#[async_trait]
impl UserRepository for StubUserRepository {
    async fn create(&self, new_user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut state = self.state.lock().expect("state lock");
        if state.fail_connection {
            return Err(UserPersistenceError::connection("refused"));
        }
        for existing in state.users.values() {
            if existing.username == new_user.username {
                return Err(UserPersistenceError::duplicate_username(
                    new_user.username.as_ref(),
                ));
            }
            if existing.email == new_user.email {
                return Err(UserPersistenceError::duplicate_email(
                    new_user.email.as_ref(),
                ));
            }
        }
        let user = User {
            id: UserId::random(),
            username: new_user.username.clone(),
            email: new_user.email.clone(),
            phone_number: new_user.phone_number.clone(),
            password_hash: new_user.password_hash.clone(),
            credits: 0,
            is_staff: new_user.is_staff,
            created_at: Utc::now(),
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self.state.lock().expect("state lock");
        if state.fail_connection {
            return Err(UserPersistenceError::connection("refused"));
        }
        Ok(state.users.get(id).cloned())
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError> {
        let state = self.state.lock().expect("state lock");
        Ok(state
            .users
            .values()
            .find(|u| &u.username == username)
            .cloned())
    }

    async fn adjust_credits(&self, id: &UserId, delta: i32) -> Result<i32, UserPersistenceError> {
        let mut state = self.state.lock().expect("state lock");
        let user = state
            .users
            .get_mut(id)
            .ok_or_else(|| UserPersistenceError::not_found(id.to_string()))?;
        user.credits += delta;
        Ok(user.credits)
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserPersistenceError> {
        let mut state = self.state.lock().expect("state lock");
        state
            .users
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| UserPersistenceError::not_found(id.to_string()))
    }
}

fn service_over(repo: std::sync::Arc<StubUserRepository>) -> UserService {
    UserService::new(repo, std::sync::Arc::new(StubHasher))
}

fn register_request(username: &str, email: &str) -> RegisterUser {
    RegisterUser {
        username: Username::new(username).expect("valid username"),
        email: EmailAddress::new(email).expect("valid email"),
        phone_number: None,
        password: "hunter2".to_owned(),
        is_staff: false,
    }
}

#[tokio::test]
async fn register_stores_hash_not_plaintext() {
    let repo = std::sync::Arc::new(StubUserRepository::default());
    let service = service_over(repo.clone());

    let user = service
        .register(register_request("jane", "jane@example.com"))
        .await
        .expect("registration succeeds");

    assert_eq!(user.password_hash.expose(), "hashed:hunter2");
    assert_eq!(user.credits, 0);
}

#[tokio::test]
async fn duplicate_username_maps_to_conflict() {
    let repo = std::sync::Arc::new(StubUserRepository::default());
    let service = service_over(repo);

    service
        .register(register_request("jane", "jane@example.com"))
        .await
        .expect("first registration succeeds");
    let error = service
        .register(register_request("jane", "other@example.com"))
        .await
        .expect_err("duplicate username must fail");

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert!(error.message().contains("username"));
}

#[tokio::test]
async fn duplicate_email_maps_to_conflict() {
    let repo = std::sync::Arc::new(StubUserRepository::default());
    let service = service_over(repo);

    service
        .register(register_request("jane", "jane@example.com"))
        .await
        .expect("first registration succeeds");
    let error = service
        .register(register_request("janet", "jane@example.com"))
        .await
        .expect_err("duplicate email must fail");

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert!(error.message().contains("email"));
}

#[tokio::test]
async fn login_accepts_correct_password() {
    let repo = std::sync::Arc::new(StubUserRepository::default());
    let service = service_over(repo);
    let registered = service
        .register(register_request("jane", "jane@example.com"))
        .await
        .expect("registration succeeds");

    let user = service
        .login(&registered.username, "hunter2")
        .await
        .expect("login succeeds");
    assert_eq!(user.id, registered.id);
}

#[rstest]
#[case("jane", "wrong-password")]
#[case("nobody", "hunter2")]
#[tokio::test]
async fn login_failures_are_uniformly_unauthorized(
    #[case] username: &str,
    #[case] password: &str,
) {
    let repo = std::sync::Arc::new(StubUserRepository::default());
    let service = service_over(repo);
    service
        .register(register_request("jane", "jane@example.com"))
        .await
        .expect("registration succeeds");

    let username = Username::new(username).expect("valid username");
    let error = service
        .login(&username, password)
        .await
        .expect_err("login must fail");
    assert_eq!(error.code(), ErrorCode::Unauthorized);
    assert_eq!(error.message(), "invalid credentials");
}

#[tokio::test]
async fn award_credits_returns_new_balance() {
    let repo = std::sync::Arc::new(StubUserRepository::default());
    let service = service_over(repo.clone());
    let user = service
        .register(register_request("jane", "jane@example.com"))
        .await
        .expect("registration succeeds");

    let balance = service
        .award_credits(&user.id, 25, "community cleanup bonus")
        .await
        .expect("award succeeds");
    assert_eq!(balance, 25);
    assert_eq!(repo.credits_of(&user.id), 25);
}

#[tokio::test]
async fn award_to_unknown_user_is_not_found() {
    let repo = std::sync::Arc::new(StubUserRepository::default());
    let service = service_over(repo);

    let error = service
        .award_credits(&UserId::random(), 5, "test")
        .await
        .expect_err("unknown user must fail");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn connection_failures_map_to_service_unavailable() {
    let repo = std::sync::Arc::new(StubUserRepository::with_connection_failure());
    let service = service_over(repo);

    let error = service
        .register(register_request("jane", "jane@example.com"))
        .await
        .expect_err("connection failure must surface");
    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

#[tokio::test]
async fn delete_removes_user() {
    let repo = std::sync::Arc::new(StubUserRepository::default());
    let service = service_over(repo.clone());
    let user = service
        .register(register_request("jane", "jane@example.com"))
        .await
        .expect("registration succeeds");

    service.delete_user(&user.id).await.expect("delete succeeds");
    let error = service
        .profile(&user.id)
        .await
        .expect_err("profile must be gone");
    assert_eq!(error.code(), ErrorCode::NotFound);
}
