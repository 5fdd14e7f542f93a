//! Account services: registration, login, and profile lookup.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    LoginService, ProfileCommand, RegistrationService, UserPersistenceError, UserProfileQuery,
    UserRepository,
};
use crate::domain::{
    EmailAddress, Error, LoginCredentials, PasswordDigest, ProfileUpdate, Registration, User,
    UserAccount, UserId, UserValidationError,
};

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { .. } => {
            Error::conflict("email is already registered").with_details(json!({
                "field": "email",
                "code": "email_taken",
            }))
        }
    }
}

fn map_profile_error(error: &UserValidationError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({
        "field": error.field(),
        "code": "invalid_profile",
    }))
}

fn user_not_found(user_id: &UserId) -> Error {
    Error::not_found(format!("user {user_id} not found"))
}

fn invalid_credentials() -> Error {
    Error::unauthorized("invalid credentials")
}

/// Account service implementing the login, registration and profile ports.
#[derive(Clone)]
pub struct AccountService<U> {
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<U> AccountService<U> {
    /// Create a new service backed by the user repository.
    pub fn new(users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self { users, clock }
    }
}

#[async_trait]
impl<U> RegistrationService for AccountService<U>
where
    U: UserRepository,
{
    async fn register(&self, registration: &Registration) -> Result<User, Error> {
        let user = User::new(
            UserId::random(),
            registration.name().clone(),
            registration.email().clone(),
            registration.contact().clone(),
            self.clock.utc(),
        );
        let password = PasswordDigest::generate(registration.password())
            .map_err(|err| Error::internal(err.to_string()))?;
        let account = UserAccount { user, password };
        self.users.insert(&account).await.map_err(map_user_error)?;
        info!(user_id = %account.user.id(), "user registered");
        Ok(account.user)
    }
}

#[async_trait]
impl<U> LoginService for AccountService<U>
where
    U: UserRepository,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let Ok(email) = EmailAddress::new(credentials.email()) else {
            return Err(invalid_credentials());
        };
        let account = self
            .users
            .find_account_by_email(&email)
            .await
            .map_err(map_user_error)?;
        match account {
            Some(account) if account.password.verify(credentials.password()) => {
                Ok(account.user.id().clone())
            }
            _ => {
                warn!("rejected login attempt");
                Err(invalid_credentials())
            }
        }
    }
}

#[async_trait]
impl<U> UserProfileQuery for AccountService<U>
where
    U: UserRepository,
{
    async fn fetch_profile(&self, user_id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| user_not_found(user_id))
    }
}

#[async_trait]
impl<U> ProfileCommand for AccountService<U>
where
    U: UserRepository,
{
    async fn update_profile(
        &self,
        user_id: &UserId,
        update: ProfileUpdate,
    ) -> Result<User, Error> {
        let current = self.fetch_profile(user_id).await?;
        let edited = current
            .with_profile(update)
            .map_err(|err| map_profile_error(&err))?;
        let stored = self
            .users
            .update_profile(&edited)
            .await
            .map_err(map_user_error)?;
        if !stored {
            return Err(user_not_found(user_id));
        }
        info!(%user_id, "profile updated");
        Ok(edited)
    }
}
