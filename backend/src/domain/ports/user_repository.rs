//! Port abstraction for user account persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{EmailAddress, User, UserAccount, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses the e-mail address.
        DuplicateEmail { email: String } => "email already registered: {email}",
    }
}

/// Directory of registered users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Store a newly registered account.
    async fn insert(&self, account: &UserAccount) -> Result<(), UserPersistenceError>;

    /// Overwrite the editable profile columns of an existing user.
    ///
    /// Returns `false` when no user with that identifier exists.
    async fn update_profile(&self, user: &User) -> Result<bool, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch an account, including its password digest, by e-mail.
    async fn find_account_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserAccount>, UserPersistenceError>;
}

/// Fixture directory holding no users.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserRepository;

#[async_trait]
impl UserRepository for FixtureUserRepository {
    async fn insert(&self, _account: &UserAccount) -> Result<(), UserPersistenceError> {
        Ok(())
    }

    async fn update_profile(&self, _user: &User) -> Result<bool, UserPersistenceError> {
        Ok(false)
    }

    async fn find_by_id(&self, _id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(None)
    }

    async fn find_account_by_email(
        &self,
        _email: &EmailAddress,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        Ok(None)
    }
}
