//! Driving ports for account registration and authentication.
//!
//! In hexagonal terms these are *driving* ports: inbound adapters call them to
//! register users and check credentials without knowing the backing
//! infrastructure.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, Registration, User, UserId};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated user id.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error>;
}

/// Domain use-case port for creating accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationService: Send + Sync {
    /// Store a validated registration and return the new user.
    async fn register(&self, registration: &Registration) -> Result<User, Error>;
}
