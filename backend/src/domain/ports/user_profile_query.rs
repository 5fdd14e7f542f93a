//! Driving port for user profile queries.
//!
//! Inbound adapters use this port to load the signed-in user's profile without
//! importing persistence details.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId};

/// Domain use-case port for reading the current user's profile.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserProfileQuery: Send + Sync {
    /// Return the profile for the authenticated user.
    async fn fetch_profile(&self, user_id: &UserId) -> Result<User, Error>;
}
