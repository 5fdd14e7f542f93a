//! Driving port for editing the signed-in user's profile.

use async_trait::async_trait;

use crate::domain::{Error, ProfileUpdate, User, UserId};

/// Domain use-case port for partial profile edits.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileCommand: Send + Sync {
    /// Apply `update` to the user's profile and return the stored result.
    async fn update_profile(&self, user_id: &UserId, update: ProfileUpdate) -> Result<User, Error>;
}
