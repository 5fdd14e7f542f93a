//! Driving port for donation listing mutations.

use async_trait::async_trait;

use crate::domain::{Donation, DonationDraft, DonationId, Error, UserId};

/// Driving port for offering, editing and withdrawing donations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DonationCommand: Send + Sync {
    /// Validate and store a new AVAILABLE donation owned by `donor_id`.
    async fn create(&self, donor_id: &UserId, draft: DonationDraft) -> Result<Donation, Error>;

    /// Replace the descriptive fields of an AVAILABLE donation owned by
    /// `actor_id`.
    async fn update(
        &self,
        id: &DonationId,
        actor_id: &UserId,
        draft: DonationDraft,
    ) -> Result<Donation, Error>;

    /// Delete a donation owned by `actor_id` that has no active matches.
    async fn delete(&self, id: &DonationId, actor_id: &UserId) -> Result<(), Error>;
}
