//! Driving port for match listings.

use async_trait::async_trait;

use crate::domain::{DonationId, Error, MatchId, MatchRecord, Page, PageRequest, UserId};

/// Driving port for reading matches from the donor, requester and donation
/// perspectives.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MatchQuery: Send + Sync {
    /// Fail with not found unless the match exists.
    async fn ensure_exists(&self, match_id: &MatchId) -> Result<(), Error>;

    /// All matches on a donation, newest first. Fails when the donation is
    /// missing.
    async fn list_for_donation(&self, donation_id: &DonationId)
    -> Result<Vec<MatchRecord>, Error>;

    /// Matches the user requested, newest first.
    async fn list_for_requester(
        &self,
        requester_id: &UserId,
        page: PageRequest,
    ) -> Result<Page<MatchRecord>, Error>;

    /// Matches received on the user's donations, newest first.
    async fn list_for_donor(&self, donor_id: &UserId) -> Result<Vec<MatchRecord>, Error>;
}
