//! Driving port for donation reads.

use async_trait::async_trait;

use crate::domain::{
    Donation, DonationFilter, DonationId, DonationSort, Error, Page, PageRequest, UserId,
};

/// Listing parameters for [`DonationQuery::list`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListDonationsRequest {
    pub filter: DonationFilter,
    pub sort: DonationSort,
    pub page: PageRequest,
}

/// Driving port for browsing donations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DonationQuery: Send + Sync {
    /// Fetch one donation.
    async fn get(&self, id: &DonationId) -> Result<Donation, Error>;

    /// Filtered and paginated listing.
    async fn list(&self, request: ListDonationsRequest) -> Result<Page<Donation>, Error>;

    /// Donations offered by `donor_id`.
    async fn list_for_donor(&self, donor_id: &UserId) -> Result<Vec<Donation>, Error>;

    /// Distinct categories in use.
    async fn categories(&self) -> Result<Vec<String>, Error>;

    /// Distinct cities in use.
    async fn cities(&self) -> Result<Vec<String>, Error>;
}
