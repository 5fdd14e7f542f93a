//! Port for donation persistence and listing reads.

use async_trait::async_trait;

use crate::domain::{
    Donation, DonationFilter, DonationId, DonationSort, Page, PageRequest, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by donation repository adapters.
    pub enum DonationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "donation repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "donation repository query failed: {message}",
    }
}

/// Port for reading and writing donation listings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DonationRepository: Send + Sync {
    /// Fetch a donation by id.
    async fn find_by_id(
        &self,
        id: &DonationId,
    ) -> Result<Option<Donation>, DonationRepositoryError>;

    /// Insert or replace a donation.
    async fn save(&self, donation: &Donation) -> Result<(), DonationRepositoryError>;

    /// Delete a donation. Returns `false` when nothing was deleted.
    async fn delete(&self, id: &DonationId) -> Result<bool, DonationRepositoryError>;

    /// Filtered, sorted, paginated listing.
    async fn list(
        &self,
        filter: &DonationFilter,
        sort: DonationSort,
        page: PageRequest,
    ) -> Result<Page<Donation>, DonationRepositoryError>;

    /// Every donation offered by `donor_id`, newest first.
    async fn list_for_donor(
        &self,
        donor_id: &UserId,
    ) -> Result<Vec<Donation>, DonationRepositoryError>;

    /// Distinct categories, sorted.
    async fn distinct_categories(&self) -> Result<Vec<String>, DonationRepositoryError>;

    /// Distinct non-empty cities, sorted.
    async fn distinct_cities(&self) -> Result<Vec<String>, DonationRepositoryError>;
}

/// Fixture implementation holding no donations.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureDonationRepository;

#[async_trait]
impl DonationRepository for FixtureDonationRepository {
    async fn find_by_id(
        &self,
        _id: &DonationId,
    ) -> Result<Option<Donation>, DonationRepositoryError> {
        Ok(None)
    }

    async fn save(&self, _donation: &Donation) -> Result<(), DonationRepositoryError> {
        Ok(())
    }

    async fn delete(&self, _id: &DonationId) -> Result<bool, DonationRepositoryError> {
        Ok(false)
    }

    async fn list(
        &self,
        _filter: &DonationFilter,
        _sort: DonationSort,
        page: PageRequest,
    ) -> Result<Page<Donation>, DonationRepositoryError> {
        Ok(Page::new(Vec::new(), 0, page))
    }

    async fn list_for_donor(
        &self,
        _donor_id: &UserId,
    ) -> Result<Vec<Donation>, DonationRepositoryError> {
        Ok(Vec::new())
    }

    async fn distinct_categories(&self) -> Result<Vec<String>, DonationRepositoryError> {
        Ok(Vec::new())
    }

    async fn distinct_cities(&self) -> Result<Vec<String>, DonationRepositoryError> {
        Ok(Vec::new())
    }
}
