//! Donation listing services.
//!
//! Implements [`DonationCommand`] and [`DonationQuery`]. Edits and deletions
//! share the per-donation lock with the match workflow so they never
//! interleave with an approval or a new request.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{
    DonationCommand, DonationQuery, DonationRepository, DonationRepositoryError,
    ListDonationsRequest, MatchRepository, MatchRepositoryError,
};
use crate::domain::{
    Donation, DonationDetails, DonationDraft, DonationId, DonationLocks, DonationStatus,
    DonationValidationError, Error, Page, UserId,
};

fn map_donation_error(error: DonationRepositoryError) -> Error {
    match error {
        DonationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("donation repository unavailable: {message}"))
        }
        DonationRepositoryError::Query { message } => {
            Error::internal(format!("donation repository error: {message}"))
        }
    }
}

fn map_match_error(error: MatchRepositoryError) -> Error {
    match error {
        MatchRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("match repository unavailable: {message}"))
        }
        other => Error::internal(format!("match repository error: {other}")),
    }
}

fn map_validation_error(error: DonationValidationError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({
        "field": error.field(),
        "code": "invalid_donation",
    }))
}

/// Donation service implementing the donation driving ports.
#[derive(Clone)]
pub struct DonationService<D, M> {
    donations: Arc<D>,
    matches: Arc<M>,
    locks: DonationLocks,
    clock: Arc<dyn Clock>,
}

impl<D, M> DonationService<D, M> {
    /// Create a new service. `locks` is shared with the match workflow.
    pub fn new(
        donations: Arc<D>,
        matches: Arc<M>,
        locks: DonationLocks,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            donations,
            matches,
            locks,
            clock,
        }
    }
}

impl<D, M> DonationService<D, M>
where
    D: DonationRepository,
    M: MatchRepository,
{
    async fn load_owned(&self, id: &DonationId, actor_id: &UserId) -> Result<Donation, Error> {
        let donation = self
            .donations
            .find_by_id(id)
            .await
            .map_err(map_donation_error)?
            .ok_or_else(|| Error::not_found(format!("donation {id} not found")))?;
        if !donation.is_owned_by(actor_id) {
            return Err(Error::forbidden("only the donor may change this donation"));
        }
        Ok(donation)
    }
}

#[async_trait]
impl<D, M> DonationCommand for DonationService<D, M>
where
    D: DonationRepository,
    M: MatchRepository,
{
    async fn create(&self, donor_id: &UserId, draft: DonationDraft) -> Result<Donation, Error> {
        let details = DonationDetails::try_from_draft(draft).map_err(map_validation_error)?;
        let donation = Donation::offer(donor_id.clone(), details, self.clock.utc());
        self.donations
            .save(&donation)
            .await
            .map_err(map_donation_error)?;
        info!(donation_id = %donation.id, donor_id = %donor_id, "donation created");
        Ok(donation)
    }

    async fn update(
        &self,
        id: &DonationId,
        actor_id: &UserId,
        draft: DonationDraft,
    ) -> Result<Donation, Error> {
        let details = DonationDetails::try_from_draft(draft).map_err(map_validation_error)?;
        let _guard = self.locks.acquire(*id).await;

        let mut donation = self.load_owned(id, actor_id).await?;
        if donation.status != DonationStatus::Available {
            return Err(Error::conflict(format!(
                "donation {id} is {} and can no longer be edited",
                donation.status
            ))
            .with_details(json!({
                "code": "donation_locked",
                "status": donation.status.as_str(),
            })));
        }

        donation.details = details;
        donation.updated_at = self.clock.utc();
        self.donations
            .save(&donation)
            .await
            .map_err(map_donation_error)?;
        info!(donation_id = %id, "donation updated");
        Ok(donation)
    }

    async fn delete(&self, id: &DonationId, actor_id: &UserId) -> Result<(), Error> {
        let _guard = self.locks.acquire(*id).await;
        self.load_owned(id, actor_id).await?;

        let active = self
            .matches
            .has_active_for_donation(id)
            .await
            .map_err(map_match_error)?;
        if active {
            return Err(
                Error::conflict("donation has open requests and cannot be deleted")
                    .with_details(json!({ "code": "active_matches" })),
            );
        }

        let deleted = self
            .donations
            .delete(id)
            .await
            .map_err(map_donation_error)?;
        if !deleted {
            return Err(Error::not_found(format!("donation {id} not found")));
        }
        info!(donation_id = %id, "donation deleted");
        Ok(())
    }
}

#[async_trait]
impl<D, M> DonationQuery for DonationService<D, M>
where
    D: DonationRepository,
    M: MatchRepository,
{
    async fn get(&self, id: &DonationId) -> Result<Donation, Error> {
        self.donations
            .find_by_id(id)
            .await
            .map_err(map_donation_error)?
            .ok_or_else(|| Error::not_found(format!("donation {id} not found")))
    }

    async fn list(&self, request: ListDonationsRequest) -> Result<Page<Donation>, Error> {
        let ListDonationsRequest { filter, sort, page } = request;
        self.donations
            .list(&filter, sort, page)
            .await
            .map_err(map_donation_error)
    }

    async fn list_for_donor(&self, donor_id: &UserId) -> Result<Vec<Donation>, Error> {
        self.donations
            .list_for_donor(donor_id)
            .await
            .map_err(map_donation_error)
    }

    async fn categories(&self) -> Result<Vec<String>, Error> {
        self.donations
            .distinct_categories()
            .await
            .map_err(map_donation_error)
    }

    async fn cities(&self) -> Result<Vec<String>, Error> {
        self.donations
            .distinct_cities()
            .await
            .map_err(map_donation_error)
    }
}
