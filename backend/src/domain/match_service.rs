//! Match workflow service.
//!
//! Implements the [`MatchCommand`] and [`MatchQuery`] driving ports. Every
//! mutation on a donation's match set runs under that donation's lock from
//! [`DonationLocks`]: the service re-reads the match and donation, plans the
//! transition with [`plan_transition`], and hands the whole plan to
//! [`MatchRepository::commit_transition`].

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info};

use crate::domain::ports::{
    DonationRepository, DonationRepositoryError, MatchCommand, MatchQuery, MatchRepository,
    MatchRepositoryError, RequestDonationRequest, UpdateMatchStatusRequest,
};
use crate::domain::{
    Donation, DonationId, DonationLocks, DonationStatus, Error, Match, MatchId, MatchRecord,
    MatchStatus, Page, PageRequest, TransitionError, UserId, plan_transition,
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
        MatchRepositoryError::Query { message } => {
            Error::internal(format!("match repository error: {message}"))
        }
        MatchRepositoryError::Duplicate { .. } => duplicate_request(),
        MatchRepositoryError::Stale { message } => Error::conflict(format!(
            "match or donation changed while updating; retry the request ({message})"
        ))
        .with_details(json!({ "code": "stale_state" })),
        MatchRepositoryError::DonationUnavailable { status } => {
            Error::conflict(format!("donation is {status} and cannot be requested"))
                .with_details(json!({
                    "code": "donation_unavailable",
                    "status": status,
                }))
        }
    }
}

fn map_transition_error(error: TransitionError) -> Error {
    let message = error.to_string();
    match error {
        TransitionError::UnsupportedTarget(status) => {
            Error::invalid_request(message).with_details(json!({
                "field": "status",
                "value": status.as_str(),
                "code": "invalid_status",
            }))
        }
        TransitionError::NotAParticipant | TransitionError::DonorOnly(_) => {
            Error::forbidden(message)
        }
        TransitionError::Terminal(status) => Error::conflict(message).with_details(json!({
            "code": "match_closed",
            "status": status.as_str(),
        })),
        TransitionError::InvalidTransition { from, to } => {
            Error::conflict(message).with_details(json!({
                "code": "invalid_transition",
                "from": from.as_str(),
                "to": to.as_str(),
            }))
        }
        TransitionError::DonationUnavailable(status) => {
            donation_unavailable(message, status)
        }
    }
}

fn donation_unavailable(message: String, status: DonationStatus) -> Error {
    Error::conflict(message).with_details(json!({
        "code": "donation_unavailable",
        "status": status.as_str(),
    }))
}

fn duplicate_request() -> Error {
    Error::conflict("you have already requested this donation")
        .with_details(json!({ "code": "duplicate_request" }))
}

fn donation_not_found(id: &DonationId) -> Error {
    Error::not_found(format!("donation {id} not found"))
}

fn match_not_found(id: &MatchId) -> Error {
    Error::not_found(format!("match {id} not found"))
}

/// Match workflow service implementing the match driving ports.
#[derive(Clone)]
pub struct MatchWorkflowService<D, M> {
    donations: Arc<D>,
    matches: Arc<M>,
    locks: DonationLocks,
    clock: Arc<dyn Clock>,
}

impl<D, M> MatchWorkflowService<D, M> {
    /// Create a workflow service.
    ///
    /// `locks` must be shared with every other service that mutates the same
    /// donations.
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

impl<D, M> MatchWorkflowService<D, M>
where
    D: DonationRepository,
    M: MatchRepository,
{
    async fn load_donation(&self, id: &DonationId) -> Result<Donation, Error> {
        self.donations
            .find_by_id(id)
            .await
            .map_err(map_donation_error)?
            .ok_or_else(|| donation_not_found(id))
    }

    async fn load_match(&self, id: &MatchId) -> Result<Match, Error> {
        self.matches
            .find_by_id(id)
            .await
            .map_err(map_match_error)?
            .ok_or_else(|| match_not_found(id))
    }
}

#[async_trait]
impl<D, M> MatchCommand for MatchWorkflowService<D, M>
where
    D: DonationRepository,
    M: MatchRepository,
{
    async fn request_donation(
        &self,
        request: RequestDonationRequest,
    ) -> Result<MatchRecord, Error> {
        let RequestDonationRequest {
            donation_id,
            requester_id,
            message,
        } = request;
        let _guard = self.locks.acquire(donation_id).await;

        let donation = self.load_donation(&donation_id).await?;
        if donation.status != DonationStatus::Available {
            return Err(donation_unavailable(
                format!("donation {donation_id} is {} and cannot be requested", donation.status),
                donation.status,
            ));
        }
        if donation.is_owned_by(&requester_id) {
            return Err(Error::conflict("donors cannot request their own donation")
                .with_details(json!({ "code": "self_request" })));
        }
        let already_requested = self
            .matches
            .exists_for_donation_and_requester(&donation_id, &requester_id)
            .await
            .map_err(map_match_error)?;
        if already_requested {
            return Err(duplicate_request());
        }

        let created = Match::request(donation_id, requester_id, message, self.clock.utc());
        self.matches.save(&created).await.map_err(map_match_error)?;
        info!(
            match_id = %created.id,
            donation_id = %donation_id,
            requester_id = %created.requester_id,
            "donation requested"
        );

        Ok(MatchRecord {
            request: created,
            donation,
        })
    }

    async fn update_status(&self, request: UpdateMatchStatusRequest) -> Result<MatchRecord, Error> {
        let UpdateMatchStatusRequest {
            match_id,
            actor_id,
            change,
        } = request;

        let donation_id = self.load_match(&match_id).await?.donation_id;
        let _guard = self.locks.acquire(donation_id).await;

        // Re-read under the lock; the match may have moved while we waited.
        let current = self.load_match(&match_id).await?;
        let mut donation = self.load_donation(&current.donation_id).await?;
        let siblings = if change.status == MatchStatus::Approved {
            self.matches
                .find_pending_for_donation(&donation.id)
                .await
                .map_err(map_match_error)?
        } else {
            Vec::new()
        };

        let now = self.clock.utc();
        let from = current.status;
        let plan = plan_transition(current, &donation, &actor_id, change, siblings, now)
            .map_err(map_transition_error)?;
        self.matches
            .commit_transition(&plan)
            .await
            .map_err(map_match_error)?;

        if let Some(status) = plan.donation_status {
            donation.status = status;
            donation.updated_at = now;
        }
        info!(
            match_id = %match_id,
            donation_id = %donation.id,
            actor_id = %actor_id,
            from = %from,
            to = %plan.updated.status,
            rejected = plan.rejected.len(),
            "match status updated"
        );
        if let Some(status) = plan.donation_status {
            debug!(donation_id = %donation.id, status = %status, "donation status changed");
        }

        Ok(MatchRecord {
            request: plan.updated,
            donation,
        })
    }
}

#[async_trait]
impl<D, M> MatchQuery for MatchWorkflowService<D, M>
where
    D: DonationRepository,
    M: MatchRepository,
{
    async fn ensure_exists(&self, match_id: &MatchId) -> Result<(), Error> {
        self.load_match(match_id).await.map(|_| ())
    }

    async fn list_for_donation(
        &self,
        donation_id: &DonationId,
    ) -> Result<Vec<MatchRecord>, Error> {
        self.load_donation(donation_id).await?;
        self.matches
            .list_for_donation(donation_id)
            .await
            .map_err(map_match_error)
    }

    async fn list_for_requester(
        &self,
        requester_id: &UserId,
        page: PageRequest,
    ) -> Result<Page<MatchRecord>, Error> {
        self.matches
            .list_for_requester(requester_id, page)
            .await
            .map_err(map_match_error)
    }

    async fn list_for_donor(&self, donor_id: &UserId) -> Result<Vec<MatchRecord>, Error> {
        self.matches
            .list_for_donor(donor_id)
            .await
            .map_err(map_match_error)
    }
}

#[cfg(test)]
#[path = "match_service_tests.rs"]
mod tests;
