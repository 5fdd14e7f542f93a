//! Port for match persistence, listing reads, and atomic transition commits.

use async_trait::async_trait;

use crate::domain::{
    DonationId, Match, MatchId, MatchRecord, Page, PageRequest, TransitionPlan, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by match repository adapters.
    pub enum MatchRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "match repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "match repository query failed: {message}",
        /// A match already exists for the donation and requester pair.
        Duplicate { message: String } =>
            "match already exists: {message}",
        /// Stored state diverged from the state a transition was planned on.
        Stale { message: String } =>
            "match changed concurrently: {message}",
        /// The donation left AVAILABLE before a new request was stored.
        DonationUnavailable { status: String } =>
            "donation is {status} and cannot be requested",
    }
}

/// Port for reading and writing donation requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MatchRepository: Send + Sync {
    /// Fetch a match by id.
    async fn find_by_id(&self, id: &MatchId) -> Result<Option<Match>, MatchRepositoryError>;

    /// Insert a new match.
    ///
    /// The insert and a check that the donation is still AVAILABLE happen
    /// atomically. Adapters report [`MatchRepositoryError::Duplicate`] when
    /// the donation and requester pair is already taken and
    /// [`MatchRepositoryError::DonationUnavailable`] when the donation moved
    /// on.
    async fn save(&self, request: &Match) -> Result<(), MatchRepositoryError>;

    /// PENDING matches for a donation.
    async fn find_pending_for_donation(
        &self,
        donation_id: &DonationId,
    ) -> Result<Vec<Match>, MatchRepositoryError>;

    /// Whether `requester_id` already requested `donation_id`.
    async fn exists_for_donation_and_requester(
        &self,
        donation_id: &DonationId,
        requester_id: &UserId,
    ) -> Result<bool, MatchRepositoryError>;

    /// Whether any PENDING, APPROVED or IN_PROGRESS match targets the donation.
    async fn has_active_for_donation(
        &self,
        donation_id: &DonationId,
    ) -> Result<bool, MatchRepositoryError>;

    /// Matches for a donation, newest first.
    async fn list_for_donation(
        &self,
        donation_id: &DonationId,
    ) -> Result<Vec<MatchRecord>, MatchRepositoryError>;

    /// Matches created by a requester, newest first.
    async fn list_for_requester(
        &self,
        requester_id: &UserId,
        page: PageRequest,
    ) -> Result<Page<MatchRecord>, MatchRepositoryError>;

    /// Matches on donations owned by a donor, newest first.
    async fn list_for_donor(
        &self,
        donor_id: &UserId,
    ) -> Result<Vec<MatchRecord>, MatchRepositoryError>;

    /// Apply every write of a transition plan atomically.
    ///
    /// The updated match, the rejected siblings, and the donation status
    /// change either all land or none do. Adapters report
    /// [`MatchRepositoryError::Stale`] when the stored match or donation no
    /// longer holds the status the plan expects.
    async fn commit_transition(&self, plan: &TransitionPlan) -> Result<(), MatchRepositoryError>;
}

/// Fixture implementation holding no matches.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMatchRepository;

#[async_trait]
impl MatchRepository for FixtureMatchRepository {
    async fn find_by_id(&self, _id: &MatchId) -> Result<Option<Match>, MatchRepositoryError> {
        Ok(None)
    }

    async fn save(&self, _request: &Match) -> Result<(), MatchRepositoryError> {
        Ok(())
    }

    async fn find_pending_for_donation(
        &self,
        _donation_id: &DonationId,
    ) -> Result<Vec<Match>, MatchRepositoryError> {
        Ok(Vec::new())
    }

    async fn exists_for_donation_and_requester(
        &self,
        _donation_id: &DonationId,
        _requester_id: &UserId,
    ) -> Result<bool, MatchRepositoryError> {
        Ok(false)
    }

    async fn has_active_for_donation(
        &self,
        _donation_id: &DonationId,
    ) -> Result<bool, MatchRepositoryError> {
        Ok(false)
    }

    async fn list_for_donation(
        &self,
        _donation_id: &DonationId,
    ) -> Result<Vec<MatchRecord>, MatchRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_for_requester(
        &self,
        _requester_id: &UserId,
        page: PageRequest,
    ) -> Result<Page<MatchRecord>, MatchRepositoryError> {
        Ok(Page::new(Vec::new(), 0, page))
    }

    async fn list_for_donor(
        &self,
        _donor_id: &UserId,
    ) -> Result<Vec<MatchRecord>, MatchRepositoryError> {
        Ok(Vec::new())
    }

    async fn commit_transition(&self, _plan: &TransitionPlan) -> Result<(), MatchRepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn fixture_reports_no_existing_requests() {
        let repo = FixtureMatchRepository;
        let exists = repo
            .exists_for_donation_and_requester(&DonationId::random(), &UserId::random())
            .await
            .expect("fixture lookup succeeds");
        assert!(!exists);
    }

    #[rstest]
    #[case(MatchRepositoryError::duplicate("pair taken"), "match already exists: pair taken")]
    #[case(
        MatchRepositoryError::stale("donation reserved"),
        "match changed concurrently: donation reserved"
    )]
    #[case(
        MatchRepositoryError::donation_unavailable("RESERVED"),
        "donation is RESERVED and cannot be requested"
    )]
    fn error_messages(#[case] err: MatchRepositoryError, #[case] expected: &str) {
        assert_eq!(err.to_string(), expected);
    }
}
