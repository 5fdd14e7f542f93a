//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    DonationCommand, DonationQuery, DonationRepository, LoginService, MatchCommand, MatchQuery,
    MatchRepository, ProfileCommand, RegistrationService, UserProfileQuery, UserRepository,
};
use crate::domain::{AccountService, DonationLocks, DonationService, MatchWorkflowService};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub registration: Arc<dyn RegistrationService>,
    pub profile: Arc<dyn UserProfileQuery>,
    pub profile_updates: Arc<dyn ProfileCommand>,
    pub donations: Arc<dyn DonationCommand>,
    pub donations_query: Arc<dyn DonationQuery>,
    pub matches: Arc<dyn MatchCommand>,
    pub matches_query: Arc<dyn MatchQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub registration: Arc<dyn RegistrationService>,
    pub profile: Arc<dyn UserProfileQuery>,
    pub profile_updates: Arc<dyn ProfileCommand>,
    pub donations: Arc<dyn DonationCommand>,
    pub donations_query: Arc<dyn DonationQuery>,
    pub matches: Arc<dyn MatchCommand>,
    pub matches_query: Arc<dyn MatchQuery>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            login,
            registration,
            profile,
            profile_updates,
            donations,
            donations_query,
            matches,
            matches_query,
        } = ports;
        Self {
            login,
            registration,
            profile,
            profile_updates,
            donations,
            donations_query,
            matches,
            matches_query,
        }
    }

    /// Wire the domain services over a set of repositories.
    ///
    /// The donation and match services share one [`DonationLocks`] registry.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use donations::inbound::http::state::HttpState;
    /// use donations::outbound::memory::InMemoryStore;
    /// use mockable::DefaultClock;
    ///
    /// let store = Arc::new(InMemoryStore::new());
    /// let state = HttpState::from_repositories(
    ///     store.clone(),
    ///     store.clone(),
    ///     store,
    ///     Arc::new(DefaultClock),
    /// );
    /// let _matches = state.matches.clone();
    /// ```
    pub fn from_repositories<D, M, U>(
        donations: Arc<D>,
        matches: Arc<M>,
        users: Arc<U>,
        clock: Arc<dyn Clock>,
    ) -> Self
    where
        D: DonationRepository + 'static,
        M: MatchRepository + 'static,
        U: UserRepository + 'static,
    {
        let locks = DonationLocks::new();
        let accounts = Arc::new(AccountService::new(users, clock.clone()));
        let donation_service = Arc::new(DonationService::new(
            donations.clone(),
            matches.clone(),
            locks.clone(),
            clock.clone(),
        ));
        let workflow = Arc::new(MatchWorkflowService::new(donations, matches, locks, clock));

        Self::new(HttpStatePorts {
            login: accounts.clone(),
            registration: accounts.clone(),
            profile: accounts.clone(),
            profile_updates: accounts,
            donations: donation_service.clone(),
            donations_query: donation_service,
            matches: workflow.clone(),
            matches_query: workflow,
        })
    }
}
