//! Builders for the HTTP state over the configured repositories.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use donations::domain::ports::{DonationRepository, MatchRepository, UserRepository};
use donations::inbound::http::state::HttpState;
use donations::outbound::memory::InMemoryStore;
use donations::outbound::persistence::{
    DieselDonationRepository, DieselMatchRepository, DieselUserRepository,
};

use super::ServerConfig;

/// Repository triple backing the domain services.
struct Repositories<D, M, U> {
    donations: Arc<D>,
    matches: Arc<M>,
    users: Arc<U>,
}

impl<D, M, U> Repositories<D, M, U>
where
    D: DonationRepository + 'static,
    M: MatchRepository + 'static,
    U: UserRepository + 'static,
{
    fn into_state(self, clock: Arc<dyn Clock>) -> HttpState {
        HttpState::from_repositories(self.donations, self.matches, self.users, clock)
    }
}

fn in_memory_repositories() -> Repositories<InMemoryStore, InMemoryStore, InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    Repositories {
        donations: store.clone(),
        matches: store.clone(),
        users: store,
    }
}

/// Build the shared HTTP state, using Diesel repositories when a pool is
/// configured and the in-memory store otherwise.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let state = match &config.db_pool {
        Some(pool) => {
            info!("using PostgreSQL repositories");
            Repositories {
                donations: Arc::new(DieselDonationRepository::new(pool.clone())),
                matches: Arc::new(DieselMatchRepository::new(pool.clone())),
                users: Arc::new(DieselUserRepository::new(pool.clone())),
            }
            .into_state(clock)
        }
        None => {
            warn!("no database configured; data will not survive a restart");
            in_memory_repositories().into_state(clock)
        }
    };
    web::Data::new(state)
}
