//! In-process store implementing the repository ports.
//!
//! Used when no database URL is configured and by behaviour tests. One
//! [`InMemoryStore`] backs users, donations and matches together so match
//! listings can join against donations, and a transition commit is a single
//! critical section under the write lock.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{
    DonationRepository, DonationRepositoryError, MatchRepository, MatchRepositoryError,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    Donation, DonationFilter, DonationId, DonationSort, DonationStatus, EmailAddress, Match,
    MatchId, MatchRecord, MatchStatus, Page, PageRequest, TransitionPlan, User, UserAccount,
    UserId,
};

#[derive(Debug, Default)]
struct State {
    users: HashMap<UserId, UserAccount>,
    donations: HashMap<DonationId, Donation>,
    matches: HashMap<MatchId, Match>,
}

impl State {
    fn records(&self, keep: impl Fn(&Match, &Donation) -> bool) -> Vec<MatchRecord> {
        let mut records: Vec<MatchRecord> = self
            .matches
            .values()
            .filter_map(|request| {
                let donation = self.donations.get(&request.donation_id)?;
                keep(request, donation).then(|| MatchRecord {
                    request: request.clone(),
                    donation: donation.clone(),
                })
            })
            .collect();
        records.sort_by(|a, b| {
            b.request
                .created_at
                .cmp(&a.request.created_at)
                .then_with(|| b.request.id.cmp(&a.request.id))
        });
        records
    }
}

/// Shared in-memory repositories.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, account: &UserAccount) -> Result<(), UserPersistenceError> {
        let mut state = self.state.write().await;
        let email = account.user.email();
        if state.users.values().any(|existing| existing.user.email() == email) {
            return Err(UserPersistenceError::duplicate_email(email.as_ref()));
        }
        state
            .users
            .insert(account.user.id().clone(), account.clone());
        Ok(())
    }

    async fn update_profile(&self, user: &User) -> Result<bool, UserPersistenceError> {
        let mut state = self.state.write().await;
        let Some(account) = state.users.get_mut(user.id()) else {
            return Ok(false);
        };
        account.user = user.clone();
        Ok(true)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self.state.read().await;
        Ok(state.users.get(id).map(|account| account.user.clone()))
    }

    async fn find_account_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|account| account.user.email() == email)
            .cloned())
    }
}

#[async_trait]
impl DonationRepository for InMemoryStore {
    async fn find_by_id(
        &self,
        id: &DonationId,
    ) -> Result<Option<Donation>, DonationRepositoryError> {
        Ok(self.state.read().await.donations.get(id).cloned())
    }

    async fn save(&self, donation: &Donation) -> Result<(), DonationRepositoryError> {
        self.state
            .write()
            .await
            .donations
            .insert(donation.id, donation.clone());
        Ok(())
    }

    async fn delete(&self, id: &DonationId) -> Result<bool, DonationRepositoryError> {
        let mut state = self.state.write().await;
        let removed = state.donations.remove(id).is_some();
        if removed {
            state.matches.retain(|_, request| request.donation_id != *id);
        }
        Ok(removed)
    }

    async fn list(
        &self,
        filter: &DonationFilter,
        sort: DonationSort,
        page: PageRequest,
    ) -> Result<Page<Donation>, DonationRepositoryError> {
        let mut donations: Vec<Donation> = self
            .state
            .read()
            .await
            .donations
            .values()
            .filter(|donation| filter.matches(donation))
            .cloned()
            .collect();
        sort.apply(&mut donations);
        Ok(page.slice(donations))
    }

    async fn list_for_donor(
        &self,
        donor_id: &UserId,
    ) -> Result<Vec<Donation>, DonationRepositoryError> {
        let mut donations: Vec<Donation> = self
            .state
            .read()
            .await
            .donations
            .values()
            .filter(|donation| donation.is_owned_by(donor_id))
            .cloned()
            .collect();
        DonationSort::default().apply(&mut donations);
        Ok(donations)
    }

    async fn distinct_categories(&self) -> Result<Vec<String>, DonationRepositoryError> {
        let state = self.state.read().await;
        let mut categories: Vec<String> = state
            .donations
            .values()
            .map(|donation| donation.details.category().to_owned())
            .collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    async fn distinct_cities(&self) -> Result<Vec<String>, DonationRepositoryError> {
        let state = self.state.read().await;
        let mut cities: Vec<String> = state
            .donations
            .values()
            .filter_map(|donation| donation.details.city().map(str::to_owned))
            .collect();
        cities.sort();
        cities.dedup();
        Ok(cities)
    }
}

#[async_trait]
impl MatchRepository for InMemoryStore {
    async fn find_by_id(&self, id: &MatchId) -> Result<Option<Match>, MatchRepositoryError> {
        Ok(self.state.read().await.matches.get(id).cloned())
    }

    async fn save(&self, request: &Match) -> Result<(), MatchRepositoryError> {
        let mut state = self.state.write().await;
        let taken = state.matches.values().any(|existing| {
            existing.id != request.id
                && existing.donation_id == request.donation_id
                && existing.requester_id == request.requester_id
        });
        if taken {
            return Err(MatchRepositoryError::duplicate(format!(
                "donation {} already requested by {}",
                request.donation_id, request.requester_id
            )));
        }
        match state.donations.get(&request.donation_id) {
            None => {
                return Err(MatchRepositoryError::stale(format!(
                    "donation {} was removed",
                    request.donation_id
                )));
            }
            Some(donation) if donation.status != DonationStatus::Available => {
                return Err(MatchRepositoryError::donation_unavailable(
                    donation.status.as_str(),
                ));
            }
            Some(_) => {}
        }
        state.matches.insert(request.id, request.clone());
        Ok(())
    }

    async fn find_pending_for_donation(
        &self,
        donation_id: &DonationId,
    ) -> Result<Vec<Match>, MatchRepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .matches
            .values()
            .filter(|request| {
                request.donation_id == *donation_id
                    && request.status == MatchStatus::Pending
            })
            .cloned()
            .collect())
    }

    async fn exists_for_donation_and_requester(
        &self,
        donation_id: &DonationId,
        requester_id: &UserId,
    ) -> Result<bool, MatchRepositoryError> {
        let state = self.state.read().await;
        Ok(state.matches.values().any(|request| {
            request.donation_id == *donation_id && request.requester_id == *requester_id
        }))
    }

    async fn has_active_for_donation(
        &self,
        donation_id: &DonationId,
    ) -> Result<bool, MatchRepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .matches
            .values()
            .any(|request| request.donation_id == *donation_id && request.status.is_active()))
    }

    async fn list_for_donation(
        &self,
        donation_id: &DonationId,
    ) -> Result<Vec<MatchRecord>, MatchRepositoryError> {
        let state = self.state.read().await;
        Ok(state.records(|request, _| request.donation_id == *donation_id))
    }

    async fn list_for_requester(
        &self,
        requester_id: &UserId,
        page: PageRequest,
    ) -> Result<Page<MatchRecord>, MatchRepositoryError> {
        let state = self.state.read().await;
        let records = state.records(|request, _| request.requester_id == *requester_id);
        Ok(page.slice(records))
    }

    async fn list_for_donor(
        &self,
        donor_id: &UserId,
    ) -> Result<Vec<MatchRecord>, MatchRepositoryError> {
        let state = self.state.read().await;
        Ok(state.records(|_, donation| donation.is_owned_by(donor_id)))
    }

    async fn commit_transition(&self, plan: &TransitionPlan) -> Result<(), MatchRepositoryError> {
        let mut state = self.state.write().await;
        let updated = &plan.updated;

        let stored_status = state.matches.get(&updated.id).map(|request| request.status);
        if stored_status != Some(plan.expected_status) {
            return Err(MatchRepositoryError::stale(format!(
                "match {} is no longer {}",
                updated.id, plan.expected_status
            )));
        }
        let donation = state
            .donations
            .get_mut(&updated.donation_id)
            .ok_or_else(|| {
                MatchRepositoryError::stale(format!("donation {} was removed", updated.donation_id))
            })?;
        if donation.status != plan.expected_donation_status {
            return Err(MatchRepositoryError::stale(format!(
                "donation {} is no longer {}",
                donation.id, plan.expected_donation_status
            )));
        }

        if let Some(status) = plan.donation_status {
            donation.status = status;
            donation.updated_at = updated.updated_at;
        }
        state.matches.insert(updated.id, updated.clone());
        for rejected in &plan.rejected {
            state.matches.insert(rejected.id, rejected.clone());
        }
        Ok(())
    }
}
