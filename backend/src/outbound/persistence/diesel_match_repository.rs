//! PostgreSQL-backed `MatchRepository` implementation using Diesel ORM.
//!
//! Transition commits and request inserts run in one transaction that locks
//! the donation row with `SELECT ... FOR UPDATE` and re-checks the donation
//! status, so concurrent processes cannot both approve a donation or add a
//! request to a donation that was reserved meanwhile.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{MatchRepository, MatchRepositoryError};
use crate::domain::{
    DonationId, DonationStatus, Match, MatchId, MatchRecord, MatchStatus, Page, PageRequest,
    Rating, TransitionPlan, UserId,
};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, unique_violation,
};
use super::diesel_donation_repository::row_to_donation;
use super::models::{DonationRow, MatchRow, MatchUpdate, NewMatchRow};
use super::pool::{DbPool, PoolError};
use super::schema::{donations, matches};

/// Diesel-backed implementation of the match repository port.
#[derive(Clone)]
pub struct DieselMatchRepository {
    pool: DbPool,
}

impl DieselMatchRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> MatchRepositoryError {
    map_basic_pool_error(error, MatchRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> MatchRepositoryError {
    map_basic_diesel_error(
        error,
        MatchRepositoryError::query,
        MatchRepositoryError::connection,
    )
}

/// Failure inside a donation-locking transaction.
#[derive(Debug)]
enum CommitError {
    Stale(String),
    Unavailable(String),
    Database(diesel::result::Error),
}

impl From<diesel::result::Error> for CommitError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Database(error)
    }
}

fn map_commit_error(error: CommitError) -> MatchRepositoryError {
    match error {
        CommitError::Stale(message) => MatchRepositoryError::stale(message),
        CommitError::Unavailable(status) => MatchRepositoryError::donation_unavailable(status),
        CommitError::Database(error) => map_diesel_error(error),
    }
}

/// A request may only be inserted while its locked donation is AVAILABLE.
fn ensure_requestable(
    donation_id: &DonationId,
    status: Option<String>,
) -> Result<(), CommitError> {
    match status {
        None => Err(CommitError::Stale(format!("donation {donation_id} was removed"))),
        Some(status) if status == DonationStatus::Available.as_str() => Ok(()),
        Some(status) => Err(CommitError::Unavailable(status)),
    }
}

fn decode_rating(value: Option<i16>, id: &uuid::Uuid) -> Result<Option<Rating>, String> {
    value
        .map(|score| Rating::new(i64::from(score)).map_err(|err| format!("match {id}: {err}")))
        .transpose()
}

fn encode_rating(rating: Option<Rating>) -> Option<i16> {
    rating.map(|rating| i16::from(rating.value()))
}

fn row_to_match(row: MatchRow) -> Result<Match, MatchRepositoryError> {
    let MatchRow {
        id,
        donation_id,
        requester_id,
        message,
        status,
        requested_at,
        responded_at,
        completed_at,
        pickup_date,
        pickup_notes,
        donor_notes,
        requester_rating,
        donor_rating,
        created_at,
        updated_at,
    } = row;

    let status = status
        .parse::<MatchStatus>()
        .map_err(|err| MatchRepositoryError::query(format!("match {id}: {err}")))?;
    let requester_rating =
        decode_rating(requester_rating, &id).map_err(MatchRepositoryError::query)?;
    let donor_rating = decode_rating(donor_rating, &id).map_err(MatchRepositoryError::query)?;

    Ok(Match {
        id: MatchId::from_uuid(id),
        donation_id: DonationId::from_uuid(donation_id),
        requester_id: UserId::from_uuid(requester_id),
        message,
        status,
        requested_at,
        responded_at,
        completed_at,
        pickup_date,
        pickup_notes,
        donor_notes,
        requester_rating,
        donor_rating,
        created_at,
        updated_at,
    })
}

fn rows_to_records(
    rows: Vec<(MatchRow, DonationRow)>,
) -> Result<Vec<MatchRecord>, MatchRepositoryError> {
    rows.into_iter()
        .map(|(request, donation)| {
            Ok(MatchRecord {
                request: row_to_match(request)?,
                donation: row_to_donation(donation).map_err(MatchRepositoryError::query)?,
            })
        })
        .collect()
}

fn match_update(request: &Match) -> MatchUpdate<'_> {
    MatchUpdate {
        status: request.status.as_str(),
        responded_at: request.responded_at,
        completed_at: request.completed_at,
        pickup_date: request.pickup_date,
        pickup_notes: request.pickup_notes.as_deref(),
        donor_notes: request.donor_notes.as_deref(),
        requester_rating: encode_rating(request.requester_rating),
        donor_rating: encode_rating(request.donor_rating),
        updated_at: request.updated_at,
    }
}

#[async_trait]
impl MatchRepository for DieselMatchRepository {
    async fn find_by_id(&self, id: &MatchId) -> Result<Option<Match>, MatchRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<MatchRow> = matches::table
            .filter(matches::id.eq(id.as_uuid()))
            .select(MatchRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_match).transpose()
    }

    async fn save(&self, request: &Match) -> Result<(), MatchRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewMatchRow {
            id: *request.id.as_uuid(),
            donation_id: *request.donation_id.as_uuid(),
            requester_id: *request.requester_id.as_uuid(),
            message: request.message.as_deref(),
            status: request.status.as_str(),
            requested_at: request.requested_at,
            created_at: request.created_at,
            updated_at: request.updated_at,
        };

        conn.transaction::<_, CommitError, _>(|conn| {
            async move {
                let status: Option<String> = donations::table
                    .filter(donations::id.eq(row.donation_id))
                    .select(donations::status)
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?;
                ensure_requestable(&request.donation_id, status)?;

                diesel::insert_into(matches::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|error| match error {
            CommitError::Database(error) if unique_violation(&error).is_some() => {
                MatchRepositoryError::duplicate(format!(
                    "donation {} already requested by {}",
                    request.donation_id, request.requester_id
                ))
            }
            other => map_commit_error(other),
        })
    }

    async fn find_pending_for_donation(
        &self,
        donation_id: &DonationId,
    ) -> Result<Vec<Match>, MatchRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<MatchRow> = matches::table
            .filter(matches::donation_id.eq(donation_id.as_uuid()))
            .filter(matches::status.eq(MatchStatus::Pending.as_str()))
            .select(MatchRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_match).collect()
    }

    async fn exists_for_donation_and_requester(
        &self,
        donation_id: &DonationId,
        requester_id: &UserId,
    ) -> Result<bool, MatchRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            matches::table
                .filter(matches::donation_id.eq(donation_id.as_uuid()))
                .filter(matches::requester_id.eq(requester_id.as_uuid())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn has_active_for_donation(
        &self,
        donation_id: &DonationId,
    ) -> Result<bool, MatchRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let active: Vec<&'static str> = MatchStatus::ALL
            .into_iter()
            .filter(|status| status.is_active())
            .map(MatchStatus::as_str)
            .collect();
        diesel::select(diesel::dsl::exists(
            matches::table
                .filter(matches::donation_id.eq(donation_id.as_uuid()))
                .filter(matches::status.eq_any(active)),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn list_for_donation(
        &self,
        donation_id: &DonationId,
    ) -> Result<Vec<MatchRecord>, MatchRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(MatchRow, DonationRow)> = matches::table
            .inner_join(donations::table)
            .filter(matches::donation_id.eq(donation_id.as_uuid()))
            .order((matches::created_at.desc(), matches::id.desc()))
            .select((MatchRow::as_select(), DonationRow::as_select()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_records(rows)
    }

    async fn list_for_requester(
        &self,
        requester_id: &UserId,
        page: PageRequest,
    ) -> Result<Page<MatchRecord>, MatchRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = matches::table
            .filter(matches::requester_id.eq(requester_id.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let rows: Vec<(MatchRow, DonationRow)> = matches::table
            .inner_join(donations::table)
            .filter(matches::requester_id.eq(requester_id.as_uuid()))
            .order((matches::created_at.desc(), matches::id.desc()))
            .select((MatchRow::as_select(), DonationRow::as_select()))
            .limit(i64::from(page.size()))
            .offset(i64::try_from(page.offset()).unwrap_or(i64::MAX))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows_to_records(rows)?;
        Ok(Page::new(items, u64::try_from(total).unwrap_or_default(), page))
    }

    async fn list_for_donor(
        &self,
        donor_id: &UserId,
    ) -> Result<Vec<MatchRecord>, MatchRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(MatchRow, DonationRow)> = matches::table
            .inner_join(donations::table)
            .filter(donations::donor_id.eq(donor_id.as_uuid()))
            .order((matches::created_at.desc(), matches::id.desc()))
            .select((MatchRow::as_select(), DonationRow::as_select()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_records(rows)
    }

    async fn commit_transition(&self, plan: &TransitionPlan) -> Result<(), MatchRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction::<_, CommitError, _>(|conn| {
            async move {
                let updated = &plan.updated;
                let donation_id = *updated.donation_id.as_uuid();

                let donation_status: Option<String> = donations::table
                    .filter(donations::id.eq(donation_id))
                    .select(donations::status)
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?;
                let Some(donation_status) = donation_status else {
                    return Err(CommitError::Stale(format!(
                        "donation {} was removed",
                        updated.donation_id
                    )));
                };
                if donation_status != plan.expected_donation_status.as_str() {
                    return Err(CommitError::Stale(format!(
                        "donation {} is no longer {}",
                        updated.donation_id, plan.expected_donation_status
                    )));
                }

                let changed = diesel::update(
                    matches::table
                        .filter(matches::id.eq(updated.id.as_uuid()))
                        .filter(matches::status.eq(plan.expected_status.as_str())),
                )
                .set(&match_update(updated))
                .execute(conn)
                .await?;
                if changed == 0 {
                    return Err(CommitError::Stale(format!(
                        "match {} is no longer {}",
                        updated.id, plan.expected_status
                    )));
                }

                for rejected in &plan.rejected {
                    diesel::update(
                        matches::table
                            .filter(matches::id.eq(rejected.id.as_uuid()))
                            .filter(matches::status.eq(MatchStatus::Pending.as_str())),
                    )
                    .set(&match_update(rejected))
                    .execute(conn)
                    .await?;
                }

                if let Some(status) = plan.donation_status {
                    diesel::update(donations::table.filter(donations::id.eq(donation_id)))
                        .set((
                            donations::status.eq(status.as_str()),
                            donations::updated_at.eq(updated.updated_at),
                        ))
                        .execute(conn)
                        .await?;
                }

                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_commit_error)
    }
}
