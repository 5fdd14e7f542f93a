//! PostgreSQL-backed `DonationRepository` implementation using Diesel ORM.
//!
//! Listing filters, ordering and pagination run in SQL; rows are revalidated
//! through [`DonationDetails::try_from_draft`] on the way out.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{DonationRepository, DonationRepositoryError};
use crate::domain::{
    Donation, DonationDetails, DonationDraft, DonationFilter, DonationId, DonationSort,
    DonationSortField, DonationStatus, Page, PageRequest, SortDirection, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{DonationRow, DonationUpdate, NewDonationRow};
use super::pool::{DbPool, PoolError};
use super::schema::donations;

/// Diesel-backed implementation of the donation repository port.
#[derive(Clone)]
pub struct DieselDonationRepository {
    pool: DbPool,
}

impl DieselDonationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> DonationRepositoryError {
    map_basic_pool_error(error, DonationRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> DonationRepositoryError {
    map_basic_diesel_error(
        error,
        DonationRepositoryError::query,
        DonationRepositoryError::connection,
    )
}

/// Convert a stored row into a domain donation.
///
/// Shared with the match repository, whose listings join donations.
pub(super) fn row_to_donation(row: DonationRow) -> Result<Donation, String> {
    let DonationRow {
        id,
        donor_id,
        title,
        description,
        category,
        condition,
        quantity,
        location,
        city,
        state,
        zip_code,
        image_urls,
        pickup_instructions,
        expires_at,
        status,
        created_at,
        updated_at,
    } = row;

    let details = DonationDetails::try_from_draft(DonationDraft {
        title,
        description,
        category,
        condition,
        quantity: Some(i64::from(quantity)),
        location,
        city,
        state,
        zip_code,
        image_urls,
        pickup_instructions,
        expires_at,
    })
    .map_err(|err| format!("donation {id}: {err}"))?;
    let status = status
        .parse::<DonationStatus>()
        .map_err(|err| format!("donation {id}: {err}"))?;

    Ok(Donation {
        id: DonationId::from_uuid(id),
        donor_id: UserId::from_uuid(donor_id),
        status,
        details,
        created_at,
        updated_at,
    })
}

fn rows_to_donations(rows: Vec<DonationRow>) -> Result<Vec<Donation>, DonationRepositoryError> {
    rows.into_iter()
        .map(|row| row_to_donation(row).map_err(DonationRepositoryError::query))
        .collect()
}

/// Escape `LIKE` wildcards so user search text matches literally.
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn filtered(filter: &DonationFilter) -> donations::BoxedQuery<'static, Pg> {
    let mut query = donations::table.into_boxed();
    if let Some(category) = &filter.category {
        query = query.filter(donations::category.eq(category.clone()));
    }
    if let Some(city) = &filter.city {
        query = query.filter(donations::city.eq(city.clone()));
    }
    if let Some(state) = &filter.state {
        query = query.filter(donations::state.eq(state.clone()));
    }
    if let Some(status) = filter.status {
        query = query.filter(donations::status.eq(status.as_str()));
    }
    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        query = query.filter(
            donations::title
                .ilike(pattern.clone())
                .or(donations::description.ilike(pattern)),
        );
    }
    query
}

fn ordered(
    query: donations::BoxedQuery<'static, Pg>,
    sort: DonationSort,
) -> donations::BoxedQuery<'static, Pg> {
    match (sort.field, sort.direction) {
        (DonationSortField::CreatedAt, SortDirection::Desc) => {
            query.order((donations::created_at.desc(), donations::id.desc()))
        }
        (DonationSortField::CreatedAt, SortDirection::Asc) => {
            query.order((donations::created_at.asc(), donations::id.asc()))
        }
        (DonationSortField::Title, SortDirection::Desc) => {
            query.order((donations::title.desc(), donations::id.desc()))
        }
        (DonationSortField::Title, SortDirection::Asc) => {
            query.order((donations::title.asc(), donations::id.asc()))
        }
    }
}

#[async_trait]
impl DonationRepository for DieselDonationRepository {
    async fn find_by_id(
        &self,
        id: &DonationId,
    ) -> Result<Option<Donation>, DonationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<DonationRow> = donations::table
            .filter(donations::id.eq(id.as_uuid()))
            .select(DonationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(|row| row_to_donation(row).map_err(DonationRepositoryError::query))
            .transpose()
    }

    async fn save(&self, donation: &Donation) -> Result<(), DonationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let details = &donation.details;
        let quantity = i32::try_from(details.quantity())
            .map_err(|_| DonationRepositoryError::query("quantity exceeds storage range"))?;

        let new_row = NewDonationRow {
            id: *donation.id.as_uuid(),
            donor_id: *donation.donor_id.as_uuid(),
            title: details.title(),
            description: details.description(),
            category: details.category(),
            condition: details.condition(),
            quantity,
            location: details.location(),
            city: details.city(),
            state: details.state(),
            zip_code: details.zip_code(),
            image_urls: details.image_urls(),
            pickup_instructions: details.pickup_instructions(),
            expires_at: details.expires_at(),
            status: donation.status.as_str(),
            created_at: donation.created_at,
            updated_at: donation.updated_at,
        };
        let update = DonationUpdate {
            title: details.title(),
            description: details.description(),
            category: details.category(),
            condition: details.condition(),
            quantity,
            location: details.location(),
            city: details.city(),
            state: details.state(),
            zip_code: details.zip_code(),
            image_urls: details.image_urls(),
            pickup_instructions: details.pickup_instructions(),
            expires_at: details.expires_at(),
            status: donation.status.as_str(),
            updated_at: donation.updated_at,
        };

        diesel::insert_into(donations::table)
            .values(&new_row)
            .on_conflict(donations::id)
            .do_update()
            .set(&update)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn delete(&self, id: &DonationId) -> Result<bool, DonationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(donations::table.filter(donations::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn list(
        &self,
        filter: &DonationFilter,
        sort: DonationSort,
        page: PageRequest,
    ) -> Result<Page<Donation>, DonationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = filtered(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
        let rows: Vec<DonationRow> = ordered(filtered(filter), sort)
            .select(DonationRow::as_select())
            .limit(i64::from(page.size()))
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows_to_donations(rows)?;
        Ok(Page::new(items, u64::try_from(total).unwrap_or_default(), page))
    }

    async fn list_for_donor(
        &self,
        donor_id: &UserId,
    ) -> Result<Vec<Donation>, DonationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<DonationRow> = donations::table
            .filter(donations::donor_id.eq(donor_id.as_uuid()))
            .order((donations::created_at.desc(), donations::id.desc()))
            .select(DonationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_donations(rows)
    }

    async fn distinct_categories(&self) -> Result<Vec<String>, DonationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        donations::table
            .select(donations::category)
            .distinct()
            .order(donations::category.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn distinct_cities(&self) -> Result<Vec<String>, DonationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let cities: Vec<Option<String>> = donations::table
            .select(donations::city)
            .filter(donations::city.is_not_null())
            .distinct()
            .order(donations::city.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(cities.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for row conversion and query helpers.
    use chrono::Utc;
    use rstest::{fixture, rstest};
    use uuid::Uuid;

    use super::*;

    #[fixture]
    fn row() -> DonationRow {
        DonationRow {
            id: Uuid::new_v4(),
            donor_id: Uuid::new_v4(),
            title: "Bookshelf".to_owned(),
            description: "Five-shelf pine bookshelf, some scratches.".to_owned(),
            category: "Furniture".to_owned(),
            condition: Some("Good".to_owned()),
            quantity: 2,
            location: None,
            city: Some("Seattle".to_owned()),
            state: Some("WA".to_owned()),
            zip_code: None,
            image_urls: vec!["https://img.example.org/shelf.jpg".to_owned()],
            pickup_instructions: None,
            expires_at: None,
            status: "RESERVED".to_owned(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[rstest]
    fn row_converts_to_donation(row: DonationRow) {
        let donation = row_to_donation(row).expect("valid row");

        assert_eq!(donation.status, DonationStatus::Reserved);
        assert_eq!(donation.details.quantity(), 2);
        assert_eq!(donation.details.image_urls().len(), 1);
    }

    #[rstest]
    fn unknown_status_is_rejected(mut row: DonationRow) {
        row.status = "ON_HOLD".to_owned();

        let err = row_to_donation(row).expect_err("bad status");
        assert!(err.contains("ON_HOLD"));
    }

    #[rstest]
    #[case("sofa", "%sofa%")]
    #[case("50%_off", "%50\\%\\_off%")]
    #[case("back\\slash", "%back\\\\slash%")]
    fn like_pattern_escapes_wildcards(#[case] needle: &str, #[case] expected: &str) {
        assert_eq!(like_pattern(needle), expected);
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let err = map_pool_error(PoolError::checkout("connection refused"));
        assert!(matches!(err, DonationRepositoryError::Connection { .. }));
    }
}
