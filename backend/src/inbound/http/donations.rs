//! Donation listing HTTP handlers.
//!
//! ```text
//! GET /api/v1/donations?category=Furniture&city=Portland&page=0&size=10
//! POST /api/v1/donations
//! GET /api/v1/donations/my
//! GET /api/v1/donations/categories
//! GET /api/v1/donations/cities
//! GET|PUT|DELETE /api/v1/donations/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::ListDonationsRequest;
use crate::domain::{
    Donation, DonationDraft, DonationFilter, DonationSort, DonationSortField, Error, Page,
    SortDirection,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_donation_id, parse_donation_status, parse_optional_rfc3339_timestamp,
    parse_page_request,
};

/// Descriptive fields accepted when creating or editing a donation.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DonationRequest {
    #[schema(example = "Kitchen table")]
    pub title: String,
    pub description: String,
    #[schema(example = "Furniture")]
    pub category: String,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    #[schema(minimum = 1)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub pickup_instructions: Option<String>,
    #[serde(default)]
    #[schema(format = "date-time")]
    pub expires_at: Option<String>,
}

impl DonationRequest {
    fn into_draft(self) -> Result<DonationDraft, Error> {
        Ok(DonationDraft {
            expires_at: parse_optional_rfc3339_timestamp(
                self.expires_at,
                FieldName::new("expiresAt"),
            )?,
            title: self.title,
            description: self.description,
            category: self.category,
            condition: self.condition,
            quantity: self.quantity,
            location: self.location,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
            image_urls: self.image_urls,
            pickup_instructions: self.pickup_instructions,
        })
    }
}

/// Donation as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DonationResponse {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub donor_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub condition: Option<String>,
    pub quantity: u32,
    pub location: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub image_urls: Vec<String>,
    pub pickup_instructions: Option<String>,
    #[schema(format = "date-time")]
    pub expires_at: Option<String>,
    #[schema(example = "AVAILABLE")]
    pub status: String,
    #[schema(format = "date-time")]
    pub created_at: String,
    #[schema(format = "date-time")]
    pub updated_at: String,
}

impl From<Donation> for DonationResponse {
    fn from(donation: Donation) -> Self {
        let details = &donation.details;
        Self {
            id: donation.id.to_string(),
            donor_id: donation.donor_id.to_string(),
            title: details.title().to_owned(),
            description: details.description().to_owned(),
            category: details.category().to_owned(),
            condition: details.condition().map(str::to_owned),
            quantity: details.quantity(),
            location: details.location().map(str::to_owned),
            city: details.city().map(str::to_owned),
            state: details.state().map(str::to_owned),
            zip_code: details.zip_code().map(str::to_owned),
            image_urls: details.image_urls().to_vec(),
            pickup_instructions: details.pickup_instructions().map(str::to_owned),
            expires_at: details.expires_at().map(|at| at.to_rfc3339()),
            status: donation.status.as_str().to_owned(),
            created_at: donation.created_at.to_rfc3339(),
            updated_at: donation.updated_at.to_rfc3339(),
        }
    }
}

/// One page of donations.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DonationPageResponse {
    pub items: Vec<DonationResponse>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
    pub total_pages: u64,
}

impl From<Page<Donation>> for DonationPageResponse {
    fn from(page: Page<Donation>) -> Self {
        let total_pages = page.total_pages();
        let page = page.map(DonationResponse::from);
        Self {
            items: page.items,
            total: page.total,
            page: page.page,
            size: page.size,
            total_pages,
        }
    }
}

/// Query parameters for `GET /api/v1/donations`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ListDonationsQuery {
    pub category: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    /// Donation status, e.g. `AVAILABLE`.
    pub status: Option<String>,
    /// Case-insensitive substring over title and description.
    pub search: Option<String>,
    /// `createdAt` (default) or `title`.
    pub sort_by: Option<String>,
    /// `desc` (default) or `asc`.
    pub sort_dir: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

fn invalid_choice(field: &str, value: &str, expected: &str) -> Error {
    Error::invalid_request(format!("{field} must be one of {expected}")).with_details(json!({
        "field": field,
        "value": value,
        "code": "invalid_choice",
    }))
}

fn parse_sort(sort_by: Option<&str>, sort_dir: Option<&str>) -> Result<DonationSort, Error> {
    let field = match sort_by {
        None | Some("createdAt") => DonationSortField::CreatedAt,
        Some("title") => DonationSortField::Title,
        Some(other) => return Err(invalid_choice("sortBy", other, "createdAt, title")),
    };
    let direction = match sort_dir.map(str::to_ascii_lowercase).as_deref() {
        None | Some("desc") => SortDirection::Desc,
        Some("asc") => SortDirection::Asc,
        Some(_) => {
            return Err(invalid_choice(
                "sortDir",
                sort_dir.unwrap_or_default(),
                "asc, desc",
            ));
        }
    };
    Ok(DonationSort { field, direction })
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|value| !value.is_empty())
}

impl ListDonationsQuery {
    fn into_request(self) -> Result<ListDonationsRequest, Error> {
        let sort = parse_sort(self.sort_by.as_deref(), self.sort_dir.as_deref())?;
        let status = blank_to_none(self.status)
            .map(|raw| parse_donation_status(&raw, FieldName::new("status")))
            .transpose()?;
        let filter = DonationFilter {
            category: blank_to_none(self.category),
            city: blank_to_none(self.city),
            state: blank_to_none(self.state).map(|state| state.to_uppercase()),
            status,
            search: blank_to_none(self.search),
        };
        Ok(ListDonationsRequest {
            filter,
            sort,
            page: parse_page_request(self.page, self.size)?,
        })
    }
}

/// Browse donations with filters, sorting and pagination.
#[utoipa::path(
    get,
    path = "/api/v1/donations",
    params(ListDonationsQuery),
    responses(
        (status = 200, description = "Donations", body = DonationPageResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["donations"],
    operation_id = "listDonations",
    security([])
)]
#[get("/donations")]
pub async fn list_donations(
    state: web::Data<HttpState>,
    query: web::Query<ListDonationsQuery>,
) -> ApiResult<web::Json<DonationPageResponse>> {
    let request = query.into_inner().into_request()?;
    let page = state.donations_query.list(request).await?;
    Ok(web::Json(DonationPageResponse::from(page)))
}

/// Offer a new donation as the signed-in user.
#[utoipa::path(
    post,
    path = "/api/v1/donations",
    request_body = DonationRequest,
    responses(
        (status = 201, description = "Donation created", body = DonationResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["donations"],
    operation_id = "createDonation",
    security(("SessionCookie" = []))
)]
#[post("/donations")]
pub async fn create_donation(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<DonationRequest>,
) -> ApiResult<HttpResponse> {
    let donor_id = session.require_user_id()?;
    let draft = payload.into_inner().into_draft()?;
    let donation = state.donations.create(&donor_id, draft).await?;
    Ok(HttpResponse::Created().json(DonationResponse::from(donation)))
}

/// Donations offered by the signed-in user, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/donations/my",
    responses(
        (status = 200, description = "Caller's donations", body = [DonationResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["donations"],
    operation_id = "listMyDonations",
    security(("SessionCookie" = []))
)]
#[get("/donations/my")]
pub async fn my_donations(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<DonationResponse>>> {
    let donor_id = session.require_user_id()?;
    let donations = state.donations_query.list_for_donor(&donor_id).await?;
    Ok(web::Json(
        donations.into_iter().map(DonationResponse::from).collect(),
    ))
}

/// Distinct categories in use, sorted.
#[utoipa::path(
    get,
    path = "/api/v1/donations/categories",
    responses((status = 200, description = "Categories", body = [String])),
    tags = ["donations"],
    operation_id = "listCategories",
    security([])
)]
#[get("/donations/categories")]
pub async fn list_categories(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<String>>> {
    Ok(web::Json(state.donations_query.categories().await?))
}

/// Distinct cities in use, sorted.
#[utoipa::path(
    get,
    path = "/api/v1/donations/cities",
    responses((status = 200, description = "Cities", body = [String])),
    tags = ["donations"],
    operation_id = "listCities",
    security([])
)]
#[get("/donations/cities")]
pub async fn list_cities(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<String>>> {
    Ok(web::Json(state.donations_query.cities().await?))
}

/// Fetch one donation.
#[utoipa::path(
    get,
    path = "/api/v1/donations/{id}",
    params(("id" = String, Path, description = "Donation id", format = "uuid")),
    responses(
        (status = 200, description = "Donation", body = DonationResponse),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["donations"],
    operation_id = "getDonation",
    security([])
)]
#[get("/donations/{id}")]
pub async fn get_donation(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<DonationResponse>> {
    let id = parse_donation_id(&path.into_inner(), FieldName::new("id"))?;
    let donation = state.donations_query.get(&id).await?;
    Ok(web::Json(DonationResponse::from(donation)))
}

/// Replace the descriptive fields of an AVAILABLE donation.
#[utoipa::path(
    put,
    path = "/api/v1/donations/{id}",
    params(("id" = String, Path, description = "Donation id", format = "uuid")),
    request_body = DonationRequest,
    responses(
        (status = 200, description = "Donation updated", body = DonationResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the donor", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Donation is no longer editable", body = ErrorSchema)
    ),
    tags = ["donations"],
    operation_id = "updateDonation",
    security(("SessionCookie" = []))
)]
#[put("/donations/{id}")]
pub async fn update_donation(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<DonationRequest>,
) -> ApiResult<web::Json<DonationResponse>> {
    let actor_id = session.require_user_id()?;
    let id = parse_donation_id(&path.into_inner(), FieldName::new("id"))?;
    let draft = payload.into_inner().into_draft()?;
    let donation = state.donations.update(&id, &actor_id, draft).await?;
    Ok(web::Json(DonationResponse::from(donation)))
}

/// Withdraw a donation without open requests.
#[utoipa::path(
    delete,
    path = "/api/v1/donations/{id}",
    params(("id" = String, Path, description = "Donation id", format = "uuid")),
    responses(
        (status = 204, description = "Donation deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the donor", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Donation has active matches", body = ErrorSchema)
    ),
    tags = ["donations"],
    operation_id = "deleteDonation",
    security(("SessionCookie" = []))
)]
#[delete("/donations/{id}")]
pub async fn delete_donation(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor_id = session.require_user_id()?;
    let id = parse_donation_id(&path.into_inner(), FieldName::new("id"))?;
    state.donations.delete(&id, &actor_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "donations_tests.rs"]
mod tests;
