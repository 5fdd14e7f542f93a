//! Match workflow HTTP handlers.
//!
//! ```text
//! POST /api/v1/matches?donationId=... {"message":"Could collect on Saturday"}
//! GET /api/v1/matches/my?page=0&size=10
//! GET /api/v1/matches/received
//! PUT /api/v1/matches/{id}/status {"status":"APPROVED","pickupDate":"2026-03-01T10:00:00Z"}
//! GET /api/v1/matches/donation/{donationId}
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{RequestDonationRequest, UpdateMatchStatusRequest};
use crate::domain::{
    Donation, Error, MatchRecord, Page, StatusChange, normalise_message, normalise_notes,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, missing_field_error, parse_donation_id, parse_match_id, parse_match_status,
    parse_optional_rating, parse_optional_rfc3339_timestamp, parse_page_request,
    text_field_error,
};

/// Query parameters for `POST /api/v1/matches`.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct RequestDonationQuery {
    /// Donation to request.
    pub donation_id: Option<String>,
}

/// Optional note sent to the donor with a request.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestDonationBody {
    #[serde(default)]
    #[schema(example = "Could collect on Saturday morning")]
    pub message: Option<String>,
}

/// Status change request for `PUT /api/v1/matches/{id}/status`.
///
/// Absent auxiliary fields leave the stored values untouched.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMatchStatusBody {
    #[schema(example = "APPROVED")]
    pub status: String,
    #[serde(default)]
    #[schema(format = "date-time")]
    pub pickup_date: Option<String>,
    #[serde(default)]
    pub pickup_notes: Option<String>,
    #[serde(default)]
    pub donor_notes: Option<String>,
    /// 1 to 5, stored against the acting party.
    #[serde(default)]
    #[schema(minimum = 1, maximum = 5)]
    pub rating: Option<i64>,
}

impl UpdateMatchStatusBody {
    fn into_change(self) -> Result<StatusChange, Error> {
        Ok(StatusChange {
            status: parse_match_status(&self.status, FieldName::new("status"))?,
            pickup_date: parse_optional_rfc3339_timestamp(
                self.pickup_date,
                FieldName::new("pickupDate"),
            )?,
            pickup_notes: normalise_notes(self.pickup_notes, "pickupNotes")
                .map_err(text_field_error)?,
            donor_notes: normalise_notes(self.donor_notes, "donorNotes")
                .map_err(text_field_error)?,
            rating: parse_optional_rating(self.rating, FieldName::new("rating"))?,
        })
    }
}

/// Donation fields embedded in match responses.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DonationSummary {
    #[schema(format = "uuid")]
    pub id: String,
    pub title: String,
    pub category: String,
    pub city: Option<String>,
    pub state: Option<String>,
    #[schema(example = "RESERVED")]
    pub status: String,
    pub image_urls: Vec<String>,
}

impl From<&Donation> for DonationSummary {
    fn from(donation: &Donation) -> Self {
        let details = &donation.details;
        Self {
            id: donation.id.to_string(),
            title: details.title().to_owned(),
            category: details.category().to_owned(),
            city: details.city().map(str::to_owned),
            state: details.state().map(str::to_owned),
            status: donation.status.as_str().to_owned(),
            image_urls: details.image_urls().to_vec(),
        }
    }
}

/// Match as returned to clients, with its donation summary.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchResponse {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub donation_id: String,
    #[schema(format = "uuid")]
    pub requester_id: String,
    #[schema(format = "uuid")]
    pub donor_id: String,
    pub message: Option<String>,
    #[schema(example = "PENDING")]
    pub status: String,
    #[schema(format = "date-time")]
    pub requested_at: String,
    #[schema(format = "date-time")]
    pub responded_at: Option<String>,
    #[schema(format = "date-time")]
    pub completed_at: Option<String>,
    #[schema(format = "date-time")]
    pub pickup_date: Option<String>,
    pub pickup_notes: Option<String>,
    pub donor_notes: Option<String>,
    pub requester_rating: Option<u8>,
    pub donor_rating: Option<u8>,
    #[schema(format = "date-time")]
    pub created_at: String,
    #[schema(format = "date-time")]
    pub updated_at: String,
    pub donation: DonationSummary,
}

impl From<MatchRecord> for MatchResponse {
    fn from(record: MatchRecord) -> Self {
        let donation = DonationSummary::from(&record.donation);
        let donor_id = record.donor_id().to_string();
        let request = record.request;
        Self {
            id: request.id.to_string(),
            donation_id: request.donation_id.to_string(),
            requester_id: request.requester_id.to_string(),
            donor_id,
            message: request.message,
            status: request.status.as_str().to_owned(),
            requested_at: request.requested_at.to_rfc3339(),
            responded_at: request.responded_at.map(|at| at.to_rfc3339()),
            completed_at: request.completed_at.map(|at| at.to_rfc3339()),
            pickup_date: request.pickup_date.map(|at| at.to_rfc3339()),
            pickup_notes: request.pickup_notes,
            donor_notes: request.donor_notes,
            requester_rating: request.requester_rating.map(u8::from),
            donor_rating: request.donor_rating.map(u8::from),
            created_at: request.created_at.to_rfc3339(),
            updated_at: request.updated_at.to_rfc3339(),
            donation,
        }
    }
}

/// One page of matches.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchPageResponse {
    pub items: Vec<MatchResponse>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
    pub total_pages: u64,
}

impl From<Page<MatchRecord>> for MatchPageResponse {
    fn from(page: Page<MatchRecord>) -> Self {
        let total_pages = page.total_pages();
        let page = page.map(MatchResponse::from);
        Self {
            items: page.items,
            total: page.total,
            page: page.page,
            size: page.size,
            total_pages,
        }
    }
}

/// Paging parameters for `GET /api/v1/matches/my`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MatchPageQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
}

fn into_responses(records: Vec<MatchRecord>) -> Vec<MatchResponse> {
    records.into_iter().map(MatchResponse::from).collect()
}

/// Request an AVAILABLE donation as the signed-in user.
#[utoipa::path(
    post,
    path = "/api/v1/matches",
    params(RequestDonationQuery),
    request_body(content = RequestDonationBody, description = "Optional message", content_type = "application/json"),
    responses(
        (status = 201, description = "Request created", body = MatchResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Donation not found", body = ErrorSchema),
        (status = 409, description = "Donation unavailable, own donation or duplicate request", body = ErrorSchema)
    ),
    tags = ["matches"],
    operation_id = "requestDonation",
    security(("SessionCookie" = []))
)]
#[post("/matches")]
pub async fn request_donation(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<RequestDonationQuery>,
    payload: Option<web::Json<RequestDonationBody>>,
) -> ApiResult<HttpResponse> {
    let requester_id = session.require_user_id()?;
    let raw_id = query
        .into_inner()
        .donation_id
        .ok_or_else(|| missing_field_error(FieldName::new("donationId")))?;
    let donation_id = parse_donation_id(&raw_id, FieldName::new("donationId"))?;
    let body = payload.map(web::Json::into_inner).unwrap_or_default();
    let message = normalise_message(body.message).map_err(text_field_error)?;

    let record = state
        .matches
        .request_donation(RequestDonationRequest {
            donation_id,
            requester_id,
            message,
        })
        .await?;
    Ok(HttpResponse::Created().json(MatchResponse::from(record)))
}

/// Requests made by the signed-in user, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/matches/my",
    params(MatchPageQuery),
    responses(
        (status = 200, description = "Caller's requests", body = MatchPageResponse),
        (status = 400, description = "Invalid paging", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["matches"],
    operation_id = "listMyMatches",
    security(("SessionCookie" = []))
)]
#[get("/matches/my")]
pub async fn my_matches(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<MatchPageQuery>,
) -> ApiResult<web::Json<MatchPageResponse>> {
    let requester_id = session.require_user_id()?;
    let MatchPageQuery { page, size } = query.into_inner();
    let page = parse_page_request(page, size)?;
    let records = state
        .matches_query
        .list_for_requester(&requester_id, page)
        .await?;
    Ok(web::Json(MatchPageResponse::from(records)))
}

/// Requests received on the signed-in user's donations, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/matches/received",
    responses(
        (status = 200, description = "Requests received", body = [MatchResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["matches"],
    operation_id = "listReceivedMatches",
    security(("SessionCookie" = []))
)]
#[get("/matches/received")]
pub async fn received_matches(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<MatchResponse>>> {
    let donor_id = session.require_user_id()?;
    let records = state.matches_query.list_for_donor(&donor_id).await?;
    Ok(web::Json(into_responses(records)))
}

/// Move a match through its lifecycle.
#[utoipa::path(
    put,
    path = "/api/v1/matches/{id}/status",
    params(("id" = String, Path, description = "Match id", format = "uuid")),
    request_body = UpdateMatchStatusBody,
    responses(
        (status = 200, description = "Match updated", body = MatchResponse),
        (status = 400, description = "Invalid status or field", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Actor may not make this change", body = ErrorSchema),
        (status = 404, description = "Match not found", body = ErrorSchema),
        (status = 409, description = "Transition not allowed from the current state", body = ErrorSchema)
    ),
    tags = ["matches"],
    operation_id = "updateMatchStatus",
    security(("SessionCookie" = []))
)]
#[put("/matches/{id}/status")]
pub async fn update_match_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateMatchStatusBody>,
) -> ApiResult<web::Json<MatchResponse>> {
    let actor_id = session.require_user_id()?;
    let match_id = parse_match_id(&path.into_inner(), FieldName::new("id"))?;
    // A missing match outranks a malformed body.
    let change = match payload.into_inner().into_change() {
        Ok(change) => change,
        Err(invalid) => {
            state.matches_query.ensure_exists(&match_id).await?;
            return Err(invalid);
        }
    };

    let record = state
        .matches
        .update_status(UpdateMatchStatusRequest {
            match_id,
            actor_id,
            change,
        })
        .await?;
    Ok(web::Json(MatchResponse::from(record)))
}

/// Every request on one donation, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/matches/donation/{donationId}",
    params(("donationId" = String, Path, description = "Donation id", format = "uuid")),
    responses(
        (status = 200, description = "Requests on the donation", body = [MatchResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Donation not found", body = ErrorSchema)
    ),
    tags = ["matches"],
    operation_id = "listDonationMatches",
    security(("SessionCookie" = []))
)]
#[get("/matches/donation/{donationId}")]
pub async fn donation_matches(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<MatchResponse>>> {
    session.require_user_id()?;
    let donation_id = parse_donation_id(&path.into_inner(), FieldName::new("donationId"))?;
    let records = state.matches_query.list_for_donation(&donation_id).await?;
    Ok(web::Json(into_responses(records)))
}

#[cfg(test)]
#[path = "matches_tests.rs"]
mod tests;
