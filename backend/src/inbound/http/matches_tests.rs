//! Tests for match workflow HTTP handlers.

use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::ports::MockMatchCommand;
use crate::inbound::http::donations::{create_donation, get_donation};
use crate::inbound::http::state::HttpStatePorts;
use crate::inbound::http::test_utils::{in_memory_state, register_user, test_session_middleware};
use crate::inbound::http::users::register;

fn test_app(
    state: HttpState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(test_session_middleware())
        .service(
            web::scope("/api/v1")
                .service(register)
                .service(create_donation)
                .service(get_donation)
                .service(request_donation)
                .service(my_matches)
                .service(received_matches)
                .service(update_match_status)
                .service(donation_matches),
        )
}

async fn offer<S>(app: &S, donor: &Cookie<'static>) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let created: Value = actix_test::call_and_read_body_json(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/donations")
            .cookie(donor.clone())
            .set_json(json!({
                "title": "Children's bicycle",
                "description": "Blue bike with stabilisers, fits ages 4 to 6.",
                "category": "Toys",
                "city": "Leeds"
            }))
            .to_request(),
    )
    .await;
    created["id"].as_str().expect("donation id").to_owned()
}

async fn request<S>(app: &S, requester: &Cookie<'static>, donation_id: &str) -> ServiceResponse
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/matches?donationId={donation_id}"))
            .cookie(requester.clone())
            .set_json(json!({ "message": "  Could collect on Saturday  " }))
            .to_request(),
    )
    .await
}

async fn set_status<S>(app: &S, actor: &Cookie<'static>, match_id: &str, body: Value) -> ServiceResponse
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    actix_test::call_service(
        app,
        actix_test::TestRequest::put()
            .uri(&format!("/api/v1/matches/{match_id}/status"))
            .cookie(actor.clone())
            .set_json(body)
            .to_request(),
    )
    .await
}

async fn match_id_of(response: ServiceResponse) -> String {
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(response).await;
    body["id"].as_str().expect("match id").to_owned()
}

#[actix_web::test]
async fn request_creates_pending_match_with_trimmed_message() {
    let app = actix_test::init_service(test_app(in_memory_state())).await;
    let (donor, donor_id) = register_user(&app, "Dana Donor", "dana@example.org").await;
    let (requester, requester_id) = register_user(&app, "Rory Requester", "rory@example.org").await;
    let donation_id = offer(&app, &donor).await;

    let res = request(&app, &requester, &donation_id).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["status"], "PENDING");
    assert_eq!(body["message"], "Could collect on Saturday");
    assert_eq!(body["requesterId"], requester_id.as_str());
    assert_eq!(body["donorId"], donor_id.as_str());
    assert_eq!(body["donation"]["title"], "Children's bicycle");
    assert_eq!(body["donation"]["status"], "AVAILABLE");
}

#[rstest]
#[case("/api/v1/matches", "missing_field")]
#[case("/api/v1/matches?donationId=bike", "invalid_uuid")]
#[actix_web::test]
async fn request_validates_the_donation_id(#[case] uri: &str, #[case] code: &str) {
    let app = actix_test::init_service(test_app(in_memory_state())).await;
    let (requester, _) = register_user(&app, "Rory Requester", "rory@example.org").await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(uri)
            .cookie(requester)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["details"]["code"], code);
}

#[actix_web::test]
async fn duplicate_and_self_requests_conflict() {
    let app = actix_test::init_service(test_app(in_memory_state())).await;
    let (donor, _) = register_user(&app, "Dana Donor", "dana@example.org").await;
    let (requester, _) = register_user(&app, "Rory Requester", "rory@example.org").await;
    let donation_id = offer(&app, &donor).await;

    request(&app, &requester, &donation_id).await;
    let duplicate = request(&app, &requester, &donation_id).await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);
    let body: Value = actix_test::read_body_json(duplicate).await;
    assert_eq!(body["details"]["code"], "duplicate_request");

    let own = request(&app, &donor, &donation_id).await;
    assert_eq!(own.status(), StatusCode::CONFLICT);
    let body: Value = actix_test::read_body_json(own).await;
    assert_eq!(body["details"]["code"], "self_request");
}

#[actix_web::test]
async fn approval_reserves_donation_and_rejects_competitors() {
    let app = actix_test::init_service(test_app(in_memory_state())).await;
    let (donor, _) = register_user(&app, "Dana Donor", "dana@example.org").await;
    let (first, _) = register_user(&app, "Rory Requester", "rory@example.org").await;
    let (second, _) = register_user(&app, "Sam Second", "sam@example.org").await;
    let donation_id = offer(&app, &donor).await;
    let chosen = match_id_of(request(&app, &first, &donation_id).await).await;
    match_id_of(request(&app, &second, &donation_id).await).await;

    let res = set_status(
        &app,
        &donor,
        &chosen,
        json!({ "status": "APPROVED", "pickupDate": "2026-03-01T10:00:00Z" }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let approved: Value = actix_test::read_body_json(res).await;
    assert_eq!(approved["status"], "APPROVED");
    assert_eq!(approved["donation"]["status"], "RESERVED");
    assert!(approved["respondedAt"].is_string());
    assert_eq!(approved["pickupDate"], "2026-03-01T10:00:00+00:00");

    let all: Value = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/matches/donation/{donation_id}"))
            .cookie(donor.clone())
            .to_request(),
    )
    .await;
    let statuses: Vec<(&str, &str)> = all
        .as_array()
        .expect("array")
        .iter()
        .map(|m| {
            (
                m["id"].as_str().unwrap_or_default(),
                m["status"].as_str().unwrap_or_default(),
            )
        })
        .collect();
    assert_eq!(statuses.len(), 2);
    for (id, status) in statuses {
        let expected = if id == chosen { "APPROVED" } else { "REJECTED" };
        assert_eq!(status, expected);
    }

    let (late_requester, _) = register_user(&app, "Lee Late", "lee@example.org").await;
    let late = request(&app, &late_requester, &donation_id).await;
    assert_eq!(late.status(), StatusCode::CONFLICT);
}

#[rstest]
#[case("APPROVED")]
#[case("REJECTED")]
#[actix_web::test]
async fn requester_cannot_decide_their_own_request(#[case] status: &str) {
    let app = actix_test::init_service(test_app(in_memory_state())).await;
    let (donor, _) = register_user(&app, "Dana Donor", "dana@example.org").await;
    let (requester, _) = register_user(&app, "Rory Requester", "rory@example.org").await;
    let donation_id = offer(&app, &donor).await;
    let match_id = match_id_of(request(&app, &requester, &donation_id).await).await;

    let res = set_status(&app, &requester, &match_id, json!({ "status": status })).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn outsiders_are_forbidden() {
    let app = actix_test::init_service(test_app(in_memory_state())).await;
    let (donor, _) = register_user(&app, "Dana Donor", "dana@example.org").await;
    let (requester, _) = register_user(&app, "Rory Requester", "rory@example.org").await;
    let (outsider, _) = register_user(&app, "Olly Outsider", "olly@example.org").await;
    let donation_id = offer(&app, &donor).await;
    let match_id = match_id_of(request(&app, &requester, &donation_id).await).await;

    let res = set_status(&app, &outsider, &match_id, json!({ "status": "CANCELLED" })).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn cancelling_an_approved_match_releases_the_donation() {
    let app = actix_test::init_service(test_app(in_memory_state())).await;
    let (donor, _) = register_user(&app, "Dana Donor", "dana@example.org").await;
    let (requester, _) = register_user(&app, "Rory Requester", "rory@example.org").await;
    let donation_id = offer(&app, &donor).await;
    let match_id = match_id_of(request(&app, &requester, &donation_id).await).await;
    set_status(&app, &donor, &match_id, json!({ "status": "APPROVED" })).await;

    let res = set_status(&app, &requester, &match_id, json!({ "status": "CANCELLED" })).await;
    assert_eq!(res.status(), StatusCode::OK);
    let cancelled: Value = actix_test::read_body_json(res).await;
    assert_eq!(cancelled["status"], "CANCELLED");
    assert_eq!(cancelled["donation"]["status"], "AVAILABLE");

    let again = set_status(&app, &requester, &match_id, json!({ "status": "IN_PROGRESS" })).await;
    assert_eq!(again.status(), StatusCode::CONFLICT);
    let body: Value = actix_test::read_body_json(again).await;
    assert_eq!(body["details"]["code"], "match_closed");
}

#[actix_web::test]
async fn completion_records_the_actors_rating_and_closes_the_donation() {
    let app = actix_test::init_service(test_app(in_memory_state())).await;
    let (donor, _) = register_user(&app, "Dana Donor", "dana@example.org").await;
    let (requester, _) = register_user(&app, "Rory Requester", "rory@example.org").await;
    let donation_id = offer(&app, &donor).await;
    let match_id = match_id_of(request(&app, &requester, &donation_id).await).await;
    set_status(&app, &donor, &match_id, json!({ "status": "APPROVED", "donorNotes": "Porch" })).await;
    set_status(&app, &requester, &match_id, json!({ "status": "IN_PROGRESS" })).await;

    let res = set_status(
        &app,
        &requester,
        &match_id,
        json!({ "status": "COMPLETED", "rating": 5 }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let completed: Value = actix_test::read_body_json(res).await;
    assert_eq!(completed["status"], "COMPLETED");
    assert_eq!(completed["requesterRating"], 5);
    assert!(completed["donorRating"].is_null());
    assert_eq!(completed["donorNotes"], "Porch");
    assert!(completed["completedAt"].is_string());
    assert_eq!(completed["donation"]["status"], "COMPLETED");
}

#[rstest]
#[case(json!({ "status": "SHIPPED" }), "status")]
#[case(json!({ "status": "PENDING" }), "status")]
#[case(json!({ "status": "COMPLETED", "rating": 6 }), "rating")]
#[case(json!({ "status": "APPROVED", "pickupDate": "next week" }), "pickupDate")]
#[actix_web::test]
async fn status_updates_validate_their_fields(#[case] body: Value, #[case] field: &str) {
    let app = actix_test::init_service(test_app(in_memory_state())).await;
    let (donor, _) = register_user(&app, "Dana Donor", "dana@example.org").await;
    let (requester, _) = register_user(&app, "Rory Requester", "rory@example.org").await;
    let donation_id = offer(&app, &donor).await;
    let match_id = match_id_of(request(&app, &requester, &donation_id).await).await;

    let res = set_status(&app, &donor, &match_id, body).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let payload: Value = actix_test::read_body_json(res).await;
    assert_eq!(payload["details"]["field"], field);
}

#[rstest]
#[case(json!({ "status": "SHIPPED" }))]
#[case(json!({ "status": "APPROVED" }))]
#[actix_web::test]
async fn status_update_on_unknown_match_is_not_found(#[case] body: Value) {
    let app = actix_test::init_service(test_app(in_memory_state())).await;
    let (donor, _) = register_user(&app, "Dana Donor", "dana@example.org").await;

    let unknown = uuid::Uuid::new_v4().to_string();
    let res = set_status(&app, &donor, &unknown, body).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let payload: Value = actix_test::read_body_json(res).await;
    assert_eq!(payload["code"], "not_found");
}

#[actix_web::test]
async fn listings_show_each_party_their_side() {
    let app = actix_test::init_service(test_app(in_memory_state())).await;
    let (donor, _) = register_user(&app, "Dana Donor", "dana@example.org").await;
    let (requester, _) = register_user(&app, "Rory Requester", "rory@example.org").await;
    let donation_id = offer(&app, &donor).await;
    let match_id = match_id_of(request(&app, &requester, &donation_id).await).await;

    let mine: Value = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/matches/my?size=5")
            .cookie(requester.clone())
            .to_request(),
    )
    .await;
    assert_eq!(mine["total"], 1);
    assert_eq!(mine["size"], 5);
    assert_eq!(mine["items"][0]["id"], match_id.as_str());

    let received: Value = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/matches/received")
            .cookie(donor)
            .to_request(),
    )
    .await;
    assert_eq!(received[0]["id"], match_id.as_str());

    let none: Value = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/matches/received")
            .cookie(requester)
            .to_request(),
    )
    .await;
    assert_eq!(none, json!([]));
}

#[actix_web::test]
async fn donation_listing_requires_known_donation() {
    let app = actix_test::init_service(test_app(in_memory_state())).await;
    let (requester, _) = register_user(&app, "Rory Requester", "rory@example.org").await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/matches/donation/3c1e5e0a-8d0b-4b7a-9f53-9a7d1c2e4b6f")
            .cookie(requester)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn workflow_outage_surfaces_as_service_unavailable() {
    let mut matches = MockMatchCommand::new();
    matches
        .expect_update_status()
        .return_once(|_| Err(Error::service_unavailable("match repository unavailable")));
    let base = in_memory_state();
    let state = HttpState::new(HttpStatePorts {
        login: base.login,
        registration: base.registration,
        profile: base.profile,
        profile_updates: base.profile_updates,
        donations: base.donations,
        donations_query: base.donations_query,
        matches: Arc::new(matches),
        matches_query: base.matches_query,
    });
    let app = actix_test::init_service(test_app(state)).await;
    let (actor, _) = register_user(&app, "Dana Donor", "dana@example.org").await;

    let res = set_status(
        &app,
        &actor,
        "3c1e5e0a-8d0b-4b7a-9f53-9a7d1c2e4b6f",
        json!({ "status": "APPROVED" }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
}
