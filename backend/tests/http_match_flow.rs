//! End-to-end HTTP flow: two users, one donation, and the request lifecycle
//! through approval, pickup and completion.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use donations::Trace;
use donations::domain::TRACE_ID_HEADER;
use donations::inbound::http::donations::{create_donation, get_donation, list_donations};
use donations::inbound::http::matches::{
    my_matches, received_matches, request_donation, update_match_status,
};
use donations::inbound::http::state::HttpState;
use donations::inbound::http::users::{current_user, register};
use donations::outbound::memory::InMemoryStore;
use mockable::DefaultClock;
use rstest::rstest;
use serde_json::{Value, json};

fn state() -> web::Data<HttpState> {
    let store = Arc::new(InMemoryStore::new());
    web::Data::new(HttpState::from_repositories(
        store.clone(),
        store.clone(),
        store,
        Arc::new(DefaultClock),
    ))
}

fn session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

async fn call<S>(app: &S, req: test::TestRequest) -> (StatusCode, Value, Option<String>)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = test::call_service(app, req.to_request()).await;
    let status = res.status();
    let trace = res
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = test::read_body(res).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body, trace)
}

async fn sign_up<S>(app: &S, name: &str, email: &str) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(json!({ "name": name, "email": email, "password": "correct-horse" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}

fn set_status(id: &str, cookie: &Cookie<'static>, body: Value) -> test::TestRequest {
    test::TestRequest::put()
        .uri(&format!("/api/v1/matches/{id}/status"))
        .cookie(cookie.clone())
        .set_json(body)
}

#[rstest]
#[actix_web::test]
async fn request_lifecycle_through_completion() {
    let app = test::init_service(
        App::new().app_data(state()).wrap(Trace).service(
            web::scope("/api/v1")
                .wrap(session_middleware())
                .service(register)
                .service(current_user)
                .service(list_donations)
                .service(create_donation)
                .service(get_donation)
                .service(request_donation)
                .service(my_matches)
                .service(received_matches)
                .service(update_match_status),
        ),
    )
    .await;

    let donor = sign_up(&app, "Dana Donor", "dana@example.org").await;
    let requester = sign_up(&app, "Rory Requester", "rory@example.org").await;

    let (status, donation, _) = call(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/donations")
            .cookie(donor.clone())
            .set_json(json!({
                "title": "Winter coats",
                "description": "Three adult winter coats in good condition.",
                "category": "Clothing",
                "city": "Leeds",
                "quantity": 3,
            })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let donation_id = donation["id"].as_str().expect("donation id").to_owned();

    let (status, created, _) = call(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/matches?donationId={donation_id}"))
            .cookie(requester.clone())
            .set_json(json!({ "message": "  I can collect tomorrow  " })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "PENDING");
    assert_eq!(created["message"], "I can collect tomorrow");
    let match_id = created["id"].as_str().expect("match id").to_owned();

    let (_, received, _) = call(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/matches/received")
            .cookie(donor.clone()),
    )
    .await;
    assert_eq!(received.as_array().map(Vec::len), Some(1));

    let (status, approved, _) = call(
        &app,
        set_status(
            &match_id,
            &donor,
            json!({ "status": "APPROVED", "pickupDate": "2030-01-05T10:00:00Z" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["donation"]["status"], "RESERVED");
    assert!(approved["respondedAt"].is_string());

    let (status, _, _) = call(
        &app,
        set_status(&match_id, &requester, json!({ "status": "IN_PROGRESS" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, completed, _) = call(
        &app,
        set_status(
            &match_id,
            &requester,
            json!({ "status": "COMPLETED", "rating": 5 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completed["requesterRating"], 5);
    assert!(completed["completedAt"].is_string());

    let (_, stored, _) = call(
        &app,
        test::TestRequest::get().uri(&format!("/api/v1/donations/{donation_id}")),
    )
    .await;
    assert_eq!(stored["status"], "COMPLETED");

    let (status, error, trace) = call(
        &app,
        set_status(&match_id, &donor, json!({ "status": "CANCELLED" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["details"]["code"], "match_closed");
    assert_eq!(error["traceId"].as_str(), trace.as_deref());

    let (_, mine, _) = call(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/matches/my")
            .cookie(requester.clone()),
    )
    .await;
    assert_eq!(mine["items"][0]["status"], "COMPLETED");
}
