//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::test as actix_test;
use mockable::DefaultClock;
use serde_json::{Value, json};

use crate::inbound::http::state::HttpState;
use crate::outbound::memory::InMemoryStore;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Real services over a fresh in-memory store.
pub fn in_memory_state() -> HttpState {
    let store = Arc::new(InMemoryStore::new());
    HttpState::from_repositories(store.clone(), store.clone(), store, Arc::new(DefaultClock))
}

/// Extract the session cookie set by a response.
pub fn session_cookie(response: &ServiceResponse) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

/// Register a user through `POST /api/v1/auth/register`.
///
/// Returns the session cookie and the new user's id.
pub async fn register_user<S>(app: &S, name: &str, email: &str) -> (Cookie<'static>, String)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(json!({
                "name": name,
                "email": email,
                "password": "correct-horse",
            }))
            .to_request(),
    )
    .await;
    assert!(res.status().is_success(), "registration failed: {}", res.status());
    let cookie = session_cookie(&res);
    let body: Value = actix_test::read_body_json(res).await;
    let id = body["id"].as_str().expect("user id").to_owned();
    (cookie, id)
}
