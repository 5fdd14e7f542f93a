//! Account HTTP handlers.
//!
//! ```text
//! POST /api/v1/auth/register {"name":"Ada Lovelace","email":"ada@example.org","password":"..."}
//! POST /api/v1/auth/login {"email":"ada@example.org","password":"..."}
//! POST /api/v1/auth/logout
//! GET /api/v1/users/me
//! PUT /api/v1/users/me {"city":"London","bio":"..."}
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{
    ContactDetails, Error, LoginCredentials, LoginValidationError, ProfileUpdate, Registration,
    RegistrationDraft, RegistrationValidationError, User,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Registration request body for `POST /api/v1/auth/register`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[schema(example = "ada@example.org")]
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

impl From<RegisterRequest> for RegistrationDraft {
    fn from(value: RegisterRequest) -> Self {
        Self {
            name: value.name,
            email: value.email,
            password: value.password,
            contact: ContactDetails {
                phone: value.phone,
                address: value.address,
                city: value.city,
                state: value.state,
                zip_code: value.zip_code,
                bio: value.bio,
            },
        }
    }
}

/// Login request body for `POST /api/v1/auth/login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "ada@example.org")]
    pub email: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password)
    }
}

/// Partial profile edit for `PUT /api/v1/users/me`. Omitted fields are kept.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(value: UpdateProfileRequest) -> Self {
        Self {
            name: value.name,
            phone: value.phone,
            address: value.address,
            city: value.city,
            state: value.state,
            zip_code: value.zip_code,
            bio: value.bio,
        }
    }
}

/// Public view of a user account. Never carries the password digest.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(format = "uuid")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub bio: Option<String>,
    #[schema(format = "date-time")]
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let contact = user.contact().clone();
        Self {
            id: user.id().to_string(),
            name: user.name().as_ref().to_owned(),
            email: user.email().as_ref().to_owned(),
            phone: contact.phone,
            address: contact.address,
            city: contact.city,
            state: contact.state,
            zip_code: contact.zip_code,
            bio: contact.bio,
            created_at: user.created_at().to_rfc3339(),
        }
    }
}

fn map_registration_error(err: RegistrationValidationError) -> Error {
    let field = match &err {
        RegistrationValidationError::User(inner) => inner.field(),
        RegistrationValidationError::PasswordTooShort { .. } => "password",
    };
    Error::invalid_request(err.to_string()).with_details(json!({
        "field": field,
        "code": "invalid_registration",
    }))
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyEmail => Error::invalid_request("email must not be empty")
            .with_details(json!({ "field": "email", "code": "empty_email" })),
        LoginValidationError::EmptyPassword => Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password", "code": "empty_password" })),
    }
}

/// Create an account and sign the new user in.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration = Registration::try_from_draft(payload.into_inner().into())
        .map_err(map_registration_error)?;
    let user = state.registration.register(&registration).await?;
    session.persist_user(user.id())?;
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// Authenticate a user and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = UserResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let user_id = state.login.authenticate(&credentials).await?;
    let user = state.profile.fetch_profile(&user_id).await?;
    session.persist_user(&user_id)?;
    Ok(web::Json(UserResponse::from(user)))
}

/// Clear the caller's session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[post("/auth/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

/// Return the signed-in user's profile.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "User no longer exists", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser",
    security(("SessionCookie" = []))
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserResponse>> {
    let user_id = session.require_user_id()?;
    let user = state.profile.fetch_profile(&user_id).await?;
    Ok(web::Json(UserResponse::from(user)))
}

/// Edit the signed-in user's profile. Only supplied fields change.
#[utoipa::path(
    put,
    path = "/api/v1/users/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "User no longer exists", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateProfile",
    security(("SessionCookie" = []))
)]
#[put("/users/me")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<UpdateProfileRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let user_id = session.require_user_id()?;
    let user = state
        .profile_updates
        .update_profile(&user_id, payload.into_inner().into())
        .await?;
    Ok(web::Json(UserResponse::from(user)))
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
