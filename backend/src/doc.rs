//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: every HTTP endpoint from the inbound layer (auth, users,
//!   donations, matches, health)
//! - **Schemas**: request and response bodies plus the error wrappers
//!   ([`ErrorSchema`], [`ErrorCodeSchema`]) that describe domain errors
//!   without coupling domain types to utoipa
//! - **Security**: session cookie authentication scheme
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::donations::{DonationPageResponse, DonationRequest, DonationResponse};
use crate::inbound::http::matches::{
    DonationSummary, MatchPageResponse, MatchResponse, RequestDonationBody, UpdateMatchStatusBody,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::users::{
    LoginRequest, RegisterRequest, UpdateProfileRequest, UserResponse,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/auth/login or /api/v1/auth/register.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Donations backend API",
        description = "Donation listings and the request/approval workflow that matches donors with requesters.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::update_profile,
        crate::inbound::http::donations::list_donations,
        crate::inbound::http::donations::create_donation,
        crate::inbound::http::donations::my_donations,
        crate::inbound::http::donations::list_categories,
        crate::inbound::http::donations::list_cities,
        crate::inbound::http::donations::get_donation,
        crate::inbound::http::donations::update_donation,
        crate::inbound::http::donations::delete_donation,
        crate::inbound::http::matches::request_donation,
        crate::inbound::http::matches::my_matches,
        crate::inbound::http::matches::received_matches,
        crate::inbound::http::matches::update_match_status,
        crate::inbound::http::matches::donation_matches,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        RegisterRequest,
        LoginRequest,
        UpdateProfileRequest,
        UserResponse,
        DonationRequest,
        DonationResponse,
        DonationPageResponse,
        RequestDonationBody,
        UpdateMatchStatusBody,
        DonationSummary,
        MatchResponse,
        MatchPageResponse,
    )),
    tags(
        (name = "auth", description = "Registration and session management"),
        (name = "users", description = "Operations related to users"),
        (name = "donations", description = "Donation listings"),
        (name = "matches", description = "Requests for donations and their status workflow"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying OpenAPI schema field structure and path registration.

    use super::*;
    use rstest::rstest;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // Note: utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";

    /// Assert that an Object schema contains a field with the given name.
    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn openapi_error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get(ERROR_SCHEMA_NAME).expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
        assert_object_schema_has_field(error_schema, "traceId");
    }

    #[rstest]
    #[case("MatchResponse", "donorId")]
    #[case("MatchResponse", "requesterRating")]
    #[case("DonationResponse", "imageUrls")]
    #[case("UpdateMatchStatusBody", "pickupDate")]
    #[case("UserResponse", "zipCode")]
    #[case("UpdateProfileRequest", "zipCode")]
    fn openapi_dto_schemas_use_camel_case(#[case] schema: &str, #[case] field: &str) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let found = schemas.get(schema).expect("schema registered");
        assert_object_schema_has_field(found, field);
    }

    #[rstest]
    #[case("/api/v1/auth/register")]
    #[case("/api/v1/users/me")]
    #[case("/api/v1/donations/{id}")]
    #[case("/api/v1/matches/{id}/status")]
    #[case("/api/v1/matches/donation/{donationId}")]
    #[case("/health/ready")]
    fn openapi_registers_paths(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing path {path}");
    }

    #[test]
    fn openapi_declares_session_cookie_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
