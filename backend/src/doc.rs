//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every REST path, the request and response DTOs, and
//! the bearer-token security scheme. Swagger UI serves it in debug builds.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::items::{
    ItemClaimResponse, ItemFields, ItemResponse, ReportItemRequest, StatusChangeRequest,
};
use crate::inbound::http::requests::{ClaimRequestResponse, FileRequestBody};
use crate::inbound::http::stats::{
    ItemCountsResponse, RequestCountsResponse, StatisticsResponse, UserCountsResponse,
};
use crate::inbound::http::users::{
    ChangePasswordRequest, EmailCheckResponse, LoginRequest, LoginResponse, RegisterRequest,
    UpdateUserRequest, UserResponse,
};

/// Name of the bearer security scheme referenced by protected paths.
pub const BEARER_SCHEME: &str = "BearerAuth";

/// Enrich the generated document with the bearer security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        let bearer = HttpBuilder::new()
            .scheme(HttpAuthScheme::Bearer)
            .bearer_format("HS256")
            .description(Some("Token issued by POST /api/v1/login."))
            .build();
        components.add_security_scheme(BEARER_SCHEME, SecurityScheme::Http(bearer));
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Lost and found API",
        description = "Report lost and found items, file claims, and decide them.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::check_email,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::change_password,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::items::list_items,
        crate::inbound::http::items::report_item,
        crate::inbound::http::items::list_my_items,
        crate::inbound::http::items::get_item,
        crate::inbound::http::items::update_item,
        crate::inbound::http::items::review_item,
        crate::inbound::http::items::delete_item,
        crate::inbound::http::items::list_item_requests,
        crate::inbound::http::requests::file_request,
        crate::inbound::http::requests::list_requests,
        crate::inbound::http::requests::get_request,
        crate::inbound::http::requests::approve_request,
        crate::inbound::http::requests::reject_request,
        crate::inbound::http::requests::delete_request,
        crate::inbound::http::stats::get_statistics,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        RegisterRequest,
        LoginRequest,
        LoginResponse,
        UserResponse,
        UpdateUserRequest,
        ChangePasswordRequest,
        EmailCheckResponse,
        ItemFields,
        ReportItemRequest,
        StatusChangeRequest,
        ItemResponse,
        ItemClaimResponse,
        FileRequestBody,
        ClaimRequestResponse,
        StatisticsResponse,
        ItemCountsResponse,
        RequestCountsResponse,
        UserCountsResponse,
    )),
    tags(
        (name = "users", description = "Registration, login and account management"),
        (name = "items", description = "Reported lost and found items"),
        (name = "requests", description = "Claims filed against items"),
        (name = "stats", description = "Office-wide counts for administrators"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated document.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

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
    fn error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get("Error").expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
    }

    #[test]
    fn user_schema_is_camel_case_and_has_no_verifier() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let user_schema = schemas.get("UserResponse").expect("UserResponse schema");

        assert_object_schema_has_field(user_schema, "displayName");
        if let RefOr::T(Schema::Object(obj)) = user_schema {
            assert!(!obj.properties.contains_key("passwordHash"));
        }
    }

    #[test]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.as_ref().expect("components");
        assert!(components.security_schemes.contains_key(BEARER_SCHEME));
    }

    #[rstest]
    #[case("/api/v1/users/register")]
    #[case("/api/v1/login")]
    #[case("/api/v1/items/{id}/requests")]
    #[case("/api/v1/requests/{id}/approve")]
    #[case("/api/v1/users/{id}/password")]
    #[case("/api/v1/stats")]
    #[case("/health/ready")]
    fn paths_are_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }
}
