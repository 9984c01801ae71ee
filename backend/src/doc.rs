//! OpenAPI documentation for the REST API.
//!
//! Served by Swagger UI in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode, List, ListLink};
use crate::inbound::http::lists::{
    CreateListBody, CreatedListResponse, ShareListBody, UpdateListBody,
};
use crate::inbound::http::users::CredentialsRequest;

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
                "Session cookie issued by POST /api/v1/login or /api/v1/register.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "listshare API",
        description = "Create lists, share them with other users and manage guest access."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::lists::create_list,
        crate::inbound::http::lists::list_owned,
        crate::inbound::http::lists::list_shared,
        crate::inbound::http::lists::get_list,
        crate::inbound::http::lists::update_list,
        crate::inbound::http::lists::delete_list,
        crate::inbound::http::lists::share_list,
        crate::inbound::http::lists::revoke_guest,
        crate::inbound::http::lists::unshare_list,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        List,
        ListLink,
        CredentialsRequest,
        CreateListBody,
        CreatedListResponse,
        UpdateListBody,
        ShareListBody
    )),
    tags(
        (name = "users", description = "Registration and login"),
        (name = "lists", description = "List ownership and sharing"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
