//! List API handlers.
//!
//! ```text
//! POST   /api/v1/lists                       {"name":"Groceries","content":"milk"}
//! GET    /api/v1/lists/owned
//! GET    /api/v1/lists/shared
//! GET    /api/v1/lists/{id}
//! PUT    /api/v1/lists/{id}                  {"content":"milk,eggs"}
//! DELETE /api/v1/lists/{id}
//! POST   /api/v1/lists/{id}/guests           {"guest":"bob"}
//! DELETE /api/v1/lists/{id}/guests/{guest}
//! DELETE /api/v1/lists/{id}/membership
//! ```
//!
//! Handlers resolve the requester from the session and delegate everything
//! else to the list ports.

use std::str::FromStr;

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::ports::CreateListRequest;
use crate::domain::{Error, List, ListId, ListLink, Username};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Body for `POST /api/v1/lists`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateListBody {
    pub name: String,
    #[serde(default)]
    pub content: String,
}

/// Response for a created list.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedListResponse {
    pub id: ListId,
}

/// Body for `PUT /api/v1/lists/{id}`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListBody {
    pub content: String,
}

/// Body for `POST /api/v1/lists/{id}/guests`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShareListBody {
    pub guest: String,
}

fn parse_list_id(raw: &str) -> Result<ListId, Error> {
    ListId::from_str(raw).map_err(|err| {
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "id", "code": "invalid_list_id" }))
    })
}

fn parse_guest(raw: &str) -> Result<Username, Error> {
    Username::new(raw).map_err(|err| {
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "guest", "code": "invalid_username" }))
    })
}

/// Create a list owned by the session user.
#[utoipa::path(
    post,
    path = "/api/v1/lists",
    request_body = CreateListBody,
    responses(
        (status = 201, description = "List created", body = CreatedListResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Owner not registered", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["lists"],
    operation_id = "createList"
)]
#[post("/lists")]
pub async fn create_list(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateListBody>,
) -> ApiResult<HttpResponse> {
    let owner = session.require_user()?;
    let CreateListBody { name, content } = payload.into_inner();
    let id = state
        .lists
        .create_list(&owner, CreateListRequest { name, content })
        .await?;
    Ok(HttpResponse::Created().json(CreatedListResponse { id }))
}

/// Links to lists the session user owns, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/lists/owned",
    responses(
        (status = 200, description = "Owned lists", body = [ListLink]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["lists"],
    operation_id = "listOwned"
)]
#[get("/lists/owned")]
pub async fn list_owned(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ListLink>>> {
    let username = session.require_user()?;
    Ok(web::Json(state.lists_query.list_owned(&username).await?))
}

/// Links to lists shared with the session user, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/lists/shared",
    responses(
        (status = 200, description = "Shared lists", body = [ListLink]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["lists"],
    operation_id = "listShared"
)]
#[get("/lists/shared")]
pub async fn list_shared(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ListLink>>> {
    let username = session.require_user()?;
    Ok(web::Json(state.lists_query.list_shared(&username).await?))
}

/// Fetch a list the session user owns or was shared.
#[utoipa::path(
    get,
    path = "/api/v1/lists/{id}",
    params(("id" = String, Path, description = "List identifier")),
    responses(
        (status = 200, description = "List", body = List),
        (status = 400, description = "Invalid list id", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "No access", body = Error),
        (status = 404, description = "List not found", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["lists"],
    operation_id = "getList"
)]
#[get("/lists/{id}")]
pub async fn get_list(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<List>> {
    let requester = session.require_user()?;
    let id = parse_list_id(&path)?;
    Ok(web::Json(state.lists_query.get_list(&requester, &id).await?))
}

/// Replace the content of an accessible list.
#[utoipa::path(
    put,
    path = "/api/v1/lists/{id}",
    params(("id" = String, Path, description = "List identifier")),
    request_body = UpdateListBody,
    responses(
        (status = 204, description = "List updated"),
        (status = 400, description = "Invalid list id", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "No access", body = Error),
        (status = 409, description = "Update not applied", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["lists"],
    operation_id = "updateList"
)]
#[put("/lists/{id}")]
pub async fn update_list(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateListBody>,
) -> ApiResult<HttpResponse> {
    let requester = session.require_user()?;
    let id = parse_list_id(&path)?;
    state
        .lists
        .update_list(&requester, &id, payload.into_inner().content)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Delete an owned list and every link to it.
#[utoipa::path(
    delete,
    path = "/api/v1/lists/{id}",
    params(("id" = String, Path, description = "List identifier")),
    responses(
        (status = 204, description = "List deleted"),
        (status = 400, description = "Invalid list id", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not the owner", body = Error),
        (status = 404, description = "List not found", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["lists"],
    operation_id = "deleteList"
)]
#[delete("/lists/{id}")]
pub async fn delete_list(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let requester = session.require_user()?;
    let id = parse_list_id(&path)?;
    state.lists.delete_list(&requester, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Share an owned list with another registered user.
#[utoipa::path(
    post,
    path = "/api/v1/lists/{id}/guests",
    params(("id" = String, Path, description = "List identifier")),
    request_body = ShareListBody,
    responses(
        (status = 204, description = "List shared"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not the owner", body = Error),
        (status = 404, description = "List or guest not found", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["lists"],
    operation_id = "shareList"
)]
#[post("/lists/{id}/guests")]
pub async fn share_list(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ShareListBody>,
) -> ApiResult<HttpResponse> {
    let owner = session.require_user()?;
    let id = parse_list_id(&path)?;
    let guest = parse_guest(&payload.guest)?;
    state.lists.share_list(&owner, &guest, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Revoke a guest's access to an owned list.
#[utoipa::path(
    delete,
    path = "/api/v1/lists/{id}/guests/{guest}",
    params(
        ("id" = String, Path, description = "List identifier"),
        ("guest" = String, Path, description = "Guest username")
    ),
    responses(
        (status = 204, description = "Guest removed"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not the owner", body = Error),
        (status = 404, description = "Guest not found", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["lists"],
    operation_id = "revokeGuest"
)]
#[delete("/lists/{id}/guests/{guest}")]
pub async fn revoke_guest(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let owner = session.require_user()?;
    let (raw_id, raw_guest) = path.into_inner();
    let id = parse_list_id(&raw_id)?;
    let guest = parse_guest(&raw_guest)?;
    state.lists.revoke_guest(&owner, &guest, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Leave a list that was shared with the session user.
#[utoipa::path(
    delete,
    path = "/api/v1/lists/{id}/membership",
    params(("id" = String, Path, description = "List identifier")),
    responses(
        (status = 204, description = "Access removed"),
        (status = 400, description = "Invalid list id", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Owners cannot unshare", body = Error),
        (status = 404, description = "List not shared with requester", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["lists"],
    operation_id = "unshareList"
)]
#[delete("/lists/{id}/membership")]
pub async fn unshare_list(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let requester = session.require_user()?;
    let id = parse_list_id(&path)?;
    state.lists.unshare_list(&requester, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register every list handler.
///
/// The static `owned`/`shared` routes are registered before `{id}` so they
/// are not captured as identifiers.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_list)
        .service(list_owned)
        .service(list_shared)
        .service(get_list)
        .service(update_list)
        .service(delete_list)
        .service(share_list)
        .service(revoke_guest)
        .service(unshare_list);
}

#[cfg(test)]
#[path = "lists_tests.rs"]
mod tests;
