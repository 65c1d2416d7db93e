//! Item API handlers.
//!
//! ```text
//! GET /api/v1/items?status=OPEN
//! POST /api/v1/items {"name":"Umbrella","description":"Black","location":"Library","kind":"FOUND"}
//! GET|PUT|DELETE /api/v1/items/{id}
//! PUT /api/v1/items/{id}/status {"status":"RETURNED"}
//! GET /api/v1/items/{id}/requests
//! GET /api/v1/me/items
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::ReportItem;
use crate::domain::{ClaimRequest, Error, Item, ItemDetails, ItemFilter};
use crate::inbound::http::ApiResult;
use crate::inbound::http::caller::Caller;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, map_item_validation_error, parse_item_id, parse_item_kind, parse_item_status,
    parse_user_id,
};

/// Descriptive fields shared by report and update bodies.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemFields {
    #[schema(example = "Umbrella")]
    pub name: String,
    #[schema(example = "Black, folding, wooden handle")]
    pub description: String,
    #[schema(example = "Library foyer")]
    pub location: String,
    pub category: Option<String>,
    /// `LOST` or `FOUND`.
    pub kind: Option<String>,
}

impl TryFrom<ItemFields> for ItemDetails {
    type Error = Error;

    fn try_from(value: ItemFields) -> Result<Self, Self::Error> {
        let kind = value
            .kind
            .as_deref()
            .map(|raw| parse_item_kind(raw, FieldName::new("kind")))
            .transpose()?;
        Self::try_new(
            &value.name,
            &value.description,
            &value.location,
            value.category.as_deref(),
            kind,
        )
        .map_err(|err| map_item_validation_error(&err))
    }
}

/// Body for `POST /api/v1/items`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportItemRequest {
    #[serde(flatten)]
    pub fields: ItemFields,
    /// Report on behalf of another user. Staff and administrators only.
    #[schema(format = "uuid")]
    pub reporter_id: Option<String>,
}

/// Body for `PUT /api/v1/items/{id}/status`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeRequest {
    #[schema(example = "RETURNED")]
    pub status: String,
}

/// Public item projection.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    #[schema(format = "uuid")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub location: String,
    pub category: Option<String>,
    pub kind: Option<String>,
    #[schema(format = "uuid")]
    pub reporter_id: String,
    #[schema(example = "OPEN")]
    pub status: String,
    #[schema(format = "date-time")]
    pub reported_at: String,
}

impl From<Item> for ItemResponse {
    fn from(value: Item) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.details.name().to_owned(),
            description: value.details.description().to_owned(),
            location: value.details.location().to_owned(),
            category: value.details.category().map(str::to_owned),
            kind: value.details.kind().map(|kind| kind.as_str().to_owned()),
            reporter_id: value.reporter.to_string(),
            status: value.status.as_str().to_owned(),
            reported_at: value.reported_at.to_rfc3339(),
        }
    }
}

/// Claim status of one request, without the requester's identity.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemClaimResponse {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub item_id: String,
    #[schema(example = "PENDING")]
    pub status: String,
    #[schema(format = "date-time")]
    pub requested_at: String,
    #[schema(format = "date")]
    pub approved_date: Option<String>,
}

impl From<ClaimRequest> for ItemClaimResponse {
    fn from(value: ClaimRequest) -> Self {
        Self {
            id: value.id.to_string(),
            item_id: value.item_id.to_string(),
            status: value.status.as_str().to_owned(),
            requested_at: value.requested_at.to_rfc3339(),
            approved_date: value.approved_date.map(|date| date.to_string()),
        }
    }
}

/// Filters for `GET /api/v1/items`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ItemListQuery {
    /// Only items in this status.
    pub status: Option<String>,
    /// Only items reported by this user.
    pub reporter: Option<String>,
}

impl TryFrom<ItemListQuery> for ItemFilter {
    type Error = Error;

    fn try_from(value: ItemListQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            status: value
                .status
                .as_deref()
                .map(|raw| parse_item_status(raw, FieldName::new("status")))
                .transpose()?,
            reporter: value
                .reporter
                .as_deref()
                .map(|raw| parse_user_id(raw, FieldName::new("reporter")))
                .transpose()?,
        })
    }
}

fn into_responses(items: Vec<Item>) -> Vec<ItemResponse> {
    items.into_iter().map(ItemResponse::from).collect()
}

/// List items, optionally filtered.
#[utoipa::path(
    get,
    path = "/api/v1/items",
    params(ItemListQuery),
    responses(
        (status = 200, description = "Items", body = [ItemResponse]),
        (status = 400, description = "Invalid filter", body = Error)
    ),
    tags = ["items"],
    operation_id = "listItems",
    security([])
)]
#[get("/items")]
pub async fn list_items(
    state: web::Data<HttpState>,
    query: web::Query<ItemListQuery>,
) -> ApiResult<web::Json<Vec<ItemResponse>>> {
    let filter = ItemFilter::try_from(query.into_inner())?;
    let items = state.items.list_items(&filter).await?;
    Ok(web::Json(into_responses(items)))
}

/// Report a lost or found item.
#[utoipa::path(
    post,
    path = "/api/v1/items",
    request_body = ReportItemRequest,
    responses(
        (status = 201, description = "Item reported", body = ItemResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Reporter not found", body = Error)
    ),
    tags = ["items"],
    operation_id = "reportItem",
    security(("BearerAuth" = []))
)]
#[post("/items")]
pub async fn report_item(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<ReportItemRequest>,
) -> ApiResult<HttpResponse> {
    let ReportItemRequest {
        fields,
        reporter_id,
    } = payload.into_inner();
    let report = ReportItem {
        details: ItemDetails::try_from(fields)?,
        reporter: reporter_id
            .as_deref()
            .map(|raw| parse_user_id(raw, FieldName::new("reporterId")))
            .transpose()?,
    };
    let item = state.items.report_item(caller.context(), report).await?;
    Ok(HttpResponse::Created().json(ItemResponse::from(item)))
}

/// Items reported by the caller.
#[utoipa::path(
    get,
    path = "/api/v1/me/items",
    responses(
        (status = 200, description = "Items", body = [ItemResponse]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["items"],
    operation_id = "listMyItems",
    security(("BearerAuth" = []))
)]
#[get("/me/items")]
pub async fn list_my_items(
    state: web::Data<HttpState>,
    caller: Caller,
) -> ApiResult<web::Json<Vec<ItemResponse>>> {
    let items = state.items.list_my_items(caller.context()).await?;
    Ok(web::Json(into_responses(items)))
}

#[utoipa::path(
    get,
    path = "/api/v1/items/{id}",
    params(("id" = uuid::Uuid, Path, description = "Item identifier")),
    responses(
        (status = 200, description = "Item", body = ItemResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["items"],
    operation_id = "getItem",
    security([])
)]
#[get("/items/{id}")]
pub async fn get_item(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<ItemResponse>> {
    let id = parse_item_id(&path, FieldName::new("id"))?;
    let item = state.items.get_item(&id).await?;
    Ok(web::Json(item.into()))
}

/// Replace an item's descriptive fields. Owner, staff or administrator.
#[utoipa::path(
    put,
    path = "/api/v1/items/{id}",
    params(("id" = uuid::Uuid, Path, description = "Item identifier")),
    request_body = ItemFields,
    responses(
        (status = 200, description = "Updated item", body = ItemResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["items"],
    operation_id = "updateItem",
    security(("BearerAuth" = []))
)]
#[put("/items/{id}")]
pub async fn update_item(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
    payload: web::Json<ItemFields>,
) -> ApiResult<web::Json<ItemResponse>> {
    let id = parse_item_id(&path, FieldName::new("id"))?;
    let details = ItemDetails::try_from(payload.into_inner())?;
    let item = state
        .items
        .update_item(caller.context(), &id, details)
        .await?;
    Ok(web::Json(item.into()))
}

/// Moderate an item's status. Staff and administrators.
#[utoipa::path(
    put,
    path = "/api/v1/items/{id}/status",
    params(("id" = uuid::Uuid, Path, description = "Item identifier")),
    request_body = StatusChangeRequest,
    responses(
        (status = 200, description = "Updated item", body = ItemResponse),
        (status = 400, description = "Invalid or illegal status", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Status changed concurrently", body = Error)
    ),
    tags = ["items"],
    operation_id = "reviewItem",
    security(("BearerAuth" = []))
)]
#[put("/items/{id}/status")]
pub async fn review_item(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
    payload: web::Json<StatusChangeRequest>,
) -> ApiResult<web::Json<ItemResponse>> {
    let id = parse_item_id(&path, FieldName::new("id"))?;
    let status = parse_item_status(&payload.status, FieldName::new("status"))?;
    let item = state
        .items
        .review_item(caller.context(), &id, status)
        .await?;
    Ok(web::Json(item.into()))
}

/// Delete an item and every request filed against it. Administrators only.
#[utoipa::path(
    delete,
    path = "/api/v1/items/{id}",
    params(("id" = uuid::Uuid, Path, description = "Item identifier")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["items"],
    operation_id = "deleteItem",
    security(("BearerAuth" = []))
)]
#[delete("/items/{id}")]
pub async fn delete_item(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_item_id(&path, FieldName::new("id"))?;
    state.claims.delete_item(caller.context(), &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Public claim status of an item's requests.
#[utoipa::path(
    get,
    path = "/api/v1/items/{id}/requests",
    params(("id" = uuid::Uuid, Path, description = "Item identifier")),
    responses(
        (status = 200, description = "Requests against the item", body = [ItemClaimResponse]),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["items"],
    operation_id = "listItemRequests",
    security([])
)]
#[get("/items/{id}/requests")]
pub async fn list_item_requests(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<ItemClaimResponse>>> {
    let id = parse_item_id(&path, FieldName::new("id"))?;
    let requests = state.claims.list_item_requests(&id).await?;
    Ok(web::Json(
        requests.into_iter().map(ItemClaimResponse::from).collect(),
    ))
}

#[cfg(test)]
#[path = "items_tests.rs"]
mod tests;
