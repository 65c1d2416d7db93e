//! Claim request API handlers.
//!
//! ```text
//! POST /api/v1/requests {"itemId":"3fa85f64-5717-4562-b3fc-2c963f66afa6"}
//! GET /api/v1/requests
//! GET|DELETE /api/v1/requests/{id}
//! PUT /api/v1/requests/{id}/approve
//! PUT /api/v1/requests/{id}/reject
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ClaimRequest, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::caller::Caller;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, missing_field_error, parse_item_id, parse_request_id, parse_user_id,
};

/// Body for `POST /api/v1/requests`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileRequestBody {
    #[schema(format = "uuid")]
    pub item_id: Option<String>,
    /// File on behalf of another user. Staff and administrators only.
    #[schema(format = "uuid")]
    pub requester_id: Option<String>,
}

/// A claim request as seen by its requester and by reviewers.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRequestResponse {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub item_id: String,
    #[schema(format = "uuid")]
    pub requester_id: String,
    #[schema(example = "PENDING")]
    pub status: String,
    #[schema(format = "date-time")]
    pub requested_at: String,
    #[schema(format = "date")]
    pub approved_date: Option<String>,
}

impl From<ClaimRequest> for ClaimRequestResponse {
    fn from(value: ClaimRequest) -> Self {
        Self {
            id: value.id.to_string(),
            item_id: value.item_id.to_string(),
            requester_id: value.requester.to_string(),
            status: value.status.as_str().to_owned(),
            requested_at: value.requested_at.to_rfc3339(),
            approved_date: value.approved_date.map(|date| date.to_string()),
        }
    }
}

/// File a claim against an item.
///
/// Claimed or otherwise closed items answer 409 and nothing is recorded.
#[utoipa::path(
    post,
    path = "/api/v1/requests",
    request_body = FileRequestBody,
    responses(
        (status = 201, description = "Request filed", body = ClaimRequestResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Item or requester not found", body = Error),
        (status = 409, description = "Item no longer accepts claims", body = Error)
    ),
    tags = ["requests"],
    operation_id = "fileRequest",
    security(("BearerAuth" = []))
)]
#[post("/requests")]
pub async fn file_request(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<FileRequestBody>,
) -> ApiResult<HttpResponse> {
    let FileRequestBody {
        item_id,
        requester_id,
    } = payload.into_inner();
    let item_field = FieldName::new("itemId");
    let item_id = item_id.ok_or_else(|| missing_field_error(item_field))?;
    let item_id = parse_item_id(&item_id, item_field)?;
    let requester = requester_id
        .as_deref()
        .map(|raw| parse_user_id(raw, FieldName::new("requesterId")))
        .transpose()?;

    let request = state
        .claims
        .file_request(caller.context(), &item_id, requester)
        .await?;
    Ok(HttpResponse::Created().json(ClaimRequestResponse::from(request)))
}

/// Requests visible to the caller: all of them for administrators, the
/// caller's own otherwise.
#[utoipa::path(
    get,
    path = "/api/v1/requests",
    responses(
        (status = 200, description = "Requests", body = [ClaimRequestResponse]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["requests"],
    operation_id = "listRequests",
    security(("BearerAuth" = []))
)]
#[get("/requests")]
pub async fn list_requests(
    state: web::Data<HttpState>,
    caller: Caller,
) -> ApiResult<web::Json<Vec<ClaimRequestResponse>>> {
    let requests = state.claims.list_requests(caller.context()).await?;
    Ok(web::Json(
        requests
            .into_iter()
            .map(ClaimRequestResponse::from)
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/requests/{id}",
    params(("id" = uuid::Uuid, Path, description = "Request identifier")),
    responses(
        (status = 200, description = "Request", body = ClaimRequestResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["requests"],
    operation_id = "getRequest",
    security(("BearerAuth" = []))
)]
#[get("/requests/{id}")]
pub async fn get_request(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<web::Json<ClaimRequestResponse>> {
    let id = parse_request_id(&path, FieldName::new("id"))?;
    let request = state.claims.get_request(caller.context(), &id).await?;
    Ok(web::Json(request.into()))
}

/// Approve a pending request and mark its item claimed. Administrators only.
#[utoipa::path(
    put,
    path = "/api/v1/requests/{id}/approve",
    params(("id" = uuid::Uuid, Path, description = "Request identifier")),
    responses(
        (status = 200, description = "Approved request", body = ClaimRequestResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Already decided, or item already claimed", body = Error)
    ),
    tags = ["requests"],
    operation_id = "approveRequest",
    security(("BearerAuth" = []))
)]
#[put("/requests/{id}/approve")]
pub async fn approve_request(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<web::Json<ClaimRequestResponse>> {
    let id = parse_request_id(&path, FieldName::new("id"))?;
    let request = state.claims.approve(caller.context(), &id).await?;
    Ok(web::Json(request.into()))
}

/// Reject a pending request. Administrators only.
#[utoipa::path(
    put,
    path = "/api/v1/requests/{id}/reject",
    params(("id" = uuid::Uuid, Path, description = "Request identifier")),
    responses(
        (status = 200, description = "Rejected request", body = ClaimRequestResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Already decided", body = Error)
    ),
    tags = ["requests"],
    operation_id = "rejectRequest",
    security(("BearerAuth" = []))
)]
#[put("/requests/{id}/reject")]
pub async fn reject_request(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<web::Json<ClaimRequestResponse>> {
    let id = parse_request_id(&path, FieldName::new("id"))?;
    let request = state.claims.reject(caller.context(), &id).await?;
    Ok(web::Json(request.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/requests/{id}",
    params(("id" = uuid::Uuid, Path, description = "Request identifier")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["requests"],
    operation_id = "deleteRequest",
    security(("BearerAuth" = []))
)]
#[delete("/requests/{id}")]
pub async fn delete_request(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_request_id(&path, FieldName::new("id"))?;
    state.claims.delete_request(caller.context(), &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    //! Handler wiring against a mocked workflow; the workflow rules have
    //! their own tests.
    use std::sync::Arc;

    use super::*;
    use crate::domain::ports::{
        MockClaimWorkflow, MockItemCatalogue, MockStatistics, MockUserAccounts,
    };
    use crate::domain::{
        AccessContext, ClaimRequestId, ClaimStatus, ItemId, Principal, Role, UserId,
        WorkflowError,
    };
    use crate::test_support::{fixture_now, user};
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpMessage, test as actix_test};
    use serde_json::{Value, json};

    fn state_with(claims: MockClaimWorkflow) -> web::Data<HttpState> {
        web::Data::new(HttpState::new(
            Arc::new(MockUserAccounts::new()),
            Arc::new(MockItemCatalogue::new()),
            Arc::new(claims),
            Arc::new(MockStatistics::new()),
        ))
    }

    fn admin() -> AccessContext {
        AccessContext::Authenticated(Principal::from_user(&user("admin@x.com", Role::Admin)))
    }

    macro_rules! app_as {
        ($claims:expr, $context:expr) => {{
            let context = $context;
            actix_test::init_service(
                App::new()
                    .app_data(state_with($claims))
                    .wrap_fn(move |req, srv| {
                        req.extensions_mut().insert(context.clone());
                        actix_web::dev::Service::call(srv, req)
                    })
                    .service(
                        web::scope("/api/v1")
                            .service(file_request)
                            .service(approve_request)
                            .service(delete_request),
                    ),
            )
            .await
        }};
    }

    #[actix_web::test]
    async fn filing_passes_ids_through() {
        let item_id = ItemId::random();
        let requester = UserId::random();
        let mut claims = MockClaimWorkflow::new();
        claims
            .expect_file_request()
            .withf(move |_, item, who| *item == item_id && *who == Some(requester))
            .times(1)
            .returning(move |_, item, who| {
                Ok(ClaimRequest::file(
                    *item,
                    who.unwrap_or_else(UserId::random),
                    fixture_now(),
                ))
            });
        let app = app_as!(claims, admin());

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/requests")
            .set_json(json!({ "itemId": item_id.to_string(), "requesterId": requester.to_string() }))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: ClaimRequestResponse = actix_test::read_body_json(res).await;
        assert_eq!(body.status, "PENDING");
        assert_eq!(body.requester_id, requester.to_string());
    }

    #[actix_web::test]
    async fn missing_item_id_is_a_field_error() {
        let mut claims = MockClaimWorkflow::new();
        claims.expect_file_request().never();
        let app = app_as!(claims, admin());

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/requests")
            .set_json(json!({}))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["details"]["field"], "itemId");
        assert_eq!(body["details"]["code"], "missing_field");
    }

    #[actix_web::test]
    async fn repeated_decisions_surface_as_conflicts() {
        let mut claims = MockClaimWorkflow::new();
        claims.expect_approve().returning(|_, id| {
            Err(WorkflowError::RequestAlreadyDecided {
                id: *id,
                status: ClaimStatus::Approved,
            }
            .into())
        });
        let app = app_as!(claims, admin());

        let id = ClaimRequestId::random();
        let req = actix_test::TestRequest::put()
            .uri(&format!("/api/v1/requests/{id}/approve"))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CONFLICT);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["details"]["code"], "request_already_decided");
    }

    #[actix_web::test]
    async fn deletion_answers_no_content() {
        let mut claims = MockClaimWorkflow::new();
        claims.expect_delete_request().times(1).returning(|_, _| Ok(()));
        let app = app_as!(claims, admin());

        let id = ClaimRequestId::random();
        let req = actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/requests/{id}"))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }
}
