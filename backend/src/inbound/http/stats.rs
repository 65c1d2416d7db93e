//! Office statistics handler.
//!
//! ```text
//! GET /api/v1/stats
//! ```

use std::collections::BTreeMap;

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, ItemCounts, OfficeStatistics, RequestCounts, Role, UserCounts};
use crate::inbound::http::ApiResult;
use crate::inbound::http::caller::Caller;
use crate::inbound::http::state::HttpState;

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemCountsResponse {
    pub total: usize,
    pub lost: usize,
    pub found: usize,
    /// Every item status, zeros included.
    pub by_status: BTreeMap<String, usize>,
}

impl From<ItemCounts> for ItemCountsResponse {
    fn from(value: ItemCounts) -> Self {
        Self {
            total: value.total,
            lost: value.lost,
            found: value.found,
            by_status: value
                .by_status
                .into_iter()
                .map(|(status, count)| (status.as_str().to_owned(), count))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestCountsResponse {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

impl From<RequestCounts> for RequestCountsResponse {
    fn from(value: RequestCounts) -> Self {
        Self {
            total: value.total,
            pending: value.pending,
            approved: value.approved,
            rejected: value.rejected,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserCountsResponse {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub by_role: BTreeMap<String, usize>,
}

impl From<UserCounts> for UserCountsResponse {
    fn from(value: UserCounts) -> Self {
        let by_role = [
            (Role::User, value.users),
            (Role::Staff, value.staff),
            (Role::Admin, value.admins),
        ]
        .into_iter()
        .map(|(role, count)| (role.as_str().to_owned(), count))
        .collect();
        Self {
            total: value.total,
            active: value.active,
            inactive: value.inactive,
            by_role,
        }
    }
}

/// Office-wide counts.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsResponse {
    pub items: ItemCountsResponse,
    pub requests: RequestCountsResponse,
    pub users: UserCountsResponse,
}

impl From<OfficeStatistics> for StatisticsResponse {
    fn from(value: OfficeStatistics) -> Self {
        Self {
            items: value.items.into(),
            requests: value.requests.into(),
            users: value.users.into(),
        }
    }
}

/// Item, request, and account counts. Administrators only.
#[utoipa::path(
    get,
    path = "/api/v1/stats",
    responses(
        (status = 200, description = "Counts", body = StatisticsResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["stats"],
    operation_id = "getStatistics",
    security(("BearerAuth" = []))
)]
#[get("/stats")]
pub async fn get_statistics(
    state: web::Data<HttpState>,
    caller: Caller,
) -> ApiResult<web::Json<StatisticsResponse>> {
    let statistics = state.statistics.office_statistics(caller.context()).await?;
    Ok(web::Json(statistics.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ItemStatus;
    use crate::domain::ports::ItemRepository;
    use crate::inbound::http::test_utils::TestApp;
    use crate::test_support::item;
    use actix_web::http::StatusCode;
    use actix_web::http::header::AUTHORIZATION;
    use actix_web::test as actix_test;
    use rstest::rstest;

    #[rstest]
    #[case(None, StatusCode::UNAUTHORIZED)]
    #[case(Some(Role::User), StatusCode::FORBIDDEN)]
    #[case(Some(Role::Staff), StatusCode::FORBIDDEN)]
    #[case(Some(Role::Admin), StatusCode::OK)]
    #[actix_web::test]
    async fn statistics_are_for_administrators(
        #[case] role: Option<Role>,
        #[case] expected: StatusCode,
    ) {
        let harness = TestApp::new();
        let mut req = actix_test::TestRequest::get().uri("/api/v1/stats");
        if let Some(role) = role {
            let (_, bearer) = harness.seed_user("caller@x.com", role).await;
            req = req.insert_header((AUTHORIZATION, bearer));
        }
        let app = actix_test::init_service(harness.app()).await;
        let res = actix_test::call_service(&app, req.to_request()).await;
        assert_eq!(res.status(), expected);
    }

    #[actix_web::test]
    async fn statistics_count_items_and_accounts() {
        let harness = TestApp::new();
        let (admin, bearer) = harness.seed_user("admin@x.com", Role::Admin).await;
        harness.seed_user("alice@x.com", Role::User).await;
        for status in [ItemStatus::Open, ItemStatus::Claimed, ItemStatus::Claimed] {
            ItemRepository::insert(&harness.store, &item(admin.id, status))
                .await
                .unwrap_or_else(|err| panic!("seed item: {err}"));
        }
        let app = actix_test::init_service(harness.app()).await;

        let req = actix_test::TestRequest::get()
            .uri("/api/v1/stats")
            .insert_header((AUTHORIZATION, bearer))
            .to_request();
        let body: StatisticsResponse = actix_test::call_and_read_body_json(&app, req).await;

        assert_eq!(body.items.total, 3);
        assert_eq!(body.items.found, 3);
        assert_eq!(body.items.by_status.get("CLAIMED"), Some(&2));
        assert_eq!(body.items.by_status.get("EXPIRED"), Some(&0));
        assert_eq!(body.requests.total, 0);
        assert_eq!(body.users.total, 2);
        assert_eq!(body.users.by_role.get("ADMIN"), Some(&1));
        assert_eq!(body.users.by_role.get("STAFF"), Some(&0));
    }
}
