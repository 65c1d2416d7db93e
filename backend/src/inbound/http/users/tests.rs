//! Tests for account API handlers.

use super::*;
use crate::domain::Role;
use crate::inbound::http::test_utils::TestApp;
use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

fn registration(email: &str) -> Value {
    json!({
        "name": "Alice Example",
        "email": email,
        "password": "correct horse battery",
    })
}

fn detail(body: &Value, key: &str) -> Option<String> {
    body.get("details")
        .and_then(|details| details.get(key))
        .and_then(Value::as_str)
        .map(str::to_owned)
}

#[actix_web::test]
async fn register_then_login_returns_a_bearer_token() {
    let harness = TestApp::new();
    let app = actix_test::init_service(harness.app()).await;

    let req = actix_test::TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(registration(" Alice@X.com "))
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: UserResponse = actix_test::read_body_json(res).await;
    assert_eq!(created.email, "alice@x.com");
    assert_eq!(created.role, "USER");
    assert!(created.active);

    let req = actix_test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({"email": "alice@x.com", "password": "correct horse battery"}))
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let session: LoginResponse = actix_test::read_body_json(res).await;
    assert_eq!(session.token_type, "Bearer");
    assert_eq!(session.user.id, created.id);
    assert!(harness.tokens.validate(&session.token, "alice@x.com"));
}

#[actix_web::test]
async fn duplicate_registration_conflicts() {
    let harness = TestApp::new();
    let app = actix_test::init_service(harness.app()).await;

    for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
        let req = actix_test::TestRequest::post()
            .uri("/api/v1/users/register")
            .set_json(registration("alice@x.com"))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), expected);
        if expected == StatusCode::CONFLICT {
            let body: Value = actix_test::read_body_json(res).await;
            assert_eq!(detail(&body, "code").as_deref(), Some("duplicate_identifier"));
        }
    }
}

#[rstest]
#[case(json!({"name": "", "email": "a@x.com", "password": "long enough"}), "name", "missing_field")]
#[case(json!({"name": "A", "email": "nope", "password": "long enough"}), "email", "invalid_email")]
#[case(json!({"name": "A", "email": "a@x.com", "password": "short"}), "password", "invalid_password")]
#[case(json!({"name": "A", "email": "a@x.com", "password": "long enough", "role": "OWNER"}), "role", "unknown_role")]
#[actix_web::test]
async fn invalid_registrations_name_the_field(
    #[case] payload: Value,
    #[case] field: &str,
    #[case] code: &str,
) {
    let harness = TestApp::new();
    let app = actix_test::init_service(harness.app()).await;
    let req = actix_test::TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(payload)
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body.get("code").and_then(Value::as_str), Some("invalid_request"));
    assert_eq!(detail(&body, "field").as_deref(), Some(field));
    assert_eq!(detail(&body, "code").as_deref(), Some(code));
}

#[rstest]
#[case("alice@x.com", "wrong password")]
#[case("nobody@x.com", "correct horse battery")]
#[actix_web::test]
async fn login_failures_look_the_same(#[case] email: &str, #[case] password: &str) {
    let harness = TestApp::new();
    let app = actix_test::init_service(harness.app()).await;
    let req = actix_test::TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(registration("alice@x.com"))
        .to_request();
    actix_test::call_service(&app, req).await;

    let req = actix_test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({"email": email, "password": password}))
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body.get("message").and_then(Value::as_str), Some("invalid credentials"));
}

#[actix_web::test]
async fn check_email_is_public() {
    let harness = TestApp::new();
    harness.seed_user("alice@x.com", Role::User).await;
    let app = actix_test::init_service(harness.app()).await;

    let req = actix_test::TestRequest::get()
        .uri("/api/v1/users/check-email/ALICE@x.com")
        .to_request();
    let body: EmailCheckResponse = actix_test::call_and_read_body_json(&app, req).await;
    assert!(body.exists);
    assert_eq!(body.email, "alice@x.com");

    let req = actix_test::TestRequest::get()
        .uri("/api/v1/users/check-email/bob@x.com")
        .to_request();
    let body: EmailCheckResponse = actix_test::call_and_read_body_json(&app, req).await;
    assert!(!body.exists);
}

#[rstest]
#[case(None, StatusCode::UNAUTHORIZED)]
#[case(Some(Role::User), StatusCode::FORBIDDEN)]
#[case(Some(Role::Staff), StatusCode::FORBIDDEN)]
#[case(Some(Role::Admin), StatusCode::OK)]
#[actix_web::test]
async fn listing_users_is_for_administrators(
    #[case] role: Option<Role>,
    #[case] expected: StatusCode,
) {
    let harness = TestApp::new();
    let mut req = actix_test::TestRequest::get().uri("/api/v1/users");
    if let Some(role) = role {
        let (_, bearer) = harness.seed_user("caller@x.com", role).await;
        req = req.insert_header((AUTHORIZATION, bearer));
    }
    let app = actix_test::init_service(harness.app()).await;
    let res = actix_test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), expected);
}

#[actix_web::test]
async fn users_may_read_only_their_own_profile() {
    let harness = TestApp::new();
    let (alice, bearer) = harness.seed_user("alice@x.com", Role::User).await;
    let (bob, _) = harness.seed_user("bob@x.com", Role::User).await;
    let app = actix_test::init_service(harness.app()).await;

    let req = actix_test::TestRequest::get()
        .uri(&format!("/api/v1/users/{}", alice.id))
        .insert_header((AUTHORIZATION, bearer.clone()))
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);

    let req = actix_test::TestRequest::get()
        .uri(&format!("/api/v1/users/{}", bob.id))
        .insert_header((AUTHORIZATION, bearer))
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn empty_department_clears_it() {
    let harness = TestApp::new();
    let (alice, bearer) = harness.seed_user("alice@x.com", Role::User).await;
    let app = actix_test::init_service(harness.app()).await;

    let req = actix_test::TestRequest::put()
        .uri(&format!("/api/v1/users/{}", alice.id))
        .insert_header((AUTHORIZATION, bearer.clone()))
        .set_json(json!({"department": "Facilities", "name": "Alice B"}))
        .to_request();
    let updated: UserResponse = actix_test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated.department.as_deref(), Some("Facilities"));
    assert_eq!(updated.display_name, "Alice B");

    let req = actix_test::TestRequest::put()
        .uri(&format!("/api/v1/users/{}", alice.id))
        .insert_header((AUTHORIZATION, bearer))
        .set_json(json!({"department": ""}))
        .to_request();
    let updated: UserResponse = actix_test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated.department, None);
}

#[actix_web::test]
async fn users_cannot_promote_themselves() {
    let harness = TestApp::new();
    let (alice, bearer) = harness.seed_user("alice@x.com", Role::User).await;
    let app = actix_test::init_service(harness.app()).await;

    let req = actix_test::TestRequest::put()
        .uri(&format!("/api/v1/users/{}", alice.id))
        .insert_header((AUTHORIZATION, bearer))
        .set_json(json!({"role": "ADMIN"}))
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn administrators_delete_unreferenced_users() {
    let harness = TestApp::new();
    let (_, admin) = harness.seed_user("admin@x.com", Role::Admin).await;
    let (bob, _) = harness.seed_user("bob@x.com", Role::User).await;
    let app = actix_test::init_service(harness.app()).await;

    let req = actix_test::TestRequest::delete()
        .uri(&format!("/api/v1/users/{}", bob.id))
        .insert_header((AUTHORIZATION, admin.clone()))
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let req = actix_test::TestRequest::get()
        .uri(&format!("/api/v1/users/{}", bob.id))
        .insert_header((AUTHORIZATION, admin))
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn malformed_user_ids_are_rejected() {
    let harness = TestApp::new();
    let (_, admin) = harness.seed_user("admin@x.com", Role::Admin).await;
    let app = actix_test::init_service(harness.app()).await;
    let req = actix_test::TestRequest::get()
        .uri("/api/v1/users/not-a-uuid")
        .insert_header((AUTHORIZATION, admin))
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(detail(&body, "code").as_deref(), Some("invalid_uuid"));
}

fn login_request(email: &str, password: &str) -> actix_test::TestRequest {
    actix_test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({"email": email, "password": password}))
}

#[actix_web::test]
async fn own_password_change_needs_the_current_password() {
    let harness = TestApp::new();
    let app = actix_test::init_service(harness.app()).await;
    let req = actix_test::TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(registration("alice@x.com"))
        .to_request();
    let alice: UserResponse = actix_test::call_and_read_body_json(&app, req).await;
    let req = login_request("alice@x.com", "correct horse battery").to_request();
    let session: LoginResponse = actix_test::call_and_read_body_json(&app, req).await;
    let bearer = format!("Bearer {}", session.token);
    let uri = format!("/api/v1/users/{}/password", alice.id);

    let req = actix_test::TestRequest::put()
        .uri(&uri)
        .insert_header((AUTHORIZATION, bearer.clone()))
        .set_json(json!({"currentPassword": "not it", "newPassword": "battery staple horse"}))
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(detail(&body, "code").as_deref(), Some("invalid_credentials"));
    let req = login_request("alice@x.com", "correct horse battery").to_request();
    assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = actix_test::TestRequest::put()
        .uri(&uri)
        .insert_header((AUTHORIZATION, bearer))
        .set_json(json!({
            "currentPassword": "correct horse battery",
            "newPassword": "battery staple horse"
        }))
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let req = login_request("alice@x.com", "correct horse battery").to_request();
    assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    let req = login_request("alice@x.com", "battery staple horse").to_request();
    assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[rstest]
#[case(Role::User, StatusCode::FORBIDDEN)]
#[case(Role::Staff, StatusCode::FORBIDDEN)]
#[case(Role::Admin, StatusCode::NO_CONTENT)]
#[actix_web::test]
async fn only_administrators_reset_other_passwords(
    #[case] role: Role,
    #[case] expected: StatusCode,
) {
    let harness = TestApp::new();
    let (_, bearer) = harness.seed_user("caller@x.com", role).await;
    let (bob, _) = harness.seed_user("bob@x.com", Role::User).await;
    let app = actix_test::init_service(harness.app()).await;

    let req = actix_test::TestRequest::put()
        .uri(&format!("/api/v1/users/{}/password", bob.id))
        .insert_header((AUTHORIZATION, bearer))
        .set_json(json!({"newPassword": "battery staple horse"}))
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), expected);
    let reset = expected == StatusCode::NO_CONTENT;
    let req = login_request("bob@x.com", "battery staple horse").to_request();
    let status = actix_test::call_service(&app, req).await.status();
    assert_eq!(status == StatusCode::OK, reset);
}

#[actix_web::test]
async fn weak_replacement_passwords_name_the_field() {
    let harness = TestApp::new();
    let (alice, bearer) = harness.seed_user("alice@x.com", Role::User).await;
    let app = actix_test::init_service(harness.app()).await;

    let req = actix_test::TestRequest::put()
        .uri(&format!("/api/v1/users/{}/password", alice.id))
        .insert_header((AUTHORIZATION, bearer))
        .set_json(json!({"currentPassword": "whatever", "newPassword": "short"}))
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(detail(&body, "field").as_deref(), Some("newPassword"));
    assert_eq!(detail(&body, "code").as_deref(), Some("invalid_password"));
}
