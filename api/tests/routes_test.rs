//! End-to-end tests of the demo routes over the in-memory backend

use std::sync::Arc;

use actix_web::{test, web, App};
use serde_json::{json, Value};
use tk_api::routes::{self, PUBLIC_PATHS};
use tk_api::{AppState, JwtAuthentication};
use tk_core::TokenLifecycleManager;
use tk_infra::MemoryCacheRepository;
use tk_shared::AuthConfig;

macro_rules! test_app {
    () => {{
        let config = AuthConfig::new("routes-test-secret").with_expiration_seconds(Some(3600));
        let manager = Arc::new(
            TokenLifecycleManager::new(config, Arc::new(MemoryCacheRepository::new())).unwrap(),
        );
        test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::new(manager.clone())))
                .wrap(JwtAuthentication::new(manager).exclude(PUBLIC_PATHS))
                .configure(routes::configure),
        )
        .await
    }};
}

fn credentials(username: &str, password: &str) -> Value {
    json!({ "username": username, "password": password })
}

#[actix_web::test]
async fn test_session_flow() {
    let app = test_app!();

    let req = test::TestRequest::post()
        .uri("/sign-up")
        .set_json(credentials("alice", "correct horse"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(credentials("alice", "correct horse"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    let token = body["token"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/profile-info")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let profile: Value = test::read_body_json(resp).await;
    assert_eq!(profile["username"], "alice");
    assert!(profile["user_id"].is_string());

    let req = test::TestRequest::post()
        .uri("/logout")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let req = test::TestRequest::get()
        .uri("/profile-info")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let req = test::TestRequest::post()
        .uri("/logout")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn test_duplicate_sign_up_conflicts() {
    let app = test_app!();

    for expected in [201, 409] {
        let req = test::TestRequest::post()
            .uri("/sign-up")
            .set_json(credentials("bob", "long enough password"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected);
    }
}

#[actix_web::test]
async fn test_bad_credentials_are_rejected() {
    let app = test_app!();

    let req = test::TestRequest::post()
        .uri("/sign-up")
        .set_json(credentials("carol", "correct horse"))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(credentials("carol", "wrong password"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "Invalid username or password.");
    assert_eq!(body["path"], "/login");
}

#[actix_web::test]
async fn test_short_password_fails_validation() {
    let app = test_app!();

    let req = test::TestRequest::post()
        .uri("/sign-up")
        .set_json(credentials("dave", "short"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "Password must be 8 to 128 characters.");
}

#[actix_web::test]
async fn test_profile_requires_token() {
    let app = test_app!();

    let req = test::TestRequest::get().uri("/profile-info").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn test_health_reports_storage() {
    let app = test_app!();

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "memory");
}
