//! Integration tests for authentication endpoints

mod common;

use axum::http::StatusCode;
use serde_json::json;
use smart_school_backend::auth::JwtService;
use smart_school_backend::repositories::PrincipalRepository;
use smart_school_backend::services::{AuthService, Registration};
use smart_school_shared::roles::Role;

fn token_of(response: &serde_json::Value) -> String {
    response["data"]["tokens"]["accessToken"]
        .as_str()
        .expect("access token in response")
        .to_string()
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_register_student_success() {
    let app = common::TestApp::new().await;
    let email = common::unique_email("register");

    let response = app.register_student(&email, "SecurePassword123!").await;

    assert_eq!(response["success"], true);
    let principal = &response["data"]["principal"];
    assert_eq!(principal["email"], email);
    assert_eq!(principal["role"], "student");
    assert_eq!(principal["status"], "active");
    assert!(principal["code"].as_str().unwrap().starts_with("STU-"));
    // Password must never appear in any spelling
    assert!(principal.get("password").is_none());
    assert!(principal.get("passwordHash").is_none());

    let tokens = &response["data"]["tokens"];
    assert!(!tokens["accessToken"].as_str().unwrap().is_empty());
    assert!(!tokens["refreshToken"].as_str().unwrap().is_empty());
    assert_eq!(tokens["tokenType"], "Bearer");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_register_duplicate_email() {
    let app = common::TestApp::new().await;
    let email = common::unique_email("duplicate");
    let body = json!({
        "firstName": "Test",
        "lastName": "Student",
        "email": email,
        "password": "SecurePassword123!",
    })
    .to_string();

    let (status, _) = app.post("/api/v1/auth/register/student", &body).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, response) = app.post("/api/v1/auth/register/student", &body).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(response["message"], "Email already registered");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_concurrent_duplicate_registration_single_winner() {
    let app = common::TestApp::new().await;
    let email = common::unique_email("race");
    let body = json!({
        "firstName": "Race",
        "lastName": "Condition",
        "email": email,
        "password": "SecurePassword123!",
    })
    .to_string();

    // Both requests in flight at once; the unique index must pick one winner.
    let (a, b) = tokio::join!(
        app.post("/api/v1/auth/register/student", &body),
        app.post("/api/v1/auth/register/student", &body),
    );

    let mut statuses = [a.0, b.0];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::CONFLICT]);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_login_success_and_failures_are_uniform() {
    let app = common::TestApp::new().await;
    let email = common::unique_email("login");
    app.register_student(&email, "CorrectPassword123!").await;

    // Correct credentials
    let (status, response) = app
        .post(
            "/api/v1/auth/login",
            &json!({"email": email, "password": "CorrectPassword123!", "userType": "student"})
                .to_string(),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["message"], "Login successful");
    assert!(!token_of(&response).is_empty());
    assert!(response["data"]["principal"]["lastLogin"].is_string());

    // Wrong password and unknown email must be indistinguishable
    let (status_wrong, wrong) = app
        .post(
            "/api/v1/auth/login",
            &json!({"email": email, "password": "WrongPassword123!", "userType": "student"})
                .to_string(),
        )
        .await;
    let (status_unknown, unknown) = app
        .post(
            "/api/v1/auth/login",
            &json!({
                "email": common::unique_email("nobody"),
                "password": "WrongPassword123!",
                "userType": "student"
            })
            .to_string(),
        )
        .await;
    assert_eq!(status_wrong, StatusCode::UNAUTHORIZED);
    assert_eq!(status_unknown, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong["message"], unknown["message"]);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_login_is_scoped_to_user_type() {
    let app = common::TestApp::new().await;
    let email = common::unique_email("scoped");
    app.register_student(&email, "SecurePassword123!").await;

    // Same credentials, wrong account kind
    let (status, _) = app
        .post(
            "/api/v1/auth/login",
            &json!({"email": email, "password": "SecurePassword123!", "userType": "teacher"})
                .to_string(),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_suspended_account_cannot_login() {
    let app = common::TestApp::new().await;
    let email = common::unique_email("suspended");
    app.register_student(&email, "SecurePassword123!").await;

    sqlx::query("UPDATE principals SET status = 'suspended' WHERE email = $1")
        .bind(&email)
        .execute(&app.pool)
        .await
        .unwrap();

    let (status, response) = app
        .post(
            "/api/v1/auth/login",
            &json!({"email": email, "password": "SecurePassword123!", "userType": "student"})
                .to_string(),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(response["message"], "Account is not active");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_profile_round_trip() {
    let app = common::TestApp::new().await;
    let email = common::unique_email("profile");
    let registered = app.register_student(&email, "SecurePassword123!").await;
    let token = token_of(&registered);

    let (status, response) = app.get_auth("/api/v1/auth/profile", &token).await;

    assert_eq!(status, StatusCode::OK);
    let principal = &response["data"];
    assert_eq!(principal["email"], email);
    assert_eq!(principal["role"], "student");
    assert!(principal.get("password").is_none());
    assert!(principal.get("passwordHash").is_none());
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_expired_token_rejected_on_profile() {
    let app = common::TestApp::new().await;
    let email = common::unique_email("expired");
    app.register_student(&email, "SecurePassword123!").await;

    // Same secret as the app, expiry already in the past
    let config = common::test_config();
    let expired = JwtService::new(&config.jwt.secret, None, -2, -2);
    let token = expired
        .issue_access_token(uuid::Uuid::new_v4(), Role::Student, &email)
        .unwrap();

    let (status, response) = app.get_auth("/api/v1/auth/profile", &token).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(response["message"], "Token expired. Please login again.");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_update_password_flow() {
    let app = common::TestApp::new().await;
    let email = common::unique_email("password");
    let registered = app.register_student(&email, "OldPassword123!").await;
    let token = token_of(&registered);

    // Wrong current password: stored hash must stay untouched
    let (status, response) = app
        .put_auth(
            "/api/v1/auth/password",
            &json!({"currentPassword": "NotTheOldOne!", "newPassword": "NewPassword123!"})
                .to_string(),
            &token,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(response["message"], "Current password is incorrect");

    let (status, _) = app
        .post(
            "/api/v1/auth/login",
            &json!({"email": email, "password": "OldPassword123!", "userType": "student"})
                .to_string(),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "old password must still work");

    // Correct current password
    let (status, _) = app
        .put_auth(
            "/api/v1/auth/password",
            &json!({"currentPassword": "OldPassword123!", "newPassword": "NewPassword123!"})
                .to_string(),
            &token,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .post(
            "/api/v1/auth/login",
            &json!({"email": email, "password": "NewPassword123!", "userType": "student"})
                .to_string(),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .post(
            "/api/v1/auth/login",
            &json!({"email": email, "password": "OldPassword123!", "userType": "student"})
                .to_string(),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_admin_registration_requires_admin_role() {
    let app = common::TestApp::new().await;

    // A teacher token must not open the admin registration route
    let teacher_email = common::unique_email("teacher");
    let (status, response) = app
        .post(
            "/api/v1/auth/register/teacher",
            &json!({
                "firstName": "Tess",
                "lastName": "Teacher",
                "email": teacher_email,
                "password": "SecurePassword123!",
            })
            .to_string(),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let teacher_token = token_of(&response);

    let candidate = json!({
        "firstName": "Alma",
        "lastName": "Admin",
        "email": common::unique_email("admin_candidate"),
        "password": "SecurePassword123!",
    })
    .to_string();

    let (status, _) = app
        .post_auth("/api/v1/auth/register/admin", &candidate, &teacher_token)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Seed an admin through the service layer, then the route succeeds
    let admin_email = common::unique_email("admin_seed");
    let seeded = AuthService::register(
        &app.pool,
        app.state.jwt(),
        app.state.passwords(),
        Role::Admin,
        Registration {
            first_name: "Seed".to_string(),
            last_name: "Admin".to_string(),
            email: admin_email.clone(),
            password: "SecurePassword123!".to_string(),
            phone: None,
            date_of_birth: None,
            address: None,
        },
    )
    .await
    .unwrap();
    assert!(seeded.principal.code.starts_with("ADM-"));

    let (status, _) = app
        .post_auth(
            "/api/v1/auth/register/admin",
            &candidate,
            &seeded.tokens.access_token,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_soft_deleted_email_can_be_reclaimed() {
    let app = common::TestApp::new().await;
    let email = common::unique_email("reclaim");
    let registered = app.register_student(&email, "SecurePassword123!").await;
    let id: uuid::Uuid = registered["data"]["principal"]["id"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();

    PrincipalRepository::soft_delete(&app.pool, id).await.unwrap();

    // The partial unique index only covers live rows
    let (status, _) = app
        .post(
            "/api/v1/auth/register/student",
            &json!({
                "firstName": "Test",
                "lastName": "Student",
                "email": email,
                "password": "SecurePassword123!",
            })
            .to_string(),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // And the soft-deleted principal no longer authenticates as itself
    let (status, _) = app
        .post(
            "/api/v1/auth/login",
            &json!({"email": email, "password": "SecurePassword123!", "userType": "student"})
                .to_string(),
        )
        .await;
    // The reclaimer owns the email now; login succeeds against the new row
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_logout_returns_success() {
    let app = common::TestApp::new().await;
    let email = common::unique_email("logout");
    let registered = app.register_student(&email, "SecurePassword123!").await;
    let token = token_of(&registered);

    let (status, response) = app.post_auth("/api/v1/auth/logout", "{}", &token).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["message"], "Logout successful");
}
