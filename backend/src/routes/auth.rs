//! Authentication routes
//!
//! Registration, login, profile, password change and logout. Field
//! validation runs here, before the service is called, and surfaces as a
//! 400 with per-field messages.

use crate::auth::Identity;
use crate::error::{ApiError, ApiResult};
use crate::services::{AuthService, Registration};
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use smart_school_shared::roles::Role;
use smart_school_shared::types::{
    ApiResponse, AuthResponse, FieldError, LoginRequest, PrincipalResponse,
    RegisterStaffRequest, RegisterStudentRequest, UpdatePasswordRequest,
};
use smart_school_shared::validation;

/// Create auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register/student", post(register_student))
        .route("/register/teacher", post(register_teacher))
        .route("/register/admin", post(register_admin))
        .route("/login", post(login))
        .route("/profile", get(get_profile))
        .route("/password", put(update_password))
        .route("/logout", post(logout))
}

fn check(errors: &mut Vec<FieldError>, field: &str, result: Result<(), String>) {
    if let Err(message) = result {
        errors.push(FieldError {
            field: field.to_string(),
            message,
        });
    }
}

fn validate_student(req: &RegisterStudentRequest) -> Result<(), ApiError> {
    let mut errors = Vec::new();
    check(&mut errors, "firstName", validation::validate_name(&req.first_name));
    check(&mut errors, "lastName", validation::validate_name(&req.last_name));
    check(&mut errors, "email", validation::validate_email(&req.email));
    check(&mut errors, "password", validation::validate_password(&req.password));
    if let Some(phone) = &req.phone {
        check(&mut errors, "phone", validation::validate_phone(phone));
    }
    if let Some(dob) = req.date_of_birth {
        check(&mut errors, "dateOfBirth", validation::validate_date_of_birth(dob));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

fn validate_staff(req: &RegisterStaffRequest) -> Result<(), ApiError> {
    let mut errors = Vec::new();
    check(&mut errors, "firstName", validation::validate_name(&req.first_name));
    check(&mut errors, "lastName", validation::validate_name(&req.last_name));
    check(&mut errors, "email", validation::validate_email(&req.email));
    check(&mut errors, "password", validation::validate_password(&req.password));
    if let Some(phone) = &req.phone {
        check(&mut errors, "phone", validation::validate_phone(phone));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

/// Register a new student
///
/// POST /api/v1/auth/register/student (public)
async fn register_student(
    State(state): State<AppState>,
    Json(req): Json<RegisterStudentRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<AuthResponse>>)> {
    validate_student(&req)?;

    let result = AuthService::register(
        state.db(),
        state.jwt(),
        state.passwords(),
        Role::Student,
        Registration {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            password: req.password,
            phone: req.phone,
            date_of_birth: req.date_of_birth,
            address: req.address,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(result, "Student registered successfully")),
    ))
}

/// Register a new teacher
///
/// POST /api/v1/auth/register/teacher (public)
async fn register_teacher(
    State(state): State<AppState>,
    Json(req): Json<RegisterStaffRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<AuthResponse>>)> {
    validate_staff(&req)?;

    let result = AuthService::register(
        state.db(),
        state.jwt(),
        state.passwords(),
        Role::Teacher,
        staff_registration(req),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(result, "Teacher registered successfully")),
    ))
}

/// Register a new admin
///
/// POST /api/v1/auth/register/admin (admin/super-admin only)
async fn register_admin(
    State(state): State<AppState>,
    identity: Identity,
    Json(req): Json<RegisterStaffRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<AuthResponse>>)> {
    identity.authorize(&[Role::Admin, Role::SuperAdmin])?;
    validate_staff(&req)?;

    let result = AuthService::register(
        state.db(),
        state.jwt(),
        state.passwords(),
        Role::Admin,
        staff_registration(req),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(result, "Admin registered successfully")),
    ))
}

fn staff_registration(req: RegisterStaffRequest) -> Registration {
    Registration {
        first_name: req.first_name,
        last_name: req.last_name,
        email: req.email,
        password: req.password,
        phone: req.phone,
        date_of_birth: None,
        address: None,
    }
}

/// Login with email, password and account type
///
/// POST /api/v1/auth/login (public)
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<ApiResponse<AuthResponse>>> {
    let role = req
        .user_type
        .parse::<Role>()
        .ok()
        .filter(|r| r.is_login_type())
        .ok_or_else(|| ApiError::BadRequest("Invalid user type".to_string()))?;

    let result = AuthService::login(
        state.db(),
        state.jwt(),
        state.passwords(),
        &req.email,
        &req.password,
        role,
    )
    .await?;

    Ok(Json(ApiResponse::ok(result, "Login successful")))
}

/// Get the authenticated principal's profile
///
/// GET /api/v1/auth/profile (bearer token)
async fn get_profile(
    State(state): State<AppState>,
    identity: Identity,
) -> ApiResult<Json<ApiResponse<PrincipalResponse>>> {
    let profile = AuthService::get_profile(state.db(), identity.id).await?;
    Ok(Json(ApiResponse::ok(profile, "Profile retrieved successfully")))
}

/// Change the authenticated principal's password
///
/// PUT /api/v1/auth/password (bearer token)
async fn update_password(
    State(state): State<AppState>,
    identity: Identity,
    Json(req): Json<UpdatePasswordRequest>,
) -> ApiResult<Json<ApiResponse<()>>> {
    if let Err(message) = validation::validate_password(&req.new_password) {
        return Err(ApiError::Validation(vec![FieldError {
            field: "newPassword".to_string(),
            message,
        }]));
    }

    AuthService::update_password(
        state.db(),
        state.passwords(),
        identity.id,
        &req.current_password,
        req.new_password,
    )
    .await?;

    Ok(Json(ApiResponse::message_only("Password updated successfully")))
}

/// Logout
///
/// POST /api/v1/auth/logout (bearer token)
///
/// Tokens are stateless; the server keeps nothing to invalidate. The
/// client discards its copy.
async fn logout(_identity: Identity) -> Json<ApiResponse<()>> {
    Json(ApiResponse::message_only("Logout successful"))
}
