//! Authentication service
//!
//! Registration, login, password change and profile lookup. Each operation
//! is a single decision sequence over the principal repository and the auth
//! primitives; field validation happens in the route layer before the
//! service is called.
//!
//! Password hashing and verification run on the blocking thread pool.

use chrono::{NaiveDate, Utc};
use rand::Rng;
use smart_school_shared::roles::{Role, Status};
use smart_school_shared::types::{AuthResponse, AuthTokens, PrincipalResponse};
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::auth::{JwtService, PasswordService};
use crate::error::ApiError;
use crate::repositories::{NewPrincipal, PrincipalRecord, PrincipalRepository};

/// Registration fields, already validated by the route layer
#[derive(Debug, Clone)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
}

/// Authentication operations
pub struct AuthService;

impl AuthService {
    /// Register a new principal with the given role
    ///
    /// The `email_exists` pre-check handles the common duplicate case with
    /// a clean 409; the unique index settles concurrent registrations of
    /// the same address, so the losing insert maps to the same error.
    pub async fn register(
        pool: &PgPool,
        jwt: &JwtService,
        passwords: &PasswordService,
        role: Role,
        registration: Registration,
    ) -> Result<AuthResponse, ApiError> {
        if PrincipalRepository::email_exists(pool, &registration.email).await? {
            return Err(ApiError::DuplicateEmail);
        }

        let code = generate_code(role);
        let password_hash = passwords.hash_async(registration.password).await?;

        let record = PrincipalRepository::create(
            pool,
            NewPrincipal {
                code,
                first_name: registration.first_name,
                last_name: registration.last_name,
                email: registration.email,
                phone: registration.phone,
                password_hash,
                role,
                status: Status::Active,
                date_of_birth: registration.date_of_birth,
                address: registration.address,
            },
        )
        .await?;

        let tokens = issue_token_pair(jwt, &record)?;

        Ok(AuthResponse {
            principal: record.into(),
            tokens,
        })
    }

    /// Login scoped to the caller-selected role
    ///
    /// An unknown email and a wrong password produce the same error, so a
    /// caller cannot probe which addresses are registered.
    pub async fn login(
        pool: &PgPool,
        jwt: &JwtService,
        passwords: &PasswordService,
        email: &str,
        password: &str,
        login_role: Role,
    ) -> Result<AuthResponse, ApiError> {
        let record = PrincipalRepository::find_by_email(pool, email, Some(login_role))
            .await?
            .ok_or(ApiError::InvalidCredentials)?;

        if record.status != Status::Active {
            return Err(ApiError::AccountNotActive);
        }

        let valid = passwords
            .verify_async(password.to_string(), record.password_hash.clone())
            .await?;
        if !valid {
            return Err(ApiError::InvalidCredentials);
        }

        // Best-effort: a failed timestamp write must not fail the login.
        let now = Utc::now();
        if let Err(e) = PrincipalRepository::update_last_login(pool, record.id, now).await {
            warn!(principal = %record.id, "Failed to record last login: {}", e);
        }

        let tokens = issue_token_pair(jwt, &record)?;
        let mut principal: PrincipalResponse = record.into();
        principal.last_login = Some(now);

        Ok(AuthResponse { principal, tokens })
    }

    /// Change a principal's password
    ///
    /// Verifies the current password first; the stored hash is untouched on
    /// mismatch. Outstanding tokens stay valid until they expire.
    pub async fn update_password(
        pool: &PgPool,
        passwords: &PasswordService,
        principal_id: Uuid,
        current_password: &str,
        new_password: String,
    ) -> Result<(), ApiError> {
        let record = PrincipalRepository::find_by_id(pool, principal_id)
            .await?
            .ok_or(ApiError::NotFound("Principal"))?;

        let valid = passwords
            .verify_async(current_password.to_string(), record.password_hash.clone())
            .await?;
        if !valid {
            return Err(ApiError::InvalidCurrentPassword);
        }

        let new_hash = passwords.hash_async(new_password).await?;
        PrincipalRepository::update_password(pool, principal_id, &new_hash).await
    }

    /// Fetch a principal's profile, password hash stripped
    pub async fn get_profile(
        pool: &PgPool,
        principal_id: Uuid,
    ) -> Result<PrincipalResponse, ApiError> {
        PrincipalRepository::find_by_id(pool, principal_id)
            .await?
            .map(Into::into)
            .ok_or(ApiError::NotFound("Principal"))
    }
}

fn issue_token_pair(jwt: &JwtService, record: &PrincipalRecord) -> Result<AuthTokens, ApiError> {
    let access_token = jwt
        .issue_access_token(record.id, record.role, &record.email)
        .map_err(ApiError::Internal)?;
    let refresh_token = jwt
        .issue_refresh_token(record.id, record.role, &record.email)
        .map_err(ApiError::Internal)?;

    Ok(AuthTokens {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: jwt.access_token_expiry_secs(),
    })
}

/// Generate the human-readable principal code
///
/// Role prefix, the last 8 digits of the millisecond clock, then 4 random
/// digits. Collisions are improbable; the unique constraint on `code`
/// catches the residual case rather than corrupting data.
fn generate_code(role: Role) -> String {
    let millis = Utc::now().timestamp_millis().to_string();
    let tail = &millis[millis.len().saturating_sub(8)..];
    let suffix: u16 = rand::thread_rng().gen_range(1000..=9999);
    format!("{}-{}{}", role.code_prefix(), tail, suffix)
}
