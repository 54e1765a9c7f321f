//! Principal repository
//!
//! All queries exclude soft-deleted rows. Email uniqueness is enforced by a
//! partial unique index on `LOWER(email)`, so two concurrent registrations
//! with the same address cannot both succeed; the loser's insert surfaces
//! here as `DuplicateEmail`.

use chrono::{DateTime, NaiveDate, Utc};
use smart_school_shared::roles::{Role, Status};
use smart_school_shared::types::PrincipalResponse;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;

/// Principal row as stored
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PrincipalRecord {
    pub id: Uuid,
    pub code: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    #[sqlx(try_from = "String")]
    pub status: Status,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PrincipalRecord> for PrincipalResponse {
    fn from(record: PrincipalRecord) -> Self {
        PrincipalResponse {
            id: record.id,
            code: record.code,
            first_name: record.first_name,
            last_name: record.last_name,
            email: record.email,
            phone: record.phone,
            role: record.role,
            status: record.status,
            date_of_birth: record.date_of_birth,
            address: record.address,
            last_login: record.last_login,
            created_at: record.created_at,
        }
    }
}

/// Input for creating a principal (password already hashed)
#[derive(Debug, Clone)]
pub struct NewPrincipal {
    pub code: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role: Role,
    pub status: Status,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
}

/// Principal repository for database operations
pub struct PrincipalRepository;

impl PrincipalRepository {
    /// Insert a new principal
    ///
    /// The email uniqueness race is settled by the storage constraint, not
    /// by `email_exists` pre-checks.
    pub async fn create(pool: &PgPool, new: NewPrincipal) -> Result<PrincipalRecord, ApiError> {
        sqlx::query_as::<_, PrincipalRecord>(
            r#"
            INSERT INTO principals
                (id, code, first_name, last_name, email, phone, password_hash,
                 role, status, date_of_birth, address)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, code, first_name, last_name, email, phone, password_hash,
                      role, status, date_of_birth, address, last_login,
                      created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.code)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.password_hash)
        .bind(new.role.as_str())
        .bind(new.status.as_str())
        .bind(new.date_of_birth)
        .bind(&new.address)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db) = &e {
                if db.is_unique_violation() && db.constraint() == Some("principals_email_unique") {
                    return ApiError::DuplicateEmail;
                }
            }
            ApiError::Database(e)
        })
    }

    /// Find a principal by email, optionally scoped to one role
    pub async fn find_by_email(
        pool: &PgPool,
        email: &str,
        role: Option<Role>,
    ) -> Result<Option<PrincipalRecord>, ApiError> {
        let record = match role {
            Some(role) => {
                sqlx::query_as::<_, PrincipalRecord>(
                    r#"
                    SELECT id, code, first_name, last_name, email, phone, password_hash,
                           role, status, date_of_birth, address, last_login,
                           created_at, updated_at
                    FROM principals
                    WHERE LOWER(email) = LOWER($1) AND role = $2 AND deleted_at IS NULL
                    "#,
                )
                .bind(email)
                .bind(role.as_str())
                .fetch_optional(pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, PrincipalRecord>(
                    r#"
                    SELECT id, code, first_name, last_name, email, phone, password_hash,
                           role, status, date_of_birth, address, last_login,
                           created_at, updated_at
                    FROM principals
                    WHERE LOWER(email) = LOWER($1) AND deleted_at IS NULL
                    "#,
                )
                .bind(email)
                .fetch_optional(pool)
                .await?
            }
        };

        Ok(record)
    }

    /// Find a principal by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<PrincipalRecord>, ApiError> {
        let record = sqlx::query_as::<_, PrincipalRecord>(
            r#"
            SELECT id, code, first_name, last_name, email, phone, password_hash,
                   role, status, date_of_birth, address, last_login,
                   created_at, updated_at
            FROM principals
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Check if an email is claimed by a live principal
    pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, ApiError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM principals
                WHERE LOWER(email) = LOWER($1) AND deleted_at IS NULL
            )
            "#,
        )
        .bind(email)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Replace the stored password hash
    pub async fn update_password(
        pool: &PgPool,
        id: Uuid,
        new_hash: &str,
    ) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            UPDATE principals
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(new_hash)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Record a successful login
    pub async fn update_last_login(
        pool: &PgPool,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            UPDATE principals
            SET last_login = $2, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(at)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Mark a principal deleted without removing the row
    pub async fn soft_delete(pool: &PgPool, id: Uuid) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            UPDATE principals
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(())
    }
}
