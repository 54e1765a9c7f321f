//! Health check endpoints
//!
//! - /health - basic health check with environment info
//! - /health/ready - readiness probe (checks the database)
//! - /health/live - liveness probe (OK whenever the server runs)

use crate::config::AppConfig;
use crate::{db, state::AppState};
use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub environment: &'static str,
    pub version: &'static str,
}

impl HealthResponse {
    fn new(success: bool, message: impl Into<String>) -> Self {
        Self {
            success,
            message: message.into(),
            timestamp: Utc::now(),
            environment: if AppConfig::is_production() {
                "production"
            } else {
                "development"
            },
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// Basic health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::new(true, "Server is healthy"))
}

/// Readiness probe - returns 503 when the database is unreachable
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    match db::health_check(&state.db).await {
        Ok(_) => Ok(Json(HealthResponse::new(true, "Ready"))),
        Err(_) => Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse::new(false, "Database unavailable")),
        )),
    }
}

/// Liveness probe
pub async fn liveness_check() -> Json<HealthResponse> {
    Json(HealthResponse::new(true, "Alive"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check_is_healthy() {
        let response = health_check().await;
        assert!(response.success);
        assert_eq!(response.environment, "development");
        assert!(!response.version.is_empty());
    }

    #[tokio::test]
    async fn test_liveness_check_is_alive() {
        let response = liveness_check().await;
        assert!(response.success);
        assert_eq!(response.message, "Alive");
    }
}
