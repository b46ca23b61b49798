//! Health check endpoint for service monitoring.

use crate::{db::DbPool, error::AppError, response::ApiResponse};
use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall service status
    pub status: String,

    /// Database connection status
    pub database: String,

    /// Current server timestamp
    pub timestamp: DateTime<Utc>,
}

/// Health check handler.
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "success": true,
///   "data": {
///     "status": "healthy",
///     "database": "connected",
///     "timestamp": "2025-01-15T10:30:00Z"
///   }
/// }
/// ```
///
/// # Response (500 Internal Server Error)
///
/// If the database is unreachable, returns the standard error response.
pub async fn health_check(
    State(pool): State<DbPool>,
) -> Result<Json<ApiResponse<HealthResponse>>, AppError> {
    sqlx::query("SELECT 1").execute(&pool).await?;

    Ok(Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
        database: "connected".to_string(),
        timestamp: Utc::now(),
    })))
}
