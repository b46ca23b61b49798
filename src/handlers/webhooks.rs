//! HTTP handlers for store webhook endpoint management.
//!
//! Stores register URLs here to be told when their orders are paid.
//! All endpoints require an admin API key.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::webhook::{WebhookEndpointRequest, WebhookEndpointResponse};
use crate::response::ApiResponse;
use crate::services::webhook_service;

/// Register a new webhook endpoint.
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://shop.example.com/hooks/folio"
/// }
/// ```
///
/// # Response
///
/// Returns 201 Created with the endpoint details.
/// The `secret` is only returned once, during creation.
///
/// ```json
/// {
///   "success": true,
///   "data": {
///     "id": "550e8400-e29b-41d4-a716-446655440000",
///     "url": "https://shop.example.com/hooks/folio",
///     "secret": "a1b2c3d4e5f6...",
///     "is_active": true,
///     "created_at": "2025-01-15T10:30:00Z"
///   }
/// }
/// ```
///
/// # Security
///
/// - HTTPS URLs required (HTTP localhost allowed for development)
/// - Secret is a 64-character hex string for HMAC-SHA256
pub async fn create_webhook(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<WebhookEndpointRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth.require_admin()?;

    let endpoint = webhook_service::create_webhook_endpoint(&pool, auth.store_id, request).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(endpoint))))
}

/// List the store's active webhook endpoints. Secrets are never returned.
pub async fn list_webhooks(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ApiResponse<Vec<WebhookEndpointResponse>>>, AppError> {
    auth.require_admin()?;

    let webhooks = webhook_service::list_webhook_endpoints(&pool, auth.store_id).await?;

    Ok(Json(ApiResponse::ok(webhooks)))
}

/// Delete a webhook endpoint (soft delete).
///
/// # Response
///
/// Returns 204 No Content on success, 404 if the endpoint does not belong to
/// the store. Delivery history is kept.
pub async fn delete_webhook(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(webhook_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    auth.require_admin()?;

    webhook_service::delete_webhook_endpoint(&pool, auth.store_id, webhook_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
