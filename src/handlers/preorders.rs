//! HTTP handlers for preorder campaigns.

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
use crate::models::preorder::{CreatePreorderRequest, PreorderResponse};
use crate::response::ApiResponse;
use crate::services::preorder_service;

/// Start a preorder campaign for a book.
///
/// The book is switched to `preorder` status in the same transaction.
///
/// # Security
///
/// Requires an admin API key.
pub async fn create_preorder(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreatePreorderRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth.require_admin()?;

    let preorder = preorder_service::create_preorder(&pool, auth.store_id, request).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(PreorderResponse::from(preorder))),
    ))
}

/// Campaigns open right now, soonest-ending first.
pub async fn list_preorders(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ApiResponse<Vec<PreorderResponse>>>, AppError> {
    let preorders = preorder_service::list_open(&pool, auth.store_id).await?;

    Ok(Json(ApiResponse::ok(
        preorders.into_iter().map(PreorderResponse::from).collect(),
    )))
}

pub async fn get_preorder(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(preorder_id): Path<Uuid>,
) -> Result<Json<ApiResponse<PreorderResponse>>, AppError> {
    let preorder = preorder_service::get_preorder(&pool, auth.store_id, preorder_id).await?;

    Ok(Json(ApiResponse::ok(preorder.into())))
}
