//! HTTP handlers for discount coupons.

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
use crate::models::coupon::{
    CouponResponse, CouponValidationResponse, CreateCouponRequest, ValidateCouponRequest,
};
use crate::response::ApiResponse;
use crate::services::coupon_service;

/// Create a coupon.
///
/// # Request Body
///
/// ```json
/// {
///   "code": "launch20",
///   "discount_type": "percentage",
///   "discount_value": 20,
///   "max_uses": 100,
///   "expires_at": "2025-02-01T00:00:00Z"
/// }
/// ```
///
/// The code is stored uppercase (`LAUNCH20`) and matched case-insensitively.
///
/// # Security
///
/// Requires an admin API key.
pub async fn create_coupon(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateCouponRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth.require_admin()?;

    let coupon = coupon_service::create_coupon(&pool, auth.store_id, request).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(CouponResponse::from(coupon))),
    ))
}

pub async fn list_coupons(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ApiResponse<Vec<CouponResponse>>>, AppError> {
    auth.require_admin()?;

    let coupons = coupon_service::list_coupons(&pool, auth.store_id).await?;

    Ok(Json(ApiResponse::ok(
        coupons.into_iter().map(CouponResponse::from).collect(),
    )))
}

/// Preview what a code takes off a subtotal.
///
/// Nothing is consumed; uses are only counted when an order is paid.
///
/// # Response
///
/// ```json
/// {
///   "success": true,
///   "data": { "code": "LAUNCH20", "discount_minor": 90000, "total_minor": 360000 }
/// }
/// ```
pub async fn validate_coupon(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<ValidateCouponRequest>,
) -> Result<Json<ApiResponse<CouponValidationResponse>>, AppError> {
    let preview = coupon_service::validate_coupon(
        &pool,
        auth.store_id,
        &request.code,
        request.subtotal_minor,
    )
    .await?;

    Ok(Json(ApiResponse::ok(preview)))
}

/// Deactivate a coupon (soft delete). Returns 204 No Content.
pub async fn deactivate_coupon(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(coupon_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    auth.require_admin()?;

    coupon_service::deactivate_coupon(&pool, auth.store_id, coupon_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
