//! HTTP handlers for order administration.
//!
//! All endpoints here require an admin API key.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};

use crate::db::DbPool;
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::order::{OrderListQuery, OrderResponse};
use crate::models::payment_event::PaymentEvent;
use crate::response::ApiResponse;
use crate::services::order_service;

/// List orders, newest first.
///
/// # Query Parameters
///
/// - `status`: `pending`, `paid`, `failed` or `cancelled`
pub async fn list_orders(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<ApiResponse<Vec<OrderResponse>>>, AppError> {
    auth.require_admin()?;

    let orders = order_service::list_orders(&pool, auth.store_id, query.status).await?;

    Ok(Json(ApiResponse::ok(
        orders.into_iter().map(OrderResponse::from).collect(),
    )))
}

pub async fn get_order(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(reference): Path<String>,
) -> Result<Json<ApiResponse<OrderResponse>>, AppError> {
    auth.require_admin()?;

    let order = order_service::get_order_by_reference(&pool, auth.store_id, &reference).await?;

    Ok(Json(ApiResponse::ok(order.into())))
}

/// Cancel a pending order.
///
/// Returns 409 Conflict if the order is already paid, failed or cancelled.
pub async fn cancel_order(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(reference): Path<String>,
) -> Result<Json<ApiResponse<OrderResponse>>, AppError> {
    auth.require_admin()?;

    let order = order_service::cancel_order(&pool, auth.store_id, &reference).await?;

    Ok(Json(ApiResponse::ok(order.into())))
}

/// Raw gateway callbacks received for an order, for manual reconciliation.
pub async fn list_payment_events(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(reference): Path<String>,
) -> Result<Json<ApiResponse<Vec<PaymentEvent>>>, AppError> {
    auth.require_admin()?;

    let events = order_service::list_payment_events(&pool, auth.store_id, &reference).await?;

    Ok(Json(ApiResponse::ok(events)))
}
