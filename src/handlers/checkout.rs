//! HTTP handlers for starting and confirming purchases.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::order::{CheckoutRequest, OrderResponse};
use crate::response::ApiResponse;
use crate::services::{checkout_service, order_service};
use crate::state::AppState;

/// Start a purchase.
///
/// # Request Body
///
/// ```json
/// {
///   "item_type": "book",
///   "item_id": "550e8400-e29b-41d4-a716-446655440000",
///   "quantity": 1,
///   "customer_email": "reader@example.com",
///   "coupon_code": "LAUNCH20"
/// }
/// ```
///
/// # Response
///
/// 201 Created:
///
/// ```json
/// {
///   "success": true,
///   "data": {
///     "order": { "reference": "ORD_1736937000000_K3J9QX0ZPA", "status": "pending", ... },
///     "authorization_url": "https://checkout.paystack.com/0peioxfhpn",
///     "access_code": "0peioxfhpn"
///   }
/// }
/// ```
///
/// Redirect the customer to `authorization_url`. Free orders come back `paid`
/// with no URL.
pub async fn checkout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, AppError> {
    let response = checkout_service::checkout(&state, auth.store_id, request).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(response))))
}

/// Confirm a payment after the customer returns from the gateway.
///
/// Asks the order's provider for the transaction status and settles the
/// order. Calling it again after settlement simply returns the order.
pub async fn verify_payment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(reference): Path<String>,
) -> Result<Json<ApiResponse<OrderResponse>>, AppError> {
    let order = order_service::verify_order(&state, auth.store_id, &reference).await?;

    Ok(Json(ApiResponse::ok(order.into())))
}
