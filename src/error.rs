//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// Each variant maps to a specific HTTP status code and error code.
///
/// # Error Categories
///
/// - **Database Errors**: Any sqlx::Error from database operations
/// - **Authentication Errors**: Invalid API keys, missing scope, bad webhook signatures
/// - **Resource Errors**: Requested resources not found in the caller's store
/// - **Business Logic Errors**: Coupons, preorders and editorial transitions that break the rules
/// - **Gateway Errors**: Paystack or Flutterwave rejected or failed a call
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// API key is missing, invalid, or inactive.
    #[error("Invalid API key")]
    InvalidApiKey,

    /// API key is valid but lacks the admin scope.
    #[error("This operation requires an admin API key")]
    Forbidden,

    #[error("Book not found")]
    BookNotFound,

    #[error("Course not found")]
    CourseNotFound,

    #[error("Order not found")]
    OrderNotFound,

    #[error("Coupon not found")]
    CouponNotFound,

    #[error("Preorder not found")]
    PreorderNotFound,

    #[error("Submission not found")]
    SubmissionNotFound,

    #[error("Webhook endpoint not found")]
    WebhookNotFound,

    /// Request body or parameters are invalid.
    ///
    /// The String contains details about what was invalid.
    #[error("Invalid request")]
    InvalidRequest(String),

    /// Coupon exists but cannot be applied to this order.
    #[error("Invalid coupon")]
    InvalidCoupon(String),

    /// Preorder campaign has no remaining capacity.
    #[error("Preorder is sold out")]
    PreorderSoldOut,

    /// Submission cannot move from its current status to the requested one.
    #[error("Cannot move submission from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// Order is not in a state that allows the operation.
    #[error("Order is {0}")]
    OrderNotPending(String),

    #[error("Invalid webhook URL")]
    InvalidWebhookUrl(String),

    /// Inbound gateway webhook failed signature validation.
    #[error("Invalid webhook signature")]
    InvalidSignature,

    /// A payment gateway call failed or returned an error envelope.
    #[error("{provider} error: {message}")]
    Gateway { provider: String, message: String },
}

impl AppError {
    pub fn gateway(provider: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Gateway {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// ```json
/// {
///   "success": false,
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// # Status Code Mapping
///
/// - `InvalidApiKey`, `InvalidSignature` → 401 Unauthorized
/// - `Forbidden` → 403 Forbidden
/// - `*NotFound` → 404 Not Found
/// - `InvalidTransition`, `OrderNotPending` → 409 Conflict
/// - `InvalidCoupon`, `PreorderSoldOut` → 422 Unprocessable Entity
/// - `InvalidRequest`, `InvalidWebhookUrl` → 400 Bad Request
/// - `Gateway` → 502 Bad Gateway
/// - `Database` → 500 Internal Server Error (hides details from client)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::InvalidApiKey => (
                StatusCode::UNAUTHORIZED,
                "invalid_api_key",
                self.to_string(),
            ),
            AppError::InvalidSignature => (
                StatusCode::UNAUTHORIZED,
                "invalid_signature",
                self.to_string(),
            ),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "forbidden", self.to_string()),
            AppError::BookNotFound => (StatusCode::NOT_FOUND, "book_not_found", self.to_string()),
            AppError::CourseNotFound => {
                (StatusCode::NOT_FOUND, "course_not_found", self.to_string())
            }
            AppError::OrderNotFound => {
                (StatusCode::NOT_FOUND, "order_not_found", self.to_string())
            }
            AppError::CouponNotFound => {
                (StatusCode::NOT_FOUND, "coupon_not_found", self.to_string())
            }
            AppError::PreorderNotFound => {
                (StatusCode::NOT_FOUND, "preorder_not_found", self.to_string())
            }
            AppError::SubmissionNotFound => (
                StatusCode::NOT_FOUND,
                "submission_not_found",
                self.to_string(),
            ),
            AppError::WebhookNotFound => {
                (StatusCode::NOT_FOUND, "webhook_not_found", self.to_string())
            }
            AppError::InvalidTransition { .. } => (
                StatusCode::CONFLICT,
                "invalid_transition",
                self.to_string(),
            ),
            AppError::OrderNotPending(_) => (
                StatusCode::CONFLICT,
                "order_not_pending",
                self.to_string(),
            ),
            AppError::InvalidCoupon(ref msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "invalid_coupon",
                msg.clone(),
            ),
            AppError::PreorderSoldOut => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "preorder_sold_out",
                self.to_string(),
            ),
            AppError::InvalidRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::InvalidWebhookUrl(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_webhook_url", msg.clone())
            }
            AppError::Gateway { ref provider, .. } => {
                tracing::error!("{}", self);
                (
                    StatusCode::BAD_GATEWAY,
                    "payment_gateway_error",
                    format!("Payment provider {} could not process the request", provider),
                )
            }
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn not_found_maps_to_404_envelope() {
        let response = AppError::OrderNotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "order_not_found");
        assert_eq!(body["error"]["message"], "Order not found");
    }

    #[tokio::test]
    async fn invalid_coupon_carries_its_reason() {
        let response = AppError::InvalidCoupon("Coupon has expired".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "Coupon has expired");
    }

    #[tokio::test]
    async fn gateway_errors_hide_vendor_message() {
        let response =
            AppError::gateway("Paystack", "Invalid key sk_live_leaked").into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = body_json(response).await;
        let message = body["error"]["message"].as_str().unwrap();
        assert!(message.contains("Paystack"));
        assert!(!message.contains("sk_live_leaked"));
    }

    #[tokio::test]
    async fn transition_error_is_conflict() {
        let response = AppError::InvalidTransition {
            from: "rejected".into(),
            to: "published".into(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = body_json(response).await;
        assert_eq!(
            body["error"]["message"],
            "Cannot move submission from rejected to published"
        );
    }

    #[test]
    fn forbidden_maps_to_403() {
        assert_eq!(
            AppError::Forbidden.into_response().status(),
            StatusCode::FORBIDDEN
        );
    }
}
