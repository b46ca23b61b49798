//! Webhook models for store endpoint registration and order notifications.
//!
//! # Webhook Flow
//!
//! 1. A store registers an endpoint via `POST /api/v1/webhooks`
//! 2. System generates a secret for HMAC signature verification
//! 3. When an order is paid, the system sends a signed `order.paid` payload
//! 4. The store verifies the signature using the secret
//!
//! # Security
//!
//! - Secrets are only shown once during registration
//! - Payloads are signed using HMAC-SHA256
//! - HTTPS is required for production endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::order::Order;

/// Webhook endpoint registered by a store.
///
/// # Secret Storage
///
/// The `secret` is stored in plaintext (required for HMAC generation)
/// but never returned in list operations.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WebhookEndpoint {
    pub id: Uuid,
    pub store_id: Uuid,
    pub url: String,
    pub secret: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Request to register a new webhook endpoint.
///
/// # Validation
///
/// - URL must be valid HTTPS (HTTP allowed for localhost in development)
/// - URL must not exceed 2048 characters
#[derive(Debug, Deserialize)]
pub struct WebhookEndpointRequest {
    pub url: String,
}

/// Response when registering or listing webhook endpoints.
///
/// The `secret` field is ONLY included when creating a new endpoint.
#[derive(Debug, Serialize)]
pub struct WebhookEndpointResponse {
    pub id: Uuid,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<WebhookEndpoint> for WebhookEndpointResponse {
    fn from(endpoint: WebhookEndpoint) -> Self {
        Self {
            id: endpoint.id,
            url: endpoint.url,
            secret: None,
            is_active: endpoint.is_active,
            created_at: endpoint.created_at,
        }
    }
}

impl WebhookEndpointResponse {
    /// Create response with secret included (only for registration).
    pub fn with_secret(mut self, secret: String) -> Self {
        self.secret = Some(secret);
        self
    }
}

/// A delivery attempt about to be recorded in `webhook_events`.
#[derive(Debug, Clone)]
pub struct NewWebhookEvent {
    pub id: Uuid,
    pub webhook_endpoint_id: Uuid,
    pub order_id: Uuid,
    pub payload: serde_json::Value,
    pub response_status: Option<i32>,
    pub response_body: Option<String>,
}

/// Payload sent to store endpoints.
///
/// # Example
///
/// ```json
/// {
///   "event_type": "order.paid",
///   "event_id": "550e8400-e29b-41d4-a716-446655440000",
///   "created_at": "2025-01-15T10:30:00Z",
///   "data": {
///     "order": {
///       "id": "...",
///       "reference": "ORD_1736937000000_K3J9QX0ZPA",
///       "item_type": "book",
///       "total_minor": 450000,
///       "currency": "NGN",
///       "status": "paid"
///     }
///   }
/// }
/// ```
///
/// # Signature Verification
///
/// The request includes an `X-Webhook-Signature` header with format
/// `sha256=<hex_encoded_hmac>`; receivers compute HMAC-SHA256(secret, json_body).
#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub event_type: String,
    pub event_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub data: WebhookData,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookData {
    pub order: OrderWebhookData,
}

/// Subset of the order relevant to webhook consumers.
#[derive(Debug, Serialize, Deserialize)]
pub struct OrderWebhookData {
    pub id: Uuid,
    pub reference: String,
    pub customer_email: String,
    pub item_type: String,
    pub item_id: Uuid,
    pub quantity: i32,
    pub total_minor: i64,
    pub currency: String,
    pub provider: Option<String>,
    pub status: String,
    pub paid_at: Option<DateTime<Utc>>,
}

impl From<&Order> for OrderWebhookData {
    fn from(o: &Order) -> Self {
        Self {
            id: o.id,
            reference: o.reference.clone(),
            customer_email: o.customer_email.clone(),
            item_type: o.item_type.clone(),
            item_id: o.item_id,
            quantity: o.quantity,
            total_minor: o.total_minor,
            currency: o.currency.clone(),
            provider: o.provider.clone(),
            status: o.status.clone(),
            paid_at: o.paid_at,
        }
    }
}

impl WebhookPayload {
    pub fn order_paid(event_id: Uuid, order: &Order) -> Self {
        Self {
            event_type: "order.paid".to_string(),
            event_id,
            created_at: Utc::now(),
            data: WebhookData {
                order: order.into(),
            },
        }
    }
}
