//! Order data models and checkout request/response types.
//!
//! This module defines:
//! - `Order`: Database entity representing a purchase
//! - `CheckoutRequest`: Request body for starting a purchase
//! - `OrderResponse` / `CheckoutResponse`: Response bodies returned to clients

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::payments::PaymentProviderKind;

/// Represents an order record from the database.
///
/// # Database Table
///
/// Maps to the `orders` table. Each order:
/// - Belongs to one store (via `store_id`)
/// - Buys `quantity` of a single book or course
/// - Carries the gateway reference we generated (`reference`, globally unique)
/// - Stores all amounts in minor units
///
/// # Totals
///
/// `subtotal_minor = unit_price_minor * quantity` and
/// `total_minor = subtotal_minor - discount_minor`.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Order {
    pub id: Uuid,
    pub store_id: Uuid,

    /// Reference sent to the gateway, e.g. `ORD_1736937000000_K3J9QX0ZPA`
    pub reference: String,

    pub customer_email: String,
    pub customer_name: Option<String>,

    /// `book` or `course`
    pub item_type: String,
    pub item_id: Uuid,
    pub quantity: i32,

    pub unit_price_minor: i64,
    pub subtotal_minor: i64,
    pub discount_minor: i64,
    pub total_minor: i64,
    pub currency: String,

    pub coupon_id: Option<Uuid>,
    pub preorder_id: Option<Uuid>,

    /// NULL for free orders that never touched a gateway
    pub provider: Option<String>,

    /// `pending`, `paid`, `failed` or `cancelled`
    pub status: String,

    /// Hosted payment page returned by the gateway
    pub authorization_url: Option<String>,

    /// Payment channel reported by the gateway (card, bank, ussd, ...)
    pub channel: Option<String>,

    /// Why the order failed, kept for manual admin review
    pub failure_reason: Option<String>,

    /// `declined`, `mismatch`, `gateway` or `capacity`; NULL unless failed
    pub failure_kind: Option<String>,

    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn status(&self) -> OrderStatus {
        self.status.parse().unwrap_or(OrderStatus::Pending)
    }

    pub fn provider_kind(&self) -> Option<PaymentProviderKind> {
        self.provider.as_deref().and_then(|p| p.parse().ok())
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.failure_kind.as_deref().and_then(|k| k.parse().ok())
    }

    /// A declined card can be retried on the same hosted page, so a later
    /// successful verification may still settle the order.
    pub fn awaits_retry(&self) -> bool {
        self.status() == OrderStatus::Failed && self.failure_kind() == Some(FailureKind::Declined)
    }
}

/// Why an order ended up `failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The gateway reported a declined or reversed charge
    Declined,
    /// The gateway reported success for the wrong reference, currency or amount
    Mismatch,
    /// Initializing the payment with the gateway failed
    Gateway,
    /// Paid, but the coupon or preorder campaign was exhausted at settlement
    Capacity,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Declined => "declined",
            FailureKind::Mismatch => "mismatch",
            FailureKind::Gateway => "gateway",
            FailureKind::Capacity => "capacity",
        }
    }
}

impl FromStr for FailureKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "declined" => Ok(FailureKind::Declined),
            "mismatch" => Ok(FailureKind::Mismatch),
            "gateway" => Ok(FailureKind::Gateway),
            "capacity" => Ok(FailureKind::Capacity),
            other => Err(format!("Unknown failure kind: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Paid,
    Failed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Failed => "failed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "paid" => Ok(OrderStatus::Paid),
            "failed" => Ok(OrderStatus::Failed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("Unknown order status: {}", other)),
        }
    }
}

/// What is being bought.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Book,
    Course,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Book => "book",
            ItemType::Course => "course",
        }
    }
}

/// Request body for starting a purchase.
///
/// # JSON Example
///
/// ```json
/// {
///   "item_type": "book",
///   "item_id": "550e8400-e29b-41d4-a716-446655440000",
///   "quantity": 1,
///   "customer_email": "reader@example.com",
///   "customer_name": "Ada Reader",
///   "coupon_code": "LAUNCH20",
///   "provider": "paystack",
///   "callback_url": "https://shop.example.com/thanks"
/// }
/// ```
///
/// # Validation
///
/// - `quantity`: 1 to 100, defaults to 1
/// - `customer_email`: must look like an email address
/// - `provider`: optional; defaults to Paystack for NGN and Flutterwave otherwise
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub item_type: ItemType,
    pub item_id: Uuid,

    #[serde(default = "default_quantity")]
    pub quantity: i32,

    pub customer_email: String,
    pub customer_name: Option<String>,
    pub coupon_code: Option<String>,
    pub provider: Option<PaymentProviderKind>,
    pub callback_url: Option<String>,
}

fn default_quantity() -> i32 {
    1
}

/// Query parameters for listing orders.
#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
}

/// Response body for order endpoints.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub reference: String,
    pub customer_email: String,
    pub customer_name: Option<String>,
    pub item_type: String,
    pub item_id: Uuid,
    pub quantity: i32,
    pub unit_price_minor: i64,
    pub subtotal_minor: i64,
    pub discount_minor: i64,
    pub total_minor: i64,
    pub currency: String,
    pub provider: Option<String>,
    pub status: String,
    pub authorization_url: Option<String>,
    pub channel: Option<String>,
    pub failure_reason: Option<String>,
    pub failure_kind: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            reference: order.reference,
            customer_email: order.customer_email,
            customer_name: order.customer_name,
            item_type: order.item_type,
            item_id: order.item_id,
            quantity: order.quantity,
            unit_price_minor: order.unit_price_minor,
            subtotal_minor: order.subtotal_minor,
            discount_minor: order.discount_minor,
            total_minor: order.total_minor,
            currency: order.currency,
            provider: order.provider,
            status: order.status,
            authorization_url: order.authorization_url,
            channel: order.channel,
            failure_reason: order.failure_reason,
            failure_kind: order.failure_kind,
            paid_at: order.paid_at,
            created_at: order.created_at,
        }
    }
}

/// Response body for `POST /api/v1/checkout`.
///
/// `authorization_url` is where the customer completes payment. It is absent
/// when the order total was zero and the order was settled immediately.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order: OrderResponse,
    pub authorization_url: Option<String>,
    pub access_code: Option<String>,
}

/// A pending Paystack book order with reference `ORD_1`.
#[cfg(test)]
pub(crate) fn sample_order(total_minor: i64, currency: &str) -> Order {
    Order {
        id: Uuid::new_v4(),
        store_id: Uuid::new_v4(),
        reference: "ORD_1".into(),
        customer_email: "reader@example.com".into(),
        customer_name: None,
        item_type: "book".into(),
        item_id: Uuid::new_v4(),
        quantity: 1,
        unit_price_minor: total_minor,
        subtotal_minor: total_minor,
        discount_minor: 0,
        total_minor,
        currency: currency.into(),
        coupon_id: None,
        preorder_id: None,
        provider: Some("paystack".into()),
        status: "pending".into(),
        authorization_url: None,
        channel: None,
        failure_reason: None,
        failure_kind: None,
        paid_at: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkout_request_defaults_quantity() {
        let request: CheckoutRequest = serde_json::from_value(serde_json::json!({
            "item_type": "course",
            "item_id": "550e8400-e29b-41d4-a716-446655440000",
            "customer_email": "reader@example.com",
            "provider": "flutterwave"
        }))
        .unwrap();

        assert_eq!(request.quantity, 1);
        assert_eq!(request.item_type, ItemType::Course);
        assert_eq!(request.provider, Some(PaymentProviderKind::Flutterwave));
    }

    #[test]
    fn order_status_parses_db_values() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Paid,
            OrderStatus::Failed,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn only_declined_failures_await_retry() {
        let mut order = sample_order(5_000, "NGN");
        assert!(!order.awaits_retry());

        order.status = "failed".into();
        order.failure_kind = Some("declined".into());
        assert!(order.awaits_retry());

        for kind in ["mismatch", "gateway", "capacity"] {
            order.failure_kind = Some(kind.into());
            assert!(!order.awaits_retry(), "{kind}");
        }

        order.status = "cancelled".into();
        order.failure_kind = None;
        assert!(!order.awaits_retry());
    }
}
