//! Inbound gateway webhook log.
//!
//! Every authenticated callback from Paystack or Flutterwave is stored verbatim
//! in `payment_events` so failed or disputed payments can be reviewed by hand.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PaymentEvent {
    pub id: Uuid,
    /// `paystack` or `flutterwave`
    pub provider: String,
    /// Vendor event name, e.g. `charge.success`
    pub event: String,
    /// Our order reference, when the event carries one
    pub reference: Option<String>,
    pub payload: serde_json::Value,
    pub received_at: DateTime<Utc>,
}
