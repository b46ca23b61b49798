//! Payment provider types and data structures
//!
//! Common types used across all payment providers for requests and responses.
//! Every amount here is in the smallest currency unit (kobo for NGN).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Currencies accepted at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Ngn,
    Usd,
    Ghs,
    Kes,
    Zar,
    Gbp,
    Eur,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Ngn => "NGN",
            Currency::Usd => "USD",
            Currency::Ghs => "GHS",
            Currency::Kes => "KES",
            Currency::Zar => "ZAR",
            Currency::Gbp => "GBP",
            Currency::Eur => "EUR",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NGN" => Ok(Currency::Ngn),
            "USD" => Ok(Currency::Usd),
            "GHS" => Ok(Currency::Ghs),
            "KES" => Ok(Currency::Kes),
            "ZAR" => Ok(Currency::Zar),
            "GBP" => Ok(Currency::Gbp),
            "EUR" => Ok(Currency::Eur),
            other => Err(format!("Unsupported currency: {}", other)),
        }
    }
}

/// Which external gateway handled a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentProviderKind {
    Paystack,
    Flutterwave,
}

impl PaymentProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentProviderKind::Paystack => "paystack",
            PaymentProviderKind::Flutterwave => "flutterwave",
        }
    }

    /// Vendor name used in logs and error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            PaymentProviderKind::Paystack => "Paystack",
            PaymentProviderKind::Flutterwave => "Flutterwave",
        }
    }
}

impl fmt::Display for PaymentProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "paystack" => Ok(PaymentProviderKind::Paystack),
            "flutterwave" => Ok(PaymentProviderKind::Flutterwave),
            other => Err(format!("Unknown payment provider: {}", other)),
        }
    }
}

/// Request to start a hosted checkout with a gateway.
#[derive(Debug, Clone)]
pub struct InitializePayment {
    /// Customer email address
    pub email: String,
    /// Amount in smallest currency unit
    pub amount_minor: i64,
    pub currency: Currency,
    /// Reference we generated; the gateway echoes it back on verify and webhooks
    pub reference: String,
    /// Where the gateway redirects the customer after payment
    pub callback_url: Option<String>,
    pub customer_name: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

/// Normalized outcome of initializing a payment.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PaymentResult {
    pub success: bool,
    pub provider: PaymentProviderKind,
    pub reference: String,
    /// Hosted payment page the customer should be sent to
    pub authorization_url: Option<String>,
    /// Paystack inline access code (absent for Flutterwave)
    pub access_code: Option<String>,
    pub message: String,
}

/// Normalized gateway status for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Success,
    Pending,
    Failed,
    Abandoned,
    Reversed,
    Unknown,
}

/// Normalized outcome of verifying a payment.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VerificationResult {
    /// True only when the gateway reports the charge as successful
    pub success: bool,
    pub provider: PaymentProviderKind,
    pub status: PaymentStatus,
    pub reference: String,
    /// Amount actually charged, in smallest currency unit
    pub amount_minor: i64,
    /// ISO code as reported by the gateway
    pub currency: String,
    pub paid_at: Option<String>,
    pub channel: Option<String>,
    pub customer_email: Option<String>,
    /// Free-form gateway message (e.g. "Approved", "Insufficient Funds")
    pub gateway_response: Option<String>,
}

/// A gateway callback reduced to what settlement needs.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayEvent {
    pub provider: PaymentProviderKind,
    /// Vendor event name, e.g. `charge.success` or `charge.completed`
    pub event: String,
    pub reference: Option<String>,
    pub status: Option<String>,
}

impl GatewayEvent {
    /// Whether this event concerns a customer charge (as opposed to transfers, subscriptions, ...).
    pub fn is_charge(&self) -> bool {
        self.event.starts_with("charge.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_parses_case_insensitively() {
        assert_eq!("ngn".parse::<Currency>().unwrap(), Currency::Ngn);
        assert_eq!(" USD ".parse::<Currency>().unwrap(), Currency::Usd);
        assert!("XYZ".parse::<Currency>().is_err());
    }

    #[test]
    fn currency_serializes_as_iso_code() {
        assert_eq!(serde_json::to_value(Currency::Ghs).unwrap(), "GHS");
        assert_eq!(Currency::Kes.to_string(), "KES");
    }

    #[test]
    fn provider_round_trips_through_str() {
        for kind in [PaymentProviderKind::Paystack, PaymentProviderKind::Flutterwave] {
            assert_eq!(kind.as_str().parse::<PaymentProviderKind>().unwrap(), kind);
        }
    }

    #[test]
    fn only_charge_events_are_charges() {
        let mut event = GatewayEvent {
            provider: PaymentProviderKind::Paystack,
            event: "charge.success".into(),
            reference: Some("ORD_1".into()),
            status: Some("success".into()),
        };
        assert!(event.is_charge());

        event.event = "transfer.success".into();
        assert!(!event.is_charge());
    }
}
