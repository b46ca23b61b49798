//! Payment provider trait definitions
//!
//! Defines the common interface that Paystack and Flutterwave implement so the
//! rest of the storefront never talks to a vendor API directly.

use crate::error::AppError;
use crate::payments::types::{
    Currency, GatewayEvent, InitializePayment, PaymentProviderKind, PaymentResult,
    VerificationResult,
};
use async_trait::async_trait;

/// Trait for payment gateway implementations
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Which provider this is.
    fn kind(&self) -> PaymentProviderKind;

    /// Whether the gateway can charge in `currency`.
    fn supports(&self, currency: Currency) -> bool;

    /// Initialize a payment transaction
    ///
    /// Returns the hosted page the customer must visit to complete payment.
    /// The `reference` in the request is passed through to the vendor unchanged.
    async fn initialize(&self, request: &InitializePayment) -> Result<PaymentResult, AppError>;

    /// Verify the status of a payment transaction by our reference.
    async fn verify(&self, reference: &str) -> Result<VerificationResult, AppError>;

    /// Validate webhook signature
    ///
    /// # Arguments
    /// * `payload` - Raw webhook payload body, exactly as received
    /// * `signature` - Value of the vendor's signature header
    fn validate_webhook_signature(&self, payload: &[u8], signature: &str) -> bool;

    /// Name of the header that carries the webhook signature.
    fn signature_header(&self) -> &'static str;

    /// Extract the event name and reference from a webhook body.
    fn parse_webhook(&self, payload: &[u8]) -> Result<GatewayEvent, AppError>;
}

/// Compare two byte strings without short-circuiting on the first difference.
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.iter().zip(b.iter()).fold(0, |acc, (x, y)| acc | (x ^ y)) == 0
}
