//! Payment provider integration module
//!
//! This module provides a unified interface over Paystack and Flutterwave:
//! reference generation, kobo/naira conversion, checkout initialization,
//! verification, and inbound webhook signature checks.

pub mod amount;
pub mod flutterwave;
pub mod paystack;
pub mod reference;
pub mod service;
pub mod traits;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use service::PaymentService;
pub use traits::PaymentGateway;
pub use types::{
    Currency, GatewayEvent, InitializePayment, PaymentProviderKind, PaymentResult,
    PaymentStatus, VerificationResult,
};
