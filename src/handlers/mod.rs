//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, URL params, etc.)
//! 2. Calls into the service layer
//! 3. Returns `{ "success": true, "data": ... }` or an `AppError`
pub mod books;
pub mod checkout;
pub mod coupons;
pub mod courses;
pub mod health;
pub mod orders;
/// Inbound Paystack and Flutterwave notifications
pub mod payment_webhooks;
pub mod preorders;
pub mod submissions;
/// Store webhook endpoint management
pub mod webhooks;
