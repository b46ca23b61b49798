//! Business logic services.
//!
//! Services contain core business logic separated from HTTP handlers.
//! They handle database transactions, validation, and complex operations.

pub mod catalog_service;
pub mod checkout_service;
pub mod coupon_service;
pub mod order_service;
pub mod preorder_service;
pub mod submission_service;
pub mod webhook_service;
