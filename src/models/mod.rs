//! Data models representing database entities.
//!
//! This module contains all data structures that map to database tables,
//! plus the request and response bodies built from them.

/// API key authentication model
pub mod api_key;
pub mod book;
pub mod coupon;
pub mod course;
pub mod order;
pub mod payment_event;
pub mod preorder;
pub mod submission;
pub mod webhook;
