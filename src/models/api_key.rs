//! API Key model for authentication.
//!
//! API keys authenticate a store (tenant) making requests to the API. They are
//! stored in the database as SHA-256 hashes.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Represents an API key record joined with its store.
///
/// # Database Table
///
/// Maps to `api_keys` joined with `stores`:
/// - `id`: Unique identifier (UUID)
/// - `store_id`: Store the key belongs to
/// - `key_hash`: SHA-256 hash of the actual API key
/// - `scope`: `storefront` (customer-facing site) or `admin` (dashboard)
/// - `store_name`: Name of the owning store
/// - `is_active`: Whether the key is currently valid
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ApiKey {
    pub id: Uuid,

    pub store_id: Uuid,

    /// SHA-256 hash of the actual API key (64 hex characters)
    pub key_hash: String,

    pub scope: String,

    pub store_name: String,

    pub created_at: DateTime<Utc>,

    /// Inactive keys are rejected during authentication. This provides a way to
    /// revoke access without deleting the record.
    pub is_active: bool,
}

/// What an API key is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyScope {
    /// Customer-facing site: browse, checkout, submit manuscripts
    Storefront,
    /// Dashboard: everything, including catalog, coupons and editorial review
    Admin,
}

impl KeyScope {
    pub fn from_db(scope: &str) -> Self {
        match scope {
            "admin" => KeyScope::Admin,
            _ => KeyScope::Storefront,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_scope_falls_back_to_storefront() {
        assert_eq!(KeyScope::from_db("admin"), KeyScope::Admin);
        assert_eq!(KeyScope::from_db("storefront"), KeyScope::Storefront);
        assert_eq!(KeyScope::from_db("root"), KeyScope::Storefront);
    }
}
