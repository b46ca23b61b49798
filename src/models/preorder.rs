//! Book preorder campaign models.
//!
//! A preorder sells an unreleased book at a discounted price during a window,
//! optionally capped at a number of copies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct BookPreorder {
    pub id: Uuid,
    pub store_id: Uuid,
    pub book_id: Uuid,

    /// Campaign price per copy in minor units
    pub preorder_price_minor: i64,

    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub release_date: Option<DateTime<Utc>>,

    /// NULL means unlimited copies
    pub max_quantity: Option<i32>,

    /// Copies on paid orders
    pub reserved_count: i32,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl BookPreorder {
    /// Whether the campaign is taking orders at `now`.
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.starts_at <= now && now < self.ends_at
    }

    /// Copies still available, or `None` for an uncapped campaign.
    pub fn remaining(&self) -> Option<i32> {
        self.max_quantity
            .map(|max| (max - self.reserved_count).max(0))
    }

    pub fn can_reserve(&self, quantity: i32) -> bool {
        self.remaining().is_none_or(|left| quantity <= left)
    }
}

/// Request body for starting a preorder campaign.
///
/// # JSON Example
///
/// ```json
/// {
///   "book_id": "550e8400-e29b-41d4-a716-446655440000",
///   "preorder_price_minor": 350000,
///   "ends_at": "2025-03-01T00:00:00Z",
///   "release_date": "2025-03-15T00:00:00Z",
///   "max_quantity": 500
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct CreatePreorderRequest {
    pub book_id: Uuid,
    pub preorder_price_minor: i64,

    /// Defaults to now
    pub starts_at: Option<DateTime<Utc>>,

    pub ends_at: DateTime<Utc>,
    pub release_date: Option<DateTime<Utc>>,
    pub max_quantity: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct PreorderResponse {
    pub id: Uuid,
    pub book_id: Uuid,
    pub preorder_price_minor: i64,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub release_date: Option<DateTime<Utc>>,
    pub max_quantity: Option<i32>,
    pub reserved_count: i32,
    pub remaining: Option<i32>,
    pub is_open: bool,
}

impl From<BookPreorder> for PreorderResponse {
    fn from(preorder: BookPreorder) -> Self {
        let remaining = preorder.remaining();
        let is_open = preorder.is_open(Utc::now());
        Self {
            id: preorder.id,
            book_id: preorder.book_id,
            preorder_price_minor: preorder.preorder_price_minor,
            starts_at: preorder.starts_at,
            ends_at: preorder.ends_at,
            release_date: preorder.release_date,
            max_quantity: preorder.max_quantity,
            reserved_count: preorder.reserved_count,
            remaining,
            is_open,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn preorder(now: DateTime<Utc>) -> BookPreorder {
        BookPreorder {
            id: Uuid::new_v4(),
            store_id: Uuid::new_v4(),
            book_id: Uuid::new_v4(),
            preorder_price_minor: 350_000,
            starts_at: now - Duration::days(1),
            ends_at: now + Duration::days(7),
            release_date: None,
            max_quantity: Some(10),
            reserved_count: 8,
            is_active: true,
            created_at: now,
        }
    }

    #[test]
    fn open_only_inside_window() {
        let now = Utc::now();
        let campaign = preorder(now);

        assert!(campaign.is_open(now));
        assert!(!campaign.is_open(now - Duration::days(2)));
        assert!(!campaign.is_open(campaign.ends_at));
    }

    #[test]
    fn inactive_campaign_is_closed() {
        let now = Utc::now();
        let mut campaign = preorder(now);
        campaign.is_active = false;
        assert!(!campaign.is_open(now));
    }

    #[test]
    fn capacity_limits_reservations() {
        let campaign = preorder(Utc::now());

        assert_eq!(campaign.remaining(), Some(2));
        assert!(campaign.can_reserve(2));
        assert!(!campaign.can_reserve(3));
    }

    #[test]
    fn uncapped_campaign_always_has_room() {
        let mut campaign = preorder(Utc::now());
        campaign.max_quantity = None;

        assert_eq!(campaign.remaining(), None);
        assert!(campaign.can_reserve(10_000));
    }
}
