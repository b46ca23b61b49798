//! Coupon models and discount rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Represents a coupon record from the database.
///
/// # Discount Types
///
/// - `percentage`: `discount_value` is 1–100 percent of the subtotal
/// - `fixed`: `discount_value` is an amount in minor units
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Coupon {
    pub id: Uuid,
    pub store_id: Uuid,

    /// Always stored uppercase
    pub code: String,

    pub discount_type: String,
    pub discount_value: i64,

    /// NULL means unlimited
    pub max_uses: Option<i32>,

    /// Incremented when an order using the coupon is paid, not when it is created
    pub used_count: i32,

    /// Smallest subtotal (minor units) the coupon applies to
    pub min_order_minor: i64,

    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    Percentage,
    Fixed,
}

impl DiscountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Percentage => "percentage",
            DiscountType::Fixed => "fixed",
        }
    }
}

impl Coupon {
    /// Compute the discount this coupon gives on `subtotal_minor` at `now`.
    ///
    /// # Errors
    ///
    /// `InvalidCoupon` when the coupon is inactive, expired, used up, or the
    /// subtotal is below the minimum order amount. `InvalidRequest` when the
    /// percentage cannot be computed for a subtotal that large.
    pub fn discount_for(&self, subtotal_minor: i64, now: DateTime<Utc>) -> Result<i64, AppError> {
        if !self.is_active {
            return Err(AppError::InvalidCoupon(
                "Coupon is no longer active".to_string(),
            ));
        }

        if self.expires_at.is_some_and(|expires_at| expires_at <= now) {
            return Err(AppError::InvalidCoupon("Coupon has expired".to_string()));
        }

        if self.max_uses.is_some_and(|max| self.used_count >= max) {
            return Err(AppError::InvalidCoupon(
                "Coupon usage limit reached".to_string(),
            ));
        }

        if subtotal_minor < self.min_order_minor {
            return Err(AppError::InvalidCoupon(format!(
                "Order must be at least {} to use this coupon",
                crate::payments::amount::format_major(self.min_order_minor)
            )));
        }

        let discount = match self.discount_type.as_str() {
            "percentage" => {
                subtotal_minor
                    .checked_mul(self.discount_value.clamp(0, 100))
                    .ok_or_else(|| AppError::InvalidRequest("Order total is too large".to_string()))?
                    / 100
            }
            "fixed" => self.discount_value,
            other => {
                return Err(AppError::InvalidCoupon(format!(
                    "Unknown discount type: {}",
                    other
                )));
            }
        };

        Ok(discount.clamp(0, subtotal_minor))
    }
}

/// Request body for creating a coupon.
///
/// # JSON Example
///
/// ```json
/// {
///   "code": "launch20",
///   "discount_type": "percentage",
///   "discount_value": 20,
///   "max_uses": 100,
///   "expires_at": "2025-12-31T23:59:59Z"
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct CreateCouponRequest {
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    pub max_uses: Option<i32>,

    #[serde(default)]
    pub min_order_minor: i64,

    pub expires_at: Option<DateTime<Utc>>,
}

/// Request body for previewing a coupon against a cart subtotal.
#[derive(Debug, Deserialize)]
pub struct ValidateCouponRequest {
    pub code: String,
    pub subtotal_minor: i64,
}

#[derive(Debug, Serialize)]
pub struct CouponValidationResponse {
    pub code: String,
    pub discount_minor: i64,
    pub total_minor: i64,
}

#[derive(Debug, Serialize)]
pub struct CouponResponse {
    pub id: Uuid,
    pub code: String,
    pub discount_type: String,
    pub discount_value: i64,
    pub max_uses: Option<i32>,
    pub used_count: i32,
    pub min_order_minor: i64,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Coupon> for CouponResponse {
    fn from(coupon: Coupon) -> Self {
        Self {
            id: coupon.id,
            code: coupon.code,
            discount_type: coupon.discount_type,
            discount_value: coupon.discount_value,
            max_uses: coupon.max_uses,
            used_count: coupon.used_count,
            min_order_minor: coupon.min_order_minor,
            expires_at: coupon.expires_at,
            is_active: coupon.is_active,
            created_at: coupon.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn coupon(discount_type: &str, discount_value: i64) -> Coupon {
        Coupon {
            id: Uuid::new_v4(),
            store_id: Uuid::new_v4(),
            code: "LAUNCH".into(),
            discount_type: discount_type.into(),
            discount_value,
            max_uses: None,
            used_count: 0,
            min_order_minor: 0,
            expires_at: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn percentage_discount_rounds_down() {
        let coupon = coupon("percentage", 15);
        // 15% of 999 is 149.85
        assert_eq!(coupon.discount_for(999, Utc::now()).unwrap(), 149);
    }

    #[test]
    fn fixed_discount_is_capped_at_subtotal() {
        let coupon = coupon("fixed", 50_000);
        assert_eq!(coupon.discount_for(20_000, Utc::now()).unwrap(), 20_000);
        assert_eq!(coupon.discount_for(80_000, Utc::now()).unwrap(), 50_000);
    }

    #[test]
    fn expired_coupon_is_rejected() {
        let now = Utc::now();
        let mut coupon = coupon("percentage", 10);
        coupon.expires_at = Some(now - Duration::minutes(1));

        let err = coupon.discount_for(10_000, now).unwrap_err();
        assert!(matches!(err, AppError::InvalidCoupon(msg) if msg == "Coupon has expired"));
    }

    #[test]
    fn exhausted_coupon_is_rejected() {
        let mut coupon = coupon("percentage", 10);
        coupon.max_uses = Some(3);
        coupon.used_count = 3;

        assert!(coupon.discount_for(10_000, Utc::now()).is_err());

        coupon.used_count = 2;
        assert_eq!(coupon.discount_for(10_000, Utc::now()).unwrap(), 1_000);
    }

    #[test]
    fn minimum_order_is_enforced() {
        let mut coupon = coupon("fixed", 1_000);
        coupon.min_order_minor = 500_000;

        let err = coupon.discount_for(499_999, Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::InvalidCoupon(msg) if msg.contains("5000.00")));
        assert!(coupon.discount_for(500_000, Utc::now()).is_ok());
    }

    #[test]
    fn inactive_coupon_is_rejected() {
        let mut coupon = coupon("fixed", 1_000);
        coupon.is_active = false;
        assert!(coupon.discount_for(10_000, Utc::now()).is_err());
    }

    #[test]
    fn huge_subtotal_is_refused_instead_of_overflowing() {
        let twenty = coupon("percentage", 20);

        let err = twenty.discount_for(i64::MAX / 10, Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(msg) if msg.contains("too large")));

        let full = coupon("percentage", 100);
        assert_eq!(
            full.discount_for(i64::MAX / 100, Utc::now()).unwrap(),
            i64::MAX / 100
        );
    }
}
