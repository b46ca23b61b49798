//! Coupon service - creation, lookup and discount previews.

use crate::{
    db::DbPool,
    error::AppError,
    models::coupon::{Coupon, CouponValidationResponse, CreateCouponRequest, DiscountType},
};
use chrono::Utc;
use uuid::Uuid;

/// Codes are matched case-insensitively by storing them uppercase.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

fn validate_new_coupon(request: &CreateCouponRequest) -> Result<String, AppError> {
    let code = normalize_code(&request.code);

    if code.is_empty() || code.len() > 32 {
        return Err(AppError::InvalidRequest(
            "Coupon code must be 1 to 32 characters".to_string(),
        ));
    }

    if !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(AppError::InvalidRequest(
            "Coupon code may only contain letters, digits, '-' and '_'".to_string(),
        ));
    }

    match request.discount_type {
        DiscountType::Percentage if !(1..=100).contains(&request.discount_value) => {
            return Err(AppError::InvalidRequest(
                "Percentage discount must be between 1 and 100".to_string(),
            ));
        }
        DiscountType::Fixed if request.discount_value <= 0 => {
            return Err(AppError::InvalidRequest(
                "Fixed discount must be positive".to_string(),
            ));
        }
        _ => {}
    }

    if request.max_uses.is_some_and(|max| max <= 0) {
        return Err(AppError::InvalidRequest(
            "max_uses must be positive".to_string(),
        ));
    }

    if request.min_order_minor < 0 {
        return Err(AppError::InvalidRequest(
            "min_order_minor cannot be negative".to_string(),
        ));
    }

    if request.expires_at.is_some_and(|at| at <= Utc::now()) {
        return Err(AppError::InvalidRequest(
            "expires_at must be in the future".to_string(),
        ));
    }

    Ok(code)
}

pub async fn create_coupon(
    pool: &DbPool,
    store_id: Uuid,
    request: CreateCouponRequest,
) -> Result<Coupon, AppError> {
    let code = validate_new_coupon(&request)?;

    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM coupons WHERE store_id = $1 AND code = $2)",
    )
    .bind(store_id)
    .bind(&code)
    .fetch_one(pool)
    .await?;

    if exists {
        return Err(AppError::InvalidRequest(format!(
            "Coupon {} already exists",
            code
        )));
    }

    let coupon = sqlx::query_as::<_, Coupon>(
        r#"
        INSERT INTO coupons (store_id, code, discount_type, discount_value, max_uses, min_order_minor, expires_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(store_id)
    .bind(&code)
    .bind(request.discount_type.as_str())
    .bind(request.discount_value)
    .bind(request.max_uses)
    .bind(request.min_order_minor)
    .bind(request.expires_at)
    .fetch_one(pool)
    .await?;

    tracing::info!("Coupon created: store={}, code={}", store_id, coupon.code);

    Ok(coupon)
}

pub async fn list_coupons(pool: &DbPool, store_id: Uuid) -> Result<Vec<Coupon>, AppError> {
    let coupons = sqlx::query_as::<_, Coupon>(
        "SELECT * FROM coupons WHERE store_id = $1 ORDER BY created_at DESC",
    )
    .bind(store_id)
    .fetch_all(pool)
    .await?;

    Ok(coupons)
}

pub async fn find_by_code(
    pool: &DbPool,
    store_id: Uuid,
    code: &str,
) -> Result<Coupon, AppError> {
    sqlx::query_as::<_, Coupon>("SELECT * FROM coupons WHERE store_id = $1 AND code = $2")
        .bind(store_id)
        .bind(normalize_code(code))
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::CouponNotFound)
}

/// Preview the discount a code gives on a subtotal, without consuming a use.
pub async fn validate_coupon(
    pool: &DbPool,
    store_id: Uuid,
    code: &str,
    subtotal_minor: i64,
) -> Result<CouponValidationResponse, AppError> {
    if subtotal_minor <= 0 {
        return Err(AppError::InvalidRequest(
            "Subtotal must be positive".to_string(),
        ));
    }

    let coupon = find_by_code(pool, store_id, code).await?;
    let discount_minor = coupon.discount_for(subtotal_minor, Utc::now())?;

    Ok(CouponValidationResponse {
        code: coupon.code,
        discount_minor,
        total_minor: subtotal_minor - discount_minor,
    })
}

/// Soft-delete: the row stays so past orders keep their reference.
pub async fn deactivate_coupon(
    pool: &DbPool,
    store_id: Uuid,
    coupon_id: Uuid,
) -> Result<(), AppError> {
    let result = sqlx::query("UPDATE coupons SET is_active = false WHERE id = $1 AND store_id = $2")
        .bind(coupon_id)
        .bind(store_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::CouponNotFound);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn request(discount_type: DiscountType, discount_value: i64) -> CreateCouponRequest {
        CreateCouponRequest {
            code: " launch-20 ".into(),
            discount_type,
            discount_value,
            max_uses: None,
            min_order_minor: 0,
            expires_at: None,
        }
    }

    #[test]
    fn codes_are_trimmed_and_uppercased() {
        assert_eq!(normalize_code(" launch-20 "), "LAUNCH-20");
        assert_eq!(
            validate_new_coupon(&request(DiscountType::Percentage, 20)).unwrap(),
            "LAUNCH-20"
        );
    }

    #[test]
    fn percentage_must_be_within_range() {
        assert!(validate_new_coupon(&request(DiscountType::Percentage, 0)).is_err());
        assert!(validate_new_coupon(&request(DiscountType::Percentage, 101)).is_err());
        assert!(validate_new_coupon(&request(DiscountType::Percentage, 100)).is_ok());
    }

    #[test]
    fn fixed_discount_must_be_positive() {
        assert!(validate_new_coupon(&request(DiscountType::Fixed, 0)).is_err());
        assert!(validate_new_coupon(&request(DiscountType::Fixed, 150_000)).is_ok());
    }

    #[test]
    fn rejects_odd_characters_and_past_expiry() {
        let mut bad_code = request(DiscountType::Fixed, 100);
        bad_code.code = "SAVE 10%".into();
        assert!(validate_new_coupon(&bad_code).is_err());

        let mut expired = request(DiscountType::Fixed, 100);
        expired.expires_at = Some(Utc::now() - Duration::hours(1));
        assert!(validate_new_coupon(&expired).is_err());
    }
}
