//! Checkout service - turns a purchase request into a pending order and a
//! hosted payment page.
//!
//! # Process
//!
//! 1. Validate the customer and quantity
//! 2. Price the item (preorder price while a campaign is open)
//! 3. Apply the coupon, if any
//! 4. Pick the gateway for the currency
//! 5. Insert a `pending` order with a fresh reference
//! 6. Initialize the payment, or settle at once when nothing is owed
//!
//! Coupon uses and preorder copies are only consumed when the order is paid.

use crate::{
    db::DbPool,
    error::AppError,
    models::{
        book::BookStatus,
        order::{CheckoutRequest, CheckoutResponse, FailureKind, ItemType, Order, OrderStatus},
        preorder::BookPreorder,
    },
    payments::{Currency, InitializePayment, PaymentProviderKind, reference::generate_reference},
    services::{catalog_service, coupon_service, order_service, preorder_service},
    state::AppState,
};
use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

const MAX_QUANTITY: i32 = 100;

/// Price of one unit of the requested item, plus the campaign it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedItem {
    pub unit_price_minor: i64,
    pub currency: Currency,
    pub preorder_id: Option<Uuid>,
}

/// Money owed for an order, all in minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub subtotal_minor: i64,
    pub discount_minor: i64,
    pub total_minor: i64,
}

fn validate_email(email: &str) -> Result<(), AppError> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };

    if !valid {
        return Err(AppError::InvalidRequest(
            "customer_email must be a valid email address".to_string(),
        ));
    }

    Ok(())
}

fn validate_checkout(request: &CheckoutRequest) -> Result<(), AppError> {
    validate_email(&request.customer_email)?;

    if !(1..=MAX_QUANTITY).contains(&request.quantity) {
        return Err(AppError::InvalidRequest(format!(
            "Quantity must be between 1 and {}",
            MAX_QUANTITY
        )));
    }

    if request.item_type == ItemType::Course && request.quantity != 1 {
        return Err(AppError::InvalidRequest(
            "Courses are sold one seat per order".to_string(),
        ));
    }

    if let Some(url) = &request.callback_url {
        url::Url::parse(url)
            .map_err(|_| AppError::InvalidRequest("callback_url must be a valid URL".to_string()))?;
    }

    Ok(())
}

/// Unit price for a book, given its status and any campaign open right now.
///
/// An open campaign sets the price for both listed statuses. Outside the
/// campaign window, before it starts or after it ends, the book sells at its
/// list price.
pub fn price_book(
    status: BookStatus,
    list_price_minor: i64,
    preorder: Option<&BookPreorder>,
    quantity: i32,
    now: DateTime<Utc>,
) -> Result<(i64, Option<Uuid>), AppError> {
    let open = preorder.filter(|p| p.is_open(now));

    match (status, open) {
        (BookStatus::Draft | BookStatus::Archived, _) => Err(AppError::BookNotFound),
        (BookStatus::Preorder | BookStatus::Published, Some(campaign)) => {
            if !campaign.can_reserve(quantity) {
                return Err(AppError::PreorderSoldOut);
            }
            Ok((campaign.preorder_price_minor, Some(campaign.id)))
        }
        (BookStatus::Preorder | BookStatus::Published, None) => Ok((list_price_minor, None)),
    }
}

/// Multiply out the subtotal and subtract the discount.
pub fn compute_totals(
    unit_price_minor: i64,
    quantity: i32,
    discount_minor: i64,
) -> Result<Totals, AppError> {
    let subtotal_minor = unit_price_minor
        .checked_mul(i64::from(quantity))
        .ok_or_else(|| AppError::InvalidRequest("Order total is too large".to_string()))?;

    let discount_minor = discount_minor.clamp(0, subtotal_minor);

    Ok(Totals {
        subtotal_minor,
        discount_minor,
        total_minor: subtotal_minor - discount_minor,
    })
}

async fn price_item(
    pool: &DbPool,
    store_id: Uuid,
    request: &CheckoutRequest,
    now: DateTime<Utc>,
) -> Result<PricedItem, AppError> {
    match request.item_type {
        ItemType::Book => {
            let book = catalog_service::get_book(pool, store_id, request.item_id).await?;
            let status: BookStatus = book.status.parse().map_err(|_| AppError::BookNotFound)?;
            let preorder = preorder_service::find_open_for_book(pool, book.id, now).await?;

            let (unit_price_minor, preorder_id) =
                price_book(status, book.price_minor, preorder.as_ref(), request.quantity, now)?;

            Ok(PricedItem {
                unit_price_minor,
                currency: book.currency.parse().map_err(AppError::InvalidRequest)?,
                preorder_id,
            })
        }
        ItemType::Course => {
            let course = catalog_service::get_course(pool, store_id, request.item_id).await?;
            if course.status != "published" {
                return Err(AppError::CourseNotFound);
            }

            Ok(PricedItem {
                unit_price_minor: course.price_minor,
                currency: course.currency.parse().map_err(AppError::InvalidRequest)?,
                preorder_id: None,
            })
        }
    }
}

/// Start a purchase.
///
/// # Returns
///
/// The created order and, unless it was free, the gateway's hosted payment page.
///
/// # Errors
///
/// - `InvalidRequest` / `InvalidCoupon` / `PreorderSoldOut` before anything is written
/// - `Gateway` if initialization fails; the order is then kept as `failed`
pub async fn checkout(
    state: &AppState,
    store_id: Uuid,
    request: CheckoutRequest,
) -> Result<CheckoutResponse, AppError> {
    validate_checkout(&request)?;

    let now = Utc::now();
    let item = price_item(&state.pool, store_id, &request, now).await?;

    let provisional = compute_totals(item.unit_price_minor, request.quantity, 0)?;

    let coupon = match request.coupon_code.as_deref().map(str::trim) {
        Some(code) if !code.is_empty() => {
            Some(coupon_service::find_by_code(&state.pool, store_id, code).await?)
        }
        _ => None,
    };

    let discount_minor = match &coupon {
        Some(coupon) => coupon.discount_for(provisional.subtotal_minor, now)?,
        None => 0,
    };

    let totals = compute_totals(item.unit_price_minor, request.quantity, discount_minor)?;

    let provider = if totals.total_minor > 0 {
        Some(state.payments.select_provider(item.currency, request.provider)?)
    } else {
        None
    };

    let order = insert_order(
        &state.pool,
        store_id,
        &request,
        &item,
        totals,
        coupon.as_ref().map(|c| c.id),
        provider,
    )
    .await?;

    tracing::info!(
        "Order created: reference={}, total={} {}, provider={:?}",
        order.reference,
        order.total_minor,
        order.currency,
        provider
    );

    let Some(provider) = provider else {
        let paid = settle_free_order(state, &order).await?;
        return Ok(CheckoutResponse {
            order: paid.into(),
            authorization_url: None,
            access_code: None,
        });
    };

    let callback_url = request
        .callback_url
        .clone()
        .or_else(|| state.default_callback_url.clone());

    let payment = InitializePayment {
        email: order.customer_email.clone(),
        amount_minor: order.total_minor,
        currency: item.currency,
        reference: order.reference.clone(),
        callback_url,
        customer_name: order.customer_name.clone(),
        metadata: Some(json!({
            "order_id": order.id,
            "store_id": store_id,
            "item_type": order.item_type,
            "item_id": order.item_id,
        })),
    };

    let result = match state.payments.initialize(provider, &payment).await {
        Ok(result) => result,
        Err(e) => {
            let mut conn = state.pool.acquire().await?;
            order_service::mark_failed(&mut conn, order.id, FailureKind::Gateway, &e.to_string())
                .await?;
            tracing::error!("Payment initialization failed for {}: {:?}", order.reference, e);
            return Err(e);
        }
    };

    let order = sqlx::query_as::<_, Order>(
        "UPDATE orders SET authorization_url = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(order.id)
    .bind(&result.authorization_url)
    .fetch_one(&state.pool)
    .await?;

    Ok(CheckoutResponse {
        order: order.into(),
        authorization_url: result.authorization_url,
        access_code: result.access_code,
    })
}

async fn insert_order(
    pool: &DbPool,
    store_id: Uuid,
    request: &CheckoutRequest,
    item: &PricedItem,
    totals: Totals,
    coupon_id: Option<Uuid>,
    provider: Option<PaymentProviderKind>,
) -> Result<Order, AppError> {
    let order = sqlx::query_as::<_, Order>(
        r#"
        INSERT INTO orders (
            store_id, reference, customer_email, customer_name, item_type, item_id, quantity,
            unit_price_minor, subtotal_minor, discount_minor, total_minor, currency,
            coupon_id, preorder_id, provider
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        RETURNING *
        "#,
    )
    .bind(store_id)
    .bind(generate_reference("ORD"))
    .bind(request.customer_email.trim().to_lowercase())
    .bind(request.customer_name.as_deref().map(str::trim))
    .bind(request.item_type.as_str())
    .bind(request.item_id)
    .bind(request.quantity)
    .bind(item.unit_price_minor)
    .bind(totals.subtotal_minor)
    .bind(totals.discount_minor)
    .bind(totals.total_minor)
    .bind(item.currency.as_str())
    .bind(coupon_id)
    .bind(item.preorder_id)
    .bind(provider.map(|p| p.as_str()))
    .fetch_one(pool)
    .await?;

    Ok(order)
}

/// Nothing is owed, so the order is paid without a gateway round trip.
///
/// A coupon or campaign exhausted since pricing leaves the order `failed`.
async fn settle_free_order(state: &AppState, order: &Order) -> Result<Order, AppError> {
    let mut tx = state.pool.begin().await?;

    sqlx::query("SELECT id FROM orders WHERE id = $1 FOR UPDATE")
        .bind(order.id)
        .execute(&mut *tx)
        .await?;

    let settled = order_service::mark_paid(&mut tx, order, Some("free".to_string())).await?;
    tx.commit().await?;

    if settled.status() == OrderStatus::Paid {
        order_service::notify_paid(state, &settled);
    }

    Ok(settled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn campaign(price: i64, max: Option<i32>, reserved: i32) -> BookPreorder {
        BookPreorder {
            id: Uuid::new_v4(),
            store_id: Uuid::new_v4(),
            book_id: Uuid::new_v4(),
            preorder_price_minor: price,
            starts_at: Utc::now() - Duration::days(1),
            ends_at: Utc::now() + Duration::days(7),
            release_date: None,
            max_quantity: max,
            reserved_count: reserved,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn request(item_type: ItemType, quantity: i32, email: &str) -> CheckoutRequest {
        CheckoutRequest {
            item_type,
            item_id: Uuid::new_v4(),
            quantity,
            customer_email: email.into(),
            customer_name: None,
            coupon_code: None,
            provider: None,
            callback_url: None,
        }
    }

    #[test]
    fn published_book_sells_at_list_price() {
        let (price, preorder) =
            price_book(BookStatus::Published, 500_000, None, 2, Utc::now()).unwrap();
        assert_eq!(price, 500_000);
        assert!(preorder.is_none());
    }

    #[test]
    fn open_campaign_sets_the_price() {
        let campaign = campaign(350_000, Some(10), 0);
        let (price, preorder) =
            price_book(BookStatus::Preorder, 500_000, Some(&campaign), 1, Utc::now()).unwrap();
        assert_eq!(price, 350_000);
        assert_eq!(preorder, Some(campaign.id));
    }

    #[test]
    fn full_campaign_is_sold_out() {
        let campaign = campaign(350_000, Some(10), 9);
        assert!(matches!(
            price_book(BookStatus::Preorder, 500_000, Some(&campaign), 2, Utc::now()),
            Err(AppError::PreorderSoldOut)
        ));
    }

    #[test]
    fn ended_campaign_falls_back_to_list_price() {
        let mut campaign = campaign(350_000, Some(10), 10);
        campaign.ends_at = Utc::now() - Duration::hours(1);

        let (price, preorder) =
            price_book(BookStatus::Preorder, 500_000, Some(&campaign), 1, Utc::now()).unwrap();
        assert_eq!(price, 500_000);
        assert!(preorder.is_none());
    }

    #[test]
    fn campaign_not_started_sells_at_list_price() {
        let mut campaign = campaign(350_000, None, 0);
        campaign.starts_at = Utc::now() + Duration::days(3);
        campaign.ends_at = Utc::now() + Duration::days(10);

        let (price, preorder) =
            price_book(BookStatus::Preorder, 500_000, Some(&campaign), 1, Utc::now()).unwrap();
        assert_eq!(price, 500_000);
        assert!(preorder.is_none());
    }

    #[test]
    fn preorder_book_without_campaign_sells_at_list_price() {
        assert_eq!(
            price_book(BookStatus::Preorder, 500_000, None, 1, Utc::now()).unwrap(),
            (500_000, None)
        );
    }

    #[test]
    fn unlisted_books_are_not_for_sale() {
        for status in [BookStatus::Draft, BookStatus::Archived] {
            assert!(matches!(
                price_book(status, 500_000, None, 1, Utc::now()),
                Err(AppError::BookNotFound)
            ));
        }
    }

    #[test]
    fn totals_apply_discount() {
        let totals = compute_totals(250_000, 2, 100_000).unwrap();
        assert_eq!(totals.subtotal_minor, 500_000);
        assert_eq!(totals.discount_minor, 100_000);
        assert_eq!(totals.total_minor, 400_000);
    }

    #[test]
    fn totals_never_go_negative() {
        let totals = compute_totals(1_000, 1, 5_000).unwrap();
        assert_eq!(totals.discount_minor, 1_000);
        assert_eq!(totals.total_minor, 0);
    }

    #[test]
    fn totals_reject_overflow() {
        assert!(compute_totals(i64::MAX, 2, 0).is_err());
    }

    #[test]
    fn checkout_validation() {
        assert!(validate_checkout(&request(ItemType::Book, 1, "reader@example.com")).is_ok());
        assert!(validate_checkout(&request(ItemType::Book, 0, "reader@example.com")).is_err());
        assert!(validate_checkout(&request(ItemType::Book, 101, "reader@example.com")).is_err());
        assert!(validate_checkout(&request(ItemType::Course, 2, "reader@example.com")).is_err());
        assert!(validate_checkout(&request(ItemType::Book, 1, "reader")).is_err());
        assert!(validate_checkout(&request(ItemType::Book, 1, "reader@localhost")).is_err());
        assert!(validate_checkout(&request(ItemType::Book, 1, "@example.com")).is_err());

        let mut bad_callback = request(ItemType::Book, 1, "reader@example.com");
        bad_callback.callback_url = Some("not a url".into());
        assert!(validate_checkout(&bad_callback).is_err());
    }
}
