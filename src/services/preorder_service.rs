//! Preorder service - discounted early-purchase campaigns for unreleased books.

use crate::{
    db::DbPool,
    error::AppError,
    models::{
        book::{Book, BookStatus},
        preorder::{BookPreorder, CreatePreorderRequest},
    },
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Check a campaign against the book it discounts.
fn validate_campaign(
    book: &Book,
    request: &CreatePreorderRequest,
    starts_at: DateTime<Utc>,
) -> Result<(), AppError> {
    if request.preorder_price_minor < 0 {
        return Err(AppError::InvalidRequest(
            "Preorder price cannot be negative".to_string(),
        ));
    }

    if request.preorder_price_minor >= book.price_minor {
        return Err(AppError::InvalidRequest(
            "Preorder price must be below the list price".to_string(),
        ));
    }

    if starts_at >= request.ends_at {
        return Err(AppError::InvalidRequest(
            "Preorder must end after it starts".to_string(),
        ));
    }

    if request.max_quantity.is_some_and(|max| max <= 0) {
        return Err(AppError::InvalidRequest(
            "max_quantity must be positive".to_string(),
        ));
    }

    if book.status == BookStatus::Archived.as_str() {
        return Err(AppError::InvalidRequest(
            "Archived books cannot be preordered".to_string(),
        ));
    }

    Ok(())
}

/// Start a campaign and flip the book to `preorder` so the storefront lists it.
pub async fn create_preorder(
    pool: &DbPool,
    store_id: Uuid,
    request: CreatePreorderRequest,
) -> Result<BookPreorder, AppError> {
    let mut tx = pool.begin().await?;

    let book = sqlx::query_as::<_, Book>(
        "SELECT * FROM books WHERE id = $1 AND store_id = $2 FOR UPDATE",
    )
    .bind(request.book_id)
    .bind(store_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(AppError::BookNotFound)?;

    let starts_at = request.starts_at.unwrap_or_else(Utc::now);
    validate_campaign(&book, &request, starts_at)?;

    let overlapping: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM book_preorders
            WHERE book_id = $1 AND is_active = true AND ends_at > $2 AND starts_at < $3
        )
        "#,
    )
    .bind(book.id)
    .bind(starts_at)
    .bind(request.ends_at)
    .fetch_one(&mut *tx)
    .await?;

    if overlapping {
        tx.rollback().await?;
        return Err(AppError::InvalidRequest(
            "Book already has a preorder campaign in that window".to_string(),
        ));
    }

    let preorder = sqlx::query_as::<_, BookPreorder>(
        r#"
        INSERT INTO book_preorders (store_id, book_id, preorder_price_minor, starts_at, ends_at, release_date, max_quantity)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(store_id)
    .bind(book.id)
    .bind(request.preorder_price_minor)
    .bind(starts_at)
    .bind(request.ends_at)
    .bind(request.release_date)
    .bind(request.max_quantity)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("UPDATE books SET status = 'preorder', updated_at = NOW() WHERE id = $1")
        .bind(book.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(
        "Preorder created: id={}, book={}, ends_at={}",
        preorder.id,
        book.id,
        preorder.ends_at
    );

    Ok(preorder)
}

/// Campaigns currently taking orders.
pub async fn list_open(pool: &DbPool, store_id: Uuid) -> Result<Vec<BookPreorder>, AppError> {
    let preorders = sqlx::query_as::<_, BookPreorder>(
        r#"
        SELECT * FROM book_preorders
        WHERE store_id = $1 AND is_active = true AND starts_at <= NOW() AND ends_at > NOW()
        ORDER BY ends_at ASC
        "#,
    )
    .bind(store_id)
    .fetch_all(pool)
    .await?;

    Ok(preorders)
}

pub async fn get_preorder(
    pool: &DbPool,
    store_id: Uuid,
    preorder_id: Uuid,
) -> Result<BookPreorder, AppError> {
    sqlx::query_as::<_, BookPreorder>(
        "SELECT * FROM book_preorders WHERE id = $1 AND store_id = $2",
    )
    .bind(preorder_id)
    .bind(store_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::PreorderNotFound)
}

/// The open campaign for a book at `now`, if any.
pub async fn find_open_for_book(
    pool: &DbPool,
    book_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Option<BookPreorder>, AppError> {
    let preorder = sqlx::query_as::<_, BookPreorder>(
        r#"
        SELECT * FROM book_preorders
        WHERE book_id = $1 AND is_active = true AND starts_at <= $2 AND ends_at > $2
        ORDER BY starts_at DESC
        LIMIT 1
        "#,
    )
    .bind(book_id)
    .bind(now)
    .fetch_optional(pool)
    .await?;

    Ok(preorder)
}
