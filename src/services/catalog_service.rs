//! Catalog service - books and courses.
//!
//! Handles validation, slug assignment and store-scoped lookups for the two
//! kinds of things the storefront sells.

use crate::{
    db::DbPool,
    error::AppError,
    models::{
        book::{Book, BookStatus, CreateBookRequest},
        course::{Course, CreateCourseRequest},
    },
    payments::Currency,
};
use sqlx::PgConnection;
use uuid::Uuid;

/// Turn a title into a URL-safe slug: lowercase ASCII alphanumerics separated by single dashes.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }

    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}

/// Validate fields shared by everything that goes on sale.
pub fn validate_listing(title: &str, price_minor: i64, currency: &str) -> Result<String, AppError> {
    if title.trim().is_empty() {
        return Err(AppError::InvalidRequest("Title is required".to_string()));
    }

    if price_minor < 0 {
        return Err(AppError::InvalidRequest(
            "Price cannot be negative".to_string(),
        ));
    }

    let currency: Currency = currency.parse().map_err(AppError::InvalidRequest)?;
    Ok(currency.as_str().to_string())
}

/// Find a slug not yet used by the store in `table`, suffixing the title slug if needed.
async fn unique_slug(
    conn: &mut PgConnection,
    table: &'static str,
    store_id: Uuid,
    title: &str,
) -> Result<String, AppError> {
    let base = slugify(title);

    let taken: bool = sqlx::query_scalar(&format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE store_id = $1 AND slug = $2)",
        table
    ))
    .bind(store_id)
    .bind(&base)
    .fetch_one(&mut *conn)
    .await?;

    if !taken {
        return Ok(base);
    }

    let suffix = Uuid::new_v4().simple().to_string();
    Ok(format!("{}-{}", base, &suffix[..8]))
}

/// Insert a book for a store.
///
/// Takes a connection rather than the pool so publishing a submission can
/// create the book inside its own transaction.
pub async fn create_book(
    conn: &mut PgConnection,
    store_id: Uuid,
    request: CreateBookRequest,
) -> Result<Book, AppError> {
    let currency = validate_listing(&request.title, request.price_minor, &request.currency)?;

    if request.author_name.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "Author name is required".to_string(),
        ));
    }

    let slug = unique_slug(conn, "books", store_id, &request.title).await?;

    let book = sqlx::query_as::<_, Book>(
        r#"
        INSERT INTO books (store_id, title, slug, author_name, description, cover_image_url, price_minor, currency, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(store_id)
    .bind(request.title.trim())
    .bind(slug)
    .bind(request.author_name.trim())
    .bind(request.description)
    .bind(request.cover_image_url)
    .bind(request.price_minor)
    .bind(currency)
    .bind(request.status.as_str())
    .fetch_one(&mut *conn)
    .await?;

    tracing::info!("Book created: id={}, slug={}", book.id, book.slug);

    Ok(book)
}

/// Books customers can see: published and preorder, newest first.
pub async fn list_listed_books(pool: &DbPool, store_id: Uuid) -> Result<Vec<Book>, AppError> {
    let books = sqlx::query_as::<_, Book>(
        r#"
        SELECT * FROM books
        WHERE store_id = $1 AND status IN ('published', 'preorder')
        ORDER BY created_at DESC
        "#,
    )
    .bind(store_id)
    .fetch_all(pool)
    .await?;

    Ok(books)
}

/// Every book in the store regardless of status (dashboard view).
pub async fn list_all_books(pool: &DbPool, store_id: Uuid) -> Result<Vec<Book>, AppError> {
    let books = sqlx::query_as::<_, Book>(
        "SELECT * FROM books WHERE store_id = $1 ORDER BY created_at DESC",
    )
    .bind(store_id)
    .fetch_all(pool)
    .await?;

    Ok(books)
}

pub async fn get_book(pool: &DbPool, store_id: Uuid, book_id: Uuid) -> Result<Book, AppError> {
    sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 AND store_id = $2")
        .bind(book_id)
        .bind(store_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::BookNotFound)
}

pub async fn update_book_status(
    pool: &DbPool,
    store_id: Uuid,
    book_id: Uuid,
    status: BookStatus,
) -> Result<Book, AppError> {
    sqlx::query_as::<_, Book>(
        r#"
        UPDATE books SET status = $1, updated_at = NOW()
        WHERE id = $2 AND store_id = $3
        RETURNING *
        "#,
    )
    .bind(status.as_str())
    .bind(book_id)
    .bind(store_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::BookNotFound)
}

pub async fn create_course(
    pool: &DbPool,
    store_id: Uuid,
    request: CreateCourseRequest,
) -> Result<Course, AppError> {
    let currency = validate_listing(&request.title, request.price_minor, &request.currency)?;

    if request.instructor_name.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "Instructor name is required".to_string(),
        ));
    }

    let mut conn = pool.acquire().await?;
    let slug = unique_slug(&mut conn, "courses", store_id, &request.title).await?;
    let status = if request.publish { "published" } else { "draft" };

    let course = sqlx::query_as::<_, Course>(
        r#"
        INSERT INTO courses (store_id, title, slug, instructor_name, description, price_minor, currency, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(store_id)
    .bind(request.title.trim())
    .bind(slug)
    .bind(request.instructor_name.trim())
    .bind(request.description)
    .bind(request.price_minor)
    .bind(currency)
    .bind(status)
    .fetch_one(&mut *conn)
    .await?;

    Ok(course)
}

/// Courses visible to customers.
pub async fn list_published_courses(
    pool: &DbPool,
    store_id: Uuid,
) -> Result<Vec<Course>, AppError> {
    let courses = sqlx::query_as::<_, Course>(
        "SELECT * FROM courses WHERE store_id = $1 AND status = 'published' ORDER BY created_at DESC",
    )
    .bind(store_id)
    .fetch_all(pool)
    .await?;

    Ok(courses)
}

pub async fn get_course(
    pool: &DbPool,
    store_id: Uuid,
    course_id: Uuid,
) -> Result<Course, AppError> {
    sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = $1 AND store_id = $2")
        .bind(course_id)
        .bind(store_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::CourseNotFound)
}
