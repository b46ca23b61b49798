//! HTTP handlers for the book catalog.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::api_key::KeyScope;
use crate::models::book::{BookResponse, BookStatus, CreateBookRequest, UpdateBookStatusRequest};
use crate::response::ApiResponse;
use crate::services::catalog_service;

/// Add a book to the catalog.
///
/// # Request Body
///
/// ```json
/// {
///   "title": "Things Fall Apart",
///   "author_name": "Chinua Achebe",
///   "price_minor": 450000,
///   "currency": "NGN",
///   "status": "published"
/// }
/// ```
///
/// # Response
///
/// 201 Created with the book, including its generated slug.
///
/// # Security
///
/// Requires an admin API key.
pub async fn create_book(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateBookRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth.require_admin()?;

    let mut conn = pool.acquire().await?;
    let book = catalog_service::create_book(&mut conn, auth.store_id, request).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(BookResponse::from(book))),
    ))
}

/// List books.
///
/// Storefront keys see `published` and `preorder` books; admin keys see the
/// whole catalog including drafts and archived titles.
pub async fn list_books(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ApiResponse<Vec<BookResponse>>>, AppError> {
    let books = match auth.scope {
        KeyScope::Admin => catalog_service::list_all_books(&pool, auth.store_id).await?,
        KeyScope::Storefront => catalog_service::list_listed_books(&pool, auth.store_id).await?,
    };

    Ok(Json(ApiResponse::ok(
        books.into_iter().map(BookResponse::from).collect(),
    )))
}

/// Get a single book.
///
/// Unlisted books are reported as not found to storefront keys.
pub async fn get_book(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(book_id): Path<Uuid>,
) -> Result<Json<ApiResponse<BookResponse>>, AppError> {
    let book = catalog_service::get_book(&pool, auth.store_id, book_id).await?;

    let listed = book
        .status
        .parse::<BookStatus>()
        .is_ok_and(|status| status.is_listed());

    if auth.scope != KeyScope::Admin && !listed {
        return Err(AppError::BookNotFound);
    }

    Ok(Json(ApiResponse::ok(book.into())))
}

/// Change a book's status, e.g. publish a draft or archive a title.
///
/// # Security
///
/// Requires an admin API key.
pub async fn update_book_status(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(book_id): Path<Uuid>,
    Json(request): Json<UpdateBookStatusRequest>,
) -> Result<Json<ApiResponse<BookResponse>>, AppError> {
    auth.require_admin()?;

    let book =
        catalog_service::update_book_status(&pool, auth.store_id, book_id, request.status).await?;

    Ok(Json(ApiResponse::ok(book.into())))
}
