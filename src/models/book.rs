//! Book catalog models and API request/response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Represents a book record from the database.
///
/// # Price Storage
///
/// Prices are stored as `i64` minor units (kobo for NGN) to avoid
/// floating-point precision issues. ₦2,500.00 is stored as 250000.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Book {
    pub id: Uuid,

    /// Store that sells this book
    pub store_id: Uuid,

    pub title: String,

    /// URL-safe identifier, unique per store
    pub slug: String,

    pub author_name: String,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,

    /// List price in minor units
    pub price_minor: i64,

    /// ISO 4217 code
    pub currency: String,

    /// `draft`, `published`, `preorder` or `archived`
    pub status: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lifecycle of a catalog book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookStatus {
    Draft,
    Published,
    /// Visible and purchasable only through an active preorder campaign
    Preorder,
    Archived,
}

impl BookStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Draft => "draft",
            BookStatus::Published => "published",
            BookStatus::Preorder => "preorder",
            BookStatus::Archived => "archived",
        }
    }

    /// Whether customers can see the book in the storefront.
    pub fn is_listed(&self) -> bool {
        matches!(self, BookStatus::Published | BookStatus::Preorder)
    }
}

impl FromStr for BookStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(BookStatus::Draft),
            "published" => Ok(BookStatus::Published),
            "preorder" => Ok(BookStatus::Preorder),
            "archived" => Ok(BookStatus::Archived),
            other => Err(format!("Unknown book status: {}", other)),
        }
    }
}

/// Request body for adding a book to the catalog.
///
/// # JSON Example
///
/// ```json
/// {
///   "title": "Half of a Yellow Sun",
///   "author_name": "Chimamanda Ngozi Adichie",
///   "price_minor": 450000,
///   "currency": "NGN",
///   "status": "published"
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct CreateBookRequest {
    pub title: String,
    pub author_name: String,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub price_minor: i64,

    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default = "default_status")]
    pub status: BookStatus,
}

fn default_currency() -> String {
    "NGN".to_string()
}

fn default_status() -> BookStatus {
    BookStatus::Draft
}

#[derive(Debug, Deserialize)]
pub struct UpdateBookStatusRequest {
    pub status: BookStatus,
}

/// Response body for book endpoints (omits the internal `store_id`).
#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub author_name: String,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub price_minor: i64,
    pub currency: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            slug: book.slug,
            author_name: book.author_name,
            description: book.description,
            cover_image_url: book.cover_image_url,
            price_minor: book.price_minor,
            currency: book.currency,
            status: book.status,
            created_at: book.created_at,
            updated_at: book.updated_at,
        }
    }
}
