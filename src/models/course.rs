//! Course catalog models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Course {
    pub id: Uuid,
    pub store_id: Uuid,
    pub title: String,
    pub slug: String,
    pub instructor_name: String,
    pub description: Option<String>,
    /// Price in minor units
    pub price_minor: i64,
    pub currency: String,
    /// `draft`, `published` or `archived`
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCourseRequest {
    pub title: String,
    pub instructor_name: String,
    pub description: Option<String>,
    pub price_minor: i64,

    #[serde(default = "default_currency")]
    pub currency: String,

    /// Publish immediately instead of saving as draft
    #[serde(default)]
    pub publish: bool,
}

fn default_currency() -> String {
    "NGN".to_string()
}

#[derive(Debug, Serialize)]
pub struct CourseResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub instructor_name: String,
    pub description: Option<String>,
    pub price_minor: i64,
    pub currency: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<Course> for CourseResponse {
    fn from(course: Course) -> Self {
        Self {
            id: course.id,
            title: course.title,
            slug: course.slug,
            instructor_name: course.instructor_name,
            description: course.description,
            price_minor: course.price_minor,
            currency: course.currency,
            status: course.status,
            created_at: course.created_at,
        }
    }
}
