//! HTTP handlers for courses.

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
use crate::models::course::{CourseResponse, CreateCourseRequest};
use crate::response::ApiResponse;
use crate::services::catalog_service;

/// Create a course. Saved as draft unless `"publish": true`.
///
/// # Security
///
/// Requires an admin API key.
pub async fn create_course(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateCourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth.require_admin()?;

    let course = catalog_service::create_course(&pool, auth.store_id, request).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(CourseResponse::from(course))),
    ))
}

pub async fn list_courses(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ApiResponse<Vec<CourseResponse>>>, AppError> {
    let courses = catalog_service::list_published_courses(&pool, auth.store_id).await?;

    Ok(Json(ApiResponse::ok(
        courses.into_iter().map(CourseResponse::from).collect(),
    )))
}

/// Get a course. Drafts are only visible to admin keys.
pub async fn get_course(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<ApiResponse<CourseResponse>>, AppError> {
    let course = catalog_service::get_course(&pool, auth.store_id, course_id).await?;

    if auth.scope != KeyScope::Admin && course.status != "published" {
        return Err(AppError::CourseNotFound);
    }

    Ok(Json(ApiResponse::ok(course.into())))
}
