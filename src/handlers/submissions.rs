//! HTTP handlers for manuscript submissions.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::submission::{
    CreateSubmissionRequest, PublishSubmissionRequest, ReviewSubmissionRequest,
    SubmissionListQuery, SubmissionResponse,
};
use crate::response::ApiResponse;
use crate::services::submission_service;

/// Submit a manuscript for review.
///
/// # Request Body
///
/// ```json
/// {
///   "author_name": "Ayo Writer",
///   "author_email": "ayo@example.com",
///   "title": "Harmattan Letters",
///   "synopsis": "A season of letters between two cities.",
///   "genre": "Literary fiction",
///   "manuscript_url": "https://files.example.com/harmattan.pdf"
/// }
/// ```
///
/// # Response
///
/// 201 Created with the submission in `pending` status.
pub async fn create_submission(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateSubmissionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let submission = submission_service::create_submission(&pool, auth.store_id, request).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(SubmissionResponse::from(submission))),
    ))
}

pub async fn get_submission(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(submission_id): Path<Uuid>,
) -> Result<Json<ApiResponse<SubmissionResponse>>, AppError> {
    let submission =
        submission_service::get_submission(&pool, auth.store_id, submission_id).await?;

    Ok(Json(ApiResponse::ok(submission.into())))
}

/// Review queue, oldest first. Admin only.
pub async fn list_submissions(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<SubmissionListQuery>,
) -> Result<Json<ApiResponse<Vec<SubmissionResponse>>>, AppError> {
    auth.require_admin()?;

    let submissions =
        submission_service::list_submissions(&pool, auth.store_id, query.status).await?;

    Ok(Json(ApiResponse::ok(
        submissions.into_iter().map(SubmissionResponse::from).collect(),
    )))
}

/// Record an editorial decision.
///
/// # Request Body
///
/// ```json
/// { "status": "revision_requested", "notes": "Tighten the second act." }
/// ```
///
/// Returns 409 Conflict when the move is not allowed from the current status.
pub async fn review_submission(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(submission_id): Path<Uuid>,
    Json(request): Json<ReviewSubmissionRequest>,
) -> Result<Json<ApiResponse<SubmissionResponse>>, AppError> {
    auth.require_admin()?;

    let submission =
        submission_service::review_submission(&pool, auth.store_id, submission_id, request)
            .await?;

    Ok(Json(ApiResponse::ok(submission.into())))
}

/// Publish an accepted submission as a catalog book. Admin only.
pub async fn publish_submission(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(submission_id): Path<Uuid>,
    Json(request): Json<PublishSubmissionRequest>,
) -> Result<Json<ApiResponse<SubmissionResponse>>, AppError> {
    auth.require_admin()?;

    let submission =
        submission_service::publish_submission(&pool, auth.store_id, submission_id, request)
            .await?;

    Ok(Json(ApiResponse::ok(submission.into())))
}
