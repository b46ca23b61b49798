//! Submission service - the editorial pipeline from manuscript to catalog book.
//!
//! Status changes are checked against `SubmissionStatus::can_transition_to`
//! while the row is locked, so two editors acting at once cannot both win.

use crate::{
    db::DbPool,
    error::AppError,
    models::{
        book::{BookStatus, CreateBookRequest},
        submission::{
            BookSubmission, CreateSubmissionRequest, PublishSubmissionRequest,
            ReviewSubmissionRequest, SubmissionStatus,
        },
    },
    services::catalog_service,
};
use sqlx::PgConnection;
use uuid::Uuid;

const MAX_SYNOPSIS_CHARS: usize = 5_000;

fn required(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidRequest(format!("{} is required", field)));
    }
    Ok(())
}

fn validate_submission(request: &CreateSubmissionRequest) -> Result<(), AppError> {
    required(&request.author_name, "author_name")?;
    required(&request.title, "title")?;
    required(&request.synopsis, "synopsis")?;

    let email = request.author_email.trim();
    let valid_email = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid_email {
        return Err(AppError::InvalidRequest(
            "author_email must be a valid email address".to_string(),
        ));
    }

    if request.synopsis.chars().count() > MAX_SYNOPSIS_CHARS {
        return Err(AppError::InvalidRequest(format!(
            "synopsis must be at most {} characters",
            MAX_SYNOPSIS_CHARS
        )));
    }

    let url = url::Url::parse(request.manuscript_url.trim()).map_err(|_| {
        AppError::InvalidRequest("manuscript_url must be a valid URL".to_string())
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::InvalidRequest(
            "manuscript_url must use HTTP or HTTPS".to_string(),
        ));
    }

    Ok(())
}

/// Check an editorial decision against the current status.
///
/// `published` is refused here because publishing also creates the book.
pub fn check_review(current: SubmissionStatus, next: SubmissionStatus) -> Result<(), AppError> {
    if next == SubmissionStatus::Published || !current.can_transition_to(next) {
        return Err(AppError::InvalidTransition {
            from: current.to_string(),
            to: next.to_string(),
        });
    }
    Ok(())
}

pub async fn create_submission(
    pool: &DbPool,
    store_id: Uuid,
    request: CreateSubmissionRequest,
) -> Result<BookSubmission, AppError> {
    validate_submission(&request)?;

    let submission = sqlx::query_as::<_, BookSubmission>(
        r#"
        INSERT INTO book_submissions (store_id, author_name, author_email, title, synopsis, genre, manuscript_url)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(store_id)
    .bind(request.author_name.trim())
    .bind(request.author_email.trim().to_lowercase())
    .bind(request.title.trim())
    .bind(request.synopsis.trim())
    .bind(request.genre.as_deref().map(str::trim))
    .bind(request.manuscript_url.trim())
    .fetch_one(pool)
    .await?;

    tracing::info!("Submission received: id={}, title={}", submission.id, submission.title);

    Ok(submission)
}

pub async fn get_submission(
    pool: &DbPool,
    store_id: Uuid,
    submission_id: Uuid,
) -> Result<BookSubmission, AppError> {
    sqlx::query_as::<_, BookSubmission>(
        "SELECT * FROM book_submissions WHERE id = $1 AND store_id = $2",
    )
    .bind(submission_id)
    .bind(store_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::SubmissionNotFound)
}

pub async fn list_submissions(
    pool: &DbPool,
    store_id: Uuid,
    status: Option<SubmissionStatus>,
) -> Result<Vec<BookSubmission>, AppError> {
    let submissions = sqlx::query_as::<_, BookSubmission>(
        r#"
        SELECT * FROM book_submissions
        WHERE store_id = $1 AND ($2::TEXT IS NULL OR status = $2)
        ORDER BY created_at ASC
        "#,
    )
    .bind(store_id)
    .bind(status.map(|s| s.as_str()))
    .fetch_all(pool)
    .await?;

    Ok(submissions)
}

async fn lock_submission(
    conn: &mut PgConnection,
    store_id: Uuid,
    submission_id: Uuid,
) -> Result<BookSubmission, AppError> {
    sqlx::query_as::<_, BookSubmission>(
        "SELECT * FROM book_submissions WHERE id = $1 AND store_id = $2 FOR UPDATE",
    )
    .bind(submission_id)
    .bind(store_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(AppError::SubmissionNotFound)
}

fn current_status(submission: &BookSubmission) -> Result<SubmissionStatus, AppError> {
    submission.status.parse().map_err(AppError::InvalidRequest)
}

/// Record an editorial decision.
pub async fn review_submission(
    pool: &DbPool,
    store_id: Uuid,
    submission_id: Uuid,
    request: ReviewSubmissionRequest,
) -> Result<BookSubmission, AppError> {
    let mut tx = pool.begin().await?;

    let submission = lock_submission(&mut tx, store_id, submission_id).await?;
    check_review(current_status(&submission)?, request.status)?;

    let updated = sqlx::query_as::<_, BookSubmission>(
        r#"
        UPDATE book_submissions
        SET status = $2,
            reviewer_notes = COALESCE($3, reviewer_notes),
            reviewed_at = NOW(),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(submission.id)
    .bind(request.status.as_str())
    .bind(request.notes)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        "Submission {} moved {} -> {}",
        updated.id,
        submission.status,
        updated.status
    );

    Ok(updated)
}

/// Publish an accepted submission as a catalog book.
///
/// The book insert and the status change commit together.
pub async fn publish_submission(
    pool: &DbPool,
    store_id: Uuid,
    submission_id: Uuid,
    request: PublishSubmissionRequest,
) -> Result<BookSubmission, AppError> {
    let mut tx = pool.begin().await?;

    let submission = lock_submission(&mut tx, store_id, submission_id).await?;
    let current = current_status(&submission)?;

    if !current.can_transition_to(SubmissionStatus::Published) {
        return Err(AppError::InvalidTransition {
            from: current.to_string(),
            to: SubmissionStatus::Published.to_string(),
        });
    }

    let book = catalog_service::create_book(
        &mut tx,
        store_id,
        CreateBookRequest {
            title: submission.title.clone(),
            author_name: submission.author_name.clone(),
            description: Some(submission.synopsis.clone()),
            cover_image_url: request.cover_image_url,
            price_minor: request.price_minor,
            currency: request.currency,
            status: BookStatus::Published,
        },
    )
    .await?;

    let published = sqlx::query_as::<_, BookSubmission>(
        r#"
        UPDATE book_submissions
        SET status = 'published', book_id = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(submission.id)
    .bind(book.id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!("Submission {} published as book {}", published.id, book.id);

    Ok(published)
}
