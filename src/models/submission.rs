//! Manuscript submission models and the editorial status machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// An author's manuscript moving through editorial review.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct BookSubmission {
    pub id: Uuid,
    pub store_id: Uuid,
    pub author_name: String,
    pub author_email: String,
    pub title: String,
    pub synopsis: String,
    pub genre: Option<String>,

    /// Where the manuscript file lives (uploads are handled outside this service)
    pub manuscript_url: String,

    pub status: String,
    pub reviewer_notes: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,

    /// Set once the submission is published as a book
    pub book_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editorial status.
///
/// ```text
/// pending ──► under_review ──► accepted ──► published
///    │  ▲           │
///    │  │           ├──► rejected
///    │  └───────────┴──► revision_requested
///    └──► rejected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Pending,
    UnderReview,
    Accepted,
    Rejected,
    RevisionRequested,
    Published,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::UnderReview => "under_review",
            SubmissionStatus::Accepted => "accepted",
            SubmissionStatus::Rejected => "rejected",
            SubmissionStatus::RevisionRequested => "revision_requested",
            SubmissionStatus::Published => "published",
        }
    }

    pub fn can_transition_to(&self, next: SubmissionStatus) -> bool {
        use SubmissionStatus::*;

        matches!(
            (self, next),
            (Pending, UnderReview)
                | (Pending, Rejected)
                | (UnderReview, Accepted)
                | (UnderReview, Rejected)
                | (UnderReview, RevisionRequested)
                | (RevisionRequested, Pending)
                | (Accepted, Published)
        )
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SubmissionStatus::Pending),
            "under_review" => Ok(SubmissionStatus::UnderReview),
            "accepted" => Ok(SubmissionStatus::Accepted),
            "rejected" => Ok(SubmissionStatus::Rejected),
            "revision_requested" => Ok(SubmissionStatus::RevisionRequested),
            "published" => Ok(SubmissionStatus::Published),
            other => Err(format!("Unknown submission status: {}", other)),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateSubmissionRequest {
    pub author_name: String,
    pub author_email: String,
    pub title: String,
    pub synopsis: String,
    pub genre: Option<String>,
    pub manuscript_url: String,
}

/// Editorial decision on a submission.
///
/// `published` is not accepted here; use the publish endpoint, which also
/// creates the catalog book.
#[derive(Debug, Deserialize)]
pub struct ReviewSubmissionRequest {
    pub status: SubmissionStatus,
    pub notes: Option<String>,
}

/// Catalog details for the book created when a submission is published.
#[derive(Debug, Deserialize)]
pub struct PublishSubmissionRequest {
    pub price_minor: i64,

    #[serde(default = "default_currency")]
    pub currency: String,

    pub cover_image_url: Option<String>,
}

fn default_currency() -> String {
    "NGN".to_string()
}

#[derive(Debug, Deserialize)]
pub struct SubmissionListQuery {
    pub status: Option<SubmissionStatus>,
}

#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub id: Uuid,
    pub author_name: String,
    pub author_email: String,
    pub title: String,
    pub synopsis: String,
    pub genre: Option<String>,
    pub manuscript_url: String,
    pub status: String,
    pub reviewer_notes: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub book_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BookSubmission> for SubmissionResponse {
    fn from(s: BookSubmission) -> Self {
        Self {
            id: s.id,
            author_name: s.author_name,
            author_email: s.author_email,
            title: s.title,
            synopsis: s.synopsis,
            genre: s.genre,
            manuscript_url: s.manuscript_url,
            status: s.status,
            reviewer_notes: s.reviewer_notes,
            reviewed_at: s.reviewed_at,
            book_id: s.book_id,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SubmissionStatus::*;
    use super::*;

    #[test]
    fn review_path_to_publication() {
        assert!(Pending.can_transition_to(UnderReview));
        assert!(UnderReview.can_transition_to(Accepted));
        assert!(Accepted.can_transition_to(Published));
    }

    #[test]
    fn revisions_return_to_pending() {
        assert!(UnderReview.can_transition_to(RevisionRequested));
        assert!(RevisionRequested.can_transition_to(Pending));
        assert!(!RevisionRequested.can_transition_to(Accepted));
    }

    #[test]
    fn terminal_states_do_not_move() {
        let all = [
            Pending,
            UnderReview,
            Accepted,
            Rejected,
            RevisionRequested,
            Published,
        ];
        for next in all {
            assert!(!Rejected.can_transition_to(next));
            assert!(!Published.can_transition_to(next));
        }
    }

    #[test]
    fn cannot_skip_review() {
        assert!(!Pending.can_transition_to(Accepted));
        assert!(!Pending.can_transition_to(Published));
        assert!(!UnderReview.can_transition_to(Published));
    }

    #[test]
    fn status_strings_match_database_values() {
        assert_eq!(RevisionRequested.as_str(), "revision_requested");
        assert_eq!(
            "under_review".parse::<SubmissionStatus>().unwrap(),
            UnderReview
        );
        assert_eq!(
            serde_json::to_value(UnderReview).unwrap(),
            serde_json::json!("under_review")
        );
    }
}
