use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An employee's answer to a course task.
///
/// Submissions are auto-graded when created (if the task has grading
/// criteria) and then approved or rejected by a reviewer. Approved
/// submissions drive the employee's course progress.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskSubmission {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub course_id: Uuid,
    pub task_id: Uuid,
    pub answer: String,
    pub status: SubmissionStatus,
    /// Suggested grade from the auto-grader. `None` for tasks without criteria.
    pub auto_grade: Option<GradeReport>,
    pub reviewer_comment: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

/// Review state of a submission.
///
/// - `Submitted`: waiting for a reviewer
/// - `Approved`: accepted, counts towards course progress
/// - `Rejected`: returned to the employee
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Submitted,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "submitted" => Some(Self::Submitted),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// Output of the auto-grader.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GradeReport {
    /// Integer percentage, 0 to 100.
    pub score: u8,
    pub passed: bool,
    pub word_count: u32,
    pub matched_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
}

/// Input for submitting an answer to a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubmissionInput {
    pub answer: String,
}

/// A reviewer's verdict on a submission.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

/// Input for reviewing a submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewSubmissionInput {
    pub decision: ReviewDecision,
    pub comment: Option<String>,
}
