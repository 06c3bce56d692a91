use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Course;

/// Lock reason when the course is absent from the employee's plan.
pub const REASON_NOT_ASSIGNED: &str = "Курс не назначен в вашей карте развития";

/// Lock reason when an earlier plan course is not yet certified.
pub const REASON_PREVIOUS_NOT_CERTIFIED: &str =
    "Необходимо пройти аттестацию по предыдущему курсу";

/// Title used when the blocking course is missing from the catalogue.
pub const FALLBACK_PREVIOUS_TITLE: &str = "Предыдущий курс";

/// Whether a plan course is open to an employee, and why not if it isn't.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessStatus {
    pub has_access: bool,
    pub is_locked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// First uncertified course earlier in the plan.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_course_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_course_title: Option<String>,
}

impl AccessStatus {
    pub fn granted() -> Self {
        Self {
            has_access: true,
            is_locked: false,
            reason: None,
            previous_course_id: None,
            previous_course_title: None,
        }
    }

    pub fn not_assigned() -> Self {
        Self {
            has_access: false,
            is_locked: true,
            reason: Some(REASON_NOT_ASSIGNED.to_string()),
            previous_course_id: None,
            previous_course_title: None,
        }
    }

    pub fn blocked_by(previous_course_id: Uuid, previous_course_title: String) -> Self {
        Self {
            has_access: false,
            is_locked: true,
            reason: Some(REASON_PREVIOUS_NOT_CERTIFIED.to_string()),
            previous_course_id: Some(previous_course_id),
            previous_course_title: Some(previous_course_title),
        }
    }
}

/// A plan course resolved against the catalogue, with its access state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessibleCourse {
    pub course: Course,
    pub access_status: AccessStatus,
    pub order: i32,
    pub progress: u8,
    pub is_certified: bool,
    pub stage: CourseStage,
}

/// One plan entry as seen by the catalogue.
///
/// `Missing` marks entries whose course id no longer resolves, e.g. after the
/// course was deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanCourseEntry {
    Available(AccessibleCourse),
    Missing { course_id: Uuid, order: i32 },
}

impl PlanCourseEntry {
    pub fn order(&self) -> i32 {
        match self {
            Self::Available(c) => c.order,
            Self::Missing { order, .. } => *order,
        }
    }

    pub fn course_id(&self) -> Uuid {
        match self {
            Self::Available(c) => c.course.id,
            Self::Missing { course_id, .. } => *course_id,
        }
    }
}

/// Where a plan course sits in the progression.
///
/// - `Locked`: an earlier course is not yet certified
/// - `Unlocked`: open, no progress yet
/// - `InProgress`: some progress recorded
/// - `Completed`: progress reached 100, awaiting certification
/// - `Certified`: certification passed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum CourseStage {
    Locked,
    Unlocked,
    InProgress,
    Completed,
    Certified,
}

impl CourseStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Locked => "locked",
            Self::Unlocked => "unlocked",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Certified => "certified",
        }
    }
}
