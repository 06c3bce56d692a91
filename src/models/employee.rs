use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ValidationError;

/// A learner with an optional development plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Employee {
    pub id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
    pub position: Option<String>,
    /// `None` until a development track is assigned.
    pub development_plan: Option<DevelopmentPlan>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    /// Plan entries, or an empty slice when no plan is assigned.
    pub fn plan_courses(&self) -> &[DevelopmentCourse] {
        self.development_plan
            .as_ref()
            .map(|p| p.courses.as_slice())
            .unwrap_or(&[])
    }

    pub fn plan_course(&self, course_id: Uuid) -> Option<&DevelopmentCourse> {
        self.plan_courses().iter().find(|c| c.course_id == course_id)
    }
}

/// Per-employee ordered curriculum.
///
/// Entry order in `courses` carries no meaning; sequencing comes from each
/// entry's `order` field, which must be unique within the plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DevelopmentPlan {
    pub courses: Vec<DevelopmentCourse>,
}

impl DevelopmentPlan {
    /// Check the plan's structural invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut orders = HashSet::new();
        let mut ids = HashSet::new();
        for entry in &self.courses {
            if !orders.insert(entry.order) {
                return Err(ValidationError::DuplicateOrder(entry.order));
            }
            if !ids.insert(entry.course_id) {
                return Err(ValidationError::DuplicateCourse(entry.course_id));
            }
            entry.validate()?;
        }
        Ok(())
    }

    /// The smallest order strictly greater than every order in the plan.
    pub fn next_order(&self) -> Result<i32, ValidationError> {
        match self.courses.iter().map(|c| c.order).max() {
            Some(last) => last.checked_add(1).ok_or(ValidationError::OrderOverflow),
            None => Ok(0),
        }
    }
}

/// One course reference inside a development plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DevelopmentCourse {
    pub course_id: Uuid,
    /// Prerequisite rank. Lower orders must be certified first.
    pub order: i32,
    /// Completion percentage, 0 to 100.
    pub progress: u8,
    /// Set only once the employee passes certification.
    pub is_certified: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub certified_at: Option<DateTime<Utc>>,
}

impl DevelopmentCourse {
    pub fn new(course_id: Uuid, order: i32) -> Self {
        Self {
            course_id,
            order,
            progress: 0,
            is_certified: false,
            started_at: None,
            completed_at: None,
            certified_at: None,
        }
    }

    /// Progress must be a percentage and present timestamps must satisfy
    /// `started_at <= completed_at <= certified_at`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.progress > 100 {
            return Err(ValidationError::ProgressOutOfRange(self.progress));
        }

        let stamps: Vec<DateTime<Utc>> = [self.started_at, self.completed_at, self.certified_at]
            .into_iter()
            .flatten()
            .collect();
        if stamps.windows(2).any(|w| w[0] > w[1]) {
            return Err(ValidationError::TimestampOrder(self.course_id));
        }

        Ok(())
    }
}

/// Partial update of a plan entry. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CourseProgressUpdate {
    pub progress: Option<u8>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub certified_at: Option<DateTime<Utc>>,
    pub is_certified: Option<bool>,
}

/// Input for creating a new employee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEmployeeInput {
    pub full_name: String,
    pub email: Option<String>,
    pub position: Option<String>,
}

/// Input for adding a course to an employee's plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignCourseInput {
    pub course_id: Uuid,
    /// Explicit plan order. Defaults to after the last assigned course.
    pub order: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
    }

    #[test]
    fn plan_rejects_duplicate_orders() {
        let plan = DevelopmentPlan {
            courses: vec![
                DevelopmentCourse::new(Uuid::new_v4(), 1),
                DevelopmentCourse::new(Uuid::new_v4(), 1),
            ],
        };
        assert_eq!(plan.validate(), Err(ValidationError::DuplicateOrder(1)));
    }

    #[test]
    fn plan_rejects_duplicate_courses() {
        let id = Uuid::new_v4();
        let plan = DevelopmentPlan {
            courses: vec![DevelopmentCourse::new(id, 0), DevelopmentCourse::new(id, 1)],
        };
        assert_eq!(plan.validate(), Err(ValidationError::DuplicateCourse(id)));
    }

    #[test]
    fn entry_rejects_progress_over_100() {
        let mut entry = DevelopmentCourse::new(Uuid::new_v4(), 0);
        entry.progress = 101;
        assert_eq!(entry.validate(), Err(ValidationError::ProgressOutOfRange(101)));
    }

    #[test]
    fn entry_accepts_partial_monotonic_timestamps() {
        let mut entry = DevelopmentCourse::new(Uuid::new_v4(), 0);
        entry.started_at = Some(at(1));
        entry.certified_at = Some(at(3));
        assert!(entry.validate().is_ok());
    }

    #[test]
    fn entry_rejects_completion_before_start() {
        let mut entry = DevelopmentCourse::new(Uuid::new_v4(), 0);
        entry.started_at = Some(at(5));
        entry.completed_at = Some(at(2));
        assert_eq!(
            entry.validate(),
            Err(ValidationError::TimestampOrder(entry.course_id))
        );
    }

    #[test]
    fn next_order_follows_highest_order() {
        let plan = DevelopmentPlan {
            courses: vec![
                DevelopmentCourse::new(Uuid::new_v4(), 4),
                DevelopmentCourse::new(Uuid::new_v4(), 1),
            ],
        };
        assert_eq!(plan.next_order(), Ok(5));
        assert_eq!(DevelopmentPlan::default().next_order(), Ok(0));
    }

    #[test]
    fn next_order_refuses_to_wrap_past_the_last_order() {
        let plan = DevelopmentPlan {
            courses: vec![
                DevelopmentCourse::new(Uuid::new_v4(), -3),
                DevelopmentCourse::new(Uuid::new_v4(), i32::MAX),
            ],
        };
        assert_eq!(plan.next_order(), Err(ValidationError::OrderOverflow));
    }
}
