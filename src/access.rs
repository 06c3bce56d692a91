//! Sequential course access and progression.
//!
//! A course at plan order `n` is open to an employee iff every course at an
//! order below `n` in that employee's plan is certified. Everything here is a
//! pure function over caller-owned values: no I/O, no hidden state, and no
//! error path. Missing data locks a course rather than failing.

use crate::models::*;
use uuid::Uuid;

/// Decide whether `course_id` is unlocked for `employee`.
///
/// `all_courses` is only used to put a title on the blocking course.
pub fn check_course_access(
    employee: Option<&Employee>,
    course_id: Uuid,
    all_courses: &[CourseSummary],
) -> AccessStatus {
    let Some(employee) = employee else {
        return AccessStatus::not_assigned();
    };

    let plan = employee.plan_courses();
    let Some(target) = plan.iter().find(|c| c.course_id == course_id) else {
        return AccessStatus::not_assigned();
    };

    let mut predecessors: Vec<&DevelopmentCourse> =
        plan.iter().filter(|c| c.order < target.order).collect();
    predecessors.sort_by_key(|c| c.order);

    match predecessors.into_iter().find(|c| !c.is_certified) {
        Some(blocking) => {
            let title = all_courses
                .iter()
                .find(|c| c.id == blocking.course_id)
                .map(|c| c.title.clone())
                .unwrap_or_else(|| FALLBACK_PREVIOUS_TITLE.to_string());
            AccessStatus::blocked_by(blocking.course_id, title)
        }
        None => AccessStatus::granted(),
    }
}

/// Return a copy of `employee` with the plan entry for `course_id` merged with `updates`.
///
/// Unknown course ids, or an employee without a plan, yield an unchanged copy.
pub fn update_course_progress(
    employee: &Employee,
    course_id: Uuid,
    updates: &CourseProgressUpdate,
) -> Employee {
    let mut updated = employee.clone();
    let Some(entry) = updated
        .development_plan
        .as_mut()
        .and_then(|plan| plan.courses.iter_mut().find(|c| c.course_id == course_id))
    else {
        return updated;
    };

    if let Some(progress) = updates.progress {
        entry.progress = progress;
    }
    if let Some(started_at) = updates.started_at {
        entry.started_at = Some(started_at);
    }
    if let Some(completed_at) = updates.completed_at {
        entry.completed_at = Some(completed_at);
    }
    if let Some(certified_at) = updates.certified_at {
        entry.certified_at = Some(certified_at);
    }
    if let Some(is_certified) = updates.is_certified {
        entry.is_certified = is_certified;
    }

    updated
}

/// Resolve every plan entry against the catalogue, sorted by plan order.
///
/// Entries whose course no longer exists come back as [`PlanCourseEntry::Missing`].
pub fn plan_course_entries(employee: &Employee, all_courses: &[Course]) -> Vec<PlanCourseEntry> {
    let summaries: Vec<CourseSummary> = all_courses.iter().map(CourseSummary::from).collect();

    let mut entries: Vec<PlanCourseEntry> = employee
        .plan_courses()
        .iter()
        .map(|entry| match all_courses.iter().find(|c| c.id == entry.course_id) {
            Some(course) => {
                let access_status = check_course_access(Some(employee), course.id, &summaries);
                PlanCourseEntry::Available(AccessibleCourse {
                    course: course.clone(),
                    stage: course_stage(entry, &access_status),
                    access_status,
                    order: entry.order,
                    progress: entry.progress,
                    is_certified: entry.is_certified,
                })
            }
            None => PlanCourseEntry::Missing {
                course_id: entry.course_id,
                order: entry.order,
            },
        })
        .collect();

    entries.sort_by_key(PlanCourseEntry::order);
    entries
}

/// The employee's plan courses that still exist, with access, sorted by plan order.
pub fn accessible_courses(employee: &Employee, all_courses: &[Course]) -> Vec<AccessibleCourse> {
    plan_course_entries(employee, all_courses)
        .into_iter()
        .filter_map(|entry| match entry {
            PlanCourseEntry::Available(course) => Some(course),
            PlanCourseEntry::Missing { .. } => None,
        })
        .collect()
}

/// Place a plan entry in the `Locked → … → Certified` progression.
pub fn course_stage(entry: &DevelopmentCourse, access: &AccessStatus) -> CourseStage {
    if entry.is_certified {
        CourseStage::Certified
    } else if access.is_locked {
        CourseStage::Locked
    } else if entry.progress >= 100 {
        CourseStage::Completed
    } else if entry.progress > 0 {
        CourseStage::InProgress
    } else {
        CourseStage::Unlocked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn employee_with(entries: Vec<DevelopmentCourse>) -> Employee {
        Employee {
            id: Uuid::new_v4(),
            full_name: "Test".to_string(),
            email: None,
            position: None,
            development_plan: Some(DevelopmentPlan { courses: entries }),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn certified(course_id: Uuid, order: i32) -> DevelopmentCourse {
        DevelopmentCourse {
            is_certified: true,
            ..DevelopmentCourse::new(course_id, order)
        }
    }

    #[test]
    fn missing_employee_is_locked() {
        let status = check_course_access(None, Uuid::new_v4(), &[]);
        assert_eq!(status, AccessStatus::not_assigned());
    }

    #[test]
    fn blocking_title_falls_back_when_course_unknown() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let employee = employee_with(vec![
            DevelopmentCourse::new(a, 0),
            DevelopmentCourse::new(b, 1),
        ]);

        let status = check_course_access(Some(&employee), b, &[]);
        assert_eq!(
            status.previous_course_title.as_deref(),
            Some(FALLBACK_PREVIOUS_TITLE)
        );
    }

    #[test]
    fn negative_orders_sequence_like_any_other() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let employee = employee_with(vec![
            DevelopmentCourse::new(b, 3),
            DevelopmentCourse::new(a, -2),
        ]);

        assert!(check_course_access(Some(&employee), a, &[]).has_access);
        let status = check_course_access(Some(&employee), b, &[]);
        assert_eq!(status.previous_course_id, Some(a));
    }

    #[test]
    fn stage_follows_progress_once_unlocked() {
        let id = Uuid::new_v4();
        let open = AccessStatus::granted();
        let mut entry = DevelopmentCourse::new(id, 0);
        assert_eq!(course_stage(&entry, &open), CourseStage::Unlocked);

        entry.progress = 40;
        assert_eq!(course_stage(&entry, &open), CourseStage::InProgress);

        entry.progress = 100;
        assert_eq!(course_stage(&entry, &open), CourseStage::Completed);

        entry.is_certified = true;
        assert_eq!(course_stage(&entry, &open), CourseStage::Certified);
    }

    #[test]
    fn locked_entry_reports_locked_even_with_progress() {
        let mut entry = DevelopmentCourse::new(Uuid::new_v4(), 1);
        entry.progress = 50;
        let locked = AccessStatus::blocked_by(Uuid::new_v4(), "Intro".to_string());
        assert_eq!(course_stage(&entry, &locked), CourseStage::Locked);
    }

    #[test]
    fn certified_predecessors_grant_access() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let employee = employee_with(vec![
            certified(a, 0),
            certified(b, 1),
            DevelopmentCourse::new(c, 2),
        ]);
        assert_eq!(
            check_course_access(Some(&employee), c, &[]),
            AccessStatus::granted()
        );
    }
}
