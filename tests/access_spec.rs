//! Properties of the course access rules, independent of any storage.

use academy::access::*;
use academy::models::*;
use chrono::{TimeZone, Utc};
use uuid::Uuid;

fn employee(plan: Option<Vec<DevelopmentCourse>>) -> Employee {
    let created = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
    Employee {
        id: Uuid::new_v4(),
        full_name: "Анна Петрова".to_string(),
        email: Some("anna@example.com".to_string()),
        position: Some("Менеджер".to_string()),
        development_plan: plan.map(|courses| DevelopmentPlan { courses }),
        created_at: created,
        updated_at: created,
    }
}

fn entry(course_id: Uuid, order: i32, is_certified: bool) -> DevelopmentCourse {
    DevelopmentCourse {
        is_certified,
        ..DevelopmentCourse::new(course_id, order)
    }
}

fn course(id: Uuid, title: &str) -> Course {
    let created = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
    Course {
        id,
        title: title.to_string(),
        description: String::new(),
        sections: vec![],
        tasks: vec![],
        cover_image: None,
        archived: false,
        created_at: created,
        updated_at: created,
    }
}

/// Courses A, B, C where only A is certified.
struct Scenario {
    a: Uuid,
    b: Uuid,
    c: Uuid,
    employee: Employee,
    courses: Vec<Course>,
}

impl Scenario {
    fn new() -> Self {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        Self {
            a,
            b,
            c,
            employee: employee(Some(vec![
                entry(a, 0, true),
                entry(b, 1, false),
                entry(c, 2, false),
            ])),
            courses: vec![course(a, "A"), course(b, "B"), course(c, "C")],
        }
    }

    fn summaries(&self) -> Vec<CourseSummary> {
        self.courses.iter().map(Course::summary).collect()
    }
}

mod check_course_access {
    use super::*;

    #[test]
    fn first_uncertified_predecessor_blocks() {
        let s = Scenario::new();
        let status = check_course_access(Some(&s.employee), s.c, &s.summaries());

        assert!(!status.has_access);
        assert!(status.is_locked);
        assert_eq!(status.reason.as_deref(), Some(REASON_PREVIOUS_NOT_CERTIFIED));
        assert_eq!(status.previous_course_id, Some(s.b));
        assert_eq!(status.previous_course_title.as_deref(), Some("B"));
    }

    #[test]
    fn first_course_has_no_predecessors() {
        let s = Scenario::new();
        let status = check_course_access(Some(&s.employee), s.a, &s.summaries());
        assert_eq!(status, AccessStatus::granted());
    }

    #[test]
    fn employee_without_plan_is_locked() {
        let status = check_course_access(Some(&employee(None)), Uuid::new_v4(), &[]);

        assert!(!status.has_access);
        assert!(status.is_locked);
        assert_eq!(
            status.reason.as_deref(),
            Some("Курс не назначен в вашей карте развития")
        );
    }

    #[test]
    fn empty_plan_locks_every_course() {
        let s = Scenario::new();
        let empty = employee(Some(vec![]));
        for id in [s.a, s.b, s.c, Uuid::new_v4()] {
            let status = check_course_access(Some(&empty), id, &s.summaries());
            assert!(status.is_locked);
            assert!(!status.has_access);
        }
    }

    #[test]
    fn course_outside_plan_is_locked() {
        let s = Scenario::new();
        let status = check_course_access(Some(&s.employee), Uuid::new_v4(), &s.summaries());
        assert_eq!(status, AccessStatus::not_assigned());
    }

    #[test]
    fn access_iff_all_lower_orders_certified() {
        const SIZE: usize = 5;
        let ids: Vec<Uuid> = (0..SIZE).map(|_| Uuid::new_v4()).collect();

        for pattern in 0u32..(1 << SIZE) {
            let certified = |i: usize| pattern & (1 << i) != 0;
            // Store entries in reverse so array order disagrees with plan order.
            let plan = (0..SIZE)
                .rev()
                .map(|i| entry(ids[i], (i as i32) * 10, certified(i)))
                .collect();
            let employee = employee(Some(plan));

            for target in 0..SIZE {
                let expected = (0..target).all(certified);
                let status = check_course_access(Some(&employee), ids[target], &[]);
                assert_eq!(
                    status.has_access, expected,
                    "pattern {:05b}, target {}",
                    pattern, target
                );
                assert_eq!(status.is_locked, !expected);

                if !expected {
                    let first_blocker = (0..target).find(|&i| !certified(i)).unwrap();
                    assert_eq!(status.previous_course_id, Some(ids[first_blocker]));
                }
            }
        }
    }

    #[test]
    fn evaluation_is_idempotent() {
        let s = Scenario::new();
        let summaries = s.summaries();
        for id in [s.a, s.b, s.c] {
            let first = check_course_access(Some(&s.employee), id, &summaries);
            let second = check_course_access(Some(&s.employee), id, &summaries);
            assert_eq!(first, second);
        }
    }
}

mod update_course_progress {
    use super::*;

    #[test]
    fn merges_only_the_given_fields() {
        let s = Scenario::new();
        let updated = update_course_progress(
            &s.employee,
            s.b,
            &CourseProgressUpdate {
                progress: Some(50),
                ..Default::default()
            },
        );

        let before = s.employee.plan_course(s.b).unwrap();
        let after = updated.plan_course(s.b).unwrap();
        assert_eq!(after.progress, 50);
        assert_eq!(
            DevelopmentCourse {
                progress: before.progress,
                ..after.clone()
            },
            *before
        );

        // Other entries and employee fields are untouched.
        assert_eq!(updated.plan_course(s.a), s.employee.plan_course(s.a));
        assert_eq!(updated.plan_course(s.c), s.employee.plan_course(s.c));
        assert_eq!(updated.full_name, s.employee.full_name);
    }

    #[test]
    fn unknown_course_is_a_no_op() {
        let s = Scenario::new();
        let updated = update_course_progress(
            &s.employee,
            Uuid::new_v4(),
            &CourseProgressUpdate {
                progress: Some(80),
                is_certified: Some(true),
                ..Default::default()
            },
        );
        assert_eq!(updated, s.employee);
    }

    #[test]
    fn employee_without_plan_is_returned_unchanged() {
        let e = employee(None);
        let updated = update_course_progress(
            &e,
            Uuid::new_v4(),
            &CourseProgressUpdate {
                progress: Some(10),
                ..Default::default()
            },
        );
        assert_eq!(updated, e);
    }

    #[test]
    fn input_employee_is_not_mutated() {
        let s = Scenario::new();
        let snapshot = s.employee.clone();
        let _ = update_course_progress(
            &s.employee,
            s.b,
            &CourseProgressUpdate {
                is_certified: Some(true),
                ..Default::default()
            },
        );
        assert_eq!(s.employee, snapshot);
    }

    #[test]
    fn certifying_predecessor_unlocks_next_course() {
        let s = Scenario::new();
        let certified_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let updated = update_course_progress(
            &s.employee,
            s.b,
            &CourseProgressUpdate {
                is_certified: Some(true),
                certified_at: Some(certified_at),
                ..Default::default()
            },
        );

        let b = updated.plan_course(s.b).unwrap();
        assert!(b.is_certified);
        assert_eq!(b.certified_at, Some(certified_at));

        let status = check_course_access(Some(&updated), s.c, &s.summaries());
        assert!(status.has_access);
        assert!(!status.is_locked);
    }
}

mod accessible_courses {
    use super::*;

    #[test]
    fn sorted_by_plan_order_regardless_of_input_order() {
        let (x, y, z) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let e = employee(Some(vec![
            entry(z, 7, false),
            entry(x, 1, true),
            entry(y, 4, true),
        ]));
        let courses = vec![course(y, "Y"), course(z, "Z"), course(x, "X")];

        let result = accessible_courses(&e, &courses);
        let orders: Vec<i32> = result.iter().map(|c| c.order).collect();
        assert_eq!(orders, vec![1, 4, 7]);
        assert!(result.iter().all(|c| c.access_status.has_access));
    }

    #[test]
    fn dangling_references_are_dropped() {
        let s = Scenario::new();
        let courses: Vec<Course> = s.courses.iter().filter(|c| c.id != s.b).cloned().collect();

        let result = accessible_courses(&s.employee, &courses);
        let ids: Vec<Uuid> = result.iter().map(|c| c.course.id).collect();
        assert_eq!(ids, vec![s.a, s.c]);

        // The missing course still blocks, with a generic title.
        assert_eq!(
            result[1].access_status.previous_course_title.as_deref(),
            Some(FALLBACK_PREVIOUS_TITLE)
        );
    }

    #[test]
    fn plan_entries_surface_missing_courses() {
        let s = Scenario::new();
        let courses: Vec<Course> = s.courses.iter().filter(|c| c.id != s.b).cloned().collect();

        let entries = plan_course_entries(&s.employee, &courses);
        assert_eq!(entries.len(), 3);
        assert_eq!(
            entries[1],
            PlanCourseEntry::Missing {
                course_id: s.b,
                order: 1
            }
        );
    }

    #[test]
    fn carries_progress_and_stage() {
        let s = Scenario::new();
        let e = update_course_progress(
            &s.employee,
            s.b,
            &CourseProgressUpdate {
                progress: Some(30),
                ..Default::default()
            },
        );

        let result = accessible_courses(&e, &s.courses);
        let stages: Vec<CourseStage> = result.iter().map(|c| c.stage).collect();
        assert_eq!(
            stages,
            vec![
                CourseStage::Certified,
                CourseStage::InProgress,
                CourseStage::Locked
            ]
        );
        assert_eq!(result[1].progress, 30);
        assert!(result[0].is_certified);
    }

    #[test]
    fn employee_without_plan_has_no_courses() {
        let s = Scenario::new();
        assert!(accessible_courses(&employee(None), &s.courses).is_empty());
    }
}
