//! Domain models for Academy.
//!
//! # Core Concepts
//!
//! ## Curriculum
//!
//! - [`Course`]: Authored learning content made of ordered [`Section`]s and
//!   checklist [`CourseTask`]s. Courses are archived, never hard-wired into plans.
//! - [`Employee`]: A learner. Each employee may carry a [`DevelopmentPlan`], an
//!   ordered list of [`DevelopmentCourse`] entries referencing courses by id.
//!
//! ## Access and progression
//!
//! - [`AccessStatus`]: Result of evaluating whether a plan course is unlocked.
//!   A course is unlocked once every course earlier in the plan is certified.
//! - [`CourseStage`]: Derived position of a plan entry in the
//!   `Locked → Unlocked → InProgress → Completed → Certified` progression.
//! - [`PlanCourseEntry`]: A plan entry resolved against the course catalogue,
//!   including entries whose course no longer exists.
//!
//! ## Work products
//!
//! - [`TaskSubmission`]: An employee's answer to a course task, auto-graded on
//!   submission and then reviewed.
//! - [`ZrsDocument`]: A Situation / Data / Solution (ЗРС) report with a small
//!   review workflow.

mod access;
mod course;
mod employee;
mod error;
mod submission;
mod zrs;

pub use access::*;
pub use course::*;
pub use employee::*;
pub use error::*;
pub use submission::*;
pub use zrs::*;
