use thiserror::Error;
use uuid::Uuid;

/// Domain rule violations.
///
/// These are safe to show to API clients and map to `400 Bad Request`.
/// Anything else bubbling out of the persistence layer is treated as internal.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Plan order {0} is used by more than one course")]
    DuplicateOrder(i32),

    #[error("No plan order is left after the last course; pass an explicit order")]
    OrderOverflow,

    #[error("Course {0} appears more than once in the development plan")]
    DuplicateCourse(Uuid),

    #[error("Progress must be between 0 and 100, got {0}")]
    ProgressOutOfRange(u8),

    #[error("Timestamps for course {0} are out of order")]
    TimestampOrder(Uuid),

    #[error("Course {0} is not assigned in the development plan")]
    CourseNotAssigned(Uuid),

    #[error("Course is locked: {0}")]
    CourseLocked(String),

    #[error("Course must be completed before certification (progress {0}%)")]
    CourseNotCompleted(u8),

    #[error("Certification can only be recorded by certifying the course")]
    CertificationNotAllowed,

    #[error("Task {0} does not belong to the course")]
    UnknownTask(Uuid),

    #[error("Submission has already been reviewed")]
    AlreadyReviewed,

    #[error("Cannot move document from {from} to {to}")]
    InvalidTransition { from: &'static str, to: &'static str },

    #[error("Only draft documents can be edited")]
    NotEditable,

    #[error("{0} must not be empty")]
    EmptyField(&'static str),
}

/// A referenced entity does not exist. Maps to `404 Not Found`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0} not found")]
pub struct NotFound(pub &'static str);
