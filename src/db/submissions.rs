use std::collections::HashSet;

use anyhow::Result;
use chrono::Utc;
use rusqlite::{Connection, Row};
use uuid::Uuid;

use super::courses::get_course;
use super::employees::{commit_progress, get_employee};
use super::{parse_datetime, parse_opt_datetime, parse_uuid, Database};
use crate::access::check_course_access;
use crate::grading::AutoGrader;
use crate::models::*;

const SUBMISSION_COLUMNS: &str = "id, employee_id, course_id, task_id, answer, status, auto_grade, reviewer_comment, submitted_at, reviewed_at";

impl Database {
    // ============================================================
    // Task submission operations
    // ============================================================

    /// Record an answer to a course task.
    ///
    /// The course must be unlocked for the employee. The answer is auto-graded
    /// when the task has criteria, and the plan entry gets its `started_at`
    /// stamp on the first submission.
    pub fn submit_task(
        &self,
        employee_id: Uuid,
        course_id: Uuid,
        task_id: Uuid,
        input: CreateSubmissionInput,
        grader: &AutoGrader,
    ) -> Result<TaskSubmission> {
        if input.answer.trim().is_empty() {
            return Err(ValidationError::EmptyField("answer").into());
        }

        let summaries = self.course_summaries()?;
        let mut conn = self.conn()?;
        let employee = get_employee(&conn, employee_id)?.ok_or(NotFound("Employee"))?;
        let course = get_course(&conn, course_id)?.ok_or(NotFound("Course"))?;
        let task = course
            .task(task_id)
            .ok_or(ValidationError::UnknownTask(task_id))?;

        let access = check_course_access(Some(&employee), course_id, &summaries);
        if access.is_locked {
            tracing::warn!(
                "Rejected submission from employee {} to locked course {}",
                employee_id,
                course_id
            );
            return Err(ValidationError::CourseLocked(access.reason.unwrap_or_default()).into());
        }

        let auto_grade = task
            .grading
            .as_ref()
            .map(|criteria| grader.grade(&input.answer, criteria));

        let submission = TaskSubmission {
            id: Uuid::new_v4(),
            employee_id,
            course_id,
            task_id,
            answer: input.answer,
            status: SubmissionStatus::Submitted,
            auto_grade,
            reviewer_comment: None,
            submitted_at: Utc::now(),
            reviewed_at: None,
        };

        let tx = conn.transaction()?;
        tx.execute(
            &format!(
                "INSERT INTO task_submissions ({SUBMISSION_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
            ),
            (
                submission.id.to_string(),
                employee_id.to_string(),
                course_id.to_string(),
                task_id.to_string(),
                &submission.answer,
                submission.status.as_str(),
                submission
                    .auto_grade
                    .as_ref()
                    .map(serde_json::to_string)
                    .transpose()?,
                &submission.reviewer_comment,
                submission.submitted_at.to_rfc3339(),
                None::<String>,
            ),
        )?;

        if employee.plan_course(course_id).is_some_and(never_started) {
            let update = CourseProgressUpdate {
                started_at: Some(submission.submitted_at),
                ..Default::default()
            };
            commit_progress(&tx, &employee, course_id, &update)?;
        }
        tx.commit()?;

        Ok(submission)
    }

    pub fn get_submission(&self, id: Uuid) -> Result<Option<TaskSubmission>> {
        let conn = self.conn()?;
        get_submission(&conn, id)
    }

    pub fn get_submissions_by_employee(
        &self,
        employee_id: Uuid,
        course_id: Option<Uuid>,
    ) -> Result<Vec<TaskSubmission>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM task_submissions
             WHERE employee_id = ?1 AND (?2 IS NULL OR course_id = ?2)
             ORDER BY submitted_at DESC"
        ))?;
        let submissions = stmt
            .query_map(
                (employee_id.to_string(), course_id.map(|c| c.to_string())),
                row_to_submission,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(submissions)
    }

    /// Approve or reject a pending submission.
    ///
    /// Approval recomputes the course progress as the share of the course's
    /// tasks with at least one approved submission.
    pub fn review_submission(
        &self,
        id: Uuid,
        input: ReviewSubmissionInput,
    ) -> Result<Option<TaskSubmission>> {
        let mut conn = self.conn()?;
        let Some(mut submission) = get_submission(&conn, id)? else {
            return Ok(None);
        };
        if submission.status != SubmissionStatus::Submitted {
            return Err(ValidationError::AlreadyReviewed.into());
        }

        let now = Utc::now();
        submission.status = match input.decision {
            ReviewDecision::Approve => SubmissionStatus::Approved,
            ReviewDecision::Reject => SubmissionStatus::Rejected,
        };
        submission.reviewer_comment = input.comment;
        submission.reviewed_at = Some(now);

        let tx = conn.transaction()?;
        tx.execute(
            "UPDATE task_submissions SET status = ?, reviewer_comment = ?, reviewed_at = ? WHERE id = ?",
            (
                submission.status.as_str(),
                &submission.reviewer_comment,
                now.to_rfc3339(),
                id.to_string(),
            ),
        )?;
        if submission.status == SubmissionStatus::Approved {
            recompute_progress(&tx, submission.employee_id, submission.course_id)?;
        }
        tx.commit()?;
        tracing::info!("Submission {} {}", id, submission.status.as_str());

        Ok(Some(submission))
    }
}

/// No lifecycle stamp yet, so `started_at` can be set to now without going backwards.
fn never_started(entry: &DevelopmentCourse) -> bool {
    entry.started_at.is_none() && entry.completed_at.is_none() && entry.certified_at.is_none()
}

fn recompute_progress(conn: &Connection, employee_id: Uuid, course_id: Uuid) -> Result<()> {
    let Some(course) = get_course(conn, course_id)? else {
        return Ok(());
    };
    let Some(employee) = get_employee(conn, employee_id)? else {
        return Ok(());
    };
    let Some(entry) = employee.plan_course(course_id) else {
        return Ok(());
    };
    if course.tasks.is_empty() {
        return Ok(());
    }

    let approved: HashSet<Uuid> = {
        let mut stmt = conn.prepare(
            "SELECT DISTINCT task_id FROM task_submissions
             WHERE employee_id = ? AND course_id = ? AND status = 'approved'",
        )?;
        let ids = stmt
            .query_map((employee_id.to_string(), course_id.to_string()), |row| {
                row.get::<_, String>(0)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        ids.into_iter().map(parse_uuid).collect()
    };

    let done = course
        .tasks
        .iter()
        .filter(|t| approved.contains(&t.id))
        .count();
    let progress = (done * 100 / course.tasks.len()) as u8;

    let now = Utc::now();
    let update = CourseProgressUpdate {
        progress: Some(progress),
        started_at: never_started(entry).then_some(now),
        completed_at: (progress == 100
            && entry.completed_at.is_none()
            && entry.certified_at.is_none())
        .then_some(now),
        ..Default::default()
    };
    commit_progress(conn, &employee, course_id, &update)?;
    tracing::debug!(
        "Employee {} progress on course {} is now {}%",
        employee_id,
        course_id,
        progress
    );
    Ok(())
}

fn get_submission(conn: &Connection, id: Uuid) -> Result<Option<TaskSubmission>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SUBMISSION_COLUMNS} FROM task_submissions WHERE id = ?"
    ))?;
    let mut rows = stmt.query([id.to_string()])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_submission(row)?)),
        None => Ok(None),
    }
}

fn row_to_submission(row: &Row<'_>) -> rusqlite::Result<TaskSubmission> {
    let auto_grade: Option<String> = row.get(6)?;
    Ok(TaskSubmission {
        id: parse_uuid(row.get::<_, String>(0)?),
        employee_id: parse_uuid(row.get::<_, String>(1)?),
        course_id: parse_uuid(row.get::<_, String>(2)?),
        task_id: parse_uuid(row.get::<_, String>(3)?),
        answer: row.get(4)?,
        status: SubmissionStatus::from_str(&row.get::<_, String>(5)?)
            .unwrap_or(SubmissionStatus::Submitted),
        auto_grade: auto_grade.and_then(|g| serde_json::from_str(&g).ok()),
        reviewer_comment: row.get(7)?,
        submitted_at: parse_datetime(row.get::<_, String>(8)?),
        reviewed_at: parse_opt_datetime(row.get(9)?),
    })
}
