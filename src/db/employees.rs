use anyhow::Result;
use chrono::Utc;
use rusqlite::{Connection, Row};
use uuid::Uuid;

use super::{parse_datetime, parse_opt_datetime, parse_uuid, Database};
use crate::access::{check_course_access, update_course_progress};
use crate::models::*;

impl Database {
    // ============================================================
    // Employee operations
    // ============================================================

    pub fn get_all_employees(&self) -> Result<Vec<Employee>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, full_name, email, position, has_plan, created_at, updated_at
             FROM employees ORDER BY full_name",
        )?;
        let rows = stmt
            .query_map([], row_to_employee)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(employee, has_plan)| attach_plan(&conn, employee, has_plan))
            .collect()
    }

    pub fn get_employee(&self, id: Uuid) -> Result<Option<Employee>> {
        let conn = self.conn()?;
        get_employee(&conn, id)
    }

    pub fn create_employee(&self, input: CreateEmployeeInput) -> Result<Employee> {
        if input.full_name.trim().is_empty() {
            return Err(ValidationError::EmptyField("full_name").into());
        }

        let conn = self.conn()?;
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO employees (id, full_name, email, position, has_plan, created_at, updated_at)
             VALUES (?, ?, ?, ?, 0, ?, ?)",
            (
                id.to_string(),
                &input.full_name,
                &input.email,
                &input.position,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;

        Ok(Employee {
            id,
            full_name: input.full_name,
            email: input.email,
            position: input.position,
            development_plan: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Delete an employee together with their plan, submissions and reports.
    pub fn delete_employee(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn()?;
        let rows = conn.execute("DELETE FROM employees WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }

    // ============================================================
    // Development plan operations
    // ============================================================

    /// Replace the employee's plan. Returns `false` if the employee doesn't exist.
    pub fn save_development_plan(&self, employee_id: Uuid, plan: &DevelopmentPlan) -> Result<bool> {
        plan.validate()?;
        let mut conn = self.conn()?;
        save_plan(&mut conn, employee_id, plan)
    }

    /// Add a course to the employee's plan, after the last course unless an order is given.
    pub fn assign_course(
        &self,
        employee_id: Uuid,
        input: AssignCourseInput,
    ) -> Result<Option<Employee>> {
        let mut conn = self.conn()?;
        let Some(mut employee) = get_employee(&conn, employee_id)? else {
            return Ok(None);
        };

        let mut plan = employee.development_plan.take().unwrap_or_default();
        let order = match input.order {
            Some(order) => order,
            None => plan.next_order()?,
        };
        plan.courses.push(DevelopmentCourse::new(input.course_id, order));
        plan.validate()?;

        save_plan(&mut conn, employee_id, &plan)?;
        tracing::info!(
            "Assigned course {} to employee {} at order {}",
            input.course_id,
            employee_id,
            order
        );
        get_employee(&conn, employee_id)
    }

    pub fn unassign_course(&self, employee_id: Uuid, course_id: Uuid) -> Result<Option<Employee>> {
        let mut conn = self.conn()?;
        let Some(mut employee) = get_employee(&conn, employee_id)? else {
            return Ok(None);
        };

        let mut plan = employee.development_plan.take().unwrap_or_default();
        let before = plan.courses.len();
        plan.courses.retain(|c| c.course_id != course_id);
        if plan.courses.len() == before {
            return Err(ValidationError::CourseNotAssigned(course_id).into());
        }

        save_plan(&mut conn, employee_id, &plan)?;
        get_employee(&conn, employee_id)
    }

    /// Apply a partial progress update to one plan entry and persist the result.
    ///
    /// Unlike [`update_course_progress`], an unassigned course is an error here:
    /// a caller committing progress expects it to land somewhere. Certification
    /// fields are refused; they are set only by [`Database::certify_course`].
    pub fn commit_course_progress(
        &self,
        employee_id: Uuid,
        course_id: Uuid,
        update: &CourseProgressUpdate,
    ) -> Result<Option<Employee>> {
        if update.is_certified.is_some() || update.certified_at.is_some() {
            return Err(ValidationError::CertificationNotAllowed.into());
        }

        let mut conn = self.conn()?;
        let Some(employee) = get_employee(&conn, employee_id)? else {
            return Ok(None);
        };

        let tx = conn.transaction()?;
        let updated = commit_progress(&tx, &employee, course_id, update)?;
        tx.commit()?;
        Ok(Some(updated))
    }

    /// Mark a completed, unlocked course as certified.
    pub fn certify_course(&self, employee_id: Uuid, course_id: Uuid) -> Result<Employee> {
        let summaries = self.course_summaries()?;
        let mut conn = self.conn()?;
        let employee = get_employee(&conn, employee_id)?.ok_or(NotFound("Employee"))?;

        let entry = employee
            .plan_course(course_id)
            .ok_or(ValidationError::CourseNotAssigned(course_id))?;
        if entry.is_certified {
            return Ok(employee);
        }

        let access = check_course_access(Some(&employee), course_id, &summaries);
        if access.is_locked {
            return Err(ValidationError::CourseLocked(access.reason.unwrap_or_default()).into());
        }
        if entry.progress < 100 {
            return Err(ValidationError::CourseNotCompleted(entry.progress).into());
        }

        let now = Utc::now();
        let update = CourseProgressUpdate {
            is_certified: Some(true),
            certified_at: Some(now),
            completed_at: entry.completed_at.is_none().then_some(now),
            ..Default::default()
        };
        let tx = conn.transaction()?;
        let certified = commit_progress(&tx, &employee, course_id, &update)?;
        tx.commit()?;
        tracing::info!("Employee {} certified on course {}", employee_id, course_id);
        Ok(certified)
    }
}

pub(super) fn get_employee(conn: &Connection, id: Uuid) -> Result<Option<Employee>> {
    let mut stmt = conn.prepare(
        "SELECT id, full_name, email, position, has_plan, created_at, updated_at
         FROM employees WHERE id = ?",
    )?;
    let mut rows = stmt.query([id.to_string()])?;
    match rows.next()? {
        Some(row) => {
            let (employee, has_plan) = row_to_employee(row)?;
            Ok(Some(attach_plan(conn, employee, has_plan)?))
        }
        None => Ok(None),
    }
}

/// Run the pure updater against `employee` and write the resulting plan.
///
/// Does not open a transaction; callers commit it together with their own writes.
pub(super) fn commit_progress(
    conn: &Connection,
    employee: &Employee,
    course_id: Uuid,
    update: &CourseProgressUpdate,
) -> Result<Employee> {
    if employee.plan_course(course_id).is_none() {
        return Err(ValidationError::CourseNotAssigned(course_id).into());
    }

    let mut updated = update_course_progress(employee, course_id, update);
    let plan = updated.development_plan.clone().unwrap_or_default();
    plan.validate()?;

    write_plan(conn, employee.id, &plan)?;
    updated.updated_at = Utc::now();
    Ok(updated)
}

fn save_plan(conn: &mut Connection, employee_id: Uuid, plan: &DevelopmentPlan) -> Result<bool> {
    let tx = conn.transaction()?;
    let saved = write_plan(&tx, employee_id, plan)?;
    tx.commit()?;
    Ok(saved)
}

fn write_plan(conn: &Connection, employee_id: Uuid, plan: &DevelopmentPlan) -> Result<bool> {
    let rows = conn.execute(
        "UPDATE employees SET has_plan = 1, updated_at = ? WHERE id = ?",
        (Utc::now().to_rfc3339(), employee_id.to_string()),
    )?;
    if rows == 0 {
        return Ok(false);
    }

    conn.execute(
        "DELETE FROM development_courses WHERE employee_id = ?",
        [employee_id.to_string()],
    )?;
    for entry in &plan.courses {
        conn.execute(
            "INSERT INTO development_courses
                (employee_id, course_id, sort_order, progress, is_certified, started_at, completed_at, certified_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            (
                employee_id.to_string(),
                entry.course_id.to_string(),
                entry.order,
                entry.progress,
                entry.is_certified as i32,
                entry.started_at.map(|t| t.to_rfc3339()),
                entry.completed_at.map(|t| t.to_rfc3339()),
                entry.certified_at.map(|t| t.to_rfc3339()),
            ),
        )?;
    }
    Ok(true)
}

fn attach_plan(conn: &Connection, mut employee: Employee, has_plan: bool) -> Result<Employee> {
    if !has_plan {
        return Ok(employee);
    }

    let mut stmt = conn.prepare(
        "SELECT course_id, sort_order, progress, is_certified, started_at, completed_at, certified_at
         FROM development_courses WHERE employee_id = ? ORDER BY sort_order",
    )?;
    let courses = stmt
        .query_map([employee.id.to_string()], |row| {
            Ok(DevelopmentCourse {
                course_id: parse_uuid(row.get::<_, String>(0)?),
                order: row.get(1)?,
                progress: row.get(2)?,
                is_certified: row.get::<_, i32>(3)? != 0,
                started_at: parse_opt_datetime(row.get(4)?),
                completed_at: parse_opt_datetime(row.get(5)?),
                certified_at: parse_opt_datetime(row.get(6)?),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    employee.development_plan = Some(DevelopmentPlan { courses });
    Ok(employee)
}

fn row_to_employee(row: &Row<'_>) -> rusqlite::Result<(Employee, bool)> {
    Ok((
        Employee {
            id: parse_uuid(row.get::<_, String>(0)?),
            full_name: row.get(1)?,
            email: row.get(2)?,
            position: row.get(3)?,
            development_plan: None,
            created_at: parse_datetime(row.get::<_, String>(5)?),
            updated_at: parse_datetime(row.get::<_, String>(6)?),
        },
        row.get::<_, i32>(4)? != 0,
    ))
}
