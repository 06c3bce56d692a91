use anyhow::Result;
use chrono::Utc;
use rusqlite::{Connection, Row};
use uuid::Uuid;

use super::{parse_datetime, parse_uuid, Database};
use crate::models::*;

const COURSE_COLUMNS: &str =
    "id, title, description, sections, tasks, cover_image, archived, created_at, updated_at";

impl Database {
    // ============================================================
    // Course operations
    // ============================================================

    pub fn get_all_courses(&self, include_archived: bool) -> Result<Vec<Course>> {
        let conn = self.conn()?;
        let sql = if include_archived {
            format!("SELECT {COURSE_COLUMNS} FROM courses ORDER BY created_at, title")
        } else {
            format!("SELECT {COURSE_COLUMNS} FROM courses WHERE archived = 0 ORDER BY created_at, title")
        };
        let mut stmt = conn.prepare(&sql)?;
        let courses = stmt
            .query_map([], row_to_course)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(courses)
    }

    pub fn get_course(&self, id: Uuid) -> Result<Option<Course>> {
        let conn = self.conn()?;
        get_course(&conn, id)
    }

    pub fn create_course(&self, input: CreateCourseInput) -> Result<Course> {
        if input.title.trim().is_empty() {
            return Err(ValidationError::EmptyField("title").into());
        }

        let now = Utc::now();
        let course = Course {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            sections: input
                .sections
                .into_iter()
                .map(SectionInput::into_section)
                .collect(),
            tasks: input
                .tasks
                .into_iter()
                .map(CourseTaskInput::into_task)
                .collect(),
            cover_image: input.cover_image,
            archived: false,
            created_at: now,
            updated_at: now,
        };

        let conn = self.conn()?;
        write_course(&conn, &course)?;
        tracing::info!("Created course {} ({})", course.title, course.id);
        Ok(course)
    }

    pub fn update_course(&self, id: Uuid, input: UpdateCourseInput) -> Result<Option<Course>> {
        let conn = self.conn()?;
        let Some(existing) = get_course(&conn, id)? else {
            return Ok(None);
        };

        if matches!(&input.title, Some(t) if t.trim().is_empty()) {
            return Err(ValidationError::EmptyField("title").into());
        }

        let course = Course {
            title: input.title.unwrap_or(existing.title),
            description: input.description.unwrap_or(existing.description),
            sections: input.sections.unwrap_or(existing.sections),
            tasks: input.tasks.unwrap_or(existing.tasks),
            cover_image: input.cover_image.or(existing.cover_image),
            updated_at: Utc::now(),
            ..existing
        };
        write_course(&conn, &course)?;
        Ok(Some(course))
    }

    pub fn set_course_archived(&self, id: Uuid, archived: bool) -> Result<Option<Course>> {
        let conn = self.conn()?;
        let now = Utc::now();
        let rows = conn.execute(
            "UPDATE courses SET archived = ?, updated_at = ? WHERE id = ?",
            (archived as i32, now.to_rfc3339(), id.to_string()),
        )?;
        if rows == 0 {
            return Ok(None);
        }
        tracing::info!(
            "Course {} {}",
            id,
            if archived { "archived" } else { "restored" }
        );
        get_course(&conn, id)
    }

    /// Remove a course. Plan entries that reference it are left in place.
    pub fn delete_course(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn()?;
        let rows = conn.execute("DELETE FROM courses WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }

    /// Insert or replace each course by id in one transaction.
    pub fn upsert_courses(&self, courses: &[Course]) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        for course in courses {
            write_course(&tx, course)?;
        }
        tx.commit()?;
        tracing::debug!("Saved {} courses", courses.len());
        Ok(())
    }

    pub fn course_summaries(&self) -> Result<Vec<CourseSummary>> {
        Ok(self
            .get_all_courses(true)?
            .iter()
            .map(CourseSummary::from)
            .collect())
    }
}

pub(super) fn get_course(conn: &Connection, id: Uuid) -> Result<Option<Course>> {
    let mut stmt = conn.prepare(&format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = ?"))?;
    let mut rows = stmt.query([id.to_string()])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_course(row)?)),
        None => Ok(None),
    }
}

fn write_course(conn: &Connection, course: &Course) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO courses (id, title, description, sections, tasks, cover_image, archived, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        (
            course.id.to_string(),
            &course.title,
            &course.description,
            serde_json::to_string(&course.sections)?,
            serde_json::to_string(&course.tasks)?,
            &course.cover_image,
            course.archived as i32,
            course.created_at.to_rfc3339(),
            course.updated_at.to_rfc3339(),
        ),
    )?;
    Ok(())
}

fn row_to_course(row: &Row<'_>) -> rusqlite::Result<Course> {
    let sections: String = row.get(3)?;
    let tasks: String = row.get(4)?;
    Ok(Course {
        id: parse_uuid(row.get::<_, String>(0)?),
        title: row.get(1)?,
        description: row.get(2)?,
        sections: serde_json::from_str(&sections).unwrap_or_default(),
        tasks: serde_json::from_str(&tasks).unwrap_or_default(),
        cover_image: row.get(5)?,
        archived: row.get::<_, i32>(6)? != 0,
        created_at: parse_datetime(row.get::<_, String>(7)?),
        updated_at: parse_datetime(row.get::<_, String>(8)?),
    })
}
