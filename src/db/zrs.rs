use anyhow::Result;
use chrono::Utc;
use rusqlite::{Connection, Row};
use uuid::Uuid;

use super::employees::get_employee;
use super::{parse_datetime, parse_uuid, Database};
use crate::models::*;

const ZRS_COLUMNS: &str =
    "id, employee_id, title, situation, data, solution, status, reviewer_comment, created_at, updated_at";

impl Database {
    // ============================================================
    // ЗРС document operations
    // ============================================================

    pub fn get_zrs_documents(&self, employee_id: Option<Uuid>) -> Result<Vec<ZrsDocument>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {ZRS_COLUMNS} FROM zrs_documents
             WHERE (?1 IS NULL OR employee_id = ?1)
             ORDER BY updated_at DESC"
        ))?;
        let docs = stmt
            .query_map([employee_id.map(|id| id.to_string())], row_to_zrs)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(docs)
    }

    pub fn get_zrs_document(&self, id: Uuid) -> Result<Option<ZrsDocument>> {
        let conn = self.conn()?;
        get_zrs_document(&conn, id)
    }

    pub fn create_zrs_document(&self, input: CreateZrsInput) -> Result<ZrsDocument> {
        if input.title.trim().is_empty() {
            return Err(ValidationError::EmptyField("title").into());
        }

        let conn = self.conn()?;
        get_employee(&conn, input.employee_id)?.ok_or(NotFound("Employee"))?;

        let now = Utc::now();
        let doc = ZrsDocument {
            id: Uuid::new_v4(),
            employee_id: input.employee_id,
            title: input.title,
            situation: input.situation,
            data: input.data,
            solution: input.solution,
            status: ZrsStatus::Draft,
            reviewer_comment: None,
            created_at: now,
            updated_at: now,
        };

        conn.execute(
            &format!("INSERT INTO zrs_documents ({ZRS_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"),
            (
                doc.id.to_string(),
                doc.employee_id.to_string(),
                &doc.title,
                &doc.situation,
                &doc.data,
                &doc.solution,
                doc.status.as_str(),
                &doc.reviewer_comment,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;

        Ok(doc)
    }

    /// Edit a draft. Documents in any other status are read-only.
    pub fn update_zrs_document(&self, id: Uuid, input: UpdateZrsInput) -> Result<Option<ZrsDocument>> {
        let conn = self.conn()?;
        let Some(existing) = get_zrs_document(&conn, id)? else {
            return Ok(None);
        };
        if existing.status != ZrsStatus::Draft {
            return Err(ValidationError::NotEditable.into());
        }
        if matches!(&input.title, Some(t) if t.trim().is_empty()) {
            return Err(ValidationError::EmptyField("title").into());
        }

        let doc = ZrsDocument {
            title: input.title.unwrap_or(existing.title),
            situation: input.situation.unwrap_or(existing.situation),
            data: input.data.unwrap_or(existing.data),
            solution: input.solution.unwrap_or(existing.solution),
            updated_at: Utc::now(),
            ..existing
        };

        conn.execute(
            "UPDATE zrs_documents SET title = ?, situation = ?, data = ?, solution = ?, updated_at = ? WHERE id = ?",
            (
                &doc.title,
                &doc.situation,
                &doc.data,
                &doc.solution,
                doc.updated_at.to_rfc3339(),
                id.to_string(),
            ),
        )?;

        Ok(Some(doc))
    }

    /// Move a document along its review workflow.
    pub fn transition_zrs_document(
        &self,
        id: Uuid,
        next: ZrsStatus,
        input: ZrsTransitionInput,
    ) -> Result<Option<ZrsDocument>> {
        let conn = self.conn()?;
        let Some(existing) = get_zrs_document(&conn, id)? else {
            return Ok(None);
        };
        let status = existing.status.transition_to(next)?;

        let doc = ZrsDocument {
            status,
            reviewer_comment: input.comment.or(existing.reviewer_comment),
            updated_at: Utc::now(),
            ..existing
        };

        conn.execute(
            "UPDATE zrs_documents SET status = ?, reviewer_comment = ?, updated_at = ? WHERE id = ?",
            (
                doc.status.as_str(),
                &doc.reviewer_comment,
                doc.updated_at.to_rfc3339(),
                id.to_string(),
            ),
        )?;
        tracing::info!("ЗРС document {} is now {}", id, doc.status.as_str());

        Ok(Some(doc))
    }

    pub fn delete_zrs_document(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn()?;
        let rows = conn.execute("DELETE FROM zrs_documents WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }
}

fn get_zrs_document(conn: &Connection, id: Uuid) -> Result<Option<ZrsDocument>> {
    let mut stmt = conn.prepare(&format!("SELECT {ZRS_COLUMNS} FROM zrs_documents WHERE id = ?"))?;
    let mut rows = stmt.query([id.to_string()])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_zrs(row)?)),
        None => Ok(None),
    }
}

fn row_to_zrs(row: &Row<'_>) -> rusqlite::Result<ZrsDocument> {
    Ok(ZrsDocument {
        id: parse_uuid(row.get::<_, String>(0)?),
        employee_id: parse_uuid(row.get::<_, String>(1)?),
        title: row.get(2)?,
        situation: row.get(3)?,
        data: row.get(4)?,
        solution: row.get(5)?,
        status: ZrsStatus::from_str(&row.get::<_, String>(6)?).unwrap_or(ZrsStatus::Draft),
        reviewer_comment: row.get(7)?,
        created_at: parse_datetime(row.get::<_, String>(8)?),
        updated_at: parse_datetime(row.get::<_, String>(9)?),
    })
}
