//! Course catalogue persistence behind a load/save contract.
//!
//! The access core only ever sees `&[Course]`; where those courses come from
//! is decided here. [`Database`] is the durable store, [`MemoryCourseStore`]
//! keeps everything in process.

use std::sync::{Arc, Mutex};

use anyhow::Result;

use crate::db::Database;
use crate::models::Course;

pub trait CourseStore {
    /// All courses, archived ones included.
    fn load(&self) -> Result<Vec<Course>>;

    /// Insert or replace each course by id. Courses not in `courses` are kept.
    fn save(&self, courses: &[Course]) -> Result<()>;
}

impl CourseStore for Database {
    fn load(&self) -> Result<Vec<Course>> {
        self.get_all_courses(true)
    }

    fn save(&self, courses: &[Course]) -> Result<()> {
        self.upsert_courses(courses)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryCourseStore {
    courses: Arc<Mutex<Vec<Course>>>,
}

impl MemoryCourseStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CourseStore for MemoryCourseStore {
    fn load(&self) -> Result<Vec<Course>> {
        let courses = self
            .courses
            .lock()
            .map_err(|_| anyhow::anyhow!("course store lock poisoned"))?;
        Ok(courses.clone())
    }

    fn save(&self, incoming: &[Course]) -> Result<()> {
        let mut courses = self
            .courses
            .lock()
            .map_err(|_| anyhow::anyhow!("course store lock poisoned"))?;
        for course in incoming {
            match courses.iter_mut().find(|c| c.id == course.id) {
                Some(existing) => *existing = course.clone(),
                None => courses.push(course.clone()),
            }
        }
        Ok(())
    }
}

/// Copy every course from one store into another.
pub fn copy_courses(from: &dyn CourseStore, to: &dyn CourseStore) -> Result<usize> {
    let courses = from.load()?;
    to.save(&courses)?;
    Ok(courses.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn course(title: &str) -> Course {
        Course {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: String::new(),
            sections: vec![],
            tasks: vec![],
            cover_image: None,
            archived: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn memory_store_upserts_by_id() {
        let store = MemoryCourseStore::new();
        let mut intro = course("Intro");
        store.save(&[intro.clone(), course("Sales")]).unwrap();

        intro.title = "Introduction".to_string();
        store.save(&[intro.clone()]).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].title, "Introduction");
    }

    #[test]
    fn database_store_round_trips_archived_courses() {
        let db = Database::open_memory().unwrap();
        db.migrate().unwrap();

        let mut old = course("Legacy");
        old.archived = true;
        db.save(&[old.clone(), course("Current")]).unwrap();

        let loaded = CourseStore::load(&db).unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(loaded.iter().any(|c| c.id == old.id && c.archived));
    }

    #[test]
    fn database_store_survives_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("academy.db");
        let saved = course("Onboarding");

        {
            let db = Database::open(path.clone()).unwrap();
            db.migrate().unwrap();
            db.save(&[saved.clone()]).unwrap();
        }

        let db = Database::open(path).unwrap();
        db.migrate().unwrap();
        let loaded = CourseStore::load(&db).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, saved.id);
        assert_eq!(loaded[0].title, "Onboarding");
    }

    #[test]
    fn copy_moves_everything_between_stores() {
        let memory = MemoryCourseStore::new();
        memory.save(&[course("A"), course("B")]).unwrap();

        let db = Database::open_memory().unwrap();
        db.migrate().unwrap();

        assert_eq!(copy_courses(&memory, &db).unwrap(), 2);
        assert_eq!(CourseStore::load(&db).unwrap().len(), 2);
    }
}
