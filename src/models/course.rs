use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authored learning content.
///
/// Courses are referenced by id from employees' development plans. The
/// reference is weak: deleting a course does not touch any plan, and the
/// dangling entry shows up as [`super::PlanCourseEntry::Missing`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// Content sections in display order.
    pub sections: Vec<Section>,
    /// Checklist items the learner submits work for, in display order.
    pub tasks: Vec<CourseTask>,
    /// URL or data URI of the cover image.
    pub cover_image: Option<String>,
    /// Archived courses are hidden from the catalogue but still resolve in plans.
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Course {
    pub fn summary(&self) -> CourseSummary {
        CourseSummary {
            id: self.id,
            title: self.title.clone(),
        }
    }

    pub fn task(&self, task_id: Uuid) -> Option<&CourseTask> {
        self.tasks.iter().find(|t| t.id == task_id)
    }
}

/// The `{id, title}` projection of a course, used to label lock reasons.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CourseSummary {
    pub id: Uuid,
    pub title: String,
}

impl From<&Course> for CourseSummary {
    fn from(course: &Course) -> Self {
        course.summary()
    }
}

/// A block of course content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Section {
    pub id: Uuid,
    pub title: String,
    pub kind: SectionKind,
    /// Plain text, a video URL, or an HTML fragment depending on `kind`.
    pub content: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Text,
    Video,
    Html,
}

/// A checklist item inside a course.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CourseTask {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// Auto-grading rules. Tasks without criteria are always left for manual review.
    pub grading: Option<GradingCriteria>,
}

/// Rules the auto-grader checks a free-text answer against.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GradingCriteria {
    /// Minimum number of words expected in the answer.
    #[serde(default)]
    pub min_words: u32,
    /// Keywords expected to appear in the answer (case-insensitive).
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Input for a new section. The id is assigned on creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionInput {
    pub title: String,
    pub kind: SectionKind,
    pub content: String,
}

/// Input for a new task. The id is assigned on creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseTaskInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub grading: Option<GradingCriteria>,
}

/// Input for creating a new course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCourseInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sections: Vec<SectionInput>,
    #[serde(default)]
    pub tasks: Vec<CourseTaskInput>,
    pub cover_image: Option<String>,
}

/// Input for updating a course. All fields are optional for partial updates.
///
/// `sections` and `tasks` replace the existing lists wholesale when present;
/// existing ids are preserved so submissions keep resolving.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCourseInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub sections: Option<Vec<Section>>,
    pub tasks: Option<Vec<CourseTask>>,
    pub cover_image: Option<String>,
}

impl SectionInput {
    pub fn into_section(self) -> Section {
        Section {
            id: Uuid::new_v4(),
            title: self.title,
            kind: self.kind,
            content: self.content,
        }
    }
}

impl CourseTaskInput {
    pub fn into_task(self) -> CourseTask {
        CourseTask {
            id: Uuid::new_v4(),
            title: self.title,
            description: self.description,
            grading: self.grading,
        }
    }
}
