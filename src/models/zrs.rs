use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ValidationError;

/// A structured Situation / Data / Solution (ЗРС) report written by an employee.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ZrsDocument {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub title: String,
    /// What happened.
    pub situation: String,
    /// Facts and figures backing the situation.
    pub data: String,
    /// Proposed decision.
    pub solution: String,
    pub status: ZrsStatus,
    pub reviewer_comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Review workflow of a ЗРС report.
///
/// `Draft → Submitted → Approved | Rejected`, and `Rejected → Draft` for rework.
/// Only drafts can be edited.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ZrsStatus {
    Draft,
    Submitted,
    Approved,
    Rejected,
}

impl ZrsStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "submitted" => Some(Self::Submitted),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    pub fn can_transition_to(&self, next: ZrsStatus) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::Submitted)
                | (Self::Submitted, Self::Approved)
                | (Self::Submitted, Self::Rejected)
                | (Self::Rejected, Self::Draft)
        )
    }

    pub fn transition_to(&self, next: ZrsStatus) -> Result<ZrsStatus, ValidationError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(ValidationError::InvalidTransition {
                from: self.as_str(),
                to: next.as_str(),
            })
        }
    }
}

/// Input for creating a new ЗРС report. New reports start as drafts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateZrsInput {
    pub employee_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub situation: String,
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub solution: String,
}

/// Input for editing a draft. All fields are optional for partial updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateZrsInput {
    pub title: Option<String>,
    pub situation: Option<String>,
    pub data: Option<String>,
    pub solution: Option<String>,
}

/// Optional reviewer comment attached to a status change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZrsTransitionInput {
    pub comment: Option<String>,
}
