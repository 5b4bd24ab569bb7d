//! Dual-approval state of a kaizen suggestion.
//!
//! Each suggestion carries two independent review tracks (engineer and
//! manager). The aggregate status shown in lists and counted on the dashboard
//! is derived from both, with rejection taking precedence over approval.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::AppError;

/// Status of a single review track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReviewStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ReviewStatus {
    pub const ALL: [ReviewStatus; 3] = [ReviewStatus::Pending, ReviewStatus::Approved, ReviewStatus::Rejected];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "Pending",
            ReviewStatus::Approved => "Approved",
            ReviewStatus::Rejected => "Rejected",
        }
    }

    /// Map a stored value. NULL, empty and unknown values all read as `Pending`.
    pub fn from_db(raw: Option<&str>) -> Self {
        raw.and_then(Self::parse_lenient).unwrap_or_default()
    }

    /// Case-insensitive parse; `None` if the value names no status.
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.into_iter().find(|s| s.as_str().eq_ignore_ascii_case(raw))
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status derived from both review tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregateStatus {
    Pending,
    Approved,
    Rejected,
}

impl AggregateStatus {
    pub const ALL: [AggregateStatus; 3] =
        [AggregateStatus::Pending, AggregateStatus::Approved, AggregateStatus::Rejected];

    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateStatus::Pending => "Pending",
            AggregateStatus::Approved => "Approved",
            AggregateStatus::Rejected => "Rejected",
        }
    }

    pub fn parse_lenient(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.into_iter().find(|s| s.as_str().eq_ignore_ascii_case(raw))
    }

    /// SQL rendering of `resolve` over the `engineer_status` / `manager_status` columns.
    pub fn sql_predicate(&self) -> &'static str {
        match self {
            AggregateStatus::Rejected => {
                "(engineer_status = 'Rejected' OR manager_status = 'Rejected')"
            }
            AggregateStatus::Approved => {
                "(engineer_status = 'Approved' AND manager_status = 'Approved')"
            }
            AggregateStatus::Pending => {
                "(NOT (engineer_status = 'Rejected' OR manager_status = 'Rejected') \
                 AND NOT (engineer_status = 'Approved' AND manager_status = 'Approved'))"
            }
        }
    }

    /// CSS badge modifier used by the templates.
    pub fn badge(&self) -> &'static str {
        match self {
            AggregateStatus::Pending => "badge-pending",
            AggregateStatus::Approved => "badge-approved",
            AggregateStatus::Rejected => "badge-rejected",
        }
    }
}

impl fmt::Display for AggregateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected wins over everything, then both-approved, otherwise pending.
pub fn resolve(engineer: ReviewStatus, manager: ReviewStatus) -> AggregateStatus {
    use ReviewStatus::*;
    match (engineer, manager) {
        (Rejected, _) | (_, Rejected) => AggregateStatus::Rejected,
        (Approved, Approved) => AggregateStatus::Approved,
        _ => AggregateStatus::Pending,
    }
}

/// The two review tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewRole {
    Engineer,
    Manager,
}

impl ReviewRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewRole::Engineer => "engineer",
            ReviewRole::Manager => "manager",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReviewRole::Engineer => "Engineer",
            ReviewRole::Manager => "Manager",
        }
    }
}

impl FromStr for ReviewRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "engineer" => Ok(ReviewRole::Engineer),
            "manager" => Ok(ReviewRole::Manager),
            _ => Err(AppError::InvalidRole(s.trim().to_string())),
        }
    }
}

impl fmt::Display for ReviewRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn outcome(&self) -> ReviewStatus {
        match self {
            Decision::Approve => ReviewStatus::Approved,
            Decision::Reject => ReviewStatus::Rejected,
        }
    }
}

impl FromStr for Decision {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "approve" | "approved" => Ok(Decision::Approve),
            "reject" | "rejected" => Ok(Decision::Reject),
            other => Err(AppError::validation(format!("Unknown decision '{other}'"))),
        }
    }
}

/// One review action by an engineer or manager.
#[derive(Debug, Clone)]
pub struct Review {
    pub role: ReviewRole,
    pub decision: Decision,
    pub actor: String,
    pub comments: Option<String>,
    pub at: Option<NaiveDateTime>,
}

impl Review {
    pub fn new(role: ReviewRole, decision: Decision, actor: &str) -> Self {
        Self {
            role,
            decision,
            actor: actor.to_string(),
            comments: None,
            at: None,
        }
    }

    pub fn with_comments(mut self, comments: &str) -> Self {
        let trimmed = comments.trim();
        self.comments = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    pub fn at(mut self, at: NaiveDateTime) -> Self {
        self.at = Some(at);
        self
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = Vec::new();
        if self.actor.trim().is_empty() {
            errors.push(format!("{} name is required", self.role.label()));
        }
        if self.decision == Decision::Reject && self.comments.is_none() {
            errors.push("A comment is required when rejecting".to_string());
        }
        if errors.is_empty() { Ok(()) } else { Err(AppError::Validation(errors)) }
    }
}

/// One review track as stored on the suggestion.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReviewTrack {
    pub status: ReviewStatus,
    pub decided_by: Option<String>,
    pub comments: Option<String>,
    pub reviewed_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApprovalState {
    pub engineer: ReviewTrack,
    pub manager: ReviewTrack,
}

impl ApprovalState {
    pub fn aggregate(&self) -> AggregateStatus {
        resolve(self.engineer.status, self.manager.status)
    }

    pub fn track(&self, role: ReviewRole) -> &ReviewTrack {
        match role {
            ReviewRole::Engineer => &self.engineer,
            ReviewRole::Manager => &self.manager,
        }
    }

    fn track_mut(&mut self, role: ReviewRole) -> &mut ReviewTrack {
        match role {
            ReviewRole::Engineer => &mut self.engineer,
            ReviewRole::Manager => &mut self.manager,
        }
    }

    /// Record an approval on the named track (`"engineer"` or `"manager"`).
    pub fn approve(&mut self, role: &str, approver: &str) -> Result<(), AppError> {
        self.apply(&Review::new(role.parse()?, Decision::Approve, approver))
    }

    /// Record a rejection on the named track. `comments` must not be blank.
    pub fn reject(&mut self, role: &str, rejector: &str, comments: &str) -> Result<(), AppError> {
        self.apply(&Review::new(role.parse()?, Decision::Reject, rejector).with_comments(comments))
    }

    /// Overwrite the review's track. Earlier decisions are not kept.
    pub fn apply(&mut self, review: &Review) -> Result<(), AppError> {
        review.validate()?;
        let track = self.track_mut(review.role);
        track.status = review.decision.outcome();
        track.decided_by = Some(review.actor.trim().to_string());
        track.comments = review.comments.clone();
        track.reviewed_at = review.at;
        Ok(())
    }
}
