use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::status::AggregateStatus;
use crate::errors::AppError;

/// The four fixed prize tiers a committee can assign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AwardTier {
    #[serde(rename = "1ST PRICE")]
    First,
    #[serde(rename = "2ND PRICE")]
    Second,
    #[serde(rename = "3RD PRICE")]
    Third,
    #[serde(rename = "CONSOLATION PRICE")]
    Consolation,
}

impl AwardTier {
    pub const ALL: [AwardTier; 4] = [
        AwardTier::First,
        AwardTier::Second,
        AwardTier::Third,
        AwardTier::Consolation,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AwardTier::First => "1ST PRICE",
            AwardTier::Second => "2ND PRICE",
            AwardTier::Third => "3RD PRICE",
            AwardTier::Consolation => "CONSOLATION PRICE",
        }
    }

    /// Stored labels that no longer match a tier read as "no award".
    pub fn from_db(raw: Option<&str>) -> Option<Self> {
        let raw = raw?.trim();
        if raw.is_empty() {
            return None;
        }
        let tier = Self::ALL.into_iter().find(|t| t.label().eq_ignore_ascii_case(raw));
        if tier.is_none() {
            log::warn!("Ignoring unknown stored award tier '{raw}'");
        }
        tier
    }

    /// Parse form/API input. Empty or `NONE` clears the award.
    pub fn parse_input(raw: &str) -> Result<Option<Self>, AppError> {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("none") {
            return Ok(None);
        }
        Self::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(raw))
            .map(Some)
            .ok_or_else(|| AppError::validation(format!("'{raw}' is not a valid award tier")))
    }
}

impl fmt::Display for AwardTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether awards may be assigned before both reviews approve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AwardPolicy {
    #[default]
    Unrestricted,
    RequireApproval,
}

impl AwardPolicy {
    pub fn check(&self, aggregate: AggregateStatus) -> Result<(), AppError> {
        match (self, aggregate) {
            (AwardPolicy::RequireApproval, AggregateStatus::Pending | AggregateStatus::Rejected) => {
                Err(AppError::validation(format!(
                    "Awards can only be assigned to approved suggestions (current status: {aggregate})"
                )))
            }
            _ => Ok(()),
        }
    }
}

impl FromStr for AwardPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "unrestricted" => Ok(AwardPolicy::Unrestricted),
            "require-approval" | "require_approval" => Ok(AwardPolicy::RequireApproval),
            other => Err(format!(
                "KAIZEN_AWARD_POLICY must be 'unrestricted' or 'require-approval', got '{other}'"
            )),
        }
    }
}

/// Award fields as stored on the suggestion.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AwardState {
    pub tier: Option<AwardTier>,
    pub committee_comments: Option<String>,
    pub committee_signature: Option<String>,
    pub award_date: Option<NaiveDate>,
}

impl AwardState {
    pub fn is_awarded(&self) -> bool {
        self.tier.is_some()
    }
}

/// Input of one award assignment; replaces every award field.
#[derive(Debug, Clone)]
pub struct AwardAssignment {
    pub tier: Option<AwardTier>,
    pub committee_comments: String,
    pub committee_signature: String,
    pub award_date: NaiveDate,
}

impl AwardAssignment {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.tier.is_some() && self.committee_signature.trim().is_empty() {
            return Err(AppError::validation("Committee signature is required to assign an award"));
        }
        Ok(())
    }

    pub fn into_state(self) -> AwardState {
        fn non_empty(s: String) -> Option<String> {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        // A cleared award carries no date.
        let award_date = self.tier.map(|_| self.award_date);
        AwardState {
            tier: self.tier,
            committee_comments: non_empty(self.committee_comments),
            committee_signature: non_empty(self.committee_signature),
            award_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_input_is_case_insensitive_and_validated() {
        assert_eq!(AwardTier::parse_input("1st price").unwrap(), Some(AwardTier::First));
        assert_eq!(AwardTier::parse_input(" CONSOLATION PRICE ").unwrap(), Some(AwardTier::Consolation));
        assert_eq!(AwardTier::parse_input("").unwrap(), None);
        assert_eq!(AwardTier::parse_input("none").unwrap(), None);
        assert!(matches!(AwardTier::parse_input("GOLD"), Err(AppError::Validation(_))));
    }

    #[test]
    fn unknown_stored_tier_reads_as_none() {
        assert_eq!(AwardTier::from_db(Some("4TH PRICE")), None);
        assert_eq!(AwardTier::from_db(Some("2ND PRICE")), Some(AwardTier::Second));
        assert_eq!(AwardTier::from_db(None), None);
    }

    #[test]
    fn unrestricted_policy_allows_any_status() {
        for status in AggregateStatus::ALL {
            assert!(AwardPolicy::Unrestricted.check(status).is_ok());
        }
    }

    #[test]
    fn require_approval_blocks_pending_and_rejected() {
        let policy = AwardPolicy::RequireApproval;
        assert!(policy.check(AggregateStatus::Approved).is_ok());
        assert!(policy.check(AggregateStatus::Pending).is_err());
        assert!(policy.check(AggregateStatus::Rejected).is_err());
    }

    #[test]
    fn assignment_requires_signature_for_a_tier() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let unsigned = AwardAssignment {
            tier: Some(AwardTier::Third),
            committee_comments: "Nice".into(),
            committee_signature: " ".into(),
            award_date: date,
        };
        assert!(unsigned.validate().is_err());

        let cleared = AwardAssignment { tier: None, ..unsigned };
        assert!(cleared.validate().is_ok());
        let state = cleared.into_state();
        assert!(!state.is_awarded());
        assert_eq!(state.committee_comments.as_deref(), Some("Nice"));
        assert_eq!(state.committee_signature, None);
        assert_eq!(state.award_date, None);
    }

    #[test]
    fn assigned_tier_keeps_its_date() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let state = AwardAssignment {
            tier: Some(AwardTier::First),
            committee_comments: String::new(),
            committee_signature: "Dana".into(),
            award_date: date,
        }
        .into_state();
        assert_eq!(state.award_date, Some(date));
    }
}
