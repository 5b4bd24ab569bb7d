use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::award::{AwardState, AwardTier};
use super::status::{AggregateStatus, ApprovalState, ReviewStatus, ReviewTrack};
use crate::auth::validate::{validate_optional, validate_required};

/// A kaizen suggestion with both review tracks and award fields.
#[derive(Debug, Clone, Serialize)]
pub struct Kaizen {
    pub id: i64,
    pub kaizen_no: String,
    pub employee_name: String,
    pub employee_no: String,
    pub department: String,
    pub plant: String,
    pub category: String,
    pub title: String,
    pub description: String,
    pub cost_saving: Option<Decimal>,
    pub currency_rate: Option<Decimal>,
    pub has_benefit: bool,
    pub other_benefits: Option<String>,
    pub before_image: Option<String>,
    pub after_image: Option<String>,
    pub employee_image: Option<String>,
    pub submitted_by: Option<i64>,
    pub submitted_at: NaiveDateTime,
    pub approval: ApprovalState,
    pub award: AwardState,
    pub version: i32,
}

impl Kaizen {
    pub fn aggregate(&self) -> AggregateStatus {
        self.approval.aggregate()
    }

    pub fn submitted_date(&self) -> String {
        self.submitted_at.format("%Y-%m-%d").to_string()
    }

    pub fn cost_saving_display(&self) -> String {
        self.cost_saving.map(|c| c.round_dp(2).to_string()).unwrap_or_else(|| "-".to_string())
    }

    pub fn award_label(&self) -> &'static str {
        self.award.tier.map(|t| t.label()).unwrap_or("-")
    }
}

/// Raw row; status and tier columns are mapped to enums in `From<KaizenRow>`.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct KaizenRow {
    pub id: i64,
    pub kaizen_no: String,
    pub employee_name: String,
    pub employee_no: String,
    pub department: String,
    pub plant: String,
    pub category: String,
    pub title: String,
    pub description: String,
    pub cost_saving: Option<Decimal>,
    pub currency_rate: Option<Decimal>,
    pub has_benefit: bool,
    pub other_benefits: Option<String>,
    pub before_image: Option<String>,
    pub after_image: Option<String>,
    pub employee_image: Option<String>,
    pub submitted_by: Option<i64>,
    pub submitted_at: NaiveDateTime,
    pub engineer_status: Option<String>,
    pub engineer_approved_by: Option<String>,
    pub engineer_comments: Option<String>,
    pub engineer_reviewed_at: Option<NaiveDateTime>,
    pub manager_status: Option<String>,
    pub manager_approved_by: Option<String>,
    pub manager_comments: Option<String>,
    pub manager_reviewed_at: Option<NaiveDateTime>,
    pub award_price: Option<String>,
    pub committee_comments: Option<String>,
    pub committee_signature: Option<String>,
    pub award_date: Option<NaiveDate>,
    pub version: i32,
}

impl From<KaizenRow> for Kaizen {
    fn from(r: KaizenRow) -> Self {
        Kaizen {
            id: r.id,
            kaizen_no: r.kaizen_no,
            employee_name: r.employee_name,
            employee_no: r.employee_no,
            department: r.department,
            plant: r.plant,
            category: r.category,
            title: r.title,
            description: r.description,
            cost_saving: r.cost_saving,
            currency_rate: r.currency_rate,
            has_benefit: r.has_benefit,
            other_benefits: r.other_benefits,
            before_image: r.before_image,
            after_image: r.after_image,
            employee_image: r.employee_image,
            submitted_by: r.submitted_by,
            submitted_at: r.submitted_at,
            approval: ApprovalState {
                engineer: ReviewTrack {
                    status: ReviewStatus::from_db(r.engineer_status.as_deref()),
                    decided_by: r.engineer_approved_by,
                    comments: r.engineer_comments,
                    reviewed_at: r.engineer_reviewed_at,
                },
                manager: ReviewTrack {
                    status: ReviewStatus::from_db(r.manager_status.as_deref()),
                    decided_by: r.manager_approved_by,
                    comments: r.manager_comments,
                    reviewed_at: r.manager_reviewed_at,
                },
            },
            award: AwardState {
                tier: AwardTier::from_db(r.award_price.as_deref()),
                committee_comments: r.committee_comments,
                committee_signature: r.committee_signature,
                award_date: r.award_date,
            },
            version: r.version,
        }
    }
}

/// Validated submission data.
#[derive(Debug, Clone, Default)]
pub struct NewKaizen {
    pub employee_name: String,
    pub employee_no: String,
    pub department: String,
    pub plant: String,
    pub category: String,
    pub title: String,
    pub description: String,
    pub cost_saving: Option<Decimal>,
    pub currency_rate: Option<Decimal>,
    pub has_benefit: bool,
    pub other_benefits: Option<String>,
    pub before_image: Option<String>,
    pub after_image: Option<String>,
    pub employee_image: Option<String>,
}

/// Form input for submitting a suggestion.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KaizenForm {
    pub employee_name: String,
    pub employee_no: String,
    pub department: String,
    pub plant: String,
    #[serde(default)]
    pub category: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub cost_saving: String,
    #[serde(default)]
    pub currency_rate: String,
    pub has_benefit: Option<String>,
    #[serde(default)]
    pub other_benefits: String,
    #[serde(default)]
    pub before_image: String,
    #[serde(default)]
    pub after_image: String,
    #[serde(default)]
    pub employee_image: String,
    #[serde(default)]
    pub csrf_token: String,
}

fn optional_text(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Largest value a `NUMERIC(14, scale)` column holds.
fn numeric_max(scale: u32) -> Decimal {
    Decimal::new(99_999_999_999_999, scale)
}

/// Parse an optional decimal rounded to the column `scale`. Values the
/// column cannot hold are reported instead of reaching the database.
fn optional_decimal(raw: &str, field: &str, scale: u32, errors: &mut Vec<String>) -> Option<Decimal> {
    let raw = raw.trim().replace(',', "");
    if raw.is_empty() {
        return None;
    }
    match Decimal::from_str(&raw) {
        Ok(d) => {
            let d = d.round_dp(scale);
            let max = numeric_max(scale);
            if d.abs() > max {
                errors.push(format!("{field} must be at most {max}"));
                return None;
            }
            Some(d)
        }
        Err(_) => {
            errors.push(format!("{field} must be a number"));
            None
        }
    }
}

impl KaizenForm {
    /// Validate the form. On failure returns every problem found.
    pub fn validate(&self) -> Result<NewKaizen, Vec<String>> {
        let mut errors: Vec<String> = [
            validate_required(&self.employee_name, "Employee name", 100),
            validate_required(&self.employee_no, "Employee number", 30),
            validate_required(&self.department, "Department", 100),
            validate_required(&self.plant, "Plant", 100),
            validate_optional(&self.category, "Category", 100),
            validate_required(&self.title, "Title", 200),
            validate_required(&self.description, "Description", 5000),
            validate_optional(&self.other_benefits, "Other benefits", 2000),
        ]
        .into_iter()
        .flatten()
        .collect();

        let cost_saving = optional_decimal(&self.cost_saving, "Cost saving", 2, &mut errors);
        if cost_saving.is_some_and(|c| c.is_sign_negative()) {
            errors.push("Cost saving cannot be negative".to_string());
        }
        let currency_rate = optional_decimal(&self.currency_rate, "Currency rate", 6, &mut errors);
        if currency_rate.is_some_and(|r| r <= Decimal::ZERO) {
            errors.push("Currency rate must be greater than zero".to_string());
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewKaizen {
            employee_name: self.employee_name.trim().to_string(),
            employee_no: self.employee_no.trim().to_string(),
            department: self.department.trim().to_string(),
            plant: self.plant.trim().to_string(),
            category: self.category.trim().to_string(),
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            cost_saving,
            currency_rate,
            has_benefit: self.has_benefit.as_deref().is_some_and(|v| v == "on" || v == "true"),
            other_benefits: optional_text(&self.other_benefits),
            before_image: optional_text(&self.before_image),
            after_image: optional_text(&self.after_image),
            employee_image: optional_text(&self.employee_image),
        })
    }
}

/// Form input for an engineer or manager review.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewForm {
    pub decision: String,
    #[serde(default)]
    pub comments: String,
    pub version: i32,
    pub csrf_token: String,
}

/// Form input for the award committee.
#[derive(Debug, Clone, Deserialize)]
pub struct AwardForm {
    #[serde(default)]
    pub award_price: String,
    #[serde(default)]
    pub committee_comments: String,
    #[serde(default)]
    pub committee_signature: String,
    #[serde(default)]
    pub award_date: String,
    pub version: i32,
    pub csrf_token: String,
}

/// One page of the filtered list.
#[derive(Debug, Clone)]
pub struct KaizenPage {
    pub items: Vec<Kaizen>,
    pub page: i64,
    pub per_page: i64,
    pub total_count: i64,
    pub total_pages: i64,
}

/// Suggestion counts by aggregate status.
#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct StatusCounts {
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub awarded: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> KaizenForm {
        KaizenForm {
            employee_name: " Aiko Tanaka ".into(),
            employee_no: "E1001".into(),
            department: "Assembly".into(),
            plant: "P1".into(),
            title: "Shadow board for tools".into(),
            description: "Tools kept on a shadow board near line 3".into(),
            cost_saving: "1,250.50".into(),
            has_benefit: Some("on".into()),
            ..Default::default()
        }
    }

    #[test]
    fn valid_form_is_trimmed_and_parsed() {
        let new = valid_form().validate().unwrap();
        assert_eq!(new.employee_name, "Aiko Tanaka");
        assert_eq!(new.cost_saving, Some(Decimal::from_str("1250.50").unwrap()));
        assert!(new.has_benefit);
        assert_eq!(new.before_image, None);
        assert_eq!(new.currency_rate, None);
    }

    #[test]
    fn amounts_beyond_the_column_range_are_rejected() {
        let form = KaizenForm {
            cost_saving: "1000000000000000".into(),
            currency_rate: "123456789".into(),
            ..valid_form()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("Cost saving must be at most 999999999999.99"));

        let form = KaizenForm {
            cost_saving: "999999999999.99".into(),
            currency_rate: "1.23456789".into(),
            ..valid_form()
        };
        let new = form.validate().unwrap();
        assert_eq!(new.cost_saving, Some(Decimal::from_str("999999999999.99").unwrap()));
        assert_eq!(new.currency_rate, Some(Decimal::from_str("1.234568").unwrap()));
    }

    #[test]
    fn missing_fields_and_bad_numbers_are_all_reported() {
        let form = KaizenForm {
            employee_name: "".into(),
            cost_saving: "lots".into(),
            currency_rate: "0".into(),
            ..valid_form()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 3, "{errors:?}");
    }

    #[test]
    fn negative_saving_is_rejected() {
        let form = KaizenForm { cost_saving: "-5".into(), ..valid_form() };
        assert!(form.validate().is_err());
    }
}
