use chrono::{Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::auth::validate::validate_required;

/// Monthly submission goal for one department.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DepartmentTarget {
    pub id: i64,
    pub department: String,
    pub year: i32,
    pub month: i32,
    pub target_count: i32,
}

/// A target next to what the department actually submitted that month.
#[derive(Debug, Clone, Serialize)]
pub struct TargetAchievement {
    pub target_id: i64,
    pub department: String,
    pub year: i32,
    pub month: i32,
    pub target_count: i32,
    pub submitted_count: i64,
    pub achievement_pct: f64,
}

impl TargetAchievement {
    pub fn pct_display(&self) -> String {
        format!("{:.1}%", self.achievement_pct)
    }

    pub fn is_met(&self) -> bool {
        self.target_count > 0 && self.submitted_count >= i64::from(self.target_count)
    }
}

/// Submitted ÷ target as a percentage, one decimal. A zero target yields 0.
pub fn achievement_pct(submitted: i64, target: i32) -> f64 {
    if target <= 0 {
        return 0.0;
    }
    let pct = submitted as f64 / f64::from(target) * 100.0;
    (pct * 10.0).round() / 10.0
}

/// `[first day 00:00, first day of next month 00:00)` for a calendar month.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let end = start.checked_add_months(Months::new(1))?;
    Some((start.and_time(NaiveTime::MIN), end.and_time(NaiveTime::MIN)))
}

/// Validated target data.
#[derive(Debug, Clone)]
pub struct NewTarget {
    pub department: String,
    pub year: i32,
    pub month: i32,
    pub target_count: i32,
}

/// Form data from the target editor.
#[derive(Debug, Default, Deserialize)]
pub struct TargetForm {
    pub department: String,
    pub year: String,
    pub month: String,
    pub target_count: String,
    pub csrf_token: String,
}

impl TargetForm {
    pub fn validate(&self) -> Result<NewTarget, Vec<String>> {
        let mut errors: Vec<String> = validate_required(&self.department, "Department", 100)
            .into_iter()
            .collect();

        let year = self.year.trim().parse::<i32>().ok().filter(|y| (2000..=2100).contains(y));
        if year.is_none() {
            errors.push("Year must be between 2000 and 2100".to_string());
        }
        let month = self.month.trim().parse::<i32>().ok().filter(|m| (1..=12).contains(m));
        if month.is_none() {
            errors.push("Month must be between 1 and 12".to_string());
        }
        let target_count = self.target_count.trim().parse::<i32>().ok().filter(|c| *c >= 0);
        if target_count.is_none() {
            errors.push("Target must be a whole number of zero or more".to_string());
        }

        match (year, month, target_count) {
            (Some(year), Some(month), Some(target_count)) if errors.is_empty() => Ok(NewTarget {
                department: self.department.trim().to_string(),
                year,
                month,
                target_count,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_is_rounded_to_one_decimal() {
        assert_eq!(achievement_pct(1, 3), 33.3);
        assert_eq!(achievement_pct(12, 10), 120.0);
        assert_eq!(achievement_pct(0, 5), 0.0);
    }

    #[test]
    fn zero_target_is_zero_percent() {
        assert_eq!(achievement_pct(7, 0), 0.0);
    }

    #[test]
    fn month_bounds_roll_over_the_year() {
        let (start, end) = month_bounds(2025, 12).unwrap();
        assert_eq!(start.to_string(), "2025-12-01 00:00:00");
        assert_eq!(end.to_string(), "2026-01-01 00:00:00");
        assert!(month_bounds(2025, 13).is_none());
    }

    #[test]
    fn form_validation_collects_every_error() {
        let form = TargetForm {
            department: " ".into(),
            year: "1999".into(),
            month: "0".into(),
            target_count: "-1".into(),
            csrf_token: String::new(),
        };
        assert_eq!(form.validate().unwrap_err().len(), 4);

        let ok = TargetForm {
            department: "Paint Shop".into(),
            year: "2025".into(),
            month: "3".into(),
            target_count: "15".into(),
            csrf_token: String::new(),
        };
        let t = ok.validate().unwrap();
        assert_eq!((t.year, t.month, t.target_count), (2025, 3, 15));
    }
}
