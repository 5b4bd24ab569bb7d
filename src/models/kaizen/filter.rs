//! Search and filter criteria for the suggestion list.
//!
//! Raw query parameters are parsed once into a [`KaizenFilter`]. Criteria that
//! fail to parse (dates, statuses, cost bands) are dropped rather than
//! reported, so a bad value never blocks the list. The filter renders either
//! as a parameterized SQL `WHERE` fragment or as an in-memory predicate; both
//! must agree.

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::status::{AggregateStatus, ReviewStatus};
use super::types::Kaizen;

/// Highest page number honoured; larger requests land on an empty page.
pub const MAX_PAGE: i64 = 1_000_000;

/// Query-string form of the filter, as submitted by the list page and API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KaizenFilterParams {
    pub q: Option<String>,
    pub department: Option<String>,
    pub category: Option<String>,
    pub kaizen_no: Option<String>,
    pub engineer_status: Option<String>,
    pub manager_status: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub cost_saving_range: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl KaizenFilterParams {
    /// Encoded criteria without paging, for building page and export links.
    pub fn query_string(&self) -> String {
        let blank_to_none = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());
        let criteria = KaizenFilterParams {
            q: blank_to_none(&self.q),
            department: blank_to_none(&self.department),
            category: blank_to_none(&self.category),
            kaizen_no: blank_to_none(&self.kaizen_no),
            engineer_status: blank_to_none(&self.engineer_status),
            manager_status: blank_to_none(&self.manager_status),
            status: blank_to_none(&self.status),
            start_date: blank_to_none(&self.start_date),
            end_date: blank_to_none(&self.end_date),
            cost_saving_range: blank_to_none(&self.cost_saving_range),
            page: None,
            per_page: None,
        };
        serde_urlencoded::to_string(&criteria).unwrap_or_default()
    }

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).clamp(1, MAX_PAGE)
    }

    pub fn per_page(&self) -> i64 {
        self.per_page.unwrap_or(25).clamp(1, 100)
    }

    /// Value of a criterion for re-filling the filter form.
    pub fn value(&self, field: &str) -> &str {
        let v = match field {
            "q" => self.q.as_deref(),
            "department" => self.department.as_deref(),
            "category" => self.category.as_deref(),
            "kaizen_no" => self.kaizen_no.as_deref(),
            "engineer_status" => self.engineer_status.as_deref(),
            "manager_status" => self.manager_status.as_deref(),
            "status" => self.status.as_deref(),
            "start_date" => self.start_date.as_deref(),
            "end_date" => self.end_date.as_deref(),
            "cost_saving_range" => self.cost_saving_range.as_deref(),
            _ => None,
        };
        v.unwrap_or("")
    }
}

/// Fixed cost-saving bands. Bounds are inclusive on both ends.
///
/// The bands are whole numbers, so fractional savings between them
/// (1000.50, 5000.50, 10000.50) belong to no band. This is intentional and
/// matches the published band labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostBand {
    NoSaving,
    UpTo1000,
    From1001To5000,
    From5001To10000,
    Above10000,
}

impl CostBand {
    pub const ALL: [CostBand; 5] = [
        CostBand::UpTo1000,
        CostBand::From1001To5000,
        CostBand::From5001To10000,
        CostBand::Above10000,
        CostBand::NoSaving,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            CostBand::NoSaving => "no-saving",
            CostBand::UpTo1000 => "0-1000",
            CostBand::From1001To5000 => "1001-5000",
            CostBand::From5001To10000 => "5001-10000",
            CostBand::Above10000 => "10001+",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CostBand::NoSaving => "No saving",
            CostBand::UpTo1000 => "0 - 1,000",
            CostBand::From1001To5000 => "1,001 - 5,000",
            CostBand::From5001To10000 => "5,001 - 10,000",
            CostBand::Above10000 => "Above 10,000",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        match raw.to_ascii_lowercase().as_str() {
            "none" | "no saving" | "nosaving" => Some(CostBand::NoSaving),
            _ => Self::ALL.into_iter().find(|b| b.code() == raw),
        }
    }

    fn bounds(&self) -> Option<(i64, Option<i64>)> {
        match self {
            CostBand::NoSaving => None,
            CostBand::UpTo1000 => Some((0, Some(1000))),
            CostBand::From1001To5000 => Some((1001, Some(5000))),
            CostBand::From5001To10000 => Some((5001, Some(10000))),
            CostBand::Above10000 => Some((10001, None)),
        }
    }

    pub fn contains(&self, value: Option<Decimal>) -> bool {
        match (self.bounds(), value) {
            (None, v) => v.is_none_or(|v| v.is_zero()),
            (Some(_), None) => false,
            (Some((lo, hi)), Some(v)) => {
                v >= Decimal::from(lo) && hi.is_none_or(|hi| v <= Decimal::from(hi))
            }
        }
    }

    /// SQL predicate over `cost_saving`. Bounds are constants, never user input.
    pub fn sql(&self) -> String {
        match self.bounds() {
            None => "(cost_saving IS NULL OR cost_saving = 0)".to_string(),
            Some((lo, Some(hi))) => format!("(cost_saving >= {lo} AND cost_saving <= {hi})"),
            Some((lo, None)) => format!("cost_saving >= {lo}"),
        }
    }
}

/// A bind value produced alongside a SQL fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterParam {
    Text(String),
    Timestamp(NaiveDateTime),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct KaizenFilter {
    pub text: Option<String>,
    pub department: Option<String>,
    pub category: Option<String>,
    pub kaizen_no: Option<String>,
    pub engineer_status: Option<ReviewStatus>,
    pub manager_status: Option<ReviewStatus>,
    pub status: Option<AggregateStatus>,
    pub submitted_from: Option<NaiveDateTime>,
    pub submitted_before: Option<NaiveDateTime>,
    pub cost_band: Option<CostBand>,
}

fn non_empty(v: &Option<String>) -> Option<String> {
    v.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn parse_date(v: &Option<String>) -> Option<NaiveDate> {
    let raw = v.as_deref()?.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Escape `LIKE` wildcards so user text matches literally.
fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl KaizenFilter {
    pub fn from_params(p: &KaizenFilterParams) -> Self {
        KaizenFilter {
            text: non_empty(&p.q),
            department: non_empty(&p.department),
            category: non_empty(&p.category),
            kaizen_no: non_empty(&p.kaizen_no),
            engineer_status: non_empty(&p.engineer_status).and_then(|s| ReviewStatus::parse_lenient(&s)),
            manager_status: non_empty(&p.manager_status).and_then(|s| ReviewStatus::parse_lenient(&s)),
            status: non_empty(&p.status).and_then(|s| AggregateStatus::parse_lenient(&s)),
            submitted_from: parse_date(&p.start_date).map(|d| d.and_time(NaiveTime::MIN)),
            submitted_before: parse_date(&p.end_date)
                .and_then(|d| d.checked_add_days(Days::new(1)))
                .map(|d| d.and_time(NaiveTime::MIN)),
            cost_band: non_empty(&p.cost_saving_range).and_then(|s| CostBand::parse(&s)),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == KaizenFilter::default()
    }

    /// Build the `WHERE` fragment. `param_offset` is the number of `$N`
    /// placeholders already used by the surrounding query.
    pub fn where_clause(&self, param_offset: usize) -> (String, Vec<FilterParam>) {
        let mut parts: Vec<String> = vec![];
        let mut params: Vec<FilterParam> = vec![];
        let push_param = |params: &mut Vec<FilterParam>, p: FilterParam| -> usize {
            params.push(p);
            param_offset + params.len()
        };

        if let Some(text) = &self.text {
            let n = push_param(&mut params, FilterParam::Text(format!("%{}%", escape_like(text))));
            parts.push(format!(
                "(kaizen_no ILIKE ${n} OR employee_name ILIKE ${n} OR employee_no ILIKE ${n} \
                 OR department ILIKE ${n} OR description ILIKE ${n})"
            ));
        }
        if let Some(dept) = &self.department {
            let n = push_param(&mut params, FilterParam::Text(dept.clone()));
            parts.push(format!("department = ${n}"));
        }
        if let Some(category) = &self.category {
            let n = push_param(&mut params, FilterParam::Text(format!("%{}%", escape_like(category))));
            parts.push(format!("category ILIKE ${n}"));
        }
        if let Some(no) = &self.kaizen_no {
            let n = push_param(&mut params, FilterParam::Text(format!("%{}%", escape_like(no))));
            parts.push(format!("kaizen_no ILIKE ${n}"));
        }
        if let Some(s) = self.engineer_status {
            let n = push_param(&mut params, FilterParam::Text(s.as_str().to_string()));
            parts.push(format!("engineer_status = ${n}"));
        }
        if let Some(s) = self.manager_status {
            let n = push_param(&mut params, FilterParam::Text(s.as_str().to_string()));
            parts.push(format!("manager_status = ${n}"));
        }
        if let Some(agg) = self.status {
            parts.push(agg.sql_predicate().to_string());
        }
        if let Some(from) = self.submitted_from {
            let n = push_param(&mut params, FilterParam::Timestamp(from));
            parts.push(format!("submitted_at >= ${n}"));
        }
        if let Some(before) = self.submitted_before {
            let n = push_param(&mut params, FilterParam::Timestamp(before));
            parts.push(format!("submitted_at < ${n}"));
        }
        if let Some(band) = self.cost_band {
            parts.push(band.sql());
        }

        if parts.is_empty() {
            return ("1=1".to_string(), params);
        }
        (parts.join(" AND "), params)
    }

    pub fn matches(&self, k: &Kaizen) -> bool {
        if let Some(text) = &self.text {
            let hit = [&k.kaizen_no, &k.employee_name, &k.employee_no, &k.department, &k.description]
                .into_iter()
                .any(|field| contains_ci(field, text));
            if !hit {
                return false;
            }
        }
        if self.department.as_ref().is_some_and(|d| *d != k.department) {
            return false;
        }
        if self.category.as_ref().is_some_and(|c| !contains_ci(&k.category, c)) {
            return false;
        }
        if self.kaizen_no.as_ref().is_some_and(|n| !contains_ci(&k.kaizen_no, n)) {
            return false;
        }
        if self.engineer_status.is_some_and(|s| s != k.approval.engineer.status) {
            return false;
        }
        if self.manager_status.is_some_and(|s| s != k.approval.manager.status) {
            return false;
        }
        if self.status.is_some_and(|s| s != k.aggregate()) {
            return false;
        }
        if self.submitted_from.is_some_and(|from| k.submitted_at < from) {
            return false;
        }
        if self.submitted_before.is_some_and(|before| k.submitted_at >= before) {
            return false;
        }
        if self.cost_band.is_some_and(|band| !band.contains(k.cost_saving)) {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::kaizen::{ApprovalState, AwardState};
    use std::str::FromStr;

    fn params(f: impl FnOnce(&mut KaizenFilterParams)) -> KaizenFilter {
        let mut p = KaizenFilterParams::default();
        f(&mut p);
        KaizenFilter::from_params(&p)
    }

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn kaizen(no: &str, submitted: &str, saving: Option<&str>) -> Kaizen {
        Kaizen {
            id: 1,
            kaizen_no: no.to_string(),
            employee_name: "Aiko Tanaka".into(),
            employee_no: "E1001".into(),
            department: "Assembly".into(),
            plant: "P1".into(),
            category: "Safety".into(),
            title: "Guard rail".into(),
            description: "Add a guard rail at station 4".into(),
            cost_saving: saving.map(|s| Decimal::from_str(s).unwrap()),
            currency_rate: None,
            has_benefit: false,
            other_benefits: None,
            before_image: None,
            after_image: None,
            employee_image: None,
            submitted_by: None,
            submitted_at: at(submitted),
            approval: ApprovalState::default(),
            award: AwardState::default(),
            version: 1,
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let f = KaizenFilter::from_params(&KaizenFilterParams::default());
        assert!(f.is_empty());
        assert_eq!(f.where_clause(0), ("1=1".to_string(), vec![]));
        assert!(f.matches(&kaizen("KZN-20250101-001", "2025-01-01 08:00", None)));
    }

    #[test]
    fn free_text_matches_kaizen_number_case_insensitively() {
        let f = params(|p| p.q = Some("kzn-20250101".into()));
        assert!(f.matches(&kaizen("KZN-20250101-001", "2025-01-01 08:00", None)));
        assert!(!f.matches(&kaizen("KZN-20250102-001", "2025-01-02 08:00", None)));

        let (sql, binds) = f.where_clause(0);
        assert!(sql.starts_with("(kaizen_no ILIKE $1 OR employee_name ILIKE $1"));
        assert_eq!(binds, vec![FilterParam::Text("%kzn-20250101%".into())]);
    }

    #[test]
    fn cost_band_bounds_are_inclusive() {
        let f = params(|p| p.cost_saving_range = Some("1001-5000".into()));
        assert!(!f.matches(&kaizen("A", "2025-01-01 08:00", Some("1000.00"))));
        assert!(f.matches(&kaizen("A", "2025-01-01 08:00", Some("5000.00"))));
        assert!(f.matches(&kaizen("A", "2025-01-01 08:00", Some("1001"))));
        assert!(!f.matches(&kaizen("A", "2025-01-01 08:00", None)));
        assert_eq!(f.where_clause(0).0, "(cost_saving >= 1001 AND cost_saving <= 5000)");
    }

    #[test]
    fn no_saving_band_means_null_or_zero() {
        let f = params(|p| p.cost_saving_range = Some("no-saving".into()));
        assert!(f.matches(&kaizen("A", "2025-01-01 08:00", None)));
        assert!(f.matches(&kaizen("A", "2025-01-01 08:00", Some("0.00"))));
        assert!(!f.matches(&kaizen("A", "2025-01-01 08:00", Some("0.01"))));
    }

    #[test]
    fn top_band_is_open_ended() {
        let f = params(|p| p.cost_saving_range = Some("10001+".into()));
        assert!(f.matches(&kaizen("A", "2025-01-01 08:00", Some("250000"))));
        assert!(!f.matches(&kaizen("A", "2025-01-01 08:00", Some("10000"))));
        assert_eq!(f.where_clause(0).0, "cost_saving >= 10001");
    }

    #[test]
    fn end_date_includes_the_whole_day() {
        let f = params(|p| p.end_date = Some("2025-01-10".into()));
        assert!(f.matches(&kaizen("A", "2025-01-10 23:59", None)));
        assert!(!f.matches(&kaizen("A", "2025-01-11 00:00", None)));
        assert_eq!(
            f.where_clause(0),
            ("submitted_at < $1".to_string(), vec![FilterParam::Timestamp(at("2025-01-11 00:00"))])
        );
    }

    #[test]
    fn start_date_is_inclusive() {
        let f = params(|p| p.start_date = Some("2025-01-10".into()));
        assert!(f.matches(&kaizen("A", "2025-01-10 00:00", None)));
        assert!(!f.matches(&kaizen("A", "2025-01-09 23:59", None)));
    }

    #[test]
    fn unparseable_values_are_ignored() {
        let f = params(|p| {
            p.start_date = Some("10/01/2025".into());
            p.end_date = Some("yesterday".into());
            p.status = Some("maybe".into());
            p.engineer_status = Some("??".into());
            p.cost_saving_range = Some("a lot".into());
        });
        assert!(f.is_empty());
    }

    #[test]
    fn aggregate_status_uses_precedence() {
        let f = params(|p| p.status = Some("rejected".into()));
        let mut k = kaizen("A", "2025-01-01 08:00", None);
        k.approval.approve("engineer", "Alice").unwrap();
        assert!(!f.matches(&k));
        k.approval.reject("manager", "Bob", "Duplicate idea").unwrap();
        assert!(f.matches(&k));
        assert_eq!(f.where_clause(0).0, AggregateStatus::Rejected.sql_predicate());
    }

    #[test]
    fn criteria_are_and_combined_with_running_placeholders() {
        let f = params(|p| {
            p.department = Some("Assembly".into());
            p.engineer_status = Some("approved".into());
            p.category = Some("50%_off".into());
        });
        let (sql, binds) = f.where_clause(2);
        assert_eq!(sql, "department = $3 AND category ILIKE $4 AND engineer_status = $5");
        assert_eq!(
            binds,
            vec![
                FilterParam::Text("Assembly".into()),
                FilterParam::Text("%50\\%\\_off%".into()),
                FilterParam::Text("Approved".into()),
            ]
        );
        let k = kaizen("A", "2025-01-01 08:00", None);
        assert!(!f.matches(&k));
    }

    #[test]
    fn query_string_drops_paging_and_empty_fields() {
        let p = KaizenFilterParams {
            q: Some("rail".into()),
            department: Some(" ".into()),
            status: Some("Pending".into()),
            page: Some(3),
            ..Default::default()
        };
        assert_eq!(p.query_string(), "q=rail&status=Pending");
        assert_eq!(p.page(), 3);
        assert_eq!(p.per_page(), 25);
        assert_eq!(p.value("status"), "Pending");
        assert_eq!(p.value("category"), "");
    }

    #[test]
    fn huge_page_is_clamped() {
        let p = KaizenFilterParams { page: Some(i64::MAX), per_page: Some(100), ..Default::default() };
        assert_eq!(p.page(), MAX_PAGE);
        assert!((p.page() - 1).checked_mul(p.per_page()).is_some());
        let p = KaizenFilterParams { page: Some(-4), ..Default::default() };
        assert_eq!(p.page(), 1);
    }

    #[test]
    fn fractional_savings_between_bands_match_no_band() {
        let gap = Some(Decimal::new(100050, 2));
        assert!(CostBand::ALL.into_iter().all(|b| !b.contains(gap)));
    }
}
