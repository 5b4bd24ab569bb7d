use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::kaizen::{AggregateStatus, AwardTier, Kaizen, ReviewStatus};

/// Generic paginated response wrapper for API endpoints.
#[derive(Serialize, Debug, Clone)]
pub struct PaginatedResponse<T: Serialize> {
    pub items: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
}

/// Flattened suggestion for JSON clients.
#[derive(Serialize, Debug, Clone)]
pub struct ApiKaizen {
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
    pub submitted_at: String,
    pub engineer_status: ReviewStatus,
    pub engineer_approved_by: Option<String>,
    pub engineer_comments: Option<String>,
    pub manager_status: ReviewStatus,
    pub manager_approved_by: Option<String>,
    pub manager_comments: Option<String>,
    pub status: AggregateStatus,
    pub award_price: Option<AwardTier>,
    pub award_date: Option<NaiveDate>,
    pub version: i32,
}

impl From<Kaizen> for ApiKaizen {
    fn from(k: Kaizen) -> Self {
        let status = k.aggregate();
        let engineer = k.approval.engineer;
        let manager = k.approval.manager;
        ApiKaizen {
            id: k.id,
            kaizen_no: k.kaizen_no,
            employee_name: k.employee_name,
            employee_no: k.employee_no,
            department: k.department,
            plant: k.plant,
            category: k.category,
            title: k.title,
            description: k.description,
            cost_saving: k.cost_saving,
            currency_rate: k.currency_rate,
            has_benefit: k.has_benefit,
            submitted_at: k.submitted_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            engineer_status: engineer.status,
            engineer_approved_by: engineer.decided_by,
            engineer_comments: engineer.comments,
            manager_status: manager.status,
            manager_approved_by: manager.decided_by,
            manager_comments: manager.comments,
            status,
            award_price: k.award.tier,
            award_date: k.award.award_date,
            version: k.version,
        }
    }
}

/// POST /api/v1/kaizens/{id}/review
#[derive(Deserialize, Debug)]
pub struct ApiReviewRequest {
    pub role: String,
    pub decision: String,
    #[serde(default)]
    pub comments: String,
    pub version: i32,
}

/// POST /api/v1/kaizens/{id}/award
#[derive(Deserialize, Debug)]
pub struct ApiAwardRequest {
    #[serde(default)]
    pub award_price: String,
    #[serde(default)]
    pub committee_comments: String,
    #[serde(default)]
    pub committee_signature: String,
    pub award_date: Option<NaiveDate>,
    pub version: i32,
}

/// Error body for API responses.
#[derive(Serialize, Debug)]
pub struct ApiErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
