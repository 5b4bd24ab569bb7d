use chrono::{Datelike, NaiveDate};
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::department_target::{self, TargetAchievement};
use crate::models::kaizen::{self, Kaizen, KaizenFilter, ReviewRole, StatusCounts};
use crate::models::user::Role;

const RECENT_LIMIT: i64 = 5;

/// Everything the dashboard shows for one user.
#[derive(Debug, Clone, Default)]
pub struct DashboardSummary {
    pub counts: StatusCounts,
    /// Pending items on the user's own review track, if they review at all.
    pub awaiting_review: Option<AwaitingReview>,
    pub achievements: Vec<TargetAchievement>,
    pub recent: Vec<Kaizen>,
    pub period_label: String,
}

#[derive(Debug, Clone)]
pub struct AwaitingReview {
    pub role: ReviewRole,
    pub count: i64,
}

/// Reviewers see the queue for their own department; a reviewer without one sees every department.
pub async fn load(
    pool: &PgPool,
    role: Role,
    department: &str,
    today: NaiveDate,
) -> Result<DashboardSummary, AppError> {
    let counts = kaizen::status_counts(pool).await?;

    let awaiting_review = match role.review_role() {
        Some(track) => Some(AwaitingReview {
            role: track,
            count: kaizen::count_awaiting_review(pool, track, department).await?,
        }),
        None => None,
    };

    let achievements = department_target::achievements(pool, today.year(), today.month()).await?;
    let recent = kaizen::find_page(pool, &KaizenFilter::default(), 1, RECENT_LIMIT)
        .await?
        .items;

    Ok(DashboardSummary {
        counts,
        awaiting_review,
        achievements,
        recent,
        period_label: today.format("%B %Y").to_string(),
    })
}
