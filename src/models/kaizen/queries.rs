use chrono::{Local, NaiveDateTime};
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::{PgPool, Postgres};

use super::award::{AwardAssignment, AwardPolicy};
use super::filter::{FilterParam, KaizenFilter, MAX_PAGE};
use super::number;
use super::status::{AggregateStatus, Review, ReviewRole};
use super::types::{Kaizen, KaizenPage, KaizenRow, NewKaizen, StatusCounts};
use crate::errors::AppError;

const COLUMNS: &str = "id, kaizen_no, employee_name, employee_no, department, plant, category, title, \
    description, cost_saving, currency_rate, has_benefit, other_benefits, before_image, after_image, \
    employee_image, submitted_by, submitted_at, \
    engineer_status, engineer_approved_by, engineer_comments, engineer_reviewed_at, \
    manager_status, manager_approved_by, manager_comments, manager_reviewed_at, \
    award_price, committee_comments, committee_signature, award_date, version";

/// Bind the values produced by `KaizenFilter::where_clause`, in order.
fn bind_filter<'q, O>(
    mut query: QueryAs<'q, Postgres, O, PgArguments>,
    params: &'q [FilterParam],
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for p in params {
        query = match p {
            FilterParam::Text(s) => query.bind(s.as_str()),
            FilterParam::Timestamp(t) => query.bind(*t),
        };
    }
    query
}

/// Insert a new suggestion with both review tracks pending.
///
/// The kaizen number is allocated under a transaction-scoped advisory lock
/// keyed by the submission day, so concurrent submissions get consecutive
/// numbers.
pub async fn create(
    pool: &PgPool,
    new: &NewKaizen,
    submitted_by: Option<i64>,
    submitted_at: NaiveDateTime,
) -> Result<Kaizen, AppError> {
    let day = submitted_at.date();
    let mut tx = pool.begin().await?;

    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(number::lock_key(day))
        .execute(&mut *tx)
        .await?;

    let last: Option<String> = sqlx::query_scalar(
        "SELECT kaizen_no FROM kaizen_suggestions WHERE kaizen_no LIKE $1 \
         ORDER BY LENGTH(kaizen_no) DESC, kaizen_no DESC LIMIT 1",
    )
    .bind(format!("{}%", number::day_prefix(day)))
    .fetch_optional(&mut *tx)
    .await?;

    let kaizen_no = number::format_number(day, number::next_sequence(day, last.as_deref()));

    let sql = format!(
        "INSERT INTO kaizen_suggestions \
            (kaizen_no, employee_name, employee_no, department, plant, category, title, description, \
             cost_saving, currency_rate, has_benefit, other_benefits, before_image, after_image, \
             employee_image, submitted_by, submitted_at, engineer_status, manager_status) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, \
                 'Pending', 'Pending') \
         RETURNING {COLUMNS}"
    );
    let row = sqlx::query_as::<_, KaizenRow>(&sql)
        .bind(&kaizen_no)
        .bind(&new.employee_name)
        .bind(&new.employee_no)
        .bind(&new.department)
        .bind(&new.plant)
        .bind(&new.category)
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.cost_saving)
        .bind(new.currency_rate)
        .bind(new.has_benefit)
        .bind(new.other_benefits.as_deref())
        .bind(new.before_image.as_deref())
        .bind(new.after_image.as_deref())
        .bind(new.employee_image.as_deref())
        .bind(submitted_by)
        .bind(submitted_at)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;
    log::info!("Kaizen {kaizen_no} submitted for department '{}'", new.department);
    Ok(row.into())
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Kaizen>, AppError> {
    let sql = format!("SELECT {COLUMNS} FROM kaizen_suggestions WHERE id = $1");
    let row = sqlx::query_as::<_, KaizenRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(Kaizen::from))
}

/// Like `find_by_id`, but a missing suggestion is an error.
pub async fn get(pool: &PgPool, id: i64) -> Result<Kaizen, AppError> {
    find_by_id(pool, id).await?.ok_or(AppError::NotFound)
}

pub async fn exists(pool: &PgPool, id: i64) -> Result<bool, AppError> {
    let found: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM kaizen_suggestions WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(found)
}

/// One page of suggestions matching `filter`, newest first.
pub async fn find_page(
    pool: &PgPool,
    filter: &KaizenFilter,
    page: i64,
    per_page: i64,
) -> Result<KaizenPage, AppError> {
    let page = page.clamp(1, MAX_PAGE);
    let per_page = per_page.clamp(1, 100);
    let offset = (page - 1) * per_page;

    let (where_clause, params) = filter.where_clause(0);

    let count_sql = format!("SELECT COUNT(*) FROM kaizen_suggestions WHERE {where_clause}");
    let (total_count,): (i64,) = bind_filter(sqlx::query_as(&count_sql), &params)
        .fetch_one(pool)
        .await?;

    let n = params.len();
    let data_sql = format!(
        "SELECT {COLUMNS} FROM kaizen_suggestions WHERE {where_clause} \
         ORDER BY submitted_at DESC, id DESC LIMIT ${} OFFSET ${}",
        n + 1,
        n + 2
    );
    let rows: Vec<KaizenRow> = bind_filter(sqlx::query_as(&data_sql), &params)
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    let total_pages = ((total_count + per_page - 1) / per_page).max(1);

    Ok(KaizenPage {
        items: rows.into_iter().map(Kaizen::from).collect(),
        page,
        per_page,
        total_count,
        total_pages,
    })
}

/// Every suggestion matching `filter`, newest first (used by the CSV export).
pub async fn find_all_filtered(pool: &PgPool, filter: &KaizenFilter) -> Result<Vec<Kaizen>, AppError> {
    let (where_clause, params) = filter.where_clause(0);
    let sql = format!(
        "SELECT {COLUMNS} FROM kaizen_suggestions WHERE {where_clause} \
         ORDER BY submitted_at DESC, id DESC"
    );
    let rows: Vec<KaizenRow> = bind_filter(sqlx::query_as(&sql), &params)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(Kaizen::from).collect())
}

pub async fn find_all(pool: &PgPool) -> Result<Vec<Kaizen>, AppError> {
    find_all_filtered(pool, &KaizenFilter::default()).await
}

/// Distinguish a stale write from a missing row after a guarded update hit nothing.
async fn stale_or_missing(pool: &PgPool, id: i64, expected: i32) -> AppError {
    match exists(pool, id).await {
        Ok(true) => AppError::Conflict { id, expected },
        Ok(false) => AppError::NotFound,
        Err(e) => e,
    }
}

/// Record an engineer or manager decision, overwriting that track.
///
/// `expected_version` is the version the caller read; a stale write fails
/// with `Conflict`.
pub async fn review(
    pool: &PgPool,
    id: i64,
    review: &Review,
    expected_version: i32,
) -> Result<Kaizen, AppError> {
    let current = get(pool, id).await?;
    if current.version != expected_version {
        return Err(AppError::Conflict { id, expected: expected_version });
    }

    let review = match review.at {
        Some(_) => review.clone(),
        None => review.clone().at(Local::now().naive_local()),
    };
    let mut approval = current.approval.clone();
    approval.apply(&review)?;
    let track = approval.track(review.role);

    let prefix = match review.role {
        ReviewRole::Engineer => "engineer",
        ReviewRole::Manager => "manager",
    };
    let sql = format!(
        "UPDATE kaizen_suggestions \
         SET {prefix}_status = $1, {prefix}_approved_by = $2, {prefix}_comments = $3, \
             {prefix}_reviewed_at = $4, version = version + 1 \
         WHERE id = $5 AND version = $6 \
         RETURNING {COLUMNS}"
    );
    let row = sqlx::query_as::<_, KaizenRow>(&sql)
        .bind(track.status.as_str())
        .bind(track.decided_by.as_deref())
        .bind(track.comments.as_deref())
        .bind(track.reviewed_at)
        .bind(id)
        .bind(expected_version)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => {
            let updated = Kaizen::from(row);
            log::info!(
                "Kaizen {} {} review: {} by {} (now {})",
                updated.kaizen_no,
                review.role,
                track.status,
                review.actor.trim(),
                updated.aggregate()
            );
            Ok(updated)
        }
        None => Err(stale_or_missing(pool, id, expected_version).await),
    }
}

/// Replace the award fields of a suggestion. Whether an unapproved
/// suggestion may be awarded is decided by `policy`.
pub async fn assign_award(
    pool: &PgPool,
    id: i64,
    assignment: AwardAssignment,
    policy: AwardPolicy,
    expected_version: i32,
) -> Result<Kaizen, AppError> {
    let current = get(pool, id).await?;
    if current.version != expected_version {
        return Err(AppError::Conflict { id, expected: expected_version });
    }
    policy.check(current.aggregate())?;
    assignment.validate()?;

    let award = assignment.into_state();
    let sql = format!(
        "UPDATE kaizen_suggestions \
         SET award_price = $1, committee_comments = $2, committee_signature = $3, award_date = $4, \
             version = version + 1 \
         WHERE id = $5 AND version = $6 \
         RETURNING {COLUMNS}"
    );
    let row = sqlx::query_as::<_, KaizenRow>(&sql)
        .bind(award.tier.map(|t| t.label()))
        .bind(award.committee_comments.as_deref())
        .bind(award.committee_signature.as_deref())
        .bind(award.award_date)
        .bind(id)
        .bind(expected_version)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => {
            let updated = Kaizen::from(row);
            log::info!("Kaizen {} award set to {}", updated.kaizen_no, updated.award_label());
            Ok(updated)
        }
        None => Err(stale_or_missing(pool, id, expected_version).await),
    }
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM kaizen_suggestions WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    log::info!("Kaizen #{id} deleted");
    Ok(())
}

/// Counts by aggregate status, plus awarded suggestions.
pub async fn status_counts(pool: &PgPool) -> Result<StatusCounts, AppError> {
    let sql = format!(
        "SELECT COUNT(*) AS total, \
                COUNT(*) FILTER (WHERE {}) AS pending, \
                COUNT(*) FILTER (WHERE {}) AS approved, \
                COUNT(*) FILTER (WHERE {}) AS rejected, \
                COUNT(*) FILTER (WHERE award_price IS NOT NULL AND award_price <> '') AS awarded \
         FROM kaizen_suggestions",
        AggregateStatus::Pending.sql_predicate(),
        AggregateStatus::Approved.sql_predicate(),
        AggregateStatus::Rejected.sql_predicate(),
    );
    let counts = sqlx::query_as::<_, StatusCounts>(&sql).fetch_one(pool).await?;
    Ok(counts)
}

/// Suggestions whose `role` track is still pending. An empty department counts all.
pub async fn count_awaiting_review(
    pool: &PgPool,
    role: ReviewRole,
    department: &str,
) -> Result<i64, AppError> {
    let column = match role {
        ReviewRole::Engineer => "engineer_status",
        ReviewRole::Manager => "manager_status",
    };
    let sql = format!(
        "SELECT COUNT(*) FROM kaizen_suggestions \
         WHERE {column} = 'Pending' AND ($1 = '' OR department = $1)"
    );
    let count: i64 = sqlx::query_scalar(&sql)
        .bind(department)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Departments that have at least one suggestion, for filter dropdowns.
pub async fn distinct_departments(pool: &PgPool) -> Result<Vec<String>, AppError> {
    let departments: Vec<String> = sqlx::query_scalar(
        "SELECT DISTINCT department FROM kaizen_suggestions WHERE department <> '' ORDER BY department",
    )
    .fetch_all(pool)
    .await?;
    Ok(departments)
}
