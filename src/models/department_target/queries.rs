use sqlx::PgPool;

use super::types::{achievement_pct, month_bounds, DepartmentTarget, NewTarget, TargetAchievement};
use crate::errors::AppError;

/// Insert or replace the target for `(department, year, month)`. Returns the row id.
pub async fn upsert(pool: &PgPool, target: &NewTarget) -> Result<i64, AppError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO department_targets (department, year, month, target_count) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (department, year, month) DO UPDATE SET target_count = excluded.target_count \
         RETURNING id",
    )
    .bind(&target.department)
    .bind(target.year)
    .bind(target.month)
    .bind(target.target_count)
    .fetch_one(pool)
    .await?;
    log::info!(
        "Target for {} {}-{:02} set to {}",
        target.department,
        target.year,
        target.month,
        target.target_count
    );
    Ok(id)
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM department_targets WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

pub async fn find_for_year(pool: &PgPool, year: i32) -> Result<Vec<DepartmentTarget>, AppError> {
    let targets = sqlx::query_as::<_, DepartmentTarget>(
        "SELECT id, department, year, month, target_count FROM department_targets \
         WHERE year = $1 ORDER BY month, department",
    )
    .bind(year)
    .fetch_all(pool)
    .await?;
    Ok(targets)
}

/// Achievement of every department that has a target for the month.
pub async fn achievements(pool: &PgPool, year: i32, month: u32) -> Result<Vec<TargetAchievement>, AppError> {
    let Some((start, end)) = month_bounds(year, month) else {
        return Ok(vec![]);
    };

    #[derive(sqlx::FromRow)]
    struct Row {
        id: i64,
        department: String,
        year: i32,
        month: i32,
        target_count: i32,
        submitted_count: i64,
    }

    let rows = sqlx::query_as::<_, Row>(
        "SELECT t.id, t.department, t.year, t.month, t.target_count, \
                (SELECT COUNT(*) FROM kaizen_suggestions k \
                 WHERE k.department = t.department \
                   AND k.submitted_at >= $3 AND k.submitted_at < $4) AS submitted_count \
         FROM department_targets t \
         WHERE t.year = $1 AND t.month = $2 \
         ORDER BY t.department",
    )
    .bind(year)
    .bind(month as i32)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| TargetAchievement {
            target_id: r.id,
            achievement_pct: achievement_pct(r.submitted_count, r.target_count),
            department: r.department,
            year: r.year,
            month: r.month,
            target_count: r.target_count,
            submitted_count: r.submitted_count,
        })
        .collect())
}
