use sqlx::PgPool;

use super::types::{NewUser, User, UserDisplay};
use crate::errors::AppError;

const SELECT_USER_DISPLAY: &str = "\
    SELECT id, username, display_name, department, plant, role, created_at \
    FROM users";

pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, password_hash, display_name, department, plant, role \
         FROM users WHERE username = $1",
    )
    .bind(username.trim())
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn find_display_by_id(pool: &PgPool, id: i64) -> Result<Option<UserDisplay>, AppError> {
    let sql = format!("{SELECT_USER_DISPLAY} WHERE id = $1");
    let user = sqlx::query_as::<_, UserDisplay>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_all_display(pool: &PgPool) -> Result<Vec<UserDisplay>, AppError> {
    let sql = format!("{SELECT_USER_DISPLAY} ORDER BY username");
    let users = sqlx::query_as::<_, UserDisplay>(&sql).fetch_all(pool).await?;
    Ok(users)
}

pub async fn count(pool: &PgPool) -> Result<i64, AppError> {
    let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    Ok(n)
}

/// Returns `Ok(None)` when the username is already taken.
pub async fn create(pool: &PgPool, new: &NewUser) -> Result<Option<i64>, AppError> {
    let id: Option<i64> = sqlx::query_scalar(
        "INSERT INTO users (username, password_hash, display_name, department, plant, role) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         ON CONFLICT (username) DO NOTHING \
         RETURNING id",
    )
    .bind(&new.username)
    .bind(&new.password)
    .bind(&new.display_name)
    .bind(&new.department)
    .bind(&new.plant)
    .bind(new.role.as_str())
    .fetch_optional(pool)
    .await?;
    Ok(id)
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}
