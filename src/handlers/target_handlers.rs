use actix_session::Session;
use actix_web::{web, HttpResponse};
use chrono::{Datelike, Local};
use serde::Deserialize;
use sqlx::PgPool;

use crate::auth::csrf;
use crate::auth::session::{require_admin, set_flash};
use crate::config::AppConfig;
use crate::errors::{render, AppError};
use crate::handlers::auth_handlers::CsrfOnly;
use crate::models::department_target::{self, TargetForm};
use crate::templates_structs::{PageContext, SelectOption, TargetListTemplate};

#[derive(Debug, Default, Deserialize)]
pub struct TargetQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

async fn render_list(
    pool: &PgPool,
    config: &AppConfig,
    session: &Session,
    year: i32,
    month: u32,
    errors: Vec<String>,
) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(session, config, "/targets")?;
    let targets = department_target::find_for_year(pool, year).await?;
    let achievements = department_target::achievements(pool, year, month).await?;
    let current = month.to_string();
    let months = (1..=12u32)
        .map(|m| SelectOption::new(m.to_string(), format!("{m:02}"), &current))
        .collect();

    render(TargetListTemplate { ctx, year, month, targets, achievements, months, errors })
}

/// GET /targets?year=&month=
pub async fn list(
    pool: web::Data<PgPool>,
    config: web::Data<AppConfig>,
    session: Session,
    query: web::Query<TargetQuery>,
) -> Result<HttpResponse, AppError> {
    require_admin(&session)?;
    let today = Local::now().date_naive();
    let year = query.year.filter(|y| (2000..=2100).contains(y)).unwrap_or(today.year());
    let month = query.month.filter(|m| (1..=12).contains(m)).unwrap_or(today.month());
    render_list(&pool, &config, &session, year, month, vec![]).await
}

/// POST /targets
pub async fn save(
    pool: web::Data<PgPool>,
    config: web::Data<AppConfig>,
    session: Session,
    form: web::Form<TargetForm>,
) -> Result<HttpResponse, AppError> {
    require_admin(&session)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    match form.validate() {
        Ok(target) => {
            department_target::upsert(&pool, &target).await?;
            set_flash(
                &session,
                format!("Target saved for {} {}-{:02}", target.department, target.year, target.month),
            );
            Ok(HttpResponse::SeeOther()
                .insert_header((
                    "Location",
                    format!("/targets?year={}&month={}", target.year, target.month),
                ))
                .finish())
        }
        Err(errors) => {
            let today = Local::now().date_naive();
            render_list(&pool, &config, &session, today.year(), today.month(), errors).await
        }
    }
}

/// POST /targets/{id}/delete
pub async fn delete(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    require_admin(&session)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    department_target::delete(&pool, path.into_inner()).await?;
    set_flash(&session, "Target deleted");
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/targets"))
        .finish())
}
