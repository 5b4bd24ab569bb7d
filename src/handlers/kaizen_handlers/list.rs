use actix_session::Session;
use actix_web::{web, HttpResponse};
use sqlx::PgPool;

use crate::config::AppConfig;
use crate::errors::{render, AppError};
use crate::models::kaizen::{self, AggregateStatus, CostBand, KaizenFilter, KaizenFilterParams, ReviewStatus};
use crate::templates_structs::{KaizenDetailTemplate, KaizenListTemplate, PageContext, SelectOption};

fn with_any(current: &str, options: impl IntoIterator<Item = (String, String)>) -> Vec<SelectOption> {
    std::iter::once(SelectOption::new("", "Any", current))
        .chain(options.into_iter().map(|(v, l)| SelectOption::new(v, l, current)))
        .collect()
}

fn review_status_options(current: &str) -> Vec<SelectOption> {
    with_any(
        current,
        ReviewStatus::ALL.iter().map(|s| (s.as_str().to_string(), s.as_str().to_string())),
    )
}

/// GET /kaizens
pub async fn list(
    pool: web::Data<PgPool>,
    config: web::Data<AppConfig>,
    session: Session,
    query: web::Query<KaizenFilterParams>,
) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(&session, &config, "/kaizens")?;
    let params = query.into_inner();
    let filter = KaizenFilter::from_params(&params);

    let kaizen_page = kaizen::find_page(&pool, &filter, params.page(), params.per_page()).await?;
    let departments = kaizen::distinct_departments(&pool).await?;

    let tmpl = KaizenListTemplate {
        ctx,
        kaizen_page,
        query_string: params.query_string(),
        q: params.value("q").to_string(),
        kaizen_no: params.value("kaizen_no").to_string(),
        category: params.value("category").to_string(),
        start_date: params.value("start_date").to_string(),
        end_date: params.value("end_date").to_string(),
        departments: with_any(
            params.value("department"),
            departments.into_iter().map(|d| (d.clone(), d)),
        ),
        engineer_statuses: review_status_options(params.value("engineer_status")),
        manager_statuses: review_status_options(params.value("manager_status")),
        statuses: with_any(
            params.value("status"),
            AggregateStatus::ALL.iter().map(|s| (s.as_str().to_string(), s.as_str().to_string())),
        ),
        cost_bands: with_any(
            params.value("cost_saving_range"),
            CostBand::ALL.iter().map(|b| (b.code().to_string(), b.label().to_string())),
        ),
    };
    render(tmpl)
}

/// GET /kaizens/{id}
pub async fn detail(
    pool: web::Data<PgPool>,
    config: web::Data<AppConfig>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(&session, &config, "/kaizens")?;
    let kaizen = kaizen::get(&pool, path.into_inner()).await?;

    let award_allowed = ctx.is_admin() && config.award_policy.check(kaizen.aggregate()).is_ok();
    let tmpl = KaizenDetailTemplate {
        award_tiers: KaizenDetailTemplate::tier_options(kaizen.award.tier),
        award_allowed,
        ctx,
        kaizen,
    };
    render(tmpl)
}
