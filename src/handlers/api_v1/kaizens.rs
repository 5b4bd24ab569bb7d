use actix_session::Session;
use actix_web::{web, HttpResponse};
use chrono::Local;
use sqlx::PgPool;

use crate::auth::session::{get_display_name, require_admin, require_reviewer};
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::kaizen::{
    self, AwardAssignment, AwardTier, Decision, Kaizen, KaizenFilter, KaizenFilterParams, Review,
    ReviewRole,
};
use crate::templates_structs::{
    ApiAwardRequest, ApiErrorResponse, ApiKaizen, ApiReviewRequest, PaginatedResponse,
};

/// Client errors become JSON bodies; server errors keep the default handling.
fn json_result(result: Result<Kaizen, AppError>) -> Result<HttpResponse, AppError> {
    let err = match result {
        Ok(k) => return Ok(HttpResponse::Ok().json(ApiKaizen::from(k))),
        Err(e) => e,
    };
    let mut response = match err {
        AppError::NotFound => HttpResponse::NotFound(),
        AppError::InvalidRole(_) => HttpResponse::BadRequest(),
        AppError::Validation(_) => HttpResponse::UnprocessableEntity(),
        AppError::Conflict { .. } => HttpResponse::Conflict(),
        other => return Err(other),
    };
    Ok(response.json(ApiErrorResponse {
        error: err.to_string(),
        details: None,
    }))
}

/// GET /api/v1/kaizens - filtered list with pagination.
/// Query params: the list filters, page (default 1), per_page (default 25, max 100).
pub async fn list(
    pool: web::Data<PgPool>,
    query: web::Query<KaizenFilterParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let filter = KaizenFilter::from_params(&params);
    let page = params.page();
    let per_page = params.per_page();

    let all_items = kaizen::find_all(&pool).await?;
    let filtered: Vec<Kaizen> = all_items.into_iter().filter(|k| filter.matches(k)).collect();

    let total = filtered.len() as i64;
    let offset = ((page - 1) * per_page) as usize;
    let items: Vec<ApiKaizen> = filtered
        .into_iter()
        .skip(offset)
        .take(per_page as usize)
        .map(ApiKaizen::from)
        .collect();

    Ok(HttpResponse::Ok().json(PaginatedResponse { items, page, per_page, total }))
}

/// GET /api/v1/kaizens/{id}
pub async fn read(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    json_result(kaizen::get(&pool, path.into_inner()).await)
}

/// POST /api/v1/kaizens/{id}/review
pub async fn review(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
    body: web::Json<ApiReviewRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let role = match body.role.parse::<ReviewRole>() {
        Ok(role) => role,
        Err(e) => return json_result(Err(e)),
    };
    require_reviewer(&session, role)?;

    let actor = get_display_name(&session)?;
    let result = match body.decision.parse::<Decision>() {
        Ok(decision) => {
            let review = Review::new(role, decision, &actor).with_comments(&body.comments);
            kaizen::review(&pool, id, &review, body.version).await
        }
        Err(e) => Err(e),
    };
    json_result(result)
}

/// POST /api/v1/kaizens/{id}/award
pub async fn award(
    pool: web::Data<PgPool>,
    config: web::Data<AppConfig>,
    session: Session,
    path: web::Path<i64>,
    body: web::Json<ApiAwardRequest>,
) -> Result<HttpResponse, AppError> {
    require_admin(&session)?;
    let id = path.into_inner();
    let body = body.into_inner();

    let result = match AwardTier::parse_input(&body.award_price) {
        Ok(tier) => {
            let assignment = AwardAssignment {
                tier,
                committee_comments: body.committee_comments,
                committee_signature: body.committee_signature,
                award_date: body.award_date.unwrap_or_else(|| Local::now().date_naive()),
            };
            kaizen::assign_award(&pool, id, assignment, config.award_policy, body.version).await
        }
        Err(e) => Err(e),
    };
    json_result(result)
}
