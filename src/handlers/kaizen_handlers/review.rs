use actix_session::Session;
use actix_web::{web, HttpResponse};
use chrono::{Local, NaiveDate};
use sqlx::PgPool;

use super::redirect;
use crate::auth::csrf;
use crate::auth::session::{get_display_name, require_admin, require_reviewer, set_flash};
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::kaizen::{
    self, AwardAssignment, AwardForm, AwardTier, Decision, Kaizen, Review, ReviewForm, ReviewRole,
};

/// Validation failures and stale writes go back to the detail page as a flash
/// message; anything else is a real error.
fn flash_outcome(
    session: &Session,
    id: i64,
    outcome: Result<Kaizen, AppError>,
    success: impl FnOnce(&Kaizen) -> String,
) -> Result<HttpResponse, AppError> {
    match outcome {
        Ok(k) => set_flash(session, success(&k)),
        Err(AppError::Validation(errors)) => set_flash(session, errors.join("; ")),
        Err(e @ AppError::Conflict { .. }) => {
            set_flash(session, format!("{e}. Reload the page and try again."))
        }
        Err(e) => return Err(e),
    }
    Ok(redirect(format!("/kaizens/{id}")))
}

/// Empty means today.
pub(crate) fn parse_award_date(raw: &str) -> Result<NaiveDate, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Local::now().date_naive());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Award date '{raw}' must be YYYY-MM-DD")))
}

/// POST /kaizens/{id}/review/{role}
pub async fn review(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<(i64, String)>,
    form: web::Form<ReviewForm>,
) -> Result<HttpResponse, AppError> {
    let (id, track) = path.into_inner();
    let role: ReviewRole = track.parse()?;
    require_reviewer(&session, role)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let actor = get_display_name(&session)?;
    let outcome = match form.decision.parse::<Decision>() {
        Ok(decision) => {
            let review = Review::new(role, decision, &actor).with_comments(&form.comments);
            kaizen::review(&pool, id, &review, form.version).await
        }
        Err(e) => Err(e),
    };

    flash_outcome(&session, id, outcome, |k| {
        format!("{} review recorded: {}", role.label(), k.approval.track(role).status)
    })
}

/// POST /kaizens/{id}/award
pub async fn award(
    pool: web::Data<PgPool>,
    config: web::Data<AppConfig>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<AwardForm>,
) -> Result<HttpResponse, AppError> {
    require_admin(&session)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let id = path.into_inner();

    let form = form.into_inner();
    let outcome = match (AwardTier::parse_input(&form.award_price), parse_award_date(&form.award_date)) {
        (Ok(tier), Ok(award_date)) => {
            let assignment = AwardAssignment {
                tier,
                committee_comments: form.committee_comments,
                committee_signature: form.committee_signature,
                award_date,
            };
            kaizen::assign_award(&pool, id, assignment, config.award_policy, form.version).await
        }
        (Err(e), _) | (_, Err(e)) => Err(e),
    };

    flash_outcome(&session, id, outcome, |k| format!("Award updated: {}", k.award_label()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn award_date_defaults_to_today_and_rejects_garbage() {
        assert_eq!(parse_award_date("").unwrap(), Local::now().date_naive());
        assert_eq!(
            parse_award_date("2025-03-31").unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 31).unwrap()
        );
        assert!(matches!(parse_award_date("31/03/2025"), Err(AppError::Validation(_))));
    }
}
