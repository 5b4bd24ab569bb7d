use actix_session::Session;
use actix_web::{web, HttpResponse};
use chrono::Local;
use sqlx::PgPool;

use super::redirect;
use crate::auth::csrf;
use crate::auth::session::{get_user_id, require_admin, set_flash};
use crate::config::AppConfig;
use crate::errors::{render, AppError};
use crate::handlers::auth_handlers::CsrfOnly;
use crate::models::kaizen::{self, KaizenForm};
use crate::templates_structs::{KaizenFormTemplate, PageContext};

/// GET /kaizens/new
pub async fn new_form(
    config: web::Data<AppConfig>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(&session, &config, "/kaizens/new")?;
    let form = KaizenForm {
        employee_name: ctx.display_name.clone(),
        department: ctx.department.clone(),
        ..Default::default()
    };
    render(KaizenFormTemplate { ctx, form, errors: vec![] })
}

/// POST /kaizens
pub async fn create(
    pool: web::Data<PgPool>,
    config: web::Data<AppConfig>,
    session: Session,
    form: web::Form<KaizenForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let new = match form.validate() {
        Ok(new) => new,
        Err(errors) => {
            let ctx = PageContext::build(&session, &config, "/kaizens/new")?;
            return render(KaizenFormTemplate { ctx, form: form.into_inner(), errors });
        }
    };

    let created = kaizen::create(&pool, &new, get_user_id(&session), Local::now().naive_local()).await?;
    set_flash(&session, format!("Suggestion {} submitted", created.kaizen_no));
    Ok(redirect(format!("/kaizens/{}", created.id)))
}

/// POST /kaizens/{id}/delete
pub async fn delete(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    require_admin(&session)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    kaizen::delete(&pool, path.into_inner()).await?;
    set_flash(&session, "Suggestion deleted");
    Ok(redirect("/kaizens".to_string()))
}
