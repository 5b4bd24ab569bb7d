use actix_session::Session;
use actix_web::{web, HttpResponse};
use sqlx::PgPool;

use crate::auth::session::{get_user_id, require_admin, set_flash};
use crate::auth::{csrf, password, validate};
use crate::config::AppConfig;
use crate::errors::{render, AppError};
use crate::handlers::auth_handlers::CsrfOnly;
use crate::models::user::{self, NewUser, Role, UserForm};
use crate::templates_structs::{PageContext, SelectOption, UserFormTemplate, UserListTemplate};

fn role_options(current: &str) -> Vec<SelectOption> {
    Role::ALL
        .iter()
        .map(|r| SelectOption::new(r.as_str(), r.label(), current))
        .collect()
}

fn form_page(
    session: &Session,
    config: &AppConfig,
    form: UserForm,
    errors: Vec<String>,
) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(session, config, "/users")?;
    let roles = role_options(&form.role);
    render(UserFormTemplate { ctx, form, roles, errors })
}

/// GET /users
pub async fn list(
    pool: web::Data<PgPool>,
    config: web::Data<AppConfig>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    require_admin(&session)?;
    let ctx = PageContext::build(&session, &config, "/users")?;
    let users = user::find_all_display(&pool).await?;
    let current_user_id = get_user_id(&session).unwrap_or(0);
    render(UserListTemplate { ctx, users, current_user_id })
}

/// GET /users/new
pub async fn new_form(
    config: web::Data<AppConfig>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    require_admin(&session)?;
    let form = UserForm {
        role: Role::Submitter.as_str().to_string(),
        ..Default::default()
    };
    form_page(&session, &config, form, vec![])
}

/// POST /users
pub async fn create(
    pool: web::Data<PgPool>,
    config: web::Data<AppConfig>,
    session: Session,
    form: web::Form<UserForm>,
) -> Result<HttpResponse, AppError> {
    require_admin(&session)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let form = form.into_inner();

    let mut errors: Vec<String> = vec![];
    errors.extend(validate::validate_username(&form.username));
    errors.extend(validate::validate_password(&form.password));
    errors.extend(validate::validate_optional(&form.display_name, "Display name", 100));
    errors.extend(validate::validate_optional(&form.department, "Department", 100));
    errors.extend(validate::validate_optional(&form.plant, "Plant", 100));
    let role = form.role.parse::<Role>();
    if let Err(e) = &role {
        errors.push(e.clone());
    }

    let role = match role {
        Ok(role) if errors.is_empty() => role,
        _ => return form_page(&session, &config, form, errors),
    };

    let hashed = password::hash_password(&form.password)?;
    let new = NewUser {
        username: form.username.trim().to_string(),
        password: hashed,
        display_name: form.display_name.trim().to_string(),
        department: form.department.trim().to_string(),
        plant: form.plant.trim().to_string(),
        role,
    };

    match user::create(&pool, &new).await? {
        Some(id) => {
            log::info!("User '{}' (#{id}) created as {role}", new.username);
            set_flash(&session, format!("User '{}' created", new.username));
            Ok(HttpResponse::SeeOther()
                .insert_header(("Location", "/users"))
                .finish())
        }
        None => {
            let errors = vec![format!("Username '{}' is already taken", new.username)];
            form_page(&session, &config, form, errors)
        }
    }
}

/// POST /users/{id}/delete
pub async fn delete(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    require_admin(&session)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let id = path.into_inner();
    if get_user_id(&session) == Some(id) {
        set_flash(&session, "You cannot delete your own account");
    } else {
        user::delete(&pool, id).await?;
        log::info!("User #{id} deleted");
        set_flash(&session, "User deleted");
    }
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/users"))
        .finish())
}
