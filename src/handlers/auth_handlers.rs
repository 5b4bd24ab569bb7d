use std::net::{IpAddr, Ipv4Addr};

use actix_session::Session;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;

use crate::auth::session::{self, get_user_id};
use crate::auth::{csrf, password, rate_limit::RateLimiter};
use crate::config::AppConfig;
use crate::errors::{render, AppError};
use crate::models::user;
use crate::templates_structs::LoginTemplate;

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct CsrfOnly {
    pub csrf_token: String,
}

fn login_error(session: &Session, config: &AppConfig, message: &str) -> Result<HttpResponse, AppError> {
    render(LoginTemplate {
        error: Some(message.to_string()),
        app_name: config.app_name.clone(),
        csrf_token: csrf::get_or_create_token(session),
    })
}

pub async fn login_page(
    config: web::Data<AppConfig>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    if get_user_id(&session).is_some() && session::get_role(&session).is_ok() {
        return Ok(HttpResponse::SeeOther()
            .insert_header(("Location", "/dashboard"))
            .finish());
    }

    let tmpl = LoginTemplate {
        error: None,
        app_name: config.app_name.clone(),
        csrf_token: csrf::get_or_create_token(&session),
    };
    render(tmpl)
}

pub async fn login_submit(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    config: web::Data<AppConfig>,
    session: Session,
    form: web::Form<LoginForm>,
    limiter: web::Data<RateLimiter>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    // Rate-limit check BEFORE any database access
    let ip = req
        .peer_addr()
        .map(|addr| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    if limiter.is_blocked(ip) {
        log::warn!("Login blocked for {ip}: too many failed attempts");
        return login_error(&session, &config, "Too many failed login attempts. Please try again later.");
    }

    let found = user::find_by_username(&pool, &form.username).await?;
    let verified = match &found {
        Some(u) => password::verify_password(&form.password, &u.password_hash).unwrap_or_else(|e| {
            log::error!("Stored password hash for '{}' is unreadable: {e}", u.username);
            false
        }),
        None => false,
    };

    match found {
        Some(u) if verified => {
            limiter.clear(ip);
            session::start(&session, &u)?;
            log::info!("User '{}' logged in as {}", u.username, u.role());
            Ok(HttpResponse::SeeOther()
                .insert_header(("Location", "/dashboard"))
                .finish())
        }
        _ => {
            limiter.record_failure(ip);
            log::info!("Failed login for '{}'", form.username.trim());
            login_error(&session, &config, "Invalid username or password")
        }
    }
}

pub async fn logout(
    session: Session,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    session.purge();
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/login"))
        .finish())
}
