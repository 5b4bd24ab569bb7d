use actix_session::Session;
use actix_web::{web, HttpResponse};
use chrono::{Local, Timelike};
use sqlx::PgPool;

use crate::auth::session::{get_department, get_role};
use crate::config::AppConfig;
use crate::errors::{render, AppError};
use crate::models::dashboard;
use crate::templates_structs::{DashboardTemplate, PageContext};

fn time_greeting(hour: u32, name: &str) -> String {
    let period = match hour {
        5..=11 => "Good morning",
        12..=16 => "Good afternoon",
        _ => "Good evening",
    };
    format!("{period}, {name}")
}

pub async fn index(
    pool: web::Data<PgPool>,
    config: web::Data<AppConfig>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(&session, &config, "/dashboard")?;
    let role = get_role(&session)?;
    let now = Local::now();

    let summary = dashboard::load(&pool, role, &get_department(&session), now.date_naive()).await?;

    let tmpl = DashboardTemplate {
        greeting: time_greeting(now.hour(), &ctx.display_name),
        ctx,
        summary,
    };
    render(tmpl)
}

#[cfg(test)]
mod tests {
    use super::time_greeting;

    #[test]
    fn greeting_follows_the_clock() {
        assert_eq!(time_greeting(8, "Mia"), "Good morning, Mia");
        assert_eq!(time_greeting(13, "Mia"), "Good afternoon, Mia");
        assert_eq!(time_greeting(23, "Mia"), "Good evening, Mia");
        assert_eq!(time_greeting(3, "Mia"), "Good evening, Mia");
    }
}
