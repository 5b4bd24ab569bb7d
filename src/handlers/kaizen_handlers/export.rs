use actix_session::Session;
use actix_web::{web, HttpResponse};
use chrono::Local;
use sqlx::PgPool;

use crate::auth::session::require_admin;
use crate::errors::AppError;
use crate::models::kaizen::{self, Kaizen, KaizenFilter, KaizenFilterParams};

const HEADER: &str = "kaizen_no,submitted_at,employee_name,employee_no,department,plant,category,title,\
cost_saving,engineer_status,engineer_approved_by,manager_status,manager_approved_by,status,award_price,award_date\n";

fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

pub(crate) fn to_csv(items: &[Kaizen]) -> String {
    let mut csv = String::from(HEADER);
    for k in items {
        let fields = [
            escape_csv(&k.kaizen_no),
            k.submitted_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            escape_csv(&k.employee_name),
            escape_csv(&k.employee_no),
            escape_csv(&k.department),
            escape_csv(&k.plant),
            escape_csv(&k.category),
            escape_csv(&k.title),
            k.cost_saving.map(|c| c.to_string()).unwrap_or_default(),
            k.approval.engineer.status.to_string(),
            escape_csv(k.approval.engineer.decided_by.as_deref().unwrap_or("")),
            k.approval.manager.status.to_string(),
            escape_csv(k.approval.manager.decided_by.as_deref().unwrap_or("")),
            k.aggregate().to_string(),
            k.award.tier.map(|t| t.label()).unwrap_or("").to_string(),
            k.award.award_date.map(|d| d.to_string()).unwrap_or_default(),
        ];
        csv.push_str(&fields.join(","));
        csv.push('\n');
    }
    csv
}

/// GET /kaizens/export
pub async fn export_csv(
    pool: web::Data<PgPool>,
    session: Session,
    query: web::Query<KaizenFilterParams>,
) -> Result<HttpResponse, AppError> {
    require_admin(&session)?;

    let filter = KaizenFilter::from_params(&query);
    let items = kaizen::find_all_filtered(&pool, &filter).await?;
    log::info!("Exporting {} suggestions to CSV", items.len());

    let today = Local::now().format("%Y-%m-%d");
    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"kaizens-{today}.csv\""),
        ))
        .body(to_csv(&items)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_with_separators_are_quoted() {
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn empty_export_is_just_the_header() {
        let csv = to_csv(&[]);
        assert_eq!(csv.lines().count(), 1);
        assert!(csv.starts_with("kaizen_no,submitted_at,"));
    }
}
