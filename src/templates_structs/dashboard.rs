use askama::Template;

use super::PageContext;
use crate::models::dashboard::DashboardSummary;

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub ctx: PageContext,
    pub greeting: String,
    pub summary: DashboardSummary,
}
