use askama::Template;

use super::{PageContext, SelectOption};
use crate::models::kaizen::{AwardTier, Kaizen, KaizenForm, KaizenPage};

#[derive(Template)]
#[template(path = "kaizens/list.html")]
pub struct KaizenListTemplate {
    pub ctx: PageContext,
    pub kaizen_page: KaizenPage,
    /// Active filters as a query string, without paging.
    pub query_string: String,
    pub q: String,
    pub kaizen_no: String,
    pub category: String,
    pub start_date: String,
    pub end_date: String,
    pub departments: Vec<SelectOption>,
    pub engineer_statuses: Vec<SelectOption>,
    pub manager_statuses: Vec<SelectOption>,
    pub statuses: Vec<SelectOption>,
    pub cost_bands: Vec<SelectOption>,
}

impl KaizenListTemplate {
    pub fn has_prev(&self) -> bool {
        self.kaizen_page.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.kaizen_page.page < self.kaizen_page.total_pages
    }

    pub fn prev_page(&self) -> i64 {
        self.kaizen_page.page - 1
    }

    pub fn next_page(&self) -> i64 {
        self.kaizen_page.page + 1
    }
}

#[derive(Template)]
#[template(path = "kaizens/form.html")]
pub struct KaizenFormTemplate {
    pub ctx: PageContext,
    pub form: KaizenForm,
    pub errors: Vec<String>,
}

impl KaizenFormTemplate {
    pub fn has_benefit_checked(&self) -> bool {
        self.form.has_benefit.is_some()
    }
}

#[derive(Template)]
#[template(path = "kaizens/detail.html")]
pub struct KaizenDetailTemplate {
    pub ctx: PageContext,
    pub kaizen: Kaizen,
    pub award_tiers: Vec<SelectOption>,
    pub award_allowed: bool,
}

impl KaizenDetailTemplate {
    pub fn tier_options(current: Option<AwardTier>) -> Vec<SelectOption> {
        let current = current.map(|t| t.label()).unwrap_or("");
        std::iter::once(SelectOption::new("", "No award", current))
            .chain(AwardTier::ALL.iter().map(|t| SelectOption::new(t.label(), t.label(), current)))
            .collect()
    }

    pub fn award_date_value(&self) -> String {
        self.kaizen
            .award
            .award_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}
