use askama::Template;

use super::{PageContext, SelectOption};
use crate::models::department_target::{DepartmentTarget, TargetAchievement};

#[derive(Template)]
#[template(path = "targets/list.html")]
pub struct TargetListTemplate {
    pub ctx: PageContext,
    pub year: i32,
    pub month: u32,
    pub targets: Vec<DepartmentTarget>,
    pub achievements: Vec<TargetAchievement>,
    pub months: Vec<SelectOption>,
    pub errors: Vec<String>,
}
