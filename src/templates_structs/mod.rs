// Template context structures for Askama templates, organized by domain.

use actix_session::Session;

use crate::auth::csrf;
use crate::auth::session::{get_department, get_display_name, get_role, get_username, take_flash};
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::kaizen::ReviewRole;
use crate::models::user::Role;

/// Common context shared by all authenticated pages.
/// Templates access these as `ctx.username`, `ctx.flash`, etc.
pub struct PageContext {
    pub username: String,
    pub display_name: String,
    pub avatar_initial: String,
    pub role: Role,
    pub department: String,
    pub flash: Option<String>,
    pub app_name: String,
    pub csrf_token: String,
    pub current_path: String,
}

impl PageContext {
    pub fn build(session: &Session, config: &AppConfig, current_path: &str) -> Result<Self, AppError> {
        let username = get_username(session)?;
        let display_name = get_display_name(session)?;
        let role = get_role(session)?;
        let avatar_initial = display_name.chars().next().unwrap_or('?').to_uppercase().to_string();
        Ok(Self {
            username,
            display_name,
            avatar_initial,
            role,
            department: get_department(session),
            flash: take_flash(session),
            app_name: config.app_name.clone(),
            csrf_token: csrf::get_or_create_token(session),
            current_path: current_path.to_string(),
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn can_review_engineer(&self) -> bool {
        self.role.can_review(ReviewRole::Engineer)
    }

    pub fn can_review_manager(&self) -> bool {
        self.role.can_review(ReviewRole::Manager)
    }

    pub fn role_label(&self) -> &'static str {
        self.role.label()
    }

    /// Nav highlighting: true when the current page lives under `prefix`.
    pub fn in_section(&self, prefix: &str) -> bool {
        self.current_path.starts_with(prefix)
    }
}

/// One `<option>` in a select box.
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>, current: &str) -> Self {
        let value = value.into();
        let selected = value.eq_ignore_ascii_case(current);
        Self { value, label: label.into(), selected }
    }
}

mod api;
mod common;
mod dashboard;
mod kaizen;
mod target;
mod user;

pub use self::api::{ApiAwardRequest, ApiErrorResponse, ApiKaizen, ApiReviewRequest, PaginatedResponse};
pub use self::common::LoginTemplate;
pub use self::dashboard::DashboardTemplate;
pub use self::kaizen::{KaizenDetailTemplate, KaizenFormTemplate, KaizenListTemplate};
pub use self::target::TargetListTemplate;
pub use self::user::{UserFormTemplate, UserListTemplate};
