use askama::Template;

use super::{PageContext, SelectOption};
use crate::models::user::{UserDisplay, UserForm};

#[derive(Template)]
#[template(path = "users/list.html")]
pub struct UserListTemplate {
    pub ctx: PageContext,
    pub users: Vec<UserDisplay>,
    pub current_user_id: i64,
}

#[derive(Template)]
#[template(path = "users/form.html")]
pub struct UserFormTemplate {
    pub ctx: PageContext,
    pub form: UserForm,
    pub roles: Vec<SelectOption>,
    pub errors: Vec<String>,
}
