pub mod api_v1;
pub mod auth_handlers;
pub mod dashboard;
pub mod kaizen_handlers;
pub mod target_handlers;
pub mod user_handlers;
