pub mod dashboard;
pub mod department_target;
pub mod kaizen;
pub mod user;
