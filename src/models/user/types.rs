use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::kaizen::ReviewRole;

/// Authorization role, stored on the user row and copied into the session at login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Submitter,
    Engineer,
    Manager,
    Admin,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Submitter, Role::Engineer, Role::Manager, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Submitter => "submitter",
            Role::Engineer => "engineer",
            Role::Manager => "manager",
            Role::Admin => "admin",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Submitter => "Submitter",
            Role::Engineer => "Engineer",
            Role::Manager => "Manager",
            Role::Admin => "Administrator",
        }
    }

    /// The review track this role works on, if any.
    pub fn review_role(&self) -> Option<ReviewRole> {
        match self {
            Role::Engineer => Some(ReviewRole::Engineer),
            Role::Manager => Some(ReviewRole::Manager),
            Role::Submitter | Role::Admin => None,
        }
    }

    pub fn can_review(&self, track: ReviewRole) -> bool {
        self.review_role() == Some(track)
    }

    pub fn is_admin(&self) -> bool {
        *self == Role::Admin
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown role '{s}'"))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Internal user struct for authentication, including the password hash.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub display_name: String,
    pub department: String,
    pub plant: String,
    pub role: String,
}

impl User {
    /// Unknown stored roles get the least privileged role.
    pub fn role(&self) -> Role {
        self.role.parse().unwrap_or_else(|e| {
            log::warn!("User '{}': {e}, treating as submitter", self.username);
            Role::Submitter
        })
    }
}

/// Safe version for templates, without the password hash.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserDisplay {
    pub id: i64,
    pub username: String,
    pub display_name: String,
    pub department: String,
    pub plant: String,
    pub role: String,
    pub created_at: chrono::NaiveDateTime,
}

impl UserDisplay {
    pub fn role_label(&self) -> &'static str {
        self.role.parse::<Role>().map(|r| r.label()).unwrap_or("Unknown")
    }
}

/// New user data for creation; `password` is already hashed.
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub display_name: String,
    pub department: String,
    pub plant: String,
    pub role: Role,
}

/// Form data from the create-user form.
#[derive(Debug, Default, Deserialize)]
pub struct UserForm {
    pub username: String,
    pub password: String,
    pub display_name: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub plant: String,
    pub role: String,
    pub csrf_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_reviewers_have_a_review_track() {
        assert!(Role::Engineer.can_review(ReviewRole::Engineer));
        assert!(!Role::Engineer.can_review(ReviewRole::Manager));
        assert!(Role::Manager.can_review(ReviewRole::Manager));
        assert_eq!(Role::Admin.review_role(), None);
        assert_eq!(Role::Submitter.review_role(), None);
    }

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn unknown_stored_role_falls_back_to_submitter() {
        let u = User {
            id: 1,
            username: "eng_admin".into(),
            password_hash: String::new(),
            display_name: String::new(),
            department: String::new(),
            plant: String::new(),
            role: "root".into(),
        };
        // The username no longer grants anything by itself.
        assert_eq!(u.role(), Role::Submitter);
    }
}
