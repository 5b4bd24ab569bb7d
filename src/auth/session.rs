use actix_session::Session;

use crate::errors::AppError;
use crate::models::kaizen::ReviewRole;
use crate::models::user::{Role, User};

pub const USER_ID: &str = "user_id";
pub const USERNAME: &str = "username";
pub const DISPLAY_NAME: &str = "display_name";
pub const DEPARTMENT: &str = "department";
pub const ROLE: &str = "role";
const FLASH: &str = "flash";

/// Start an authenticated session for `user`, replacing any previous one.
pub fn start(session: &Session, user: &User) -> Result<(), AppError> {
    session.renew();
    let display_name = if user.display_name.is_empty() {
        &user.username
    } else {
        &user.display_name
    };
    session
        .insert(USER_ID, user.id)
        .and_then(|_| session.insert(USERNAME, &user.username))
        .and_then(|_| session.insert(DISPLAY_NAME, display_name))
        .and_then(|_| session.insert(DEPARTMENT, &user.department))
        .and_then(|_| session.insert(ROLE, user.role().as_str()))
        .map_err(|e| AppError::Session(format!("Failed to store login: {e}")))
}

pub fn get_user_id(session: &Session) -> Option<i64> {
    session.get::<i64>(USER_ID).unwrap_or(None)
}

pub fn get_username(session: &Session) -> Result<String, AppError> {
    match session.get::<String>(USERNAME) {
        Ok(Some(username)) => Ok(username),
        Ok(None) => Err(AppError::Session("No username in session".to_string())),
        Err(e) => Err(AppError::Session(e.to_string())),
    }
}

/// Display name, falling back to the username.
pub fn get_display_name(session: &Session) -> Result<String, AppError> {
    match session.get::<String>(DISPLAY_NAME) {
        Ok(Some(name)) if !name.is_empty() => Ok(name),
        _ => get_username(session),
    }
}

pub fn get_department(session: &Session) -> String {
    session.get::<String>(DEPARTMENT).unwrap_or(None).unwrap_or_default()
}

/// The role resolved at login. A missing or unparseable role is a broken session.
pub fn get_role(session: &Session) -> Result<Role, AppError> {
    let raw = session
        .get::<String>(ROLE)
        .map_err(|e| AppError::Session(e.to_string()))?
        .ok_or_else(|| AppError::Session("No role in session".to_string()))?;
    raw.parse().map_err(AppError::Session)
}

pub fn set_flash(session: &Session, message: impl Into<String>) {
    let _ = session.insert(FLASH, message.into());
}

pub fn take_flash(session: &Session) -> Option<String> {
    let flash = session.get::<String>(FLASH).unwrap_or(None);
    if flash.is_some() {
        session.remove(FLASH);
    }
    flash
}

pub fn require_admin(session: &Session) -> Result<(), AppError> {
    if get_role(session)?.is_admin() {
        Ok(())
    } else {
        Err(AppError::PermissionDenied("administrator access".to_string()))
    }
}

/// Only the engineer may write the engineer track, and only the manager the manager track.
pub fn require_reviewer(session: &Session, track: ReviewRole) -> Result<(), AppError> {
    if get_role(session)?.can_review(track) {
        Ok(())
    } else {
        Err(AppError::PermissionDenied(format!("{} review", track.label())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_session::SessionExt;
    use actix_web::test::TestRequest;

    fn session_with_role(role: Option<&str>) -> Session {
        let session = TestRequest::default().to_http_request().get_session();
        if let Some(role) = role {
            session.insert(ROLE, role).expect("insert role");
        }
        session
    }

    #[actix_rt::test]
    async fn flash_is_read_once() {
        let session = session_with_role(None);
        set_flash(&session, "Saved");
        assert_eq!(take_flash(&session).as_deref(), Some("Saved"));
        assert_eq!(take_flash(&session), None);
    }

    #[actix_rt::test]
    async fn reviewers_only_write_their_own_track() {
        let engineer = session_with_role(Some("engineer"));
        assert!(require_reviewer(&engineer, ReviewRole::Engineer).is_ok());
        assert!(matches!(
            require_reviewer(&engineer, ReviewRole::Manager),
            Err(AppError::PermissionDenied(_))
        ));
        assert!(require_admin(&engineer).is_err());
    }

    #[actix_rt::test]
    async fn missing_or_unknown_role_is_a_session_error() {
        assert!(matches!(get_role(&session_with_role(None)), Err(AppError::Session(_))));
        assert!(matches!(get_role(&session_with_role(Some("auditor"))), Err(AppError::Session(_))));
    }
}
