use actix_session::SessionExt;
use actix_web::{
    Error, HttpResponse,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
};

use crate::auth::session::{get_role, get_user_id};

/// Checks for an authenticated session with a recognised role.
/// Anything else is purged and redirected to /login.
pub async fn require_auth(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let session = req.get_session();
    let valid = get_user_id(&session).is_some() && get_role(&session).is_ok();

    if !valid {
        if !session.entries().is_empty() {
            log::warn!("Discarding invalid session for {}", req.path());
            session.purge();
        }
        let response = HttpResponse::SeeOther()
            .insert_header(("Location", "/login"))
            .finish();
        return Ok(req.into_response(response).map_into_right_body());
    }

    next.call(req).await.map(|res| res.map_into_left_body())
}
