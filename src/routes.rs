use actix_web::{middleware, web, HttpResponse};

use crate::auth::middleware::require_auth;
use crate::handlers::{
    api_v1, auth_handlers, dashboard, kaizen_handlers, target_handlers, user_handlers,
};

/// Every application route. Static files and the 404 fallback are added in `main`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // Public routes
        .route("/login", web::get().to(auth_handlers::login_page))
        .route("/login", web::post().to(auth_handlers::login_submit))
        // Root redirect
        .route("/", web::get().to(|| async {
            HttpResponse::SeeOther()
                .insert_header(("Location", "/dashboard"))
                .finish()
        }))
        // JSON API
        .service(
            web::scope("/api/v1")
                .wrap(middleware::from_fn(require_auth))
                .configure(api_v1::configure),
        )
        // Protected routes
        .service(
            web::scope("")
                .wrap(middleware::from_fn(require_auth))
                .route("/dashboard", web::get().to(dashboard::index))
                .route("/logout", web::post().to(auth_handlers::logout))
                // Suggestions: /kaizens/new and /kaizens/export BEFORE /kaizens/{id}
                .route("/kaizens", web::get().to(kaizen_handlers::list))
                .route("/kaizens", web::post().to(kaizen_handlers::create))
                .route("/kaizens/new", web::get().to(kaizen_handlers::new_form))
                .route("/kaizens/export", web::get().to(kaizen_handlers::export_csv))
                .route("/kaizens/{id}", web::get().to(kaizen_handlers::detail))
                .route("/kaizens/{id}/review/{role}", web::post().to(kaizen_handlers::review))
                .route("/kaizens/{id}/award", web::post().to(kaizen_handlers::award))
                .route("/kaizens/{id}/delete", web::post().to(kaizen_handlers::delete))
                // Department targets
                .route("/targets", web::get().to(target_handlers::list))
                .route("/targets", web::post().to(target_handlers::save))
                .route("/targets/{id}/delete", web::post().to(target_handlers::delete))
                // Users: /users/new BEFORE /users/{id}
                .route("/users", web::get().to(user_handlers::list))
                .route("/users", web::post().to(user_handlers::create))
                .route("/users/new", web::get().to(user_handlers::new_form))
                .route("/users/{id}/delete", web::post().to(user_handlers::delete)),
        );
}
