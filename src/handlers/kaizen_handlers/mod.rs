mod export;
mod list;
mod review;
mod submit;

pub use export::export_csv;
pub use list::{detail, list};
pub use review::{award, review};
pub use submit::{create, delete, new_form};

use actix_web::HttpResponse;

fn redirect(location: String) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header(("Location", location))
        .finish()
}
