use super::controller::{get_author, get_authors, login_author, register_author};
use actix_web::web;

pub fn author_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/authors")
            .route("", web::post().to(register_author))
            .route("", web::get().to(get_authors))
            .route("/login", web::post().to(login_author))
            .route("/{id}", web::get().to(get_author)),
    );
}
