use super::controller::{get_blog_likes, get_like_status, toggle_like};
use actix_web::web;

pub fn like_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/likes")
            .route("", web::post().to(toggle_like))
            .route("/blog/{blog_id}", web::get().to(get_blog_likes))
            .route("/status/{blog_id}", web::get().to(get_like_status)),
    );
}
