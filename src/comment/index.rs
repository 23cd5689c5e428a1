use super::controller::{create_comment, delete_comment, get_blog_comments, update_comment};
use actix_web::web;

pub fn comment_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/comments")
            .route("", web::post().to(create_comment))
            .route("/blog/{blog_id}", web::get().to(get_blog_comments))
            .route("/{id}", web::put().to(update_comment))
            .route("/{id}", web::delete().to(delete_comment)),
    );
}
