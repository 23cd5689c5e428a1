use super::controller::{
    create_blog, delete_blog, get_blog, get_blogs, search_blogs, update_blog,
};
use actix_web::web;

pub fn blog_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/blogs")
            .route("", web::post().to(create_blog))
            .route("", web::get().to(get_blogs))
            .route("/search", web::get().to(search_blogs))
            .route("/{id}", web::get().to(get_blog))
            .route("/{id}", web::put().to(update_blog))
            .route("/{id}", web::delete().to(delete_blog)),
    );
}
