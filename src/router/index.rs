use actix_web::http::StatusCode;
use actix_web::{HttpResponse, get, web};
use serde_json::json;

use crate::author::index::author_routes;
use crate::blog::index::blog_routes;
use crate::category::index::category_routes;
use crate::comment::index::comment_routes;
use crate::like::index::like_routes;
use crate::utils::response::envelope;

#[get("/")]
async fn welcome() -> HttpResponse {
    envelope(StatusCode::OK, "Welcome to the Quill blog API", json!({}))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(welcome);
    cfg.configure(author_routes);
    cfg.configure(blog_routes);
    cfg.configure(comment_routes);
    cfg.configure(like_routes);
    cfg.configure(category_routes);
}
