use actix_web::{HttpResponse, web};

use crate::blog::model::{CreateBlogRequest, SearchQuery, UpdateBlogRequest};
use crate::blog::service::BlogService;
use crate::cache::CacheStatus;
use crate::middleware::auth::AuthUser;
use crate::utils::error::CustomError;
use crate::utils::helpers::parse_object_id;
use crate::utils::response::{created, ok};

fn fetched(status: CacheStatus, what: &str) -> String {
    match status {
        CacheStatus::Hit => format!("{} fetched from cache", what),
        CacheStatus::Miss => format!("{} fetched successfully", what),
    }
}

/// Create a blog
/// POST /blogs
pub async fn create_blog(
    user: AuthUser,
    blog_service: web::Data<BlogService>,
    body: web::Json<CreateBlogRequest>,
) -> Result<HttpResponse, CustomError> {
    let blog = blog_service.create(&user, body.into_inner()).await?;
    Ok(created("Blog created successfully", blog))
}

/// GET /blogs
pub async fn get_blogs(blog_service: web::Data<BlogService>) -> Result<HttpResponse, CustomError> {
    let (blogs, status) = blog_service.list().await?;
    Ok(ok(&fetched(status, "Blogs"), blogs))
}

/// GET /blogs/{id}
pub async fn get_blog(
    blog_service: web::Data<BlogService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let id = parse_object_id(&path.into_inner(), "blog")?;
    let (blog, status) = blog_service.get(&id).await?;
    Ok(ok(&fetched(status, "Blog"), blog))
}

/// GET /blogs/search?q=
pub async fn search_blogs(
    blog_service: web::Data<BlogService>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, CustomError> {
    let blogs = blog_service.search(query.q.as_deref()).await?;
    Ok(ok("Search results fetched successfully", blogs))
}

/// PUT /blogs/{id}
pub async fn update_blog(
    user: AuthUser,
    blog_service: web::Data<BlogService>,
    path: web::Path<String>,
    body: web::Json<UpdateBlogRequest>,
) -> Result<HttpResponse, CustomError> {
    let id = parse_object_id(&path.into_inner(), "blog")?;
    let blog = blog_service.update(&user, &id, body.into_inner()).await?;
    Ok(ok("Blog updated successfully", blog))
}

/// DELETE /blogs/{id}
pub async fn delete_blog(
    user: AuthUser,
    blog_service: web::Data<BlogService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let id = parse_object_id(&path.into_inner(), "blog")?;
    let blog = blog_service.delete(&user, &id).await?;
    Ok(ok("Blog deleted successfully", blog))
}
