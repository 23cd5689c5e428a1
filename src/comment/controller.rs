use actix_web::{HttpResponse, web};

use crate::comment::model::{CreateCommentRequest, UpdateCommentRequest};
use crate::comment::service::CommentService;
use crate::middleware::auth::AuthUser;
use crate::utils::error::CustomError;
use crate::utils::helpers::parse_object_id;
use crate::utils::response::{created, ok};

/// Add a comment to a blog
/// POST /comments
pub async fn create_comment(
    user: AuthUser,
    comment_service: web::Data<CommentService>,
    body: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse, CustomError> {
    let res = comment_service.add(&user, body.into_inner()).await?;
    Ok(created("Comment added successfully", res))
}

/// GET /comments/blog/{blog_id}
pub async fn get_blog_comments(
    comment_service: web::Data<CommentService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let blog = parse_object_id(&path.into_inner(), "blog")?;
    let comments = comment_service.list_for_blog(&blog).await?;
    Ok(ok("Comments fetched successfully", comments))
}

/// PUT /comments/{id}
pub async fn update_comment(
    user: AuthUser,
    comment_service: web::Data<CommentService>,
    path: web::Path<String>,
    body: web::Json<UpdateCommentRequest>,
) -> Result<HttpResponse, CustomError> {
    let id = parse_object_id(&path.into_inner(), "comment")?;
    let comment = comment_service.update(&user, &id, body.into_inner()).await?;
    Ok(ok("Comment updated successfully", comment))
}

/// DELETE /comments/{id}
pub async fn delete_comment(
    user: AuthUser,
    comment_service: web::Data<CommentService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let id = parse_object_id(&path.into_inner(), "comment")?;
    let res = comment_service.delete(&user, &id).await?;
    Ok(ok("Comment deleted successfully", res))
}
