use actix_web::{HttpResponse, web};

use crate::like::model::ToggleLikeRequest;
use crate::like::service::LikeService;
use crate::middleware::auth::AuthUser;
use crate::utils::error::CustomError;
use crate::utils::helpers::parse_object_id;
use crate::utils::response::ok;

/// Like or unlike a blog
/// POST /likes
pub async fn toggle_like(
    user: AuthUser,
    like_service: web::Data<LikeService>,
    body: web::Json<ToggleLikeRequest>,
) -> Result<HttpResponse, CustomError> {
    let res = like_service.toggle(&user, body.into_inner()).await?;
    let message = if res.is_liked {
        "Blog liked successfully"
    } else {
        "Blog unliked successfully"
    };
    Ok(ok(message, res))
}

/// GET /likes/blog/{blog_id}
pub async fn get_blog_likes(
    like_service: web::Data<LikeService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let blog = parse_object_id(&path.into_inner(), "blog")?;
    let likes = like_service.list_for_blog(&blog).await?;
    Ok(ok("Likes fetched successfully", likes))
}

/// GET /likes/status/{blog_id}
pub async fn get_like_status(
    user: AuthUser,
    like_service: web::Data<LikeService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let blog = parse_object_id(&path.into_inner(), "blog")?;
    let status = like_service.status(&user, &blog).await?;
    Ok(ok("Like status fetched successfully", status))
}
