use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use serde_json::json;

use crate::author::model::{CreateAuthorRequest, LoginRequest};
use crate::author::service::AuthorService;
use crate::utils::error::CustomError;
use crate::utils::helpers::parse_object_id;
use crate::utils::response::{envelope, ok};

/// Register a new author
/// POST /authors
pub async fn register_author(
    author_service: web::Data<AuthorService>,
    body: web::Json<CreateAuthorRequest>,
) -> Result<HttpResponse, CustomError> {
    let res = author_service.register(body.into_inner()).await?;

    Ok(envelope(
        StatusCode::CREATED,
        "Author created successfully",
        json!({ "token": res.token, "data": res.author }),
    ))
}

/// POST /authors/login
pub async fn login_author(
    author_service: web::Data<AuthorService>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, CustomError> {
    let res = author_service.login(body.into_inner()).await?;

    Ok(envelope(
        StatusCode::OK,
        "Login successful",
        json!({ "token": res.token, "data": res.author }),
    ))
}

/// GET /authors
pub async fn get_authors(
    author_service: web::Data<AuthorService>,
) -> Result<HttpResponse, CustomError> {
    let authors = author_service.list().await?;
    Ok(ok("Authors fetched successfully", authors))
}

/// GET /authors/{id}
pub async fn get_author(
    author_service: web::Data<AuthorService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let id = parse_object_id(&path.into_inner(), "author")?;
    let author = author_service.get(&id).await?;
    Ok(ok("Author fetched successfully", author))
}
