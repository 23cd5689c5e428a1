use actix_web::{HttpResponse, web};

use crate::category::model::CreateCategoryRequest;
use crate::category::service::CategoryService;
use crate::middleware::auth::AuthUser;
use crate::utils::error::CustomError;
use crate::utils::response::{created, ok};

/// POST /categories (admin)
pub async fn create_category(
    user: AuthUser,
    category_service: web::Data<CategoryService>,
    body: web::Json<CreateCategoryRequest>,
) -> Result<HttpResponse, CustomError> {
    let category = category_service.create(&user, body.into_inner()).await?;
    Ok(created("New category created successfully", category))
}

/// GET /categories
pub async fn get_categories(
    category_service: web::Data<CategoryService>,
) -> Result<HttpResponse, CustomError> {
    let categories = category_service.list().await?;
    Ok(ok("Categories fetched successfully", categories))
}
