use crate::utils::error::CustomError;

/// Fallback for routes that do not exist.
pub async fn not_found() -> Result<actix_web::HttpResponse, CustomError> {
    Err(CustomError::NotFoundError("Route does not exist".to_string()))
}
