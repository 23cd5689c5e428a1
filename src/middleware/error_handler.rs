use actix_web::{HttpRequest, error, web};
use log::debug;

use crate::utils::error::CustomError;

/// JSON body errors are reported in the standard error envelope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(handle_json_error)
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        CustomError::BadRequestError(err.to_string()).into()
    })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        CustomError::BadRequestError(err.to_string()).into()
    })
}

fn handle_json_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    debug!("rejected JSON body on {}: {}", req.path(), err);
    CustomError::ValidationError(err.to_string()).into()
}
