use mongodb::bson::oid::ObjectId;

use crate::utils::error::CustomError;

/// Service name reported in every response envelope.
pub fn service_name() -> String {
    std::env::var("SERVICE_NAME").unwrap_or_else(|_| "quill-blog".to_string())
}

/// Parse a hex object id coming from a path or body, naming the field in the error.
pub fn parse_object_id(raw: &str, what: &str) -> Result<ObjectId, CustomError> {
    ObjectId::parse_str(raw.trim())
        .map_err(|_| CustomError::BadRequestError(format!("Provide a valid {} id", what)))
}

/// Trim a required text field, rejecting blanks.
pub fn required_text(value: Option<&str>, field: &str) -> Result<String, CustomError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(CustomError::ValidationError(format!("{} is required", field))),
    }
}

/// Trim an optional text field; blank values count as absent.
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_object_id_rejects_garbage() {
        let err = parse_object_id("not-an-id", "blog").unwrap_err();
        assert_eq!(err.to_string(), "Bad Request: Provide a valid blog id");

        let id = ObjectId::new();
        assert_eq!(parse_object_id(&id.to_hex(), "blog").unwrap(), id);
    }

    #[test]
    fn required_text_trims_and_rejects_blank() {
        assert_eq!(required_text(Some("  hi "), "title").unwrap(), "hi");
        assert!(required_text(Some("   "), "title").is_err());
        assert!(required_text(None, "title").is_err());
    }

    #[test]
    fn optional_text_drops_blank() {
        assert_eq!(optional_text(Some("  ")), None);
        assert_eq!(optional_text(Some(" a ")), Some("a".to_string()));
    }
}
