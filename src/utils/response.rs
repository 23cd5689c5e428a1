use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::Serialize;
use serde_json::{Value, json};

use crate::utils::helpers::service_name;

/// Build the `{success, message, httpStatusCode, service}` envelope and merge
/// `extra` (usually `{"data": ...}`) into it.
pub fn envelope(status: StatusCode, message: &str, extra: Value) -> HttpResponse {
    let mut body = json!({
        "success": true,
        "message": message,
        "httpStatusCode": status.as_u16(),
        "service": service_name(),
    });

    if let (Some(body), Value::Object(extra)) = (body.as_object_mut(), extra) {
        body.extend(extra);
    }

    HttpResponse::build(status).json(body)
}

pub fn ok<T: Serialize>(message: &str, data: T) -> HttpResponse {
    envelope(StatusCode::OK, message, json!({ "data": data }))
}

pub fn created<T: Serialize>(message: &str, data: T) -> HttpResponse {
    envelope(StatusCode::CREATED, message, json!({ "data": data }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn envelope_merges_extra_fields() {
        let res = envelope(StatusCode::OK, "done", json!({ "count": 2, "data": [1, 2] }));
        assert_eq!(res.status(), StatusCode::OK);

        let bytes = to_bytes(res.into_body()).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "done");
        assert_eq!(body["httpStatusCode"], 200);
        assert_eq!(body["count"], 2);
        assert_eq!(body["data"], json!([1, 2]));
    }
}
