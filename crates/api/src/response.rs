//! Shared response envelope for API handlers.
//!
//! Every product endpoint answers with `{ "statusCode", "message", "data" }`,
//! on success and on failure alike. The HTTP status always matches
//! `statusCode`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Standard `{ statusCode, message, data }` response envelope.
///
/// ```ignore
/// Ok(ApiResponse::new(StatusCode::OK, "Get products successfully", products))
/// ```
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub status_code: u16,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status: StatusCode, message: impl Into<String>, data: T) -> Self {
        Self {
            status_code: status.as_u16(),
            message: message.into(),
            data: Some(data),
        }
    }

    /// An envelope with `data: null`.
    pub fn empty(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            message: message.into(),
            data: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_camel_case_envelope() {
        let body = ApiResponse::new(StatusCode::CREATED, "done", vec![1, 2]);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "statusCode": 201, "message": "done", "data": [1, 2] })
        );
    }

    #[test]
    fn empty_envelope_has_null_data() {
        let body = ApiResponse::<()>::empty(StatusCode::NOT_FOUND, "Product not found");
        let json = serde_json::to_value(&body).unwrap();
        assert!(json["data"].is_null());
        assert_eq!(body.status(), StatusCode::NOT_FOUND);
    }
}
