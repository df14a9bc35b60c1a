//! Gateway error responses (JSON bodies).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("method {method} not allowed on {path}")]
    MethodNotAllowed { method: String, path: String },

    #[error("unsupported webhook object: {0}")]
    UnsupportedObject(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Forbidden(reason) => (
                StatusCode::FORBIDDEN,
                json!({ "error": "forbidden", "reason": reason }),
            ),
            Self::BadRequest(reason) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "bad request", "reason": reason }),
            ),
            Self::NotFound(path) => (
                StatusCode::NOT_FOUND,
                json!({ "error": "not found", "path": path }),
            ),
            Self::MethodNotAllowed { method, path } => (
                StatusCode::METHOD_NOT_ALLOWED,
                json!({ "error": "method not allowed", "method": method, "path": path }),
            ),
            Self::UnsupportedObject(object) => (
                StatusCode::NOT_FOUND,
                json!({ "error": "unsupported object", "object": object }),
            ),
            Self::Internal(detail) => {
                log::error!("internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "internal server error" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

/// Turns a handler panic into a 500 JSON response.
pub fn panic_response(err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    ApiError::Internal(format!("handler panicked: {}", detail)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(
            ApiError::Forbidden("x".into()).into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::BadRequest("x".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("/x".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::MethodNotAllowed {
                method: "PUT".into(),
                path: "/webhook".into()
            }
            .into_response()
            .status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            ApiError::Internal("x".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn panic_payloads_become_500() {
        let res = panic_response(Box::new("boom"));
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let res = panic_response(Box::new(String::from("boom")));
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
