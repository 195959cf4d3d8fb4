use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Seconds clients are asked to wait while the catalog is unavailable.
pub const CATALOG_RETRY_AFTER_SEC: u64 = 5;

#[derive(Serialize, Debug)]
struct ApiErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

/// JSON error response, `{ "error": ..., "message": ... }`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: String,
    message: Option<String>,
    retry_after_sec: Option<u64>,
}

impl ApiError {
    pub fn new<E: Into<String>>(status: StatusCode, error: E) -> ApiError {
        ApiError {
            status,
            error: error.into(),
            message: None,
            retry_after_sec: None,
        }
    }

    pub fn with_message<M: Into<String>>(mut self, message: M) -> ApiError {
        self.message = Some(message.into());
        self
    }

    pub fn invalid_input<M: Into<String>>(message: M) -> ApiError {
        ApiError::new(StatusCode::BAD_REQUEST, "Invalid input").with_message(message)
    }

    pub fn no_recipes_found(mood: &str) -> ApiError {
        ApiError::new(StatusCode::NOT_FOUND, "No recipes found").with_message(format!(
            "No recipes found for mood: {}. Try a different mood like 'happy', 'cozy', or 'energetic'.",
            mood
        ))
    }

    pub fn catalog_unavailable<M: Into<String>>(message: M) -> ApiError {
        ApiError {
            retry_after_sec: Some(CATALOG_RETRY_AFTER_SEC),
            ..ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "Catalog unavailable")
                .with_message(message)
        }
    }

    pub fn route_not_found() -> ApiError {
        ApiError::new(StatusCode::NOT_FOUND, "Route not found")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.error,
            message: self.message,
        };
        let mut response = (self.status, Json(body)).into_response();
        if let Some(seconds) = self.retry_after_sec {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(seconds));
        }
        response
    }
}
