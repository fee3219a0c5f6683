//! Wire error type
//!
//! Every stage of the request pipeline that fails turns into a [`WebError`],
//! answered as a plain-text body followed by a newline.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use fnrt_core::{FormatError, ResponseError, TriggerError};
use thiserror::Error;

/// Web-specific error type for the runtime's HTTP surface
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WebError {
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Payload too large: {message}")]
    PayloadTooLarge { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

/// Result type for web operations
pub type WebResult<T> = Result<T, WebError>;

impl WebError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            WebError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            WebError::Forbidden { .. } => StatusCode::FORBIDDEN,
            WebError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            WebError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text written as the response body
    pub fn message(&self) -> &str {
        match self {
            WebError::BadRequest { message }
            | WebError::Unauthorized { message }
            | WebError::Forbidden { message }
            | WebError::PayloadTooLarge { message }
            | WebError::Internal { message } => message,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        WebError::BadRequest {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        WebError::Unauthorized {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        WebError::Forbidden {
            message: message.into(),
        }
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        WebError::PayloadTooLarge {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        WebError::Internal {
            message: message.into(),
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let mut response = (self.status_code(), format!("{}\n", self.message())).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        response
    }
}

impl From<TriggerError> for WebError {
    fn from(error: TriggerError) -> Self {
        WebError::bad_request(error.to_string())
    }
}

impl From<FormatError> for WebError {
    fn from(error: FormatError) -> Self {
        match error {
            FormatError::PayloadTooLarge(_) => WebError::payload_too_large(error.to_string()),
            FormatError::BodyRead(_) => WebError::internal(error.to_string()),
        }
    }
}

impl From<ResponseError> for WebError {
    fn from(error: ResponseError) -> Self {
        WebError::internal(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(WebError::bad_request("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(WebError::unauthorized("x").status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(WebError::forbidden("x").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(WebError::payload_too_large("x").status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(WebError::internal("x").status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_plain_text_body_with_newline() {
        let response = WebError::forbidden("Forbidden").into_response();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
        assert_eq!(body_text(response).await, "Forbidden\n");
    }

    #[test]
    fn test_core_error_conversions() {
        let error: WebError = TriggerError::Unsupported("kafka".to_string()).into();
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
        assert!(error.message().contains("kafka"));

        let error: WebError = FormatError::PayloadTooLarge(16).into();
        assert_eq!(error.status_code(), StatusCode::PAYLOAD_TOO_LARGE);

        let error: WebError = FormatError::BodyRead("reset".to_string()).into();
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let error: WebError = ResponseError::Base64BodyNotString.into();
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
