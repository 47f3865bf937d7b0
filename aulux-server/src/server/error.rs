use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use classroom_api::ClassroomApiError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Non-2xx answer from Google or a notification provider.
    #[error("Upstream error ({status}): {message}")]
    Upstream {
        status: StatusCode,
        message: String,
        details: Option<String>,
    },

    #[error("OAuth error: {0}")]
    OAuthError(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error_message, details) = match self {
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ServerError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            ServerError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, None),
            ServerError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            ServerError::Upstream {
                status,
                message,
                details,
            } => (status, message, details),
            ServerError::OAuthError(msg) => (StatusCode::BAD_GATEWAY, msg, None),
            ServerError::Configuration(msg) => {
                tracing::error!(error = %msg, "Configuration error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg, None)
            }
            ServerError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg, None)
            }
        };

        let body = match details {
            Some(details) => json!({ "error": error_message, "details": details }),
            None => json!({ "error": error_message }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<ClassroomApiError> for ServerError {
    fn from(err: ClassroomApiError) -> Self {
        match err {
            ClassroomApiError::Google(status, detail) => {
                let status =
                    StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
                ServerError::Upstream {
                    status,
                    message: format!("Google API error: {}", status.as_u16()),
                    details: Some(detail.message),
                }
            }
            ClassroomApiError::Internal(e) => ServerError::Upstream {
                status: StatusCode::BAD_GATEWAY,
                message: "Google API unreachable".to_string(),
                details: Some(e.to_string()),
            },
        }
    }
}

impl
    From<
        oauth2::RequestTokenError<
            reqwest::Error,
            oauth2::StandardErrorResponse<oauth2::basic::BasicErrorResponseType>,
        >,
    > for ServerError
{
    fn from(
        err: oauth2::RequestTokenError<
            reqwest::Error,
            oauth2::StandardErrorResponse<oauth2::basic::BasicErrorResponseType>,
        >,
    ) -> Self {
        ServerError::OAuthError(format!("Token request failed: {}", err))
    }
}

impl From<config::ConfigError> for ServerError {
    fn from(err: config::ConfigError) -> Self {
        ServerError::Configuration(format!("Configuration error: {}", err))
    }
}
