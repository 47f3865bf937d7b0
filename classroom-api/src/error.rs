use serde::{Deserialize, Serialize};
use tower_api_client::{Error as ApiError, StatusCode};

#[derive(Debug)]
pub enum ClassroomApiError {
    Google(StatusCode, ErrorDetail),
    Internal(ApiError),
}

impl ClassroomApiError {
    /// HTTP status reported by Google, if the request reached it.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClassroomApiError::Google(status, _) => Some(*status),
            ClassroomApiError::Internal(_) => None,
        }
    }
}

impl From<ApiError> for ClassroomApiError {
    fn from(value: ApiError) -> Self {
        match value {
            ApiError::ClientError(status, body) | ApiError::ServerError(status, body) => {
                let detail = serde_json::from_str::<ErrorResponse>(&body)
                    .map(|response| response.error)
                    .unwrap_or_else(|_| ErrorDetail {
                        code: status.as_u16(),
                        message: body,
                        status: None,
                    });
                ClassroomApiError::Google(status, detail)
            }
            e => ClassroomApiError::Internal(e),
        }
    }
}

impl std::fmt::Display for ClassroomApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassroomApiError::Internal(e) => write!(f, "Internal error: {}", e),
            ClassroomApiError::Google(status, detail) => match &detail.status {
                Some(code) => write!(f, "({}) {}: {}", status, code, detail.message),
                None => write!(f, "({}) {}", status, detail.message),
            },
        }
    }
}

impl std::error::Error for ClassroomApiError {}

/// Google's standard error envelope: `{"error": {"code", "message", "status"}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: u16,
    pub message: String,
    pub status: Option<String>,
}
