use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use error_common::{Categorized, ErrorCategory};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

use crate::config::StatusPolicy;

/// Body of every error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    #[serde(rename = "Error")]
    pub error: String,
}

/// The single place where failures become HTTP responses.
///
/// `message` is what the client sees; `detail` is logged and never sent.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Authentication error: {message} ({detail})")]
    Authentication { message: String, detail: String },

    #[error("Authorization error: {message}")]
    Authorization { message: String, status: StatusCode },

    #[error("Resource conflict: {message} ({detail})")]
    Conflict {
        message: String,
        detail: String,
        status: StatusCode,
    },

    #[error("Internal server error: {detail}")]
    Internal { message: String, detail: String },
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// 401 with the generic client message; `detail` goes to the log only
    pub fn authentication(detail: impl Into<String>) -> Self {
        Self::Authentication {
            message: ErrorCategory::Authentication
                .default_client_message()
                .to_string(),
            detail: detail.into(),
        }
    }

    pub fn authorization(message: impl Into<String>, status: StatusCode) -> Self {
        Self::Authorization {
            message: message.into(),
            status,
        }
    }

    /// 500 with the generic client message; `detail` goes to the log only
    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            message: ErrorCategory::Internal.default_client_message().to_string(),
            detail: detail.into(),
        }
    }

    /// Map any categorized domain error, applying the deployment's status
    /// policy to conflicts and authorization failures
    pub fn from_domain<E>(err: &E, policy: &StatusPolicy) -> Self
    where
        E: Categorized + ?Sized,
    {
        let message = err.client_message();
        let detail = format!("{}: {}", err.code(), err);

        match err.category() {
            ErrorCategory::Validation => Self::Validation { message },
            ErrorCategory::Authentication => Self::Authentication { message, detail },
            ErrorCategory::Authorization => Self::Authorization {
                message,
                status: policy.forbidden(),
            },
            ErrorCategory::Conflict => Self::Conflict {
                message,
                detail,
                status: policy.conflict(),
            },
            ErrorCategory::Internal => Self::Internal { message, detail },
        }
    }

    /// Policy-chosen status for authorization and conflict failures, the
    /// category default otherwise
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Authorization { status, .. } | ApiError::Conflict { status, .. } => *status,
            _ => StatusCode::from_u16(self.category().default_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    pub fn error_type(&self) -> &'static str {
        self.category().as_str()
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ApiError::Validation { .. } => ErrorCategory::Validation,
            ApiError::Authentication { .. } => ErrorCategory::Authentication,
            ApiError::Authorization { .. } => ErrorCategory::Authorization,
            ApiError::Conflict { .. } => ErrorCategory::Conflict,
            ApiError::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Message sent to the client
    pub fn message(&self) -> &str {
        match self {
            ApiError::Validation { message }
            | ApiError::Authentication { message, .. }
            | ApiError::Authorization { message, .. }
            | ApiError::Conflict { message, .. }
            | ApiError::Internal { message, .. } => message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4().to_string();
        let status_code = self.status_code();

        if status_code.is_server_error() {
            error!(
                error_id = %error_id,
                error_type = %self.error_type(),
                status_code = %status_code.as_u16(),
                error = %self,
                "API error occurred"
            );
        } else {
            warn!(
                error_id = %error_id,
                error_type = %self.error_type(),
                status_code = %status_code.as_u16(),
                error = %self,
                "Request rejected"
            );
        }

        let body = ApiErrorResponse {
            error: self.message().to_string(),
        };

        (status_code, Json(body)).into_response()
    }
}
