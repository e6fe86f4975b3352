use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Message shared by malformed and unknown emails so the two cannot be told apart.
pub const INVALID_EMAIL: &str = "Invalid email address";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Invalid password")]
    InvalidCredential,

    #[error("Role selection is required")]
    MissingRole,

    #[error("Role mismatch. Please select the correct role for your account")]
    RoleMismatch,

    #[error("{0}")]
    AccountNotApproved(String),

    #[error("User with this email already exists")]
    DuplicateEmail,

    #[error("User not found")]
    NotFound,

    #[error("User is already {status}")]
    AlreadyDecided { status: String },

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("storage unavailable: {0}")]
    StoreUnavailable(#[from] sqlx::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn invalid_email() -> Self {
        AppError::InvalidInput(INVALID_EMAIL.into())
    }

    /// Stable machine-readable classification.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "invalid_input",
            AppError::InvalidCredential => "invalid_credential",
            AppError::MissingRole => "missing_role",
            AppError::RoleMismatch => "role_mismatch",
            AppError::AccountNotApproved(_) => "account_not_approved",
            AppError::DuplicateEmail => "duplicate_email",
            AppError::NotFound => "not_found",
            AppError::AlreadyDecided { .. } => "already_decided",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::StoreUnavailable(_) => "store_unavailable",
            AppError::Internal(_) => "internal_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_)
            | AppError::MissingRole
            | AppError::RoleMismatch
            | AppError::DuplicateEmail
            | AppError::AlreadyDecided { .. } => StatusCode::BAD_REQUEST,
            AppError::InvalidCredential
            | AppError::AccountNotApproved(_)
            | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Only storage failures are worth retrying; every other kind is terminal.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::StoreUnavailable(_))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AppError::StoreUnavailable(e) => {
                error!(error = %e, "storage failure");
                "Service temporarily unavailable".to_string()
            }
            AppError::Internal(e) => {
                error!(error = %e, "internal error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        let mut res = (
            status,
            Json(json!({
                "success": false,
                "error": self.code(),
                "message": message,
            })),
        )
            .into_response();
        if self.is_retryable() {
            res.headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from_static("5"));
        }
        res
    }
}
