use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, AppError>;

/// AppError
///
/// The single failure type of every handler and repository call. Each variant maps to
/// one HTTP status, and the body is always the `{ success: false, message }` envelope.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed, missing or out-of-range input.
    #[error("{0}")]
    Validation(String),

    /// Login uses one message whether the email is unknown or the password is wrong.
    #[error("{0}")]
    InvalidCredentials(&'static str),

    #[error("Access token required")]
    MissingToken,

    #[error("Invalid token")]
    TokenInvalid,

    #[error("Token expired")]
    TokenExpired,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    /// Ownership-scoped lookup miss. Absence and foreign ownership are indistinguishable.
    #[error("{0} not found or you are not authorized")]
    NotFoundOrForbidden(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials(_) | AppError::MissingToken => StatusCode::UNAUTHORIZED,
            AppError::TokenInvalid | AppError::TokenExpired | AppError::Forbidden(_) => {
                StatusCode::FORBIDDEN
            }
            AppError::NotFound(_) | AppError::NotFoundOrForbidden(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Internal details stay in the logs.
        let message = match &self {
            AppError::Internal(detail) => {
                tracing::error!(detail = %detail, "request failed");
                "An unexpected error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({ "success": false, "message": message }));
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Resource"),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("Duplicate record".to_string())
            }
            other => {
                tracing::error!("database error: {:?}", other);
                AppError::Internal(other.to_string())
            }
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    /// Joins the field messages, sorted so the output is stable.
    fn from(err: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = err
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("{field} is invalid"),
                })
            })
            .collect();
        messages.sort();
        AppError::Validation(messages.join("; "))
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        AppError::Internal(format!("password hashing failed: {err}"))
    }
}

// --- Extractor rejections ---

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}
