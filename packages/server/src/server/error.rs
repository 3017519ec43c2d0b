//! HTTP error type shared by every route handler.
//!
//! Handlers return `Result<_, ApiError>`. Model functions return
//! `anyhow::Result`, and the conversion below recognises the database
//! errors that are the caller's fault (unique and foreign-key violations,
//! missing rows) so they surface as 4xx instead of a generic 500.
//!
//! A 500 body only says "Internal server error". The underlying message rides
//! along as an `InternalErrorDetail` response extension, and `build_app`
//! installs `attach_error_detail` when details should reach the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";

/// Full error chain of a 500, kept off the wire unless a layer copies it in
#[derive(Debug, Clone)]
pub struct InternalErrorDetail(pub String);

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Classify a database error; `None` means it is a genuine server fault
    fn from_sqlx(err: &sqlx::Error) -> Option<Self> {
        match err {
            sqlx::Error::RowNotFound => Some(ApiError::NotFound("Record".to_string())),
            sqlx::Error::Database(db) => match db.code().as_deref() {
                Some(UNIQUE_VIOLATION) => Some(ApiError::Conflict(match db.constraint() {
                    Some(constraint) => format!(
                        "A record with this value already exists ({})",
                        constraint
                    ),
                    None => "A record with this value already exists".to_string(),
                })),
                Some(FOREIGN_KEY_VIOLATION) => Some(ApiError::Validation(match db.constraint() {
                    Some(constraint) => format!("Referenced record does not exist ({})", constraint),
                    None => "Referenced record does not exist".to_string(),
                })),
                Some(CHECK_VIOLATION) => Some(ApiError::Validation(format!(
                    "Value rejected by constraint {}",
                    db.constraint().unwrap_or("check")
                ))),
                _ => None,
            },
            _ => None,
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(api) = err.downcast_ref::<sqlx::Error>().and_then(ApiError::from_sqlx) {
            return api;
        }
        ApiError::Internal(err)
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::from_sqlx(&err).unwrap_or_else(|| ApiError::Internal(err.into()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut response = (status, Json(json!({ "error": self.to_string() }))).into_response();

        if let ApiError::Internal(err) = &self {
            tracing::error!(error = ?err, "Request failed");
            response
                .extensions_mut()
                .insert(InternalErrorDetail(format!("{:#}", err)));
        }

        response
    }
}

/// Response mapper that adds `"detail"` to 500 bodies (development only)
pub async fn attach_error_detail(mut response: Response) -> Response {
    let Some(InternalErrorDetail(detail)) = response.extensions_mut().remove::<InternalErrorDetail>() else {
        return response;
    };

    let body = json!({ "error": "Internal server error", "detail": detail });
    let mut rewritten = (response.status(), Json(body)).into_response();
    *rewritten.extensions_mut() = std::mem::take(response.extensions_mut());
    rewritten
}
