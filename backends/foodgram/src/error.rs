use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use diesel::r2d2;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T, E = AppError> = std::result::Result<T, E>;

/// Name of the unique constraint on `recipes (author_id, name)`.
pub const RECIPE_NAME_CONSTRAINT: &str = "unique_author_name";

#[derive(Error, Debug)]
pub enum AppError {
    // 400
    #[error("Validation failed: {0}")]
    Validation(serde_json::Value),

    // 400
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] validator::ValidationErrors),

    // 401
    #[error("Unauthorized: {0}")]
    Unauthorized(&'static str),

    // 403
    #[error("Forbidden: {0}")]
    Forbidden(&'static str),

    // 404
    #[error("Not Found: {0}")]
    NotFound(String),

    // 409
    #[error("Conflict: {0}")]
    Conflict(String),

    // ======== infrastructure errors ======== //
    #[error("JWT error: {0:?}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Diesel pool error: {0:?}")]
    Pool(#[from] r2d2::PoolError),

    #[error("Diesel error: {0:?}")]
    Diesel(DieselError),

    #[error("Mailbox error: {0:?}")]
    Mailbox(#[from] actix::MailboxError),

    #[error("I/O error: {0:?}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation(json!({ field: [message.into()] }))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        AppError::Conflict(message.into())
    }
}

// Constraint violations raised by storage map onto the domain errors.
impl From<DieselError> for AppError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => AppError::not_found("Requested record does not exist"),
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                if info.constraint_name() == Some(RECIPE_NAME_CONSTRAINT) {
                    AppError::validation("name", "You already have a recipe with this name")
                } else {
                    AppError::conflict("Record already exists")
                }
            }
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                AppError::validation("non_field_errors", "Referenced record does not exist")
            }
            DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, _) => {
                AppError::validation("non_field_errors", "Value is out of the allowed range")
            }
            err => AppError::Diesel(err),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) | AppError::Jwt(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Validation(ref errors) => errors.clone(),
            AppError::InvalidRequest(ref errors) => {
                serde_json::to_value(errors).unwrap_or_else(|_| json!(errors.to_string()))
            }
            AppError::Unauthorized(message) | AppError::Forbidden(message) => {
                json!({ "errors": message })
            }
            AppError::NotFound(ref message) | AppError::Conflict(ref message) => {
                json!({ "errors": message })
            }
            AppError::Jwt(_) => json!({ "errors": "Invalid token" }),
            _ => {
                error!(error = ?self, "internal error");
                json!({ "errors": "Internal Server Error" })
            }
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}
