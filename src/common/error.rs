use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

// Application error type, mapped onto HTTP responses in one place.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed")]
    ValidationError(#[from] validator::ValidationErrors),

    // Domain validation (non-positive amounts, ceiling breaches, ...)
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    // Operation attempted against an ineligible lifecycle state
    #[error("{0}")]
    StateConflict(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("email already registered")]
    EmailAlreadyExists,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid token")]
    InvalidToken,

    #[error("database error")]
    DatabaseError(#[from] sqlx::Error),

    // Catch-all for anything unexpected; `anyhow` keeps the context.
    #[error("internal server error")]
    InternalServerError(#[from] anyhow::Error),

    #[error("bcrypt error: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("jwt error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::StateConflict(_) => StatusCode::CONFLICT,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::EmailAlreadyExists => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            // Token decode failures surface as InvalidToken; anything
            // reaching the JwtError variant is a server-side signing problem.
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Field-level details for payload validation errors.
        if let AppError::ValidationError(errors) = &self {
            let mut details = std::collections::HashMap::new();
            for (field, field_errors) in errors.field_errors() {
                let messages: Vec<String> = field_errors
                    .iter()
                    .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .collect();
                details.insert(field.to_string(), messages);
            }
            let body = Json(json!({
                "error": "one or more fields are invalid",
                "details": details,
            }));
            return (StatusCode::BAD_REQUEST, body).into_response();
        }

        let status = self.status_code();

        // 5xx details stay in the server log; the caller gets a generic body.
        let message = if status.is_server_error() {
            tracing::error!("internal error: {self:?}");
            "an unexpected error occurred".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_4xx() {
        assert_eq!(
            AppError::Validation("amount must be positive".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("application not found".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::StateConflict("not approved".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Forbidden("admin only".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(AppError::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn database_errors_map_to_500() {
        let err = AppError::DatabaseError(sqlx::Error::RowNotFound);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
