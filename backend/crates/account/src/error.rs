//! Account Error Types
//!
//! Account-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use kernel::error::{
    app_error::AppError,
    conversions::classify_sqlx_error,
    field::{FieldErrors, NON_FIELD_ERRORS},
    kind::ErrorKind,
};
use thiserror::Error;

/// Field message for a duplicate registration
pub const EMAIL_TAKEN_MESSAGE: &str = "user with this email already exists.";

/// Account-specific result type alias
pub type AccountResult<T> = Result<T, AccountError>;

/// Account-specific error variants
#[derive(Debug, Error)]
pub enum AccountError {
    /// One or more input fields failed validation
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// Email already registered
    #[error("Email already registered")]
    EmailTaken,

    /// Unknown email, wrong password or inactive account
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing, malformed or unknown token
    #[error("Authentication required")]
    Unauthenticated,

    /// Authenticated but not allowed
    #[error("Permission denied")]
    Forbidden,

    #[error("User not found")]
    UserNotFound,

    /// Body is not valid JSON for the endpoint
    #[error("Malformed request: {0}")]
    MalformedRequest(#[from] JsonRejection),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AccountError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    ///
    /// Agrees with the kind of [`AccountError::into_app_error`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            AccountError::Validation(_)
            | AccountError::EmailTaken
            | AccountError::InvalidCredentials
            | AccountError::MalformedRequest(_) => ErrorKind::BadRequest,
            AccountError::Unauthenticated => ErrorKind::Unauthorized,
            AccountError::Forbidden => ErrorKind::Forbidden,
            AccountError::UserNotFound => ErrorKind::NotFound,
            AccountError::Database(e) => classify_sqlx_error(e).0,
            AccountError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    ///
    /// Client errors keep their per-field messages; server errors carry a
    /// generic message and keep the cause as source.
    pub fn into_app_error(self) -> AppError {
        match self {
            AccountError::Validation(fields) => AppError::validation(fields),
            AccountError::EmailTaken => {
                AppError::validation(FieldErrors::single("email", EMAIL_TAKEN_MESSAGE))
            }
            AccountError::InvalidCredentials => AppError::validation(FieldErrors::single(
                NON_FIELD_ERRORS,
                "Unable to log in with provided credentials.",
            )),
            AccountError::Unauthenticated => {
                AppError::unauthorized("Authentication credentials were not provided or are invalid.")
                    .with_action("Send an Authorization: Bearer <token> header")
            }
            AccountError::Forbidden => {
                AppError::forbidden("You do not have permission to perform this action.")
            }
            AccountError::UserNotFound => AppError::not_found("User not found"),
            AccountError::MalformedRequest(rejection) => AppError::from(rejection),
            AccountError::Database(e) => AppError::from(e),
            AccountError::Internal(msg) => AppError::internal(msg),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AccountError::Database(e) => {
                tracing::error!(error = %e, "Account database error");
            }
            AccountError::Internal(msg) => {
                tracing::error!(message = %msg, "Account internal error");
            }
            AccountError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AccountError::Forbidden => {
                tracing::warn!("Admin access denied");
            }
            _ => {
                tracing::debug!(error = %self, "Account error");
            }
        }
    }
}

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        self.log();
        let challenge = matches!(self, AccountError::Unauthenticated);
        let mut response = self.into_app_error().into_response();
        if challenge {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<AppError> for AccountError {
    fn from(err: AppError) -> Self {
        if err.is_client_error() {
            let fields = err
                .fields()
                .cloned()
                .unwrap_or_else(|| FieldErrors::single(NON_FIELD_ERRORS, err.message()));
            AccountError::Validation(fields)
        } else {
            AccountError::Internal(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AccountError::Validation(FieldErrors::new()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AccountError::EmailTaken.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AccountError::InvalidCredentials.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AccountError::Unauthenticated.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AccountError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AccountError::UserNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AccountError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AccountError::Database(sqlx::Error::PoolTimedOut).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_status_code_matches_app_error() {
        for err in [
            AccountError::EmailTaken,
            AccountError::InvalidCredentials,
            AccountError::Unauthenticated,
            AccountError::Forbidden,
            AccountError::UserNotFound,
            AccountError::Database(sqlx::Error::PoolTimedOut),
            AccountError::Database(sqlx::Error::RowNotFound),
            AccountError::Database(sqlx::Error::Protocol("bad frame".into())),
            AccountError::Internal("boom".into()),
        ] {
            let status = err.status_code().as_u16();
            let kind = err.kind();
            let app = err.into_app_error();
            assert_eq!(app.status_code(), status);
            assert_eq!(app.kind(), kind);
        }
    }

    #[test]
    fn test_email_taken_is_field_error() {
        let app = AccountError::EmailTaken.into_app_error();
        assert!(app.fields().unwrap().contains("email"));
    }

    #[test]
    fn test_invalid_credentials_is_non_field_error() {
        let app = AccountError::InvalidCredentials.into_app_error();
        assert!(app.fields().unwrap().contains(NON_FIELD_ERRORS));
    }

    #[test]
    fn test_unauthenticated_sets_challenge_header() {
        let response = AccountError::Unauthenticated.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }

    #[test]
    fn test_from_app_error() {
        let err = AccountError::from(AppError::bad_request("Enter a valid email address."));
        match err {
            AccountError::Validation(fields) => assert!(fields.contains(NON_FIELD_ERRORS)),
            other => panic!("unexpected: {other:?}"),
        }

        let err = AccountError::from(AppError::internal("hash failed"));
        assert!(matches!(err, AccountError::Internal(_)));
    }
}
