//! HTTP error mapping
//!
//! Every rejection is rendered as the JSON body
//! `{"path", "method", "detail", "timestamp"}`.

use actix_web::{error::InternalError, http::StatusCode, HttpRequest, HttpResponse};
use thiserror::Error;
use tk_core::errors::AuthError;
use tk_shared::errors::{error_details, ErrorResponse};

/// Failure to obtain a bearer token from a request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenExtractionError {
    /// Neither an `Authorization` header nor cookie was sent
    #[error("{}", error_details::MISSING_HEADER)]
    Missing,

    /// The header value is not valid visible ASCII
    #[error("{}", error_details::UNPARSABLE_HEADER)]
    Unparsable,

    /// The scheme is something other than `Bearer`
    #[error("{}", error_details::INVALID_SCHEME)]
    InvalidScheme,
}

/// Errors surfaced by the HTTP layer
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Extraction(#[from] TokenExtractionError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The route needs a user but the request carried none
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Invalid username or password.")]
    InvalidLogin,

    #[error("Username already exists.")]
    UsernameTaken,

    #[error("{0}")]
    Validation(String),
}

impl ApiError {
    /// Status code for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Extraction(TokenExtractionError::Missing) => StatusCode::UNAUTHORIZED,
            ApiError::Extraction(_) => StatusCode::BAD_REQUEST,
            ApiError::Auth(AuthError::MissingClaim { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Auth(error) if error.is_token_error() => StatusCode::UNAUTHORIZED,
            ApiError::Auth(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unauthenticated | ApiError::InvalidLogin => StatusCode::UNAUTHORIZED,
            ApiError::UsernameTaken => StatusCode::CONFLICT,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Client-facing detail
    ///
    /// Token and storage failures get fixed messages; internal error text is
    /// only logged.
    pub fn detail(&self) -> String {
        match self {
            ApiError::Auth(AuthError::MissingClaim { .. }) => error_details::MISSING_CLAIM.to_string(),
            ApiError::Auth(error) if error.is_token_error() => {
                error_details::INVALID_CREDENTIALS.to_string()
            }
            ApiError::Auth(_) => error_details::INTERNAL_ERROR.to_string(),
            ApiError::Unauthenticated => error_details::INVALID_CREDENTIALS.to_string(),
            other => other.to_string(),
        }
    }

    /// Render the JSON error body for `req`
    pub fn to_response(&self, req: &HttpRequest) -> HttpResponse {
        HttpResponse::build(self.status()).json(ErrorResponse::new(
            req.path(),
            req.method().as_str(),
            self.detail(),
        ))
    }

    /// Convert into an actix error carrying the rendered response
    pub fn into_actix(self, req: &HttpRequest) -> actix_web::Error {
        let response = self.to_response(req);
        InternalError::from_response(self, response).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tk_core::errors::RepositoryError;

    #[test]
    fn test_extraction_statuses() {
        assert_eq!(
            ApiError::from(TokenExtractionError::Missing).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(TokenExtractionError::Unparsable).status(),
            StatusCode::BAD_REQUEST
        );
        let scheme = ApiError::from(TokenExtractionError::InvalidScheme);
        assert_eq!(scheme.status(), StatusCode::BAD_REQUEST);
        assert_eq!(scheme.detail(), error_details::INVALID_SCHEME);
    }

    #[test]
    fn test_missing_claim_is_bad_request() {
        let error = ApiError::from(AuthError::MissingClaim { claim: "sub".into() });
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error.detail(), error_details::MISSING_CLAIM);
    }

    #[test]
    fn test_token_errors_are_unauthorized() {
        for error in [
            AuthError::ExpiredToken,
            AuthError::InvalidSignature,
            AuthError::Decode { message: "bad".into() },
            AuthError::TokenPayloadMismatch { field: "id".into() },
        ] {
            let error = ApiError::from(error);
            assert_eq!(error.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(error.detail(), error_details::INVALID_CREDENTIALS);
        }
    }

    #[test]
    fn test_unexpected_errors_hide_details() {
        let error = ApiError::from(AuthError::UnexpectedAuth {
            source: Box::new(AuthError::CacheRead {
                operation: "get_current_user",
                source: RepositoryError::Connection {
                    message: "redis://:secret@host refused".into(),
                },
            }),
        });
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.detail(), error_details::INTERNAL_ERROR);
    }
}
