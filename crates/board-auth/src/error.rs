//! Authentication error types.

use board_http::ApiError;
use thiserror::Error;

/// Authentication error type.
#[derive(Error, Debug, Clone)]
pub enum AuthError {
    /// The API rejected or could not serve the request.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Invalid state transition in the bootstrap FSM
    #[error("Invalid auth state transition: {0}")]
    InvalidStateTransition(String),
}

impl AuthError {
    /// The normalized API error, if this came from a request.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            AuthError::Api(error) => Some(error),
            AuthError::InvalidStateTransition(_) => None,
        }
    }
}

/// Result type alias using AuthError.
pub type AuthResult<T> = Result<T, AuthError>;
