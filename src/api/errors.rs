use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::api::envelope::Envelope;
use crate::domain::provider::{ProviderError, RejectionKind};

/// API error type with HTTP status code and message
///
/// Rendered as a failure envelope with an empty `data` object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    /// Creates a new API error
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Creates a 400 Bad Request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Creates a 401 Unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    /// Creates a 404 Not Found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Creates a 500 Internal Server Error
    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Error for a signup or login body without email or password
    pub fn missing_credentials() -> Self {
        Self::bad_request("Email and password are required")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        Envelope::failure(self.status, self.message).into_response()
    }
}

/// Provider operation a failure came from
///
/// The same upstream error maps to different client-facing codes
/// depending on the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOperation {
    Signup,
    Login,
    Logout,
    Profile,
}

impl AuthOperation {
    fn fallback_status(self) -> StatusCode {
        match self {
            Self::Login => StatusCode::UNAUTHORIZED,
            Self::Signup | Self::Logout | Self::Profile => StatusCode::BAD_REQUEST,
        }
    }

    fn fallback_message(self) -> &'static str {
        match self {
            Self::Signup => "Signup failed",
            Self::Login => "Login failed",
            Self::Logout => "Logout failed",
            Self::Profile => "Failed to get profile",
        }
    }

    fn rate_limit_message(self) -> Option<&'static str> {
        match self {
            Self::Signup => Some("Too many signup attempts. Please try again later."),
            Self::Login => Some("Too many login attempts. Please try again later."),
            Self::Logout | Self::Profile => None,
        }
    }
}

/// Maps a provider failure to the client-facing error for an operation
///
/// Specific outcomes (timeout, unreachable, 429, 409) are checked before
/// the per-operation fallback.
pub fn classify(operation: AuthOperation, err: &ProviderError) -> ApiError {
    match err {
        ProviderError::Timeout => {
            ApiError::new(StatusCode::GATEWAY_TIMEOUT, "Identity provider timed out")
        }
        ProviderError::Unavailable(_) => {
            ApiError::new(StatusCode::BAD_GATEWAY, "Identity provider unavailable")
        }
        ProviderError::Rejected { kind, message } => {
            if *kind == RejectionKind::RateLimited {
                if let Some(text) = operation.rate_limit_message() {
                    return ApiError::new(StatusCode::TOO_MANY_REQUESTS, text);
                }
            }
            if *kind == RejectionKind::AccountExists && operation == AuthOperation::Signup {
                return ApiError::new(StatusCode::CONFLICT, "Email already registered");
            }

            let message = if message.is_empty() {
                operation.fallback_message().to_string()
            } else {
                message.clone()
            };
            ApiError::new(operation.fallback_status(), message)
        }
    }
}

/// Maps a failed token verification to the client-facing error
pub fn classify_token_failure(err: &ProviderError) -> ApiError {
    match err {
        ProviderError::Rejected { .. } => ApiError::unauthorized("Invalid or expired token"),
        ProviderError::Timeout | ProviderError::Unavailable(_) => {
            classify(AuthOperation::Profile, err)
        }
    }
}
