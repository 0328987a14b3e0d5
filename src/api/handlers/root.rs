use std::any::Any;

use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Extension,
};
use serde_json::json;

use crate::api::envelope::Envelope;
use crate::api::errors::ApiError;
use crate::api::middleware::AuthenticatedAccount;

pub const GREETING: &str = "Auth relay is up and running";

/// Greeting endpoint
///
/// GET /
pub async fn root(identity: Option<Extension<AuthenticatedAccount>>) -> Envelope {
    match identity {
        Some(Extension(identity)) => Envelope::success(
            StatusCode::OK,
            GREETING,
            json!({ "user": identity.account }),
        ),
        None => Envelope::message(StatusCode::OK, GREETING),
    }
}

/// Fallback for unknown routes
pub async fn not_found(uri: Uri) -> ApiError {
    tracing::debug!(%uri, "no route matched");
    ApiError::not_found("Route not found")
}

/// Fallback for a known path hit with an unsupported method
pub async fn method_not_allowed(uri: Uri) -> ApiError {
    tracing::debug!(%uri, "method not allowed");
    ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

/// Converts a handler panic into a 500 envelope
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        *s
    } else {
        "unknown panic payload"
    };
    tracing::error!(panic = %detail, "request handler panicked");

    ApiError::internal_server_error("Internal Server Error").into_response()
}
