use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::errors::{classify_token_failure, ApiError};
use crate::api::AppState;
use crate::domain::account::Account;

/// Identity attached to a request once its bearer token has been verified
///
/// Handlers read it with `Option<Extension<AuthenticatedAccount>>`.
#[derive(Debug, Clone)]
pub struct AuthenticatedAccount {
    pub account: Account,
    /// The token the caller presented, forwarded on logout
    pub access_token: String,
}

/// Extracts the token from an `Authorization: Bearer <token>` header
///
/// Any other scheme, or a missing header, yields `None`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// Rejects requests without a valid bearer token
///
/// On success the verified account is inserted into the request
/// extensions before the handler runs.
pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let Some(token) = bearer_token(req.headers()).map(str::to_string) else {
        return ApiError::unauthorized("Missing or invalid token").into_response();
    };

    match state.provider.verify_access_token(&token).await {
        Ok(account) => {
            req.extensions_mut().insert(AuthenticatedAccount {
                account,
                access_token: token,
            });
            next.run(req).await
        }
        Err(e) => {
            tracing::warn!(error = %e, "bearer token verification failed");
            classify_token_failure(&e).into_response()
        }
    }
}

/// Attaches the account when a valid bearer token is present
///
/// Never rejects: a missing or bad token just leaves the request
/// anonymous.
pub async fn optional_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    if let Some(token) = bearer_token(req.headers()).map(str::to_string) {
        match state.provider.verify_access_token(&token).await {
            Ok(account) => {
                req.extensions_mut().insert(AuthenticatedAccount {
                    account,
                    access_token: token,
                });
            }
            Err(e) => tracing::debug!(error = %e, "ignoring unverifiable bearer token"),
        }
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_prefix_is_stripped() {
        assert_eq!(bearer_token(&headers("Bearer abc")), Some("abc"));
    }

    #[test]
    fn dotted_tokens_kept_whole() {
        assert_eq!(
            bearer_token(&headers("Bearer token.with.dots")),
            Some("token.with.dots")
        );
    }

    #[test]
    fn missing_header_has_no_token() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn other_schemes_have_no_token() {
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwdw==")), None);
        assert_eq!(bearer_token(&headers("bearer abc")), None);
        assert_eq!(bearer_token(&headers("Bearer")), None);
    }
}
