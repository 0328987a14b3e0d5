//! Shared test helpers: a scriptable identity provider and request utilities

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use auth_relay::api::{self, AppState};
use auth_relay::domain::{
    Account, AuthOutcome, Credentials, IdentityProvider, ProviderError, Registration, Session,
};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::Value;
use tower::util::ServiceExt; // for oneshot

pub const VALID_TOKEN: &str = "valid-token";

/// Identity provider double
///
/// Each operation returns its scripted result; calls are recorded so
/// tests can assert what was forwarded.
#[derive(Default)]
pub struct StubProvider {
    pub signup_result: Mutex<Option<Result<AuthOutcome, ProviderError>>>,
    pub login_result: Mutex<Option<Result<AuthOutcome, ProviderError>>>,
    pub logout_error: Mutex<Option<ProviderError>>,
    pub lookup_result: Mutex<Option<Result<Account, ProviderError>>>,
    pub verify_error: Mutex<Option<ProviderError>>,
    pub calls: Mutex<Vec<String>>,
}

impl StubProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

pub fn account(id: &str, email: &str) -> Account {
    let now = Utc::now();
    Account {
        id: id.to_string(),
        email: email.to_string(),
        first_name: None,
        last_name: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn outcome(email: &str, access_token: &str) -> AuthOutcome {
    AuthOutcome {
        account: account("user-123", email),
        session: Some(Session {
            access_token: access_token.to_string(),
            refresh_token: format!("{}-refresh", access_token),
        }),
    }
}

#[async_trait]
impl IdentityProvider for StubProvider {
    async fn create_account(
        &self,
        registration: &Registration,
    ) -> Result<AuthOutcome, ProviderError> {
        self.record(format!("create_account:{}", registration.email));
        self.signup_result
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok(outcome(&registration.email, "token-123")))
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<AuthOutcome, ProviderError> {
        self.record(format!("authenticate:{}", credentials.email));
        self.login_result
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok(outcome(&credentials.email, "token-123")))
    }

    async fn invalidate_session(&self, access_token: &str) -> Result<(), ProviderError> {
        self.record(format!("invalidate_session:{}", access_token));
        match self.logout_error.lock().unwrap().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn lookup_account(&self, id: &str) -> Result<Account, ProviderError> {
        self.record(format!("lookup_account:{}", id));
        self.lookup_result
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok(account(id, "test@example.com")))
    }

    async fn verify_access_token(&self, token: &str) -> Result<Account, ProviderError> {
        self.record(format!("verify_access_token:{}", token));
        if let Some(e) = self.verify_error.lock().unwrap().take() {
            return Err(e);
        }
        if token == VALID_TOKEN {
            Ok(account("user-123", "test@example.com"))
        } else {
            Err(ProviderError::rejected("invalid JWT: unable to parse or verify signature"))
        }
    }
}

/// Setup test application backed by the given provider
pub fn setup_app(provider: Arc<StubProvider>) -> Router {
    api::router(AppState::new(provider))
}

/// Sends a request and returns status plus parsed JSON body
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();

    (status, json)
}

pub fn post_json(uri: &str, payload: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(payload).unwrap()))
        .unwrap()
}

pub fn with_auth(method: &str, uri: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(value) = authorization {
        builder = builder.header("authorization", value);
    }
    builder.body(Body::empty()).unwrap()
}
