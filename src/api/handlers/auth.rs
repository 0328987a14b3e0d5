use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    Extension, Json,
};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};

use crate::api::envelope::Envelope;
use crate::api::errors::{classify, ApiError, AuthOperation};
use crate::api::middleware::AuthenticatedAccount;
use crate::api::AppState;
use crate::domain::account::{AuthOutcome, Credentials, Registration};

/// Request body for signup
///
/// Every field is optional at the wire level so that an absent email or
/// password is reported with the envelope, not a deserialization error.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Request body for login
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Returns email and password when both are present and non-empty
fn required_credentials(
    email: Option<String>,
    password: Option<String>,
) -> Result<(String, String), ApiError> {
    match (email, password) {
        (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
            Ok((email, password))
        }
        _ => Err(ApiError::missing_credentials()),
    }
}

/// JSON request body where an absent body reads as an empty request
///
/// A missing body, a blank body, or a body sent without a JSON content
/// type all yield `T::default()`, so missing fields are reported by the
/// handler's own validation. Malformed JSON is still a 400.
pub struct JsonOrEmpty<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonOrEmpty<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

        if !is_json || bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(T::default()));
        }

        Json::<T>::from_bytes(&bytes)
            .map(|Json(body)| Self(body))
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
    }
}

/// `{user, token, refreshToken}` payload shared by signup and login
fn session_payload(outcome: AuthOutcome) -> Value {
    let mut data = json!({ "user": outcome.account });
    if let Some(session) = outcome.session {
        data["token"] = Value::String(session.access_token);
        data["refreshToken"] = Value::String(session.refresh_token);
    }
    data
}

/// Register a new account with the identity provider
///
/// POST /auth/signup
pub async fn signup(
    State(state): State<AppState>,
    JsonOrEmpty(req): JsonOrEmpty<SignupRequest>,
) -> Result<Envelope, ApiError> {
    let (email, password) = required_credentials(req.email, req.password)?;

    let registration = Registration {
        email,
        password,
        first_name: req.first_name,
        last_name: req.last_name,
    };

    let outcome = state
        .provider
        .create_account(&registration)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "signup rejected");
            classify(AuthOperation::Signup, &e)
        })?;

    tracing::info!(user_id = %outcome.account.id, "account registered");

    Ok(Envelope::success(
        StatusCode::CREATED,
        "User registered successfully",
        session_payload(outcome),
    ))
}

/// Log in with email and password
///
/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    JsonOrEmpty(req): JsonOrEmpty<LoginRequest>,
) -> Result<Envelope, ApiError> {
    let (email, password) = required_credentials(req.email, req.password)?;

    let outcome = state
        .provider
        .authenticate(&Credentials { email, password })
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "login rejected");
            classify(AuthOperation::Login, &e)
        })?;

    tracing::info!(user_id = %outcome.account.id, "login succeeded");

    Ok(Envelope::success(
        StatusCode::OK,
        "Login successful",
        session_payload(outcome),
    ))
}

/// Revoke the caller's session
///
/// POST /auth/logout
pub async fn logout(
    State(state): State<AppState>,
    identity: Option<Extension<AuthenticatedAccount>>,
) -> Result<Envelope, ApiError> {
    let Some(Extension(identity)) = identity else {
        return Err(ApiError::unauthorized("Unauthorized"));
    };

    state
        .provider
        .invalidate_session(&identity.access_token)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, user_id = %identity.account.id, "logout failed");
            classify(AuthOperation::Logout, &e)
        })?;

    Ok(Envelope::message(StatusCode::OK, "Logout successful"))
}

/// Fetch the authenticated caller's account
///
/// GET /auth/profile
pub async fn profile(
    State(state): State<AppState>,
    identity: Option<Extension<AuthenticatedAccount>>,
) -> Result<Envelope, ApiError> {
    let user_id = match identity {
        Some(Extension(identity)) if !identity.account.id.is_empty() => identity.account.id,
        _ => return Err(ApiError::unauthorized("Unauthorized")),
    };

    let account = state
        .provider
        .lookup_account(&user_id)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, %user_id, "profile lookup failed");
            classify(AuthOperation::Profile, &e)
        })?;

    Ok(Envelope::success(
        StatusCode::OK,
        "Profile retrieved successfully",
        json!({ "user": account }),
    ))
}
