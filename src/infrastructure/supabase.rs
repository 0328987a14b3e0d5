use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

use crate::domain::account::{Account, AuthOutcome, Credentials, Registration, Session};
use crate::domain::provider::{IdentityProvider, ProviderError, RejectionKind};

/// Identity provider backed by the hosted Supabase auth REST API
///
/// One `reqwest::Client` is shared by all calls; the configured timeout
/// bounds every call individually.
pub struct SupabaseIdentityProvider {
    base_url: String,
    api_key: SecretString,
    client: reqwest::Client,
}

impl SupabaseIdentityProvider {
    /// Creates a new provider client
    ///
    /// # Arguments
    /// * `base_url` - Project URL, e.g. `https://xyz.supabase.co`
    /// * `api_key` - Project API key sent as `apikey`
    /// * `timeout` - Upper bound for a single provider call
    pub fn new(
        base_url: &str,
        api_key: SecretString,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.base_url, path)
    }

    /// Admin URL for a single account, with the id percent-encoded as
    /// one path segment
    fn admin_user_url(&self, id: &str) -> Result<reqwest::Url, ProviderError> {
        let mut url = reqwest::Url::parse(&self.url("/admin/users"))
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ProviderError::Unavailable("provider URL cannot hold a path".into()))?
            .push(id);
        Ok(url)
    }

    /// Attaches the project key, authorizing as the project itself
    fn with_project_key(&self, request: RequestBuilder) -> RequestBuilder {
        let key = self.api_key.expose_secret();
        request.header("apikey", key).bearer_auth(key)
    }

    /// Attaches the project key, authorizing as the token's owner
    fn with_user_token(&self, request: RequestBuilder, token: &str) -> RequestBuilder {
        request
            .header("apikey", self.api_key.expose_secret())
            .bearer_auth(token)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ProviderError> {
        let response = request.send().await.map_err(transport_error)?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(rejection_from(response).await)
        }
    }
}

#[async_trait]
impl IdentityProvider for SupabaseIdentityProvider {
    async fn create_account(
        &self,
        registration: &Registration,
    ) -> Result<AuthOutcome, ProviderError> {
        let body = SignupRequest {
            email: &registration.email,
            password: &registration.password,
            data: json!({
                "firstName": registration.first_name,
                "lastName": registration.last_name,
            }),
        };

        let request = self.with_project_key(self.client.post(self.url("/signup")).json(&body));
        let response = self.send(request).await?;
        let body = response
            .json::<SignupResponse>()
            .await
            .map_err(transport_error)?;

        // Without auto-confirm the provider answers with the bare user.
        match body {
            SignupResponse::Session(session) => {
                let user = session
                    .user
                    .ok_or_else(|| ProviderError::rejected("User creation failed"))?;
                Ok(AuthOutcome {
                    account: user.into_account(),
                    session: Some(Session {
                        access_token: session.access_token,
                        refresh_token: session.refresh_token,
                    }),
                })
            }
            SignupResponse::User(user) => Ok(AuthOutcome {
                account: user.into_account(),
                session: None,
            }),
            SignupResponse::Empty {} => Err(ProviderError::rejected("User creation failed")),
        }
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<AuthOutcome, ProviderError> {
        let body = LoginRequest {
            email: &credentials.email,
            password: &credentials.password,
        };

        let request = self.with_project_key(
            self.client
                .post(self.url("/token"))
                .query(&[("grant_type", "password")])
                .json(&body),
        );
        let response = self.send(request).await?;
        let session = response
            .json::<SessionBody>()
            .await
            .map_err(|_| ProviderError::rejected("Login failed"))?;
        let user = session
            .user
            .ok_or_else(|| ProviderError::rejected("Login failed"))?;

        Ok(AuthOutcome {
            account: user.into_account(),
            session: Some(Session {
                access_token: session.access_token,
                refresh_token: session.refresh_token,
            }),
        })
    }

    async fn invalidate_session(&self, access_token: &str) -> Result<(), ProviderError> {
        let request = self.with_user_token(self.client.post(self.url("/logout")), access_token);
        self.send(request).await?;
        Ok(())
    }

    async fn lookup_account(&self, id: &str) -> Result<Account, ProviderError> {
        let request = self.with_project_key(self.client.get(self.admin_user_url(id)?));
        let response = self.send(request).await?;

        response
            .json::<UserBody>()
            .await
            .map(UserBody::into_account)
            .map_err(|_| ProviderError::rejected("User not found"))
    }

    async fn verify_access_token(&self, token: &str) -> Result<Account, ProviderError> {
        let request = self.with_user_token(self.client.get(self.url("/user")), token);
        let response = self.send(request).await?;

        response
            .json::<UserBody>()
            .await
            .map(UserBody::into_account)
            .map_err(|_| ProviderError::rejected("Invalid token"))
    }
}

#[derive(Debug, Serialize)]
struct SignupRequest<'a> {
    email: &'a str,
    password: &'a str,
    data: Value,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignupResponse {
    Session(SessionBody),
    User(UserBody),
    Empty {},
}

#[derive(Debug, Deserialize)]
struct SessionBody {
    access_token: String,
    refresh_token: String,
    user: Option<UserBody>,
}

#[derive(Debug, Deserialize)]
struct UserBody {
    id: String,
    email: Option<String>,
    #[serde(default)]
    user_metadata: Value,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl UserBody {
    fn into_account(self) -> Account {
        let metadata_str = |key: &str| {
            self.user_metadata
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        let first_name = metadata_str("firstName");
        let last_name = metadata_str("lastName");
        let now = Utc::now();

        Account {
            id: self.id,
            email: self.email.unwrap_or_default(),
            first_name,
            last_name,
            created_at: self.created_at.unwrap_or(now),
            updated_at: self.updated_at.unwrap_or(now),
        }
    }
}

/// Error body shapes the auth API uses across endpoints and versions
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error_code: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl ErrorBody {
    fn message(self) -> Option<String> {
        self.msg
            .or(self.message)
            .or(self.error_description)
            .or(self.error)
            .filter(|m| !m.is_empty())
    }
}

fn transport_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::Unavailable(err.to_string())
    }
}

/// Maps a machine-readable error code to a rejection kind
fn kind_from_code(code: &str) -> Option<RejectionKind> {
    match code {
        "over_request_rate_limit" | "over_email_send_rate_limit" | "over_sms_send_rate_limit" => {
            Some(RejectionKind::RateLimited)
        }
        "user_already_exists" | "email_exists" => Some(RejectionKind::AccountExists),
        _ => None,
    }
}

async fn rejection_from(response: Response) -> ProviderError {
    let status = response.status();
    let body = match response.text().await {
        Ok(text) => text,
        Err(e) => return transport_error(e),
    };
    let parsed: ErrorBody = serde_json::from_str(&body).unwrap_or_default();
    let code = parsed.error_code.clone();

    let message = parsed.message().unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Identity provider error")
            .to_string()
    });

    let kind = code
        .as_deref()
        .and_then(kind_from_code)
        .or_else(|| (status == StatusCode::TOO_MANY_REQUESTS).then_some(RejectionKind::RateLimited))
        .unwrap_or_else(|| RejectionKind::from_message(&message));

    tracing::debug!(%status, code = ?code, "identity provider rejected request");

    ProviderError::rejected_as(kind, message)
}
