use async_trait::async_trait;
use thiserror::Error;

use crate::domain::account::{Account, AuthOutcome, Credentials, Registration};

/// What kind of rejection the provider reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    RateLimited,
    AccountExists,
    Unclassified,
}

impl RejectionKind {
    /// Classifies a rejection from the provider's free-text message.
    ///
    /// Last resort only: adapters should prefer a structured error code
    /// when the provider sends one.
    pub fn from_message(message: &str) -> Self {
        if message.contains("rate limit") {
            Self::RateLimited
        } else if message.contains("already exists") {
            Self::AccountExists
        } else {
            Self::Unclassified
        }
    }
}

/// Failure surfaced by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("{message}")]
    Rejected { kind: RejectionKind, message: String },

    #[error("identity provider timed out")]
    Timeout,

    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

impl ProviderError {
    /// Builds a rejection, classifying it from the message text
    pub fn rejected(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::Rejected {
            kind: RejectionKind::from_message(&message),
            message,
        }
    }

    /// Builds a rejection whose kind is already known
    pub fn rejected_as(kind: RejectionKind, message: impl Into<String>) -> Self {
        Self::Rejected {
            kind,
            message: message.into(),
        }
    }
}

/// Port to the external identity provider
///
/// Every credential operation is delegated through this trait. The
/// production adapter talks to the hosted auth API; tests substitute a
/// double.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account, returning it together with a session when the
    /// provider issues one immediately
    async fn create_account(&self, registration: &Registration)
        -> Result<AuthOutcome, ProviderError>;

    /// Exchange email and password for an account and session
    async fn authenticate(&self, credentials: &Credentials) -> Result<AuthOutcome, ProviderError>;

    /// Revoke the session the access token belongs to
    async fn invalidate_session(&self, access_token: &str) -> Result<(), ProviderError>;

    /// Find an account by its provider identifier
    async fn lookup_account(&self, id: &str) -> Result<Account, ProviderError>;

    /// Resolve an access token to the account it was issued for
    async fn verify_access_token(&self, token: &str) -> Result<Account, ProviderError>;
}
