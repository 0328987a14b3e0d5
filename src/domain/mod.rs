// Domain layer module exports
// Following Hexagonal Architecture
// The identity provider is a port; adapters live in infrastructure

pub mod account;
pub mod provider;

pub use account::{Account, AuthOutcome, Credentials, Registration, Session};
pub use provider::{IdentityProvider, ProviderError, RejectionKind};
