//! Auth Relay Library
//!
//! HTTP relay for signup, login, logout and profile retrieval. Every
//! credential operation is delegated to an external identity provider;
//! this crate validates requests, forwards them, and reshapes results
//! into a uniform response envelope.

pub mod api;
pub mod config;
pub mod domain;
pub mod infrastructure;
