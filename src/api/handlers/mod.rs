pub mod auth;
pub mod root;
