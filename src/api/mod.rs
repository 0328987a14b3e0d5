// API layer module (adapters for controllers)
// Follows Hexagonal Architecture - API is an adapter

pub mod envelope;
pub mod errors;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::domain::provider::IdentityProvider;
use handlers::{auth, root};

/// Shared state handed to every handler
///
/// The provider client is built once at startup and shared read-only.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn IdentityProvider>,
}

impl AppState {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }
}

/// Builds the full application router
///
/// Protected routes sit behind `require_auth`, which always runs before
/// the handler.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/logout", post(auth::logout))
        .route("/profile", get(auth::profile))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    let auth_routes = Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .merge(protected);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/",
            get(root::root).route_layer(from_fn_with_state(
                state.clone(),
                middleware::optional_auth,
            )),
        )
        .nest("/auth", auth_routes)
        .fallback(root::not_found)
        .method_not_allowed_fallback(root::method_not_allowed)
        .layer(CatchPanicLayer::custom(root::handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
