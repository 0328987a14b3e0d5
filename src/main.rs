use std::sync::Arc;

use auth_relay::api::{self, AppState};
use auth_relay::config::AppConfig;
use auth_relay::infrastructure::SupabaseIdentityProvider;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("auth_relay=info,tower_http=info")),
        )
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let provider = match SupabaseIdentityProvider::new(
        &config.supabase_url,
        config.supabase_key,
        config.provider_timeout,
    ) {
        Ok(provider) => provider,
        Err(e) => {
            tracing::error!("Failed to build identity provider client: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!(url = %config.supabase_url, "Identity provider configured");

    let app = api::router(AppState::new(Arc::new(provider)));

    // Start server
    let addr = config.bind_addr;
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
