use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use farepool_api::{app, state::{AppState, AuthConfig}};
use farepool_store::{MemoryCache, UserDirectory};
use farepool_workflow::RideWorkflow;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "farepool_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = farepool_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Farepool API on port {}", config.server.port);

    let app_state = AppState {
        workflow: Arc::new(RideWorkflow::new()),
        users: Arc::new(UserDirectory::new()),
        cache: Arc::new(MemoryCache::new()),
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
        listing_ttl: Duration::from_secs(config.cache.listing_ttl_seconds),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
