//! Bibliotheca backend - GraphQL gateway for a library catalog
//!
//! Serves books, authors, and users over GraphQL at /graphql, with live
//! bookAdded notifications over /graphql/ws.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bibliotheca::app::{AppState, build_app};
use bibliotheca::config::Config;
use bibliotheca::db::Database;
use bibliotheca::graphql::build_schema;
use bibliotheca::services::{AuthConfig, AuthService, EventBus, EventBusConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(Config::from_env()?);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bibliotheca=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Bibliotheca backend");

    let db = Database::connect(&config.database_url).await?;
    tracing::info!(database = %config.database_url, "Database connected");

    let auth = Arc::new(AuthService::new(
        db.clone(),
        AuthConfig::from_config(&config),
    ));
    let events = Arc::new(EventBus::new(EventBusConfig::default()));

    let schema = build_schema(db.clone(), auth.clone(), events.clone());

    let state = AppState {
        config: config.clone(),
        db,
        schema,
        auth,
        events: events.clone(),
    };
    let router = build_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        "Listening on http://{}; GraphQL playground: http://localhost:{}/graphql",
        addr,
        config.port
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(events))
        .await?;

    tracing::info!("Shut down cleanly");
    Ok(())
}

/// Wait for ctrl-c, then close the event bus so in-flight deliveries drain
/// while no new publishes are accepted
async fn shutdown_signal(events: Arc<EventBus>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
    events.close();
}
