//! Server binary: configuration, logging, storage, seed, serve.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use uniunity_backend::config::{Config, DEFAULT_ADMIN_PASSWORD};
use uniunity_backend::db::Repository;
use uniunity_backend::models::defaults;
use uniunity_backend::{auth, create_router, db, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting UniUnity backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Wait for storage; authentication is not ready until the seed completes
    let pool = db::connect_with_retry(&config.db_path).await;
    let repo = Arc::new(Repository::new(pool));

    let password_hash = auth::hash_password(DEFAULT_ADMIN_PASSWORD)?;
    if repo.seed_admin(defaults::ADMIN_USERNAME, &password_hash).await? {
        tracing::info!("Seeded default admin credential");
    }

    // Create application state
    let state = AppState {
        repo,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
