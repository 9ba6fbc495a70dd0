use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use article_service::config::Config;
use article_service::db::Database;
use article_service::fetcher::HttpFetcher;
use article_service::routes::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "article_service=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path =
        std::env::var("ARTICLES_CONFIG").unwrap_or_else(|_| "articles.toml".to_string());
    let mut config = if Path::new(&config_path).exists() {
        info!("Loading configuration from {}", config_path);
        Config::load(&config_path)?
    } else {
        warn!("{} not found, using default configuration", config_path);
        Config::default()
    };
    if let Ok(database_url) = std::env::var("DATABASE_URL") {
        config.database_url = database_url;
    }

    // Initialize database
    let db = Database::new(&config.database_url, config.max_connections).await?;
    db.initialize().await?;
    info!("Database initialized");

    let fetcher = HttpFetcher::new(config.fetch_timeout())?;

    let state = Arc::new(AppState {
        repo: Arc::new(db),
        source: Arc::new(fetcher),
    });
    let app = routes::router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("Server starting on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
