use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use recommendations_api::api::{create_router, AppState};
use recommendations_api::config::Config;
use recommendations_api::db::{MemoryStore, PgStore, RecommendationStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn RecommendationStore> = match &config.database_url {
        Some(url) => {
            tracing::info!("using PostgreSQL store");
            Arc::new(PgStore::connect(url).await?)
        }
        None => {
            tracing::info!("no DATABASE_URL configured, using in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    let app = create_router(AppState::new(store));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Recommendations Service listening");
    axum::serve(listener, app).await?;

    Ok(())
}
