use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use concord_gateway::discord::start_discord_bot;
use concord_gateway::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = concord_core::Config::from_env()?;

    // Initialize database
    let db = concord_db::ConcordDbPool::new(config.db_path.as_deref()).await?;
    info!("Concord database initialized");

    let state = Arc::new(AppState::new(db));

    let mut client = start_discord_bot(&config.discord_bot_token, state).await?;
    info!("Connecting to the Discord gateway");
    client.start().await?;

    Ok(())
}
