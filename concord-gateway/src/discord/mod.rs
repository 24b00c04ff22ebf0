mod bot;
mod commands;
mod guard;
mod intent;
mod replies;
mod roles;
mod router;
mod tickets;

use std::sync::Arc;

use serenity::prelude::*;
use tracing::info;

pub use bot::Bot;

/// Start the Discord bot
pub async fn start_discord_bot(
    token: &str,
    state: Arc<crate::state::AppState>,
) -> Result<Client, DiscordError> {
    info!("Starting Discord bot...");

    // All traffic is slash commands and component interactions
    let intents = GatewayIntents::GUILDS;

    let bot = Bot::new(state);

    let client = Client::builder(token, intents)
        .event_handler(bot)
        .await
        .map_err(|e| DiscordError::ClientError(e.to_string()))?;

    Ok(client)
}

/// Discord-related errors
#[derive(Debug, thiserror::Error)]
pub enum DiscordError {
    #[error("Failed to create Discord client: {0}")]
    ClientError(String),
}
