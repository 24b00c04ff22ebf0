use std::sync::Arc;

use async_trait::async_trait;
use serenity::builder::CreateCommand;
use serenity::model::application::{Command, Interaction};
use serenity::model::gateway::Ready;
use serenity::model::permissions::Permissions;
use serenity::prelude::*;
use tracing::{error, info};

use crate::state::AppState;

/// Discord bot handler
///
/// All interaction traffic funnels through `interaction_create`; the router
/// in `router.rs` parses the intent and dispatches to the workflow handlers.
pub struct Bot {
    pub(super) state: Arc<AppState>,
}

impl Bot {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}

#[async_trait]
impl EventHandler for Bot {
    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        self.handle_interaction(ctx, interaction).await;
    }

    /// Bot is ready - register slash commands
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("Discord bot connected as {}", ready.user.name);

        let commands = vec![
            CreateCommand::new("role")
                .description("Open the role request menu")
                .dm_permission(false),
            CreateCommand::new("ticket")
                .description("Open the ticket administration menu")
                .default_member_permissions(Permissions::MANAGE_CHANNELS)
                .dm_permission(false),
            CreateCommand::new("info")
                .description("Show bot and server statistics")
                .dm_permission(false),
        ];

        if let Err(e) = Command::set_global_commands(&ctx.http, commands).await {
            error!("Failed to register slash commands: {}", e);
        }
    }
}
