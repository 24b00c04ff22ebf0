//! Slash command entry points: the role menu, the ticket admin menu and the
//! public stats overview.

use std::time::Duration;

use serenity::builder::{
    CreateActionRow, CreateButton, CreateEmbed, CreateInteractionResponse,
    CreateInteractionResponseMessage,
};
use serenity::model::Timestamp;
use serenity::model::application::{ButtonStyle, CommandInteraction};
use serenity::model::id::UserId;
use serenity::prelude::*;

use concord_db::{
    RoleGroupRepository, RoleRequestRepository, TicketCategoryRepository, TicketRepository,
};

use crate::state::AppState;

use super::intent::ComponentIntent;
use super::replies::{self, INFO_EMBED_COLOR};
use super::router::HandlerResult;

/// `/role`: ephemeral menu for the invoking member.
///
/// Staff rows are only rendered for members who could use them; the guard
/// still enforces access when the buttons are pressed.
pub(super) async fn open_role_menu(
    state: &AppState,
    ctx: &Context,
    command: &CommandInteraction,
) -> HandlerResult {
    let Some(guild_id) = command.guild_id else {
        command
            .create_response(
                &ctx.http,
                replies::ephemeral_text("This command only works in a server."),
            )
            .await?;
        return Ok(());
    };

    let owner = command.user.id;
    let permissions = command
        .member
        .as_ref()
        .and_then(|m| m.permissions)
        .unwrap_or_default();

    let embed = CreateEmbed::new()
        .title("Role Management")
        .description(
            "Request a role, ask for one to be removed, or review what you already have.\n\
             Every request is sent to the staff for approval.",
        )
        .color(INFO_EMBED_COLOR);

    let mut rows = vec![CreateActionRow::Buttons(vec![
        CreateButton::new(ComponentIntent::RoleRequestMenu { owner }.encode())
            .label("Request a role")
            .style(ButtonStyle::Primary),
        CreateButton::new(ComponentIntent::RoleRemoveMenu { owner }.encode())
            .label("Remove a role")
            .style(ButtonStyle::Secondary),
        CreateButton::new(ComponentIntent::RoleListMenu { owner }.encode())
            .label("My roles")
            .style(ButtonStyle::Secondary),
    ])];

    // One button per requestable group, five per row
    let groups = RoleGroupRepository::list_by_guild(state.pool(), &guild_id.to_string()).await?;
    for chunk in groups.chunks(5).take(2) {
        let buttons = chunk
            .iter()
            .map(|group| {
                CreateButton::new(
                    ComponentIntent::RoleGroupRequest {
                        owner,
                        group_id: group.id.clone(),
                    }
                    .encode(),
                )
                .label(format!("Group: {}", group.group_name))
                .style(ButtonStyle::Secondary)
            })
            .collect();
        rows.push(CreateActionRow::Buttons(buttons));
    }

    let mut staff_buttons = Vec::new();
    if permissions.manage_roles() || permissions.administrator() {
        staff_buttons.push(
            CreateButton::new(ComponentIntent::PendingRequests { owner }.encode())
                .label("Pending requests")
                .style(ButtonStyle::Primary),
        );
    }
    if permissions.administrator() {
        staff_buttons.push(
            CreateButton::new(ComponentIntent::GroupCreate { owner }.encode())
                .label("Create group")
                .style(ButtonStyle::Success),
        );
        staff_buttons.push(
            CreateButton::new(ComponentIntent::GroupManage { owner }.encode())
                .label("Manage groups")
                .style(ButtonStyle::Secondary),
        );
    }
    if !staff_buttons.is_empty() {
        rows.push(CreateActionRow::Buttons(staff_buttons));
    }

    command
        .create_response(
            &ctx.http,
            replies::ephemeral(
                CreateInteractionResponseMessage::new()
                    .embed(embed)
                    .components(rows),
            ),
        )
        .await?;
    Ok(())
}

/// Build the ticket administration menu (also used by the back button)
pub(super) fn ticket_menu_message(owner: UserId) -> CreateInteractionResponseMessage {
    let embed = CreateEmbed::new()
        .title("Ticket Administration")
        .description(
            "Manage the ticket system: panels, categories and statistics.\n\
             Members open tickets through the buttons on a panel.",
        )
        .color(INFO_EMBED_COLOR);

    CreateInteractionResponseMessage::new()
        .embed(embed)
        .components(vec![
            CreateActionRow::Buttons(vec![
                CreateButton::new(ComponentIntent::TicketCreatePanel { owner }.encode())
                    .label("Create panel")
                    .style(ButtonStyle::Primary),
                CreateButton::new(ComponentIntent::TicketManageCategories { owner }.encode())
                    .label("Manage categories")
                    .style(ButtonStyle::Secondary),
                CreateButton::new(ComponentIntent::TicketCustomize { owner }.encode())
                    .label("Customize panel")
                    .style(ButtonStyle::Secondary),
            ]),
            CreateActionRow::Buttons(vec![
                CreateButton::new(ComponentIntent::TicketStats { owner }.encode())
                    .label("Statistics")
                    .style(ButtonStyle::Secondary),
                CreateButton::new(ComponentIntent::TicketListPanels { owner }.encode())
                    .label("List panels")
                    .style(ButtonStyle::Secondary),
                CreateButton::new(ComponentIntent::TicketDeletePanel { owner }.encode())
                    .label("Delete panel")
                    .style(ButtonStyle::Danger),
            ]),
        ])
}

/// `/ticket`: ephemeral admin menu, gated on Manage Channels
pub(super) async fn open_ticket_menu(ctx: &Context, command: &CommandInteraction) -> HandlerResult {
    if command.guild_id.is_none() {
        command
            .create_response(
                &ctx.http,
                replies::ephemeral_text("This command only works in a server."),
            )
            .await?;
        return Ok(());
    }

    let permissions = command
        .member
        .as_ref()
        .and_then(|m| m.permissions)
        .unwrap_or_default();
    if !permissions.manage_channels() && !permissions.administrator() {
        command
            .create_response(
                &ctx.http,
                replies::ephemeral_text(
                    "You need the Manage Channels permission to administer tickets.",
                ),
            )
            .await?;
        return Ok(());
    }

    command
        .create_response(
            &ctx.http,
            replies::ephemeral(ticket_menu_message(command.user.id)),
        )
        .await?;
    Ok(())
}

/// `/info`: public overview of the bot and the server's workload
pub(super) async fn show_info(
    state: &AppState,
    ctx: &Context,
    command: &CommandInteraction,
) -> HandlerResult {
    let Some(guild_id) = command.guild_id else {
        command
            .create_response(
                &ctx.http,
                replies::ephemeral_text("This command only works in a server."),
            )
            .await?;
        return Ok(());
    };

    let guild = guild_id.to_string();
    let tickets = TicketRepository::stats_by_guild(state.pool(), &guild).await?;
    let categories = TicketCategoryRepository::list_by_guild(state.pool(), &guild).await?;
    let groups = RoleGroupRepository::list_by_guild(state.pool(), &guild).await?;
    let pending = RoleRequestRepository::find_pending_by_guild(state.pool(), &guild).await?;

    let embed = CreateEmbed::new()
        .title("Concord")
        .color(INFO_EMBED_COLOR)
        .field("Uptime", format_uptime(state.uptime()), true)
        .field(
            "Tickets",
            format!("{} open / {} total", tickets.open, tickets.total()),
            true,
        )
        .field("Ticket categories", categories.len().to_string(), true)
        .field("Role groups", groups.len().to_string(), true)
        .field("Pending role requests", pending.len().to_string(), true)
        .timestamp(Timestamp::now());

    // Informational, so visible to everyone in the channel
    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new().embed(embed),
            ),
        )
        .await?;
    Ok(())
}

fn format_uptime(uptime: Duration) -> String {
    let secs = uptime.as_secs();
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;
    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uptime_renders_largest_unit_first() {
        assert_eq!(format_uptime(Duration::from_secs(30)), "0m");
        assert_eq!(format_uptime(Duration::from_secs(61 * 60)), "1h 1m");
        assert_eq!(
            format_uptime(Duration::from_secs(2 * 86_400 + 3 * 3_600 + 4 * 60)),
            "2d 3h 4m"
        );
    }
}
