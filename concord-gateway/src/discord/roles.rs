//! Role workflow: request, removal, group requests, approvals and the
//! pending queue.
//!
//! Wizard steps reply ephemerally; only approval requests and their
//! resolved outcomes are posted publicly.

use std::collections::{BTreeMap, HashMap, HashSet};

use serenity::builder::{
    CreateActionRow, CreateButton, CreateEmbed, CreateInputText, CreateInteractionResponse,
    CreateInteractionResponseMessage, CreateMessage, CreateModal, CreateSelectMenu,
    CreateSelectMenuKind, CreateSelectMenuOption,
};
use serenity::model::application::{
    ButtonStyle, ComponentInteraction, ComponentInteractionDataKind, InputTextStyle,
    ModalInteraction,
};
use serenity::model::channel::GuildChannel;
use serenity::model::guild::Role;
use serenity::model::id::{ChannelId, GuildId, MessageId, RoleId, UserId};
use serenity::model::Timestamp;
use serenity::prelude::*;
use tracing::{error, info, warn};

use concord_db::{
    DbError, RequestStatus, RequestType, RoleGroup, RoleGroupRepository, RoleRef, RoleRequest,
    RoleRequestRepository,
};

use crate::state::AppState;

use super::intent::{ComponentIntent, ModalIntent};
use super::replies::{
    self, ERROR_EMBED_COLOR, INFO_EMBED_COLOR, SUCCESS_EMBED_COLOR, modal_field,
};
use super::router::HandlerResult;

/// Discord caps select menus at 25 options
const MAX_SELECT_OPTIONS: usize = 25;
/// Requesters shown in one pending-queue embed
const MAX_PENDING_USERS: usize = 8;

fn mention_user(id: &str) -> String {
    format!("<@{id}>")
}

fn mention_role(id: &str) -> String {
    format!("<@&{id}>")
}

/// Roles a member may ask for: not managed by an integration, not @everyone
fn assignable_roles(roles: &HashMap<RoleId, Role>, guild_id: GuildId) -> Vec<&Role> {
    let everyone = RoleId::new(guild_id.get());
    let mut out: Vec<&Role> = roles
        .values()
        .filter(|r| !r.managed && r.id != everyone)
        .collect();
    out.sort_by(|a, b| a.name.cmp(&b.name));
    out
}

/// First text channel whose name suggests a staff room, falling back to the
/// system channel and then any text channel.
async fn find_staff_channel(ctx: &Context, guild_id: GuildId) -> Option<ChannelId> {
    let channels = guild_id.channels(&ctx.http).await.ok()?;
    let mut text_channels: Vec<&GuildChannel> = channels
        .values()
        .filter(|c| c.kind == serenity::model::channel::ChannelType::Text)
        .collect();
    text_channels.sort_by_key(|c| c.position);

    for keyword in ["admin", "staff", "mod"] {
        if let Some(channel) = text_channels
            .iter()
            .find(|c| c.name.to_lowercase().contains(keyword))
        {
            return Some(channel.id);
        }
    }

    if let Ok(guild) = guild_id.to_partial_guild(&ctx.http).await {
        if let Some(system) = guild.system_channel_id {
            return Some(system);
        }
    }

    text_channels.first().map(|c| c.id)
}

/// Best-effort DM; users with closed DMs are silently skipped
async fn dm_user(ctx: &Context, user_id: UserId, text: &str) {
    if let Ok(dm) = user_id.create_dm_channel(&ctx.http).await {
        let _ = dm.say(&ctx.http, text).await;
    }
}

/// Best-effort delete of an approval post recorded on a request.
///
/// The post lives in the channel stored with the request (removal requests
/// are posted to a staff channel, not where the wizard ran); the fallback
/// only covers rows written before the channel was recorded.
async fn delete_request_message(ctx: &Context, fallback: ChannelId, request: &RoleRequest) {
    let channel_id = request_post_channel(request, fallback);
    if let Some(message_id) = &request.message_id {
        if let Ok(id) = message_id.parse::<u64>() {
            let _ = channel_id
                .delete_message(&ctx.http, MessageId::new(id))
                .await;
        }
    }
}

/// Channel the approval post for a request lives in
fn request_post_channel(request: &RoleRequest, fallback: ChannelId) -> ChannelId {
    request
        .channel_id
        .as_deref()
        .and_then(|c| c.parse::<u64>().ok())
        .map(ChannelId::new)
        .unwrap_or(fallback)
}

/// A group may be gated behind a role the member must already hold
fn missing_required_role(group: &RoleGroup, member_roles: &HashSet<String>) -> bool {
    group
        .required_role_id
        .as_ref()
        .is_some_and(|id| !member_roles.contains(id))
}

// ---------------------------------------------------------------------------
// Individual request path
// ---------------------------------------------------------------------------

/// "Request a role" button: open the search modal
pub(super) async fn open_role_search(
    ctx: &Context,
    component: &ComponentInteraction,
    owner: UserId,
) -> HandlerResult {
    let input = CreateInputText::new(InputTextStyle::Short, "Role name", "query")
        .placeholder("Part of the role name, e.g. mod")
        .required(true);
    let modal = CreateModal::new(ModalIntent::RoleSearch { owner }.encode(), "Find a role")
        .components(vec![CreateActionRow::InputText(input)]);

    component
        .create_response(&ctx.http, CreateInteractionResponse::Modal(modal))
        .await?;
    Ok(())
}

/// Search modal submitted: show matching roles in a select menu
pub(super) async fn handle_role_search_modal(
    ctx: &Context,
    modal: &ModalInteraction,
    guild_id: GuildId,
    owner: UserId,
) -> HandlerResult {
    let Some(query) = modal_field(modal, "query") else {
        modal
            .create_response(&ctx.http, replies::ephemeral_text("Search text cannot be empty."))
            .await?;
        return Ok(());
    };

    let roles = guild_id.roles(&ctx.http).await?;
    let needle = query.trim().to_lowercase();
    let matches: Vec<&Role> = assignable_roles(&roles, guild_id)
        .into_iter()
        .filter(|r| r.name.to_lowercase().contains(&needle))
        .take(MAX_SELECT_OPTIONS)
        .collect();

    if matches.is_empty() {
        modal
            .create_response(
                &ctx.http,
                replies::ephemeral_text(format!("No assignable role matches \"{}\".", query.trim())),
            )
            .await?;
        return Ok(());
    }

    let options = matches
        .iter()
        .map(|r| CreateSelectMenuOption::new(r.name.clone(), r.id.to_string()))
        .collect();
    let menu = CreateSelectMenu::new(
        ComponentIntent::RoleSelect { owner }.encode(),
        CreateSelectMenuKind::String { options },
    )
    .placeholder("Pick the role to request");

    modal
        .create_response(
            &ctx.http,
            replies::ephemeral(
                CreateInteractionResponseMessage::new()
                    .content(format!("Roles matching \"{}\":", query.trim()))
                    .select_menu(menu),
            ),
        )
        .await?;
    Ok(())
}

fn selected_string(component: &ComponentInteraction) -> Option<String> {
    match &component.data.kind {
        ComponentInteractionDataKind::StringSelect { values } => values.first().cloned(),
        _ => None,
    }
}

/// Role picked from the search results: persist the request and post it for
/// approval in the current channel.
pub(super) async fn handle_role_select(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
    guild_id: GuildId,
    owner: UserId,
) -> HandlerResult {
    let Some(role_id) = selected_string(component) else {
        return Ok(());
    };

    let roles = guild_id.roles(&ctx.http).await?;
    let Some(role) = role_id.parse::<u64>().ok().and_then(|n| roles.get(&RoleId::new(n))) else {
        component
            .create_response(&ctx.http, replies::ephemeral_text("That role no longer exists."))
            .await?;
        return Ok(());
    };

    let guild = guild_id.to_string();
    let user = owner.to_string();

    let request = match RoleRequestRepository::create(
        state.pool(),
        &user,
        &role_id,
        &guild,
        RequestType::Add,
    )
    .await
    {
        Ok(request) => request,
        Err(DbError::DuplicatePendingRequest { .. }) => {
            component
                .create_response(
                    &ctx.http,
                    replies::update_message(
                        CreateInteractionResponseMessage::new()
                            .content(format!(
                                "You already have a pending request for **{}**.",
                                role.name
                            ))
                            .components(vec![]),
                    ),
                )
                .await?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let embed = CreateEmbed::new()
        .title("Role Request")
        .description(format!(
            "{} requests the {} role.",
            mention_user(&user),
            mention_role(&role_id)
        ))
        .color(INFO_EMBED_COLOR)
        .timestamp(Timestamp::now());
    let buttons = CreateActionRow::Buttons(vec![
        CreateButton::new(ComponentIntent::ApproveRole { requester: owner, role_id: role.id }.encode())
            .label("Approve")
            .style(ButtonStyle::Success),
        CreateButton::new(ComponentIntent::DenyRole { requester: owner, role_id: role.id }.encode())
            .label("Deny")
            .style(ButtonStyle::Danger),
    ]);

    let message = component
        .channel_id
        .send_message(
            &ctx.http,
            CreateMessage::new().embed(embed).components(vec![buttons]),
        )
        .await?;
    RoleRequestRepository::set_approval_message(
        state.pool(),
        &request.id,
        &component.channel_id.to_string(),
        &message.id.to_string(),
    )
    .await?;

    component
        .create_response(
            &ctx.http,
            replies::update_message(
                CreateInteractionResponseMessage::new()
                    .content(format!(
                        "Your request for **{}** was sent to the staff.",
                        role.name
                    ))
                    .components(vec![]),
            ),
        )
        .await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Removal path
// ---------------------------------------------------------------------------

/// "Remove a role" button: select menu of the member's removable roles
pub(super) async fn open_remove_menu(
    ctx: &Context,
    component: &ComponentInteraction,
    guild_id: GuildId,
    owner: UserId,
) -> HandlerResult {
    let member_roles: HashSet<RoleId> = component
        .member
        .as_ref()
        .map(|m| m.roles.iter().copied().collect())
        .unwrap_or_default();

    let roles = guild_id.roles(&ctx.http).await?;
    let removable: Vec<&Role> = assignable_roles(&roles, guild_id)
        .into_iter()
        .filter(|r| member_roles.contains(&r.id))
        .take(MAX_SELECT_OPTIONS)
        .collect();

    if removable.is_empty() {
        component
            .create_response(
                &ctx.http,
                replies::ephemeral_text("You have no removable roles."),
            )
            .await?;
        return Ok(());
    }

    let options = removable
        .iter()
        .map(|r| CreateSelectMenuOption::new(r.name.clone(), r.id.to_string()))
        .collect();
    let menu = CreateSelectMenu::new(
        ComponentIntent::RoleRemoveSelect { owner }.encode(),
        CreateSelectMenuKind::String { options },
    )
    .placeholder("Pick the role to remove");

    component
        .create_response(
            &ctx.http,
            replies::ephemeral(
                CreateInteractionResponseMessage::new()
                    .content("Which role would you like removed?")
                    .select_menu(menu),
            ),
        )
        .await?;
    Ok(())
}

/// Removal target picked: persist and post to the staff channel
pub(super) async fn handle_remove_select(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
    guild_id: GuildId,
    owner: UserId,
) -> HandlerResult {
    let Some(role_id) = selected_string(component) else {
        return Ok(());
    };

    let roles = guild_id.roles(&ctx.http).await?;
    let Some(role) = role_id.parse::<u64>().ok().and_then(|n| roles.get(&RoleId::new(n))) else {
        component
            .create_response(&ctx.http, replies::ephemeral_text("That role no longer exists."))
            .await?;
        return Ok(());
    };

    let guild = guild_id.to_string();
    let user = owner.to_string();

    let request = match RoleRequestRepository::create(
        state.pool(),
        &user,
        &role_id,
        &guild,
        RequestType::Remove,
    )
    .await
    {
        Ok(request) => request,
        Err(DbError::DuplicatePendingRequest { .. }) => {
            component
                .create_response(
                    &ctx.http,
                    replies::update_message(
                        CreateInteractionResponseMessage::new()
                            .content(format!(
                                "A removal request for **{}** is already pending.",
                                role.name
                            ))
                            .components(vec![]),
                    ),
                )
                .await?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    // Removal requests go to the staff, not the channel the wizard ran in
    let Some(staff_channel) = find_staff_channel(ctx, guild_id).await else {
        warn!("No staff channel found in guild {}", guild_id);
        component
            .create_response(
                &ctx.http,
                replies::ephemeral_text("Could not find a channel to post the request in."),
            )
            .await?;
        return Ok(());
    };

    let embed = CreateEmbed::new()
        .title("Role Removal Request")
        .description(format!(
            "{} asks for the {} role to be removed.",
            mention_user(&user),
            mention_role(&role_id)
        ))
        .color(INFO_EMBED_COLOR)
        .timestamp(Timestamp::now());
    let buttons = CreateActionRow::Buttons(vec![
        CreateButton::new(
            ComponentIntent::ApproveRemoval { requester: owner, role_id: role.id }.encode(),
        )
        .label("Approve")
        .style(ButtonStyle::Success),
        CreateButton::new(
            ComponentIntent::DenyRemoval { requester: owner, role_id: role.id }.encode(),
        )
        .label("Deny")
        .style(ButtonStyle::Danger),
    ]);

    let message = staff_channel
        .send_message(
            &ctx.http,
            CreateMessage::new().embed(embed).components(vec![buttons]),
        )
        .await?;
    RoleRequestRepository::set_approval_message(
        state.pool(),
        &request.id,
        &staff_channel.to_string(),
        &message.id.to_string(),
    )
    .await?;

    component
        .create_response(
            &ctx.http,
            replies::update_message(
                CreateInteractionResponseMessage::new()
                    .content(format!(
                        "Your removal request for **{}** was sent to the staff.",
                        role.name
                    ))
                    .components(vec![]),
            ),
        )
        .await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Role list
// ---------------------------------------------------------------------------

/// "My roles" button: current roles plus the requestable groups
pub(super) async fn show_role_list(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
    guild_id: GuildId,
    _owner: UserId,
) -> HandlerResult {
    let member_roles: Vec<RoleId> = component
        .member
        .as_ref()
        .map(|m| m.roles.clone())
        .unwrap_or_default();

    let current = if member_roles.is_empty() {
        "none".to_string()
    } else {
        member_roles
            .iter()
            .map(|id| format!("<@&{id}>"))
            .collect::<Vec<_>>()
            .join(" ")
    };

    let groups = RoleGroupRepository::list_by_guild(state.pool(), &guild_id.to_string()).await?;
    let group_lines = if groups.is_empty() {
        "No role groups are configured.".to_string()
    } else {
        groups
            .iter()
            .map(|g| {
                let desc = g.description.as_deref().unwrap_or("no description");
                let gate = g
                    .required_role_name
                    .as_deref()
                    .map(|name| format!(" (requires {name})"))
                    .unwrap_or_default();
                format!("**{}** ({} roles) - {}{gate}", g.group_name, g.roles.len(), desc)
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let embed = CreateEmbed::new()
        .title("Your Roles")
        .field("Current roles", current, false)
        .field("Requestable groups", group_lines, false)
        .color(INFO_EMBED_COLOR);

    component
        .create_response(
            &ctx.http,
            replies::ephemeral(CreateInteractionResponseMessage::new().embed(embed)),
        )
        .await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Group request path
// ---------------------------------------------------------------------------

/// Group button pressed: diff the group against the member's roles, persist
/// one request per missing role and post a single combined approval message.
pub(super) async fn request_group(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
    guild_id: GuildId,
    owner: UserId,
    group_id: &str,
) -> HandlerResult {
    let Some(group) = RoleGroupRepository::get_by_id(state.pool(), group_id).await? else {
        component
            .create_response(&ctx.http, replies::ephemeral_text("This group no longer exists."))
            .await?;
        return Ok(());
    };

    let member_roles: HashSet<String> = component
        .member
        .as_ref()
        .map(|m| m.roles.iter().map(|r| r.to_string()).collect())
        .unwrap_or_default();

    if missing_required_role(&group, &member_roles) {
        let gate = group
            .required_role_id
            .as_deref()
            .map(mention_role)
            .unwrap_or_default();
        component
            .create_response(
                &ctx.http,
                replies::ephemeral_text(format!(
                    "The **{}** group is reserved for members holding {gate}.",
                    group.group_name
                )),
            )
            .await?;
        return Ok(());
    }

    let guild_roles = guild_id.roles(&ctx.http).await?;
    let (missing, already_have) = group_role_diff(&group.roles, &member_roles);
    // Drop roles that were deleted from the guild since the group was built
    let missing: Vec<&RoleRef> = missing
        .into_iter()
        .filter(|r| {
            r.id.parse::<u64>()
                .is_ok_and(|n| guild_roles.contains_key(&RoleId::new(n)))
        })
        .collect();

    if missing.is_empty() {
        component
            .create_response(
                &ctx.http,
                replies::ephemeral_text(format!(
                    "You already have every role in **{}**.",
                    group.group_name
                )),
            )
            .await?;
        return Ok(());
    }

    let guild = guild_id.to_string();
    let user = owner.to_string();

    // Skip roles that are already pending so nothing is written twice
    let mut created = Vec::new();
    for role in &missing {
        if RoleRequestRepository::find_pending(state.pool(), &user, &role.id, &guild, RequestType::Add)
            .await?
            .is_some()
        {
            continue;
        }
        created.push(
            RoleRequestRepository::create(state.pool(), &user, &role.id, &guild, RequestType::Add)
                .await?,
        );
    }

    if created.is_empty() {
        component
            .create_response(
                &ctx.http,
                replies::ephemeral_text(format!(
                    "Your request for **{}** is already awaiting approval.",
                    group.group_name
                )),
            )
            .await?;
        return Ok(());
    }

    let missing_list = missing
        .iter()
        .map(|r| mention_role(&r.id))
        .collect::<Vec<_>>()
        .join(" ");
    let mut embed = CreateEmbed::new()
        .title("Role Group Request")
        .description(format!(
            "{} requests the **{}** group.",
            mention_user(&user),
            group.group_name
        ))
        .field("Missing roles", missing_list, false)
        .color(INFO_EMBED_COLOR)
        .timestamp(Timestamp::now());
    if !already_have.is_empty() {
        let have_list = already_have
            .iter()
            .map(|r| mention_role(&r.id))
            .collect::<Vec<_>>()
            .join(" ");
        embed = embed.field("Already held", have_list, false);
    }

    // One combined message with two buttons; approval is all-or-nothing
    let buttons = CreateActionRow::Buttons(vec![
        CreateButton::new(
            ComponentIntent::ApproveGroup { requester: owner, group_id: group.id.clone() }.encode(),
        )
        .label("Approve group")
        .style(ButtonStyle::Success),
        CreateButton::new(
            ComponentIntent::DenyGroup { requester: owner, group_id: group.id.clone() }.encode(),
        )
        .label("Deny group")
        .style(ButtonStyle::Danger),
    ]);

    let message = component
        .channel_id
        .send_message(
            &ctx.http,
            CreateMessage::new().embed(embed).components(vec![buttons]),
        )
        .await?;
    for request in &created {
        RoleRequestRepository::set_approval_message(
            state.pool(),
            &request.id,
            &component.channel_id.to_string(),
            &message.id.to_string(),
        )
        .await?;
    }

    component
        .create_response(
            &ctx.http,
            replies::ephemeral_text(format!(
                "Your request for the **{}** group ({} roles) was sent to the staff.",
                group.group_name,
                created.len()
            )),
        )
        .await?;
    Ok(())
}

/// Split a group's role list into (missing, already held) for a member
pub(super) fn group_role_diff<'a>(
    group_roles: &'a [RoleRef],
    member_roles: &HashSet<String>,
) -> (Vec<&'a RoleRef>, Vec<&'a RoleRef>) {
    group_roles
        .iter()
        .partition(|r| !member_roles.contains(&r.id))
}

// ---------------------------------------------------------------------------
// Approve / deny
// ---------------------------------------------------------------------------

fn outcome_embed(title: &str, description: String, approved: bool) -> CreateEmbed {
    CreateEmbed::new()
        .title(title)
        .description(description)
        .color(if approved { SUCCESS_EMBED_COLOR } else { ERROR_EMBED_COLOR })
        .timestamp(Timestamp::now())
}

/// Approve or deny an individual add request.
///
/// The conditional status update claims the request first; a second staff
/// member racing on a stale render is told the request was already handled.
pub(super) async fn resolve_single(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
    guild_id: GuildId,
    requester: UserId,
    role_id: RoleId,
    approve: bool,
) -> HandlerResult {
    let guild = guild_id.to_string();
    let Some(request) = RoleRequestRepository::find_pending(
        state.pool(),
        &requester.to_string(),
        &role_id.to_string(),
        &guild,
        RequestType::Add,
    )
    .await?
    else {
        component
            .create_response(&ctx.http, replies::ephemeral_text("This request no longer exists."))
            .await?;
        return Ok(());
    };

    let status = if approve { RequestStatus::Approved } else { RequestStatus::Denied };
    let claimed = RoleRequestRepository::resolve_if_pending(
        state.pool(),
        &request.id,
        status,
        &component.user.id.to_string(),
        None,
    )
    .await?;
    if !claimed {
        component
            .create_response(
                &ctx.http,
                replies::ephemeral_text("This request was already handled."),
            )
            .await?;
        return Ok(());
    }

    let mut grant_note = String::new();
    if approve {
        if let Err(e) = ctx
            .http
            .add_member_role(guild_id, requester, role_id, Some("Role request approved"))
            .await
        {
            error!("Failed to grant role {} to {}: {}", role_id, requester, e);
            grant_note = "\n\nGranting the role failed; check the bot's role hierarchy.".to_string();
        }
    }

    let (title, verb) = if approve {
        ("Role Request Approved", "approved")
    } else {
        ("Role Request Denied", "denied")
    };
    let embed = outcome_embed(
        title,
        format!(
            "Request by {} for {} was {} by {}.{}",
            mention_user(&request.user_id),
            mention_role(&request.role_id),
            verb,
            mention_user(&component.user.id.to_string()),
            grant_note
        ),
        approve,
    );

    // Terminal state: buttons removed so the transition cannot re-fire
    component
        .create_response(
            &ctx.http,
            replies::update_message(
                CreateInteractionResponseMessage::new()
                    .embed(embed)
                    .components(vec![]),
            ),
        )
        .await?;

    dm_user(
        ctx,
        requester,
        &format!("Your role request in the server was {verb}."),
    )
    .await;
    Ok(())
}

/// Approve or deny a removal request
pub(super) async fn resolve_removal(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
    guild_id: GuildId,
    requester: UserId,
    role_id: RoleId,
    approve: bool,
) -> HandlerResult {
    let guild = guild_id.to_string();
    let Some(request) = RoleRequestRepository::find_pending(
        state.pool(),
        &requester.to_string(),
        &role_id.to_string(),
        &guild,
        RequestType::Remove,
    )
    .await?
    else {
        component
            .create_response(&ctx.http, replies::ephemeral_text("This request no longer exists."))
            .await?;
        return Ok(());
    };

    let status = if approve { RequestStatus::Approved } else { RequestStatus::Denied };
    let claimed = RoleRequestRepository::resolve_if_pending(
        state.pool(),
        &request.id,
        status,
        &component.user.id.to_string(),
        None,
    )
    .await?;
    if !claimed {
        component
            .create_response(
                &ctx.http,
                replies::ephemeral_text("This request was already handled."),
            )
            .await?;
        return Ok(());
    }

    let mut note = String::new();
    if approve {
        if let Err(e) = ctx
            .http
            .remove_member_role(guild_id, requester, role_id, Some("Role removal approved"))
            .await
        {
            error!("Failed to remove role {} from {}: {}", role_id, requester, e);
            note = "\n\nRemoving the role failed; check the bot's role hierarchy.".to_string();
        }
    }

    let (title, verb) = if approve {
        ("Removal Request Approved", "approved")
    } else {
        ("Removal Request Denied", "denied")
    };
    let embed = outcome_embed(
        title,
        format!(
            "Removal of {} for {} was {} by {}.{}",
            mention_role(&request.role_id),
            mention_user(&request.user_id),
            verb,
            mention_user(&component.user.id.to_string()),
            note
        ),
        approve,
    );

    component
        .create_response(
            &ctx.http,
            replies::update_message(
                CreateInteractionResponseMessage::new()
                    .embed(embed)
                    .components(vec![]),
            ),
        )
        .await?;

    dm_user(
        ctx,
        requester,
        &format!("Your role removal request in the server was {verb}."),
    )
    .await;
    Ok(())
}

/// Approve or deny a whole group request.
///
/// Each underlying row is claimed individually; per-role grant failures are
/// collected into the outcome embed instead of aborting the batch.
pub(super) async fn resolve_group(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
    guild_id: GuildId,
    requester: UserId,
    group_id: &str,
    approve: bool,
) -> HandlerResult {
    let group = RoleGroupRepository::get_by_id(state.pool(), group_id).await?;
    let group_name = group
        .as_ref()
        .map(|g| g.group_name.clone())
        .unwrap_or_else(|| "deleted group".to_string());
    let group_role_ids: HashSet<String> = group
        .map(|g| g.roles.into_iter().map(|r| r.id).collect())
        .unwrap_or_default();

    let guild = guild_id.to_string();
    let pending = RoleRequestRepository::find_pending_by_user(
        state.pool(),
        &requester.to_string(),
        &guild,
    )
    .await?;
    let related: Vec<RoleRequest> = pending
        .into_iter()
        .filter(|r| r.request_type == RequestType::Add && group_role_ids.contains(&r.role_id))
        .collect();

    if related.is_empty() {
        component
            .create_response(&ctx.http, replies::ephemeral_text("This request no longer exists."))
            .await?;
        return Ok(());
    }

    let status = if approve { RequestStatus::Approved } else { RequestStatus::Denied };
    let approver = component.user.id.to_string();

    let mut claimed = Vec::new();
    for request in &related {
        if RoleRequestRepository::resolve_if_pending(
            state.pool(),
            &request.id,
            status,
            &approver,
            None,
        )
        .await?
        {
            claimed.push(request);
        }
    }

    if claimed.is_empty() {
        component
            .create_response(
                &ctx.http,
                replies::ephemeral_text("This request was already handled."),
            )
            .await?;
        return Ok(());
    }

    let mut granted = Vec::new();
    let mut failed = Vec::new();
    if approve {
        for request in &claimed {
            let Ok(role_num) = request.role_id.parse::<u64>() else {
                failed.push(request.role_id.clone());
                continue;
            };
            match ctx
                .http
                .add_member_role(
                    guild_id,
                    requester,
                    RoleId::new(role_num),
                    Some("Role group request approved"),
                )
                .await
            {
                Ok(()) => granted.push(request.role_id.clone()),
                Err(e) => {
                    error!("Failed to grant role {} to {}: {}", request.role_id, requester, e);
                    failed.push(request.role_id.clone());
                }
            }
        }
    }

    let (title, verb) = if approve {
        ("Group Request Approved", "approved")
    } else {
        ("Group Request Denied", "denied")
    };
    let mut embed = outcome_embed(
        title,
        format!(
            "Request by {} for the **{}** group was {} by {}.",
            mention_user(&requester.to_string()),
            group_name,
            verb,
            mention_user(&approver)
        ),
        approve,
    );
    if !granted.is_empty() {
        embed = embed.field(
            "Granted",
            granted.iter().map(|r| mention_role(r)).collect::<Vec<_>>().join(" "),
            false,
        );
    }
    if !failed.is_empty() {
        embed = embed.field(
            "Not granted",
            failed.iter().map(|r| mention_role(r)).collect::<Vec<_>>().join(" "),
            false,
        );
    }

    component
        .create_response(
            &ctx.http,
            replies::update_message(
                CreateInteractionResponseMessage::new()
                    .embed(embed)
                    .components(vec![]),
            ),
        )
        .await?;

    dm_user(
        ctx,
        requester,
        &format!("Your request for the **{group_name}** group was {verb}."),
    )
    .await;
    Ok(())
}

// ---------------------------------------------------------------------------
// Pending queue
// ---------------------------------------------------------------------------

fn pending_view(guild_requests: &[RoleRequest], owner: UserId) -> CreateInteractionResponseMessage {
    let mut by_user: BTreeMap<&str, Vec<&RoleRequest>> = BTreeMap::new();
    for request in guild_requests {
        by_user.entry(&request.user_id).or_default().push(request);
    }

    let mut embed = CreateEmbed::new()
        .title("Pending Role Requests")
        .color(INFO_EMBED_COLOR)
        .timestamp(Timestamp::now());

    if by_user.is_empty() {
        embed = embed.description("No pending requests.");
    } else {
        embed = embed.description(format!(
            "{} requests from {} members.",
            guild_requests.len(),
            by_user.len()
        ));
        for (user_id, requests) in by_user.iter().take(MAX_PENDING_USERS) {
            let lines = requests
                .iter()
                .map(|r| format!("{} ({})", mention_role(&r.role_id), r.request_type))
                .collect::<Vec<_>>()
                .join("\n");
            embed = embed.field(mention_user(user_id), lines, true);
        }
        if by_user.len() > MAX_PENDING_USERS {
            embed = embed.field(
                "…",
                format!("{} more members not shown", by_user.len() - MAX_PENDING_USERS),
                false,
            );
        }
    }

    let buttons = CreateActionRow::Buttons(vec![
        CreateButton::new(ComponentIntent::PendingRefresh { owner }.encode())
            .label("Refresh")
            .style(ButtonStyle::Secondary),
        CreateButton::new(ComponentIntent::PendingDelete { owner }.encode())
            .label("Delete one")
            .style(ButtonStyle::Secondary),
        CreateButton::new(ComponentIntent::PendingClear { owner }.encode())
            .label("Clear all")
            .style(ButtonStyle::Danger),
    ]);

    CreateInteractionResponseMessage::new()
        .embed(embed)
        .components(vec![buttons])
}

/// Pending queue, grouped by requester
pub(super) async fn show_pending(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
    guild_id: GuildId,
    owner: UserId,
    refresh: bool,
) -> HandlerResult {
    let requests =
        RoleRequestRepository::find_pending_by_guild(state.pool(), &guild_id.to_string()).await?;
    let message = pending_view(&requests, owner);

    let response = if refresh {
        replies::update_message(message)
    } else {
        replies::ephemeral(message)
    };
    component.create_response(&ctx.http, response).await?;
    Ok(())
}

/// Clear the guild's entire pending queue, best-effort deleting the
/// originating approval posts.
pub(super) async fn clear_pending(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
    guild_id: GuildId,
) -> HandlerResult {
    let guild = guild_id.to_string();
    let requests = RoleRequestRepository::find_pending_by_guild(state.pool(), &guild).await?;
    for request in &requests {
        delete_request_message(ctx, component.channel_id, request).await;
    }

    let cleared = RoleRequestRepository::delete_pending_by_guild(state.pool(), &guild).await?;
    info!("Cleared pending queue in guild {}", guild);

    component
        .create_response(
            &ctx.http,
            replies::update_message(
                CreateInteractionResponseMessage::new()
                    .content(format!("Cleared {cleared} pending requests."))
                    .embeds(vec![])
                    .components(vec![]),
            ),
        )
        .await?;
    Ok(())
}

/// "Delete one" button: select menu of individual pending entries
pub(super) async fn open_pending_delete(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
    guild_id: GuildId,
    owner: UserId,
) -> HandlerResult {
    let requests =
        RoleRequestRepository::find_pending_by_guild(state.pool(), &guild_id.to_string()).await?;
    if requests.is_empty() {
        component
            .create_response(&ctx.http, replies::ephemeral_text("No pending requests to delete."))
            .await?;
        return Ok(());
    }

    let roles = guild_id.roles(&ctx.http).await.unwrap_or_default();
    let options = requests
        .iter()
        .take(MAX_SELECT_OPTIONS)
        .map(|r| {
            let role_name = r
                .role_id
                .parse::<u64>()
                .ok()
                .and_then(|n| roles.get(&RoleId::new(n)))
                .map(|role| role.name.clone())
                .unwrap_or_else(|| format!("role {}", r.role_id));
            CreateSelectMenuOption::new(
                format!("{} · {} · user {}", r.request_type, role_name, r.user_id),
                r.id.clone(),
            )
        })
        .collect();
    let menu = CreateSelectMenu::new(
        ComponentIntent::PendingDeleteSelect { owner }.encode(),
        CreateSelectMenuKind::String { options },
    )
    .placeholder("Pick the request to delete");

    component
        .create_response(
            &ctx.http,
            replies::update_message(
                CreateInteractionResponseMessage::new()
                    .content("Which pending request should be deleted?")
                    .embeds(vec![])
                    .components(vec![CreateActionRow::SelectMenu(menu)]),
            ),
        )
        .await?;
    Ok(())
}

/// One pending entry picked for deletion
pub(super) async fn handle_pending_delete_select(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
) -> HandlerResult {
    let Some(request_id) = selected_string(component) else {
        return Ok(());
    };

    let Some(request) = RoleRequestRepository::get_by_id(state.pool(), &request_id).await? else {
        component
            .create_response(&ctx.http, replies::ephemeral_text("This request no longer exists."))
            .await?;
        return Ok(());
    };

    delete_request_message(ctx, component.channel_id, &request).await;
    RoleRequestRepository::delete(state.pool(), &request.id).await?;

    component
        .create_response(
            &ctx.http,
            replies::update_message(
                CreateInteractionResponseMessage::new()
                    .content("Request deleted.")
                    .components(vec![]),
            ),
        )
        .await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Group administration
// ---------------------------------------------------------------------------

/// "Create group" button: native role multi-select
pub(super) async fn open_group_create(
    ctx: &Context,
    component: &ComponentInteraction,
    owner: UserId,
) -> HandlerResult {
    let menu = CreateSelectMenu::new(
        ComponentIntent::GroupCreateSelect { owner }.encode(),
        CreateSelectMenuKind::Role { default_roles: None },
    )
    .placeholder("Pick the roles for the new group")
    .min_values(1)
    .max_values(MAX_SELECT_OPTIONS as u8);

    component
        .create_response(
            &ctx.http,
            replies::ephemeral(
                CreateInteractionResponseMessage::new()
                    .content("Select the roles the group should contain. A default name is assigned; rename it afterwards.")
                    .select_menu(menu),
            ),
        )
        .await?;
    Ok(())
}

/// Roles picked: create the group under a timestamped default name
pub(super) async fn handle_group_create_select(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
    guild_id: GuildId,
) -> HandlerResult {
    let selected: Vec<RoleId> = match &component.data.kind {
        ComponentInteractionDataKind::RoleSelect { values } => values.clone(),
        _ => return Ok(()),
    };
    if selected.is_empty() {
        return Ok(());
    }

    let guild_roles = guild_id.roles(&ctx.http).await?;
    let roles: Vec<RoleRef> = selected
        .iter()
        .filter_map(|id| {
            guild_roles.get(id).map(|role| RoleRef {
                id: id.to_string(),
                name: role.name.clone(),
            })
        })
        .collect();

    let group_name = format!("NouveauGroupe_{}", chrono::Utc::now().timestamp());
    let group = RoleGroupRepository::create(
        state.pool(),
        &guild_id.to_string(),
        &group_name,
        &roles,
        None,
    )
    .await?;

    let owner = component.user.id;
    let buttons = CreateActionRow::Buttons(vec![
        CreateButton::new(
            ComponentIntent::GroupEditName { owner, group_id: group.id.clone() }.encode(),
        )
        .label("Rename")
        .style(ButtonStyle::Primary),
        CreateButton::new(
            ComponentIntent::GroupEditDesc { owner, group_id: group.id.clone() }.encode(),
        )
        .label("Set description")
        .style(ButtonStyle::Secondary),
        CreateButton::new(
            ComponentIntent::GroupEditRequired { owner, group_id: group.id.clone() }.encode(),
        )
        .label("Require role")
        .style(ButtonStyle::Secondary),
    ]);

    component
        .create_response(
            &ctx.http,
            replies::update_message(
                CreateInteractionResponseMessage::new()
                    .content(format!(
                        "Group **{}** created with {} roles.",
                        group.group_name,
                        roles.len()
                    ))
                    .components(vec![buttons]),
            ),
        )
        .await?;
    Ok(())
}

/// "Manage groups" button: list with inline edit buttons and a delete select
pub(super) async fn open_group_manage(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
    guild_id: GuildId,
    owner: UserId,
) -> HandlerResult {
    let groups = RoleGroupRepository::list_by_guild(state.pool(), &guild_id.to_string()).await?;
    if groups.is_empty() {
        component
            .create_response(&ctx.http, replies::ephemeral_text("No role groups are configured."))
            .await?;
        return Ok(());
    }

    let mut embed = CreateEmbed::new()
        .title("Role Groups")
        .color(INFO_EMBED_COLOR);
    for group in &groups {
        let gate = group
            .required_role_name
            .as_deref()
            .map(|name| format!(" (requires {name})"))
            .unwrap_or_default();
        embed = embed.field(
            &group.group_name,
            format!(
                "{} roles - {}{gate}",
                group.roles.len(),
                group.description.as_deref().unwrap_or("no description")
            ),
            false,
        );
    }

    // Inline edit buttons for the first few groups; deletion covers them all
    let mut rows: Vec<CreateActionRow> = groups
        .iter()
        .take(4)
        .map(|group| {
            CreateActionRow::Buttons(vec![
                CreateButton::new(
                    ComponentIntent::GroupEditName { owner, group_id: group.id.clone() }.encode(),
                )
                .label(format!("Rename {}", truncate_label(&group.group_name)))
                .style(ButtonStyle::Secondary),
                CreateButton::new(
                    ComponentIntent::GroupEditDesc { owner, group_id: group.id.clone() }.encode(),
                )
                .label("Describe")
                .style(ButtonStyle::Secondary),
                CreateButton::new(
                    ComponentIntent::GroupEditRequired { owner, group_id: group.id.clone() }
                        .encode(),
                )
                .label("Require role")
                .style(ButtonStyle::Secondary),
            ])
        })
        .collect();

    let options = groups
        .iter()
        .take(MAX_SELECT_OPTIONS)
        .map(|g| CreateSelectMenuOption::new(g.group_name.clone(), g.id.clone()))
        .collect();
    rows.push(CreateActionRow::SelectMenu(
        CreateSelectMenu::new(
            ComponentIntent::GroupDeleteSelect { owner }.encode(),
            CreateSelectMenuKind::String { options },
        )
        .placeholder("Delete a group"),
    ));

    component
        .create_response(
            &ctx.http,
            replies::update_message(
                CreateInteractionResponseMessage::new()
                    .embed(embed)
                    .components(rows),
            ),
        )
        .await?;
    Ok(())
}

/// Button labels are capped at 80 characters
fn truncate_label(name: &str) -> String {
    if name.chars().count() > 60 {
        let prefix: String = name.chars().take(57).collect();
        format!("{prefix}...")
    } else {
        name.to_string()
    }
}

/// Group picked in the delete select
pub(super) async fn handle_group_delete_select(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
) -> HandlerResult {
    let Some(group_id) = selected_string(component) else {
        return Ok(());
    };

    let Some(group) = RoleGroupRepository::get_by_id(state.pool(), &group_id).await? else {
        component
            .create_response(&ctx.http, replies::ephemeral_text("This group no longer exists."))
            .await?;
        return Ok(());
    };

    RoleGroupRepository::delete(state.pool(), &group.id).await?;

    component
        .create_response(
            &ctx.http,
            replies::update_message(
                CreateInteractionResponseMessage::new()
                    .content(format!("Group **{}** deleted.", group.group_name))
                    .embeds(vec![])
                    .components(vec![]),
            ),
        )
        .await?;
    Ok(())
}

/// "Rename" button: modal pre-filled with the current name
pub(super) async fn open_group_rename(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
    owner: UserId,
    group_id: &str,
) -> HandlerResult {
    let Some(group) = RoleGroupRepository::get_by_id(state.pool(), group_id).await? else {
        component
            .create_response(&ctx.http, replies::ephemeral_text("This group no longer exists."))
            .await?;
        return Ok(());
    };

    let input = CreateInputText::new(InputTextStyle::Short, "Group name", "name")
        .value(group.group_name)
        .required(true);
    let modal = CreateModal::new(
        ModalIntent::GroupNameInput { owner, group_id: group_id.to_string() }.encode(),
        "Rename group",
    )
    .components(vec![CreateActionRow::InputText(input)]);

    component
        .create_response(&ctx.http, CreateInteractionResponse::Modal(modal))
        .await?;
    Ok(())
}

/// "Set description" button: modal pre-filled with the current description
pub(super) async fn open_group_redescribe(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
    owner: UserId,
    group_id: &str,
) -> HandlerResult {
    let Some(group) = RoleGroupRepository::get_by_id(state.pool(), group_id).await? else {
        component
            .create_response(&ctx.http, replies::ephemeral_text("This group no longer exists."))
            .await?;
        return Ok(());
    };

    let mut input = CreateInputText::new(InputTextStyle::Paragraph, "Description", "description")
        .required(false);
    if let Some(description) = group.description {
        input = input.value(description);
    }
    let modal = CreateModal::new(
        ModalIntent::GroupDescInput { owner, group_id: group_id.to_string() }.encode(),
        "Describe group",
    )
    .components(vec![CreateActionRow::InputText(input)]);

    component
        .create_response(&ctx.http, CreateInteractionResponse::Modal(modal))
        .await?;
    Ok(())
}

/// Rename modal submitted
pub(super) async fn handle_group_rename_modal(
    state: &AppState,
    ctx: &Context,
    modal: &ModalInteraction,
    group_id: &str,
) -> HandlerResult {
    let Some(name) = modal_field(modal, "name") else {
        modal
            .create_response(&ctx.http, replies::ephemeral_text("Group name cannot be empty."))
            .await?;
        return Ok(());
    };
    let name = name.trim().to_string();

    match RoleGroupRepository::update_name(state.pool(), group_id, &name).await {
        Ok(()) => {
            modal
                .create_response(
                    &ctx.http,
                    replies::ephemeral_text(format!("Group renamed to **{name}**.")),
                )
                .await?;
        }
        Err(DbError::DuplicateGroupName(_)) => {
            modal
                .create_response(
                    &ctx.http,
                    replies::ephemeral_text(format!(
                        "A group named **{name}** already exists in this server."
                    )),
                )
                .await?;
        }
        Err(DbError::GroupNotFound(_)) => {
            modal
                .create_response(&ctx.http, replies::ephemeral_text("This group no longer exists."))
                .await?;
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// "Require role" button: single role select gating who may request the group
pub(super) async fn open_group_required(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
    owner: UserId,
    group_id: &str,
) -> HandlerResult {
    let Some(group) = RoleGroupRepository::get_by_id(state.pool(), group_id).await? else {
        component
            .create_response(&ctx.http, replies::ephemeral_text("This group no longer exists."))
            .await?;
        return Ok(());
    };

    let current = group
        .required_role_name
        .map(|name| format!(" Currently required: **{name}**."))
        .unwrap_or_default();
    let menu = CreateSelectMenu::new(
        ComponentIntent::GroupRequiredSelect { owner, group_id: group_id.to_string() }.encode(),
        CreateSelectMenuKind::Role { default_roles: None },
    )
    .placeholder("Role members must already hold")
    .min_values(0)
    .max_values(1);

    component
        .create_response(
            &ctx.http,
            replies::ephemeral(
                CreateInteractionResponseMessage::new()
                    .content(format!(
                        "Pick the role members must already hold to request **{}**. \
                         Submitting with nothing selected removes the requirement.{current}",
                        group.group_name
                    ))
                    .select_menu(menu),
            ),
        )
        .await?;
    Ok(())
}

/// Requirement picked; an empty selection clears the gate
pub(super) async fn handle_group_required_select(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
    guild_id: GuildId,
    group_id: &str,
) -> HandlerResult {
    let selected: Vec<RoleId> = match &component.data.kind {
        ComponentInteractionDataKind::RoleSelect { values } => values.clone(),
        _ => return Ok(()),
    };

    let Some(group) = RoleGroupRepository::get_by_id(state.pool(), group_id).await? else {
        component
            .create_response(&ctx.http, replies::ephemeral_text("This group no longer exists."))
            .await?;
        return Ok(());
    };

    let reply = match selected.first() {
        Some(role_id) => {
            let guild_roles = guild_id.roles(&ctx.http).await?;
            let role_name = guild_roles
                .get(role_id)
                .map(|role| role.name.clone())
                .unwrap_or_else(|| role_id.to_string());
            let role = role_id.to_string();
            RoleGroupRepository::set_required_role(
                state.pool(),
                &group.id,
                Some((role.as_str(), role_name.as_str())),
            )
            .await?;
            format!(
                "Members now need {} to request **{}**.",
                mention_role(&role),
                group.group_name
            )
        }
        None => {
            RoleGroupRepository::set_required_role(state.pool(), &group.id, None).await?;
            format!("Requirement removed from **{}**.", group.group_name)
        }
    };

    component
        .create_response(
            &ctx.http,
            replies::update_message(
                CreateInteractionResponseMessage::new()
                    .content(reply)
                    .components(vec![]),
            ),
        )
        .await?;
    Ok(())
}

/// Description modal submitted; an empty field clears the description
pub(super) async fn handle_group_redescribe_modal(
    state: &AppState,
    ctx: &Context,
    modal: &ModalInteraction,
    group_id: &str,
) -> HandlerResult {
    let description = modal_field(modal, "description");
    RoleGroupRepository::update_description(state.pool(), group_id, description.as_deref()).await?;

    let reply = if description.is_some() {
        "Group description updated."
    } else {
        "Group description cleared."
    };
    modal
        .create_response(&ctx.http, replies::ephemeral_text(reply))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role_ref(id: &str, name: &str) -> RoleRef {
        RoleRef { id: id.to_string(), name: name.to_string() }
    }

    #[test]
    fn group_diff_partitions_missing_and_held() {
        let group = vec![role_ref("a", "A"), role_ref("b", "B"), role_ref("c", "C")];
        let member: HashSet<String> = ["b".to_string()].into_iter().collect();

        let (missing, held) = group_role_diff(&group, &member);
        let missing_ids: Vec<&str> = missing.iter().map(|r| r.id.as_str()).collect();
        let held_ids: Vec<&str> = held.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(missing_ids, vec!["a", "c"]);
        assert_eq!(held_ids, vec!["b"]);
    }

    #[test]
    fn group_diff_short_circuit_case() {
        let group = vec![role_ref("a", "A"), role_ref("b", "B")];
        let member: HashSet<String> =
            ["a".to_string(), "b".to_string()].into_iter().collect();

        let (missing, held) = group_role_diff(&group, &member);
        assert!(missing.is_empty());
        assert_eq!(held.len(), 2);
    }

    fn group(required_role_id: Option<&str>) -> RoleGroup {
        RoleGroup {
            id: "rg_1".to_string(),
            guild_id: "g1".to_string(),
            group_name: "Staff".to_string(),
            roles: vec![role_ref("a", "A")],
            required_role_id: required_role_id.map(str::to_string),
            required_role_name: required_role_id.map(|_| "Member".to_string()),
            description: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn required_role_gates_members_without_it() {
        let member: HashSet<String> = ["b".to_string()].into_iter().collect();

        assert!(missing_required_role(&group(Some("r9")), &member));
        assert!(!missing_required_role(&group(None), &member));

        let holder: HashSet<String> = ["r9".to_string()].into_iter().collect();
        assert!(!missing_required_role(&group(Some("r9")), &holder));
    }

    #[test]
    fn approval_posts_delete_from_their_recorded_channel() {
        let mut request = RoleRequest {
            id: "rr_1".to_string(),
            user_id: "u1".to_string(),
            role_id: "r1".to_string(),
            guild_id: "g1".to_string(),
            request_type: RequestType::Remove,
            status: RequestStatus::Pending,
            channel_id: Some("555".to_string()),
            message_id: Some("9".to_string()),
            approver_id: None,
            approval_reason: None,
            created_at: 0,
            updated_at: 0,
        };

        // Removal posts live in the staff channel, not wherever the pending
        // queue UI happens to run.
        assert_eq!(
            request_post_channel(&request, ChannelId::new(1)),
            ChannelId::new(555)
        );

        request.channel_id = None;
        assert_eq!(
            request_post_channel(&request, ChannelId::new(1)),
            ChannelId::new(1)
        );
    }

    #[test]
    fn labels_are_truncated() {
        assert_eq!(truncate_label("short"), "short");
        let long = "x".repeat(80);
        let truncated = truncate_label(&long);
        assert_eq!(truncated.chars().count(), 60);
        assert!(truncated.ends_with("..."));
    }
}
