//! Ticket workflow: panel authoring, category authoring, ticket channels
//! and their close lifecycle.
//!
//! Panels are persistent public messages carrying one button per active
//! category. Everything else in this module is staff wizardry or the private
//! ticket channel lifecycle.

use serenity::builder::{
    CreateActionRow, CreateButton, CreateChannel, CreateEmbed, CreateInputText,
    CreateInteractionResponse, CreateInteractionResponseFollowup,
    CreateInteractionResponseMessage, CreateMessage, CreateModal, CreateSelectMenu,
    CreateSelectMenuKind, CreateSelectMenuOption, EditChannel, EditMessage,
};
use serenity::model::application::{
    ButtonStyle, ComponentInteraction, ComponentInteractionDataKind, InputTextStyle,
    ModalInteraction,
};
use serenity::model::channel::{
    ChannelType, PermissionOverwrite, PermissionOverwriteType, ReactionType,
};
use serenity::model::id::{ChannelId, GuildId, MessageId, RoleId, UserId};
use serenity::model::permissions::Permissions;
use serenity::model::Timestamp;
use serenity::prelude::*;
use tracing::{error, info, warn};

use concord_db::{
    CategoryUpdate, DbError, Ticket, TicketCategory, TicketCategoryRepository,
    TicketPanelRepository, TicketRepository, DEFAULT_PANEL_COLOR, sanitize_category_key,
};

use crate::state::AppState;

use super::commands;
use super::intent::{CategoryTarget, ComponentIntent, ModalIntent};
use super::replies::{self, INFO_EMBED_COLOR, SUCCESS_EMBED_COLOR, modal_field};
use super::router::HandlerResult;

/// Discord caps a message at five action rows of five buttons
const MAX_PANEL_BUTTONS: usize = 25;
const BUTTONS_PER_ROW: usize = 5;
const MAX_SELECT_OPTIONS: usize = 25;

/// Map a stored style number onto a Discord button style
fn button_style(style: i64) -> ButtonStyle {
    match style {
        1 => ButtonStyle::Primary,
        3 => ButtonStyle::Success,
        4 => ButtonStyle::Danger,
        _ => ButtonStyle::Secondary,
    }
}

/// Parse `#RRGGBB` (the leading `#` optional) into an embed color
fn parse_hex_color(input: &str) -> Option<i64> {
    let hex = input.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    i64::from_str_radix(hex, 16).ok()
}

/// Normalize a rename into a channel-safe slug: lowercase `[a-z0-9-]`,
/// collapsed dashes. Returns None when nothing survives.
fn sanitize_channel_slug(input: &str) -> Option<String> {
    let mut slug = String::new();
    for c in input.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-').to_string();
    if slug.is_empty() { None } else { Some(slug) }
}

fn truncate_option_label(text: &str) -> String {
    if text.chars().count() > 80 {
        let prefix: String = text.chars().take(77).collect();
        format!("{prefix}...")
    } else {
        text.to_string()
    }
}

fn selected_string(component: &ComponentInteraction) -> Option<String> {
    match &component.data.kind {
        ComponentInteractionDataKind::StringSelect { values } => values.first().cloned(),
        _ => None,
    }
}

fn jump_link(guild_id: &str, channel_id: &str, message_id: &str) -> String {
    format!("https://discord.com/channels/{guild_id}/{channel_id}/{message_id}")
}

/// Requester of the ticket, or anyone holding Manage Channels
fn can_touch_ticket(ticket: &Ticket, user: UserId, permissions: Option<Permissions>) -> bool {
    if ticket.user_id == user.to_string() {
        return true;
    }
    permissions.is_some_and(|p| p.manage_channels() || p.administrator())
}

/// Render a panel message from its stored customization and the guild's
/// active categories.
fn panel_render(
    title: &str,
    description: Option<&str>,
    color: i64,
    categories: &[TicketCategory],
) -> (CreateEmbed, Vec<CreateActionRow>) {
    let embed = CreateEmbed::new()
        .title(title)
        .description(
            description.unwrap_or("Click a button below to open a ticket."),
        )
        .color(color as u32);

    let buttons: Vec<CreateButton> = categories
        .iter()
        .take(MAX_PANEL_BUTTONS)
        .map(|category| {
            let mut button = CreateButton::new(
                ComponentIntent::CreateTicket {
                    category_key: category.category_key.clone(),
                }
                .encode(),
            )
            .label(category.button_label.clone())
            .style(button_style(category.button_style));
            if let Some(emoji) = &category.button_emoji {
                button = button.emoji(ReactionType::Unicode(emoji.clone()));
            }
            button
        })
        .collect();

    let rows = buttons
        .chunks(BUTTONS_PER_ROW)
        .map(|chunk| CreateActionRow::Buttons(chunk.to_vec()))
        .collect();

    (embed, rows)
}

fn back_row(owner: UserId) -> CreateActionRow {
    CreateActionRow::Buttons(vec![
        CreateButton::new(ComponentIntent::TicketBack { owner }.encode())
            .label("Back")
            .style(ButtonStyle::Secondary),
    ])
}

// ---------------------------------------------------------------------------
// Panel creation wizard
// ---------------------------------------------------------------------------

/// "Create panel" button: pick the channel the panel is posted into
pub(super) async fn open_panel_channel_select(
    ctx: &Context,
    component: &ComponentInteraction,
    owner: UserId,
) -> HandlerResult {
    let menu = CreateSelectMenu::new(
        ComponentIntent::TicketPanelChannelSelect { owner }.encode(),
        CreateSelectMenuKind::Channel {
            channel_types: Some(vec![ChannelType::Text]),
            default_channels: None,
        },
    )
    .placeholder("Pick the channel for the panel");

    component
        .create_response(
            &ctx.http,
            replies::update_message(
                CreateInteractionResponseMessage::new()
                    .content("Where should the panel be posted?")
                    .embeds(vec![])
                    .components(vec![CreateActionRow::SelectMenu(menu), back_row(owner)]),
            ),
        )
        .await?;
    Ok(())
}

/// Channel picked: collect title, description and color through a modal
pub(super) async fn handle_panel_channel_select(
    ctx: &Context,
    component: &ComponentInteraction,
    owner: UserId,
) -> HandlerResult {
    let channel_id = match &component.data.kind {
        ComponentInteractionDataKind::ChannelSelect { values } => match values.first() {
            Some(id) => *id,
            None => return Ok(()),
        },
        _ => return Ok(()),
    };

    let inputs = vec![
        CreateActionRow::InputText(
            CreateInputText::new(InputTextStyle::Short, "Panel title", "title")
                .placeholder("Open a ticket")
                .required(true),
        ),
        CreateActionRow::InputText(
            CreateInputText::new(InputTextStyle::Paragraph, "Description", "description")
                .placeholder("Click a button below to open a ticket.")
                .required(false),
        ),
        CreateActionRow::InputText(
            CreateInputText::new(InputTextStyle::Short, "Embed color", "color")
                .placeholder("#0099FF")
                .required(false),
        ),
    ];
    let modal = CreateModal::new(
        ModalIntent::PanelSetup { owner, channel_id }.encode(),
        "Panel setup",
    )
    .components(inputs);

    component
        .create_response(&ctx.http, CreateInteractionResponse::Modal(modal))
        .await?;
    Ok(())
}

/// Setup modal submitted: post the panel and persist it
pub(super) async fn handle_panel_setup_modal(
    state: &AppState,
    ctx: &Context,
    modal: &ModalInteraction,
    guild_id: GuildId,
    owner: UserId,
    channel_id: ChannelId,
) -> HandlerResult {
    let guild = guild_id.to_string();
    let categories =
        TicketCategoryRepository::list_active_by_guild(state.pool(), &guild).await?;
    if categories.is_empty() {
        modal
            .create_response(
                &ctx.http,
                replies::ephemeral_text(
                    "No ticket categories are configured yet; create one first.",
                ),
            )
            .await?;
        return Ok(());
    }

    let title = modal_field(modal, "title").unwrap_or_else(|| "Open a ticket".to_string());
    let description = modal_field(modal, "description");
    // Unparseable colors fall back to the default instead of failing the wizard
    let color = modal_field(modal, "color")
        .and_then(|c| parse_hex_color(&c))
        .unwrap_or(DEFAULT_PANEL_COLOR);

    let (embed, rows) = panel_render(&title, description.as_deref(), color, &categories);
    let message = channel_id
        .send_message(&ctx.http, CreateMessage::new().embed(embed).components(rows))
        .await?;

    let panel = TicketPanelRepository::create(
        state.pool(),
        &guild,
        &channel_id.to_string(),
        &message.id.to_string(),
        &title,
        description.as_deref(),
        color,
        &owner.to_string(),
    )
    .await?;
    info!("Panel {} posted in channel {}", panel.id, channel_id);

    modal
        .create_response(
            &ctx.http,
            replies::ephemeral_text(format!(
                "Panel posted: {}",
                jump_link(&guild, &panel.channel_id, &panel.message_id)
            )),
        )
        .await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Category management screen
// ---------------------------------------------------------------------------

/// "Manage categories" button: overview plus the create/edit/delete entry
/// points.
pub(super) async fn open_manage_categories(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
    guild_id: GuildId,
    owner: UserId,
) -> HandlerResult {
    let categories =
        TicketCategoryRepository::list_by_guild(state.pool(), &guild_id.to_string()).await?;

    let mut embed = CreateEmbed::new()
        .title("Ticket Categories")
        .color(INFO_EMBED_COLOR);
    if categories.is_empty() {
        embed = embed.description("No categories yet. Create one to get started.");
    } else {
        for category in &categories {
            embed = embed.field(
                format!("{} ({})", category.category_name, category.category_key),
                format!(
                    "Button: {} {}",
                    category.button_emoji.as_deref().unwrap_or(""),
                    category.button_label
                ),
                false,
            );
        }
    }

    let mut rows = vec![CreateActionRow::Buttons(vec![
        CreateButton::new(ComponentIntent::CategoryCreate { owner }.encode())
            .label("Create category")
            .style(ButtonStyle::Primary),
        CreateButton::new(ComponentIntent::TicketBack { owner }.encode())
            .label("Back")
            .style(ButtonStyle::Secondary),
    ])];

    if !categories.is_empty() {
        let edit_options = categories
            .iter()
            .take(MAX_SELECT_OPTIONS)
            .map(|c| {
                CreateSelectMenuOption::new(truncate_option_label(&c.category_name), c.id.clone())
            })
            .collect();
        rows.push(CreateActionRow::SelectMenu(
            CreateSelectMenu::new(
                ComponentIntent::CategoryEditSelect { owner }.encode(),
                CreateSelectMenuKind::String { options: edit_options },
            )
            .placeholder("Edit a category"),
        ));

        let delete_options = categories
            .iter()
            .take(MAX_SELECT_OPTIONS)
            .map(|c| {
                CreateSelectMenuOption::new(truncate_option_label(&c.category_name), c.id.clone())
            })
            .collect();
        rows.push(CreateActionRow::SelectMenu(
            CreateSelectMenu::new(
                ComponentIntent::CategoryDeleteSelect { owner }.encode(),
                CreateSelectMenuKind::String { options: delete_options },
            )
            .placeholder("Delete a category"),
        ));
    }

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

// ---------------------------------------------------------------------------
// Category creation wizard
// ---------------------------------------------------------------------------

/// Build the Discord-category picker shared by the create and edit wizards
async fn category_target_options(
    ctx: &Context,
    guild_id: GuildId,
) -> Result<Vec<CreateSelectMenuOption>, serenity::Error> {
    let channels = guild_id.channels(&ctx.http).await?;
    let mut category_channels: Vec<_> = channels
        .values()
        .filter(|c| c.kind == ChannelType::Category)
        .collect();
    category_channels.sort_by_key(|c| c.position);

    let mut options = vec![CreateSelectMenuOption::new(
        "Default (auto-created Tickets category)",
        "default",
    )];
    options.extend(
        category_channels
            .into_iter()
            .take(MAX_SELECT_OPTIONS - 1)
            .map(|c| CreateSelectMenuOption::new(truncate_option_label(&c.name), c.id.to_string())),
    );
    Ok(options)
}

/// "Create category" button: pick where its tickets will live
pub(super) async fn open_category_target_select(
    ctx: &Context,
    component: &ComponentInteraction,
    guild_id: GuildId,
    owner: UserId,
) -> HandlerResult {
    let options = category_target_options(ctx, guild_id).await?;
    let menu = CreateSelectMenu::new(
        ComponentIntent::CategoryTargetSelect { owner }.encode(),
        CreateSelectMenuKind::String { options },
    )
    .placeholder("Where should tickets of this type go?");

    component
        .create_response(
            &ctx.http,
            replies::update_message(
                CreateInteractionResponseMessage::new()
                    .content("Pick the Discord category for this ticket type.")
                    .embeds(vec![])
                    .components(vec![CreateActionRow::SelectMenu(menu), back_row(owner)]),
            ),
        )
        .await?;
    Ok(())
}

fn style_options() -> Vec<CreateSelectMenuOption> {
    vec![
        CreateSelectMenuOption::new("Blurple (primary)", "1"),
        CreateSelectMenuOption::new("Grey (secondary)", "2"),
        CreateSelectMenuOption::new("Green (success)", "3"),
        CreateSelectMenuOption::new("Red (danger)", "4"),
    ]
}

/// Target picked: choose the button style next
pub(super) async fn handle_category_target_select(
    ctx: &Context,
    component: &ComponentInteraction,
    owner: UserId,
) -> HandlerResult {
    let Some(target) = selected_string(component).and_then(|v| CategoryTarget::parse(&v)) else {
        return Ok(());
    };

    let menu = CreateSelectMenu::new(
        ComponentIntent::CategoryStyleSelect { owner, target }.encode(),
        CreateSelectMenuKind::String { options: style_options() },
    )
    .placeholder("Pick the button style");

    component
        .create_response(
            &ctx.http,
            replies::update_message(
                CreateInteractionResponseMessage::new()
                    .content("Pick the color of the panel button.")
                    .components(vec![CreateActionRow::SelectMenu(menu), back_row(owner)]),
            ),
        )
        .await?;
    Ok(())
}

fn category_modal_inputs(
    name: Option<&str>,
    label: Option<&str>,
    emoji: Option<&str>,
    message: Option<&str>,
    with_key: bool,
) -> Vec<CreateActionRow> {
    let mut inputs = Vec::new();
    if with_key {
        inputs.push(CreateActionRow::InputText(
            CreateInputText::new(InputTextStyle::Short, "Key (letters and digits)", "key")
                .placeholder("support")
                .required(true),
        ));
    }
    let mut name_input =
        CreateInputText::new(InputTextStyle::Short, "Category name", "name").required(true);
    if let Some(v) = name {
        name_input = name_input.value(v);
    }
    inputs.push(CreateActionRow::InputText(name_input));

    let mut label_input =
        CreateInputText::new(InputTextStyle::Short, "Button label", "label").required(true);
    if let Some(v) = label {
        label_input = label_input.value(v);
    }
    inputs.push(CreateActionRow::InputText(label_input));

    let mut emoji_input =
        CreateInputText::new(InputTextStyle::Short, "Button emoji", "emoji").required(false);
    if let Some(v) = emoji {
        emoji_input = emoji_input.value(v);
    }
    inputs.push(CreateActionRow::InputText(emoji_input));

    let mut message_input =
        CreateInputText::new(InputTextStyle::Paragraph, "Greeting message", "message")
            .required(false);
    if let Some(v) = message {
        message_input = message_input.value(v);
    }
    inputs.push(CreateActionRow::InputText(message_input));
    inputs
}

/// Style picked: collect the remaining fields through a modal
pub(super) async fn handle_category_style_select(
    ctx: &Context,
    component: &ComponentInteraction,
    owner: UserId,
    target: CategoryTarget,
) -> HandlerResult {
    let Some(style) = selected_string(component).and_then(|v| v.parse::<u8>().ok()) else {
        return Ok(());
    };

    let modal = CreateModal::new(
        ModalIntent::CategoryCreate { owner, target, style }.encode(),
        "New ticket category",
    )
    .components(category_modal_inputs(None, None, None, None, true));

    component
        .create_response(&ctx.http, CreateInteractionResponse::Modal(modal))
        .await?;
    Ok(())
}

/// Creation modal submitted
pub(super) async fn handle_category_create_modal(
    state: &AppState,
    ctx: &Context,
    modal: &ModalInteraction,
    guild_id: GuildId,
    target: CategoryTarget,
    style: u8,
) -> HandlerResult {
    let Some(key) = modal_field(modal, "key").and_then(|k| sanitize_category_key(&k)) else {
        modal
            .create_response(
                &ctx.http,
                replies::ephemeral_text(
                    "The key must contain at least one letter or digit.",
                ),
            )
            .await?;
        return Ok(());
    };
    let Some(name) = modal_field(modal, "name") else {
        modal
            .create_response(&ctx.http, replies::ephemeral_text("The name cannot be empty."))
            .await?;
        return Ok(());
    };
    let label = modal_field(modal, "label").unwrap_or_else(|| name.clone());
    let emoji = modal_field(modal, "emoji");
    let message = modal_field(modal, "message");
    let target_id = target.channel_id().map(|c| c.to_string());

    let created = TicketCategoryRepository::create(
        state.pool(),
        &guild_id.to_string(),
        &key,
        &name,
        &label,
        emoji.as_deref(),
        style as i64,
        target_id.as_deref(),
        message.as_deref(),
    )
    .await;

    match created {
        Ok(category) => {
            modal
                .create_response(
                    &ctx.http,
                    replies::ephemeral_text(format!(
                        "Category **{}** created with key `{}`. Existing panels must be re-posted to show its button.",
                        category.category_name, category.category_key
                    )),
                )
                .await?;
        }
        Err(DbError::DuplicateCategoryKey(key)) => {
            modal
                .create_response(
                    &ctx.http,
                    replies::ephemeral_text(format!(
                        "A category with the key `{key}` already exists in this server."
                    )),
                )
                .await?;
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Category edit wizard
// ---------------------------------------------------------------------------

/// Category picked for editing: choose the new button style first
pub(super) async fn handle_category_edit_select(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
    owner: UserId,
) -> HandlerResult {
    let Some(category_id) = selected_string(component) else {
        return Ok(());
    };
    let Some(category) = TicketCategoryRepository::get_by_id(state.pool(), &category_id).await?
    else {
        component
            .create_response(&ctx.http, replies::ephemeral_text("This category no longer exists."))
            .await?;
        return Ok(());
    };

    let menu = CreateSelectMenu::new(
        ComponentIntent::CategoryEditStyleSelect { owner, category_id: category.id.clone() }
            .encode(),
        CreateSelectMenuKind::String { options: style_options() },
    )
    .placeholder("Pick the button style");

    component
        .create_response(
            &ctx.http,
            replies::update_message(
                CreateInteractionResponseMessage::new()
                    .content(format!(
                        "Editing **{}**. Pick the button style to keep or change.",
                        category.category_name
                    ))
                    .embeds(vec![])
                    .components(vec![CreateActionRow::SelectMenu(menu), back_row(owner)]),
            ),
        )
        .await?;
    Ok(())
}

/// Style picked during an edit: choose the Discord category next
pub(super) async fn handle_category_edit_style_select(
    ctx: &Context,
    component: &ComponentInteraction,
    guild_id: GuildId,
    owner: UserId,
    category_id: &str,
) -> HandlerResult {
    let Some(style) = selected_string(component).and_then(|v| v.parse::<u8>().ok()) else {
        return Ok(());
    };

    let options = category_target_options(ctx, guild_id).await?;
    let menu = CreateSelectMenu::new(
        ComponentIntent::CategoryEditTargetSelect {
            owner,
            category_id: category_id.to_string(),
            style,
        }
        .encode(),
        CreateSelectMenuKind::String { options },
    )
    .placeholder("Where should tickets of this type go?");

    component
        .create_response(
            &ctx.http,
            replies::update_message(
                CreateInteractionResponseMessage::new()
                    .content("Pick the Discord category for this ticket type.")
                    .components(vec![CreateActionRow::SelectMenu(menu), back_row(owner)]),
            ),
        )
        .await?;
    Ok(())
}

/// Target picked during an edit: pre-filled modal for the text fields.
/// The key is immutable and not offered for editing.
pub(super) async fn handle_category_edit_target_select(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
    _guild_id: GuildId,
    owner: UserId,
    category_id: &str,
    style: u8,
) -> HandlerResult {
    let Some(target) = selected_string(component).and_then(|v| CategoryTarget::parse(&v)) else {
        return Ok(());
    };
    let Some(category) = TicketCategoryRepository::get_by_id(state.pool(), category_id).await?
    else {
        component
            .create_response(&ctx.http, replies::ephemeral_text("This category no longer exists."))
            .await?;
        return Ok(());
    };

    let modal = CreateModal::new(
        ModalIntent::CategoryEdit {
            owner,
            category_id: category.id.clone(),
            style,
            target,
        }
        .encode(),
        "Edit ticket category",
    )
    .components(category_modal_inputs(
        Some(&category.category_name),
        Some(&category.button_label),
        category.button_emoji.as_deref(),
        category.open_message.as_deref(),
        false,
    ));

    component
        .create_response(&ctx.http, CreateInteractionResponse::Modal(modal))
        .await?;
    Ok(())
}

/// Edit modal submitted: apply the partial update
pub(super) async fn handle_category_edit_modal(
    state: &AppState,
    ctx: &Context,
    modal: &ModalInteraction,
    category_id: &str,
    style: u8,
    target: CategoryTarget,
) -> HandlerResult {
    let name = modal_field(modal, "name");
    let label = modal_field(modal, "label");
    let emoji = modal_field(modal, "emoji");
    let message = modal_field(modal, "message");
    let target_id = target.channel_id().map(|c| c.to_string());

    let update = CategoryUpdate {
        category_name: name.as_deref(),
        button_label: label.as_deref(),
        button_emoji: Some(emoji.as_deref()),
        button_style: Some(style as i64),
        discord_category_id: Some(target_id.as_deref()),
        open_message: Some(message.as_deref()),
    };

    match TicketCategoryRepository::update(state.pool(), category_id, update).await {
        Ok(()) => {
            modal
                .create_response(
                    &ctx.http,
                    replies::ephemeral_text(
                        "Category updated. Re-post panels to refresh their buttons.",
                    ),
                )
                .await?;
        }
        Err(DbError::CategoryNotFound(_)) => {
            modal
                .create_response(&ctx.http, replies::ephemeral_text("This category no longer exists."))
                .await?;
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Category deletion
// ---------------------------------------------------------------------------

/// Category picked for deletion: confirm before dropping the row
pub(super) async fn handle_category_delete_select(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
    owner: UserId,
) -> HandlerResult {
    let Some(category_id) = selected_string(component) else {
        return Ok(());
    };
    let Some(category) = TicketCategoryRepository::get_by_id(state.pool(), &category_id).await?
    else {
        component
            .create_response(&ctx.http, replies::ephemeral_text("This category no longer exists."))
            .await?;
        return Ok(());
    };

    let buttons = CreateActionRow::Buttons(vec![
        CreateButton::new(
            ComponentIntent::CategoryDeleteConfirm { owner, category_id: category.id.clone() }
                .encode(),
        )
        .label("Delete")
        .style(ButtonStyle::Danger),
        CreateButton::new(ComponentIntent::TicketBack { owner }.encode())
            .label("Cancel")
            .style(ButtonStyle::Secondary),
    ]);

    component
        .create_response(
            &ctx.http,
            replies::update_message(
                CreateInteractionResponseMessage::new()
                    .content(format!(
                        "Delete the category **{}**? Panel buttons for it will stop working until the panels are re-posted.",
                        category.category_name
                    ))
                    .embeds(vec![])
                    .components(vec![buttons]),
            ),
        )
        .await?;
    Ok(())
}

/// Deletion confirmed
pub(super) async fn handle_category_delete_confirm(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
    category_id: &str,
) -> HandlerResult {
    let Some(category) = TicketCategoryRepository::get_by_id(state.pool(), category_id).await?
    else {
        component
            .create_response(&ctx.http, replies::ephemeral_text("This category no longer exists."))
            .await?;
        return Ok(());
    };

    TicketCategoryRepository::delete(state.pool(), &category.id).await?;

    component
        .create_response(
            &ctx.http,
            replies::update_message(
                CreateInteractionResponseMessage::new()
                    .content(format!("Category **{}** deleted.", category.category_name))
                    .components(vec![]),
            ),
        )
        .await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Panel customization
// ---------------------------------------------------------------------------

async fn panel_select(
    state: &AppState,
    guild_id: GuildId,
    custom_id: String,
    placeholder: &str,
) -> Result<Option<CreateSelectMenu>, DbError> {
    let panels =
        TicketPanelRepository::list_active_by_guild(state.pool(), &guild_id.to_string()).await?;
    if panels.is_empty() {
        return Ok(None);
    }

    let options = panels
        .iter()
        .take(MAX_SELECT_OPTIONS)
        .map(|p| CreateSelectMenuOption::new(truncate_option_label(&p.panel_title), p.id.clone()))
        .collect();
    Ok(Some(
        CreateSelectMenu::new(custom_id, CreateSelectMenuKind::String { options })
            .placeholder(placeholder),
    ))
}

/// "Customize panel" button: pick which panel to edit
pub(super) async fn open_panel_customize_select(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
    guild_id: GuildId,
    owner: UserId,
) -> HandlerResult {
    let Some(menu) = panel_select(
        state,
        guild_id,
        ComponentIntent::PanelCustomizeSelect { owner }.encode(),
        "Pick the panel to customize",
    )
    .await?
    else {
        component
            .create_response(&ctx.http, replies::ephemeral_text("No panels exist in this server."))
            .await?;
        return Ok(());
    };

    component
        .create_response(
            &ctx.http,
            replies::update_message(
                CreateInteractionResponseMessage::new()
                    .content("Which panel should be customized?")
                    .embeds(vec![])
                    .components(vec![CreateActionRow::SelectMenu(menu), back_row(owner)]),
            ),
        )
        .await?;
    Ok(())
}

/// Panel picked: pre-filled customization modal
pub(super) async fn handle_panel_customize_select(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
    owner: UserId,
) -> HandlerResult {
    let Some(panel_id) = selected_string(component) else {
        return Ok(());
    };
    let Some(panel) = TicketPanelRepository::get_by_id(state.pool(), &panel_id).await? else {
        component
            .create_response(&ctx.http, replies::ephemeral_text("This panel no longer exists."))
            .await?;
        return Ok(());
    };

    let mut description_input =
        CreateInputText::new(InputTextStyle::Paragraph, "Description", "description")
            .required(false);
    if let Some(description) = &panel.panel_description {
        description_input = description_input.value(description);
    }
    let inputs = vec![
        CreateActionRow::InputText(
            CreateInputText::new(InputTextStyle::Short, "Panel title", "title")
                .value(panel.panel_title.clone())
                .required(true),
        ),
        CreateActionRow::InputText(description_input),
        CreateActionRow::InputText(
            CreateInputText::new(InputTextStyle::Short, "Embed color", "color")
                .value(format!("#{:06X}", panel.panel_color))
                .required(false),
        ),
    ];
    let modal = CreateModal::new(
        ModalIntent::PanelCustomize { owner, panel_id: panel.id.clone() }.encode(),
        "Customize panel",
    )
    .components(inputs);

    component
        .create_response(&ctx.http, CreateInteractionResponse::Modal(modal))
        .await?;
    Ok(())
}

/// Customization modal submitted: persist and re-render the live message
pub(super) async fn handle_panel_customize_modal(
    state: &AppState,
    ctx: &Context,
    modal: &ModalInteraction,
    guild_id: GuildId,
    panel_id: &str,
) -> HandlerResult {
    let Some(panel) = TicketPanelRepository::get_by_id(state.pool(), panel_id).await? else {
        modal
            .create_response(&ctx.http, replies::ephemeral_text("This panel no longer exists."))
            .await?;
        return Ok(());
    };

    let title = modal_field(modal, "title").unwrap_or(panel.panel_title);
    let description = modal_field(modal, "description");
    let color = modal_field(modal, "color")
        .and_then(|c| parse_hex_color(&c))
        .unwrap_or(panel.panel_color);

    TicketPanelRepository::update_customization(
        state.pool(),
        panel_id,
        &title,
        description.as_deref(),
        color,
    )
    .await?;

    // Best-effort refresh of the live message; the row is the source of truth
    let edit = async {
        let channel = ChannelId::new(panel.channel_id.parse::<u64>()?);
        let message = MessageId::new(panel.message_id.parse::<u64>()?);
        let categories = TicketCategoryRepository::list_active_by_guild(
            state.pool(),
            &guild_id.to_string(),
        )
        .await?;
        let (embed, rows) = panel_render(&title, description.as_deref(), color, &categories);
        channel
            .edit_message(
                &ctx.http,
                message,
                EditMessage::new().embed(embed).components(rows),
            )
            .await?;
        Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
    };
    if let Err(e) = edit.await {
        warn!("Could not refresh panel message {}: {}", panel_id, e);
    }

    modal
        .create_response(&ctx.http, replies::ephemeral_text("Panel updated."))
        .await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Panel deletion, stats and listing
// ---------------------------------------------------------------------------

/// "Delete panel" button: pick which panel to drop
pub(super) async fn open_panel_delete_select(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
    guild_id: GuildId,
    owner: UserId,
) -> HandlerResult {
    let Some(menu) = panel_select(
        state,
        guild_id,
        ComponentIntent::PanelDeleteSelect { owner }.encode(),
        "Pick the panel to delete",
    )
    .await?
    else {
        component
            .create_response(&ctx.http, replies::ephemeral_text("No panels exist in this server."))
            .await?;
        return Ok(());
    };

    component
        .create_response(
            &ctx.http,
            replies::update_message(
                CreateInteractionResponseMessage::new()
                    .content("Which panel should be deleted?")
                    .embeds(vec![])
                    .components(vec![CreateActionRow::SelectMenu(menu), back_row(owner)]),
            ),
        )
        .await?;
    Ok(())
}

/// Panel picked for deletion: confirm first
pub(super) async fn handle_panel_delete_select(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
    owner: UserId,
) -> HandlerResult {
    let Some(panel_id) = selected_string(component) else {
        return Ok(());
    };
    let Some(panel) = TicketPanelRepository::get_by_id(state.pool(), &panel_id).await? else {
        component
            .create_response(&ctx.http, replies::ephemeral_text("This panel no longer exists."))
            .await?;
        return Ok(());
    };

    let buttons = CreateActionRow::Buttons(vec![
        CreateButton::new(
            ComponentIntent::PanelDeleteConfirm { owner, panel_id: panel.id.clone() }.encode(),
        )
        .label("Delete")
        .style(ButtonStyle::Danger),
        CreateButton::new(ComponentIntent::TicketBack { owner }.encode())
            .label("Cancel")
            .style(ButtonStyle::Secondary),
    ]);

    component
        .create_response(
            &ctx.http,
            replies::update_message(
                CreateInteractionResponseMessage::new()
                    .content(format!(
                        "Delete the panel **{}** and its message?",
                        panel.panel_title
                    ))
                    .components(vec![buttons]),
            ),
        )
        .await?;
    Ok(())
}

/// Deletion confirmed: remove the Discord message, then the row
pub(super) async fn handle_panel_delete_confirm(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
    _guild_id: GuildId,
    panel_id: &str,
) -> HandlerResult {
    let Some(panel) = TicketPanelRepository::get_by_id(state.pool(), panel_id).await? else {
        component
            .create_response(&ctx.http, replies::ephemeral_text("This panel no longer exists."))
            .await?;
        return Ok(());
    };

    // The message may have been deleted by hand already
    if let (Ok(channel), Ok(message)) =
        (panel.channel_id.parse::<u64>(), panel.message_id.parse::<u64>())
    {
        let _ = ChannelId::new(channel)
            .delete_message(&ctx.http, MessageId::new(message))
            .await;
    }

    TicketPanelRepository::delete(state.pool(), &panel.id).await?;

    component
        .create_response(
            &ctx.http,
            replies::update_message(
                CreateInteractionResponseMessage::new()
                    .content(format!("Panel **{}** deleted.", panel.panel_title))
                    .components(vec![]),
            ),
        )
        .await?;
    Ok(())
}

/// "Statistics" button: per-guild counts
pub(super) async fn show_stats(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
    guild_id: GuildId,
) -> HandlerResult {
    let stats = TicketRepository::stats_by_guild(state.pool(), &guild_id.to_string()).await?;

    let mut embed = CreateEmbed::new()
        .title("Ticket Statistics")
        .color(INFO_EMBED_COLOR)
        .field("Total", stats.total().to_string(), true)
        .field("Open", stats.open.to_string(), true)
        .field("Closed", stats.closed.to_string(), true);
    if !stats.by_type.is_empty() {
        let lines = stats
            .by_type
            .iter()
            .map(|(ty, count)| format!("**{ty}**: {count}"))
            .collect::<Vec<_>>()
            .join("\n");
        embed = embed.field("By type", lines, false);
    }

    component
        .create_response(
            &ctx.http,
            replies::update_message(
                CreateInteractionResponseMessage::new()
                    .content("")
                    .embed(embed)
                    .components(vec![back_row(component.user.id)]),
            ),
        )
        .await?;
    Ok(())
}

/// "List panels" button: jump links to every active panel message
pub(super) async fn list_panels(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
    guild_id: GuildId,
) -> HandlerResult {
    let guild = guild_id.to_string();
    let panels = TicketPanelRepository::list_active_by_guild(state.pool(), &guild).await?;

    let description = if panels.is_empty() {
        "No panels exist in this server.".to_string()
    } else {
        panels
            .iter()
            .enumerate()
            .map(|(i, p)| {
                format!(
                    "{}. **{}** in <#{}> - [jump]({})",
                    i + 1,
                    p.panel_title,
                    p.channel_id,
                    jump_link(&guild, &p.channel_id, &p.message_id)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    let embed = CreateEmbed::new()
        .title("Ticket Panels")
        .description(description)
        .color(INFO_EMBED_COLOR);

    component
        .create_response(
            &ctx.http,
            replies::update_message(
                CreateInteractionResponseMessage::new()
                    .content("")
                    .embed(embed)
                    .components(vec![back_row(component.user.id)]),
            ),
        )
        .await?;
    Ok(())
}

/// "Back" button: restore the admin menu in place
pub(super) async fn back_to_menu(
    ctx: &Context,
    component: &ComponentInteraction,
    owner: UserId,
) -> HandlerResult {
    component
        .create_response(
            &ctx.http,
            replies::update_message(commands::ticket_menu_message(owner).content("")),
        )
        .await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Ticket lifecycle
// ---------------------------------------------------------------------------

/// Find the configured Discord category if it still exists, otherwise fall
/// back to a guild-wide "Tickets" category, creating it on first use.
async fn resolve_ticket_parent(
    ctx: &Context,
    guild_id: GuildId,
    configured: Option<&str>,
) -> Result<ChannelId, serenity::Error> {
    let channels = guild_id.channels(&ctx.http).await?;

    if let Some(id) = configured.and_then(|s| s.parse::<u64>().ok()) {
        let id = ChannelId::new(id);
        if channels.get(&id).is_some_and(|c| c.kind == ChannelType::Category) {
            return Ok(id);
        }
        warn!("Configured ticket category {} is gone, falling back", id);
    }

    if let Some(existing) = channels
        .values()
        .find(|c| c.kind == ChannelType::Category && c.name.eq_ignore_ascii_case("tickets"))
    {
        return Ok(existing.id);
    }

    let everyone = RoleId::new(guild_id.get());
    let category = guild_id
        .create_channel(
            &ctx.http,
            CreateChannel::new("Tickets")
                .kind(ChannelType::Category)
                .permissions(vec![PermissionOverwrite {
                    allow: Permissions::empty(),
                    deny: Permissions::VIEW_CHANNEL,
                    kind: PermissionOverwriteType::Role(everyone),
                }]),
        )
        .await?;
    info!("Created fallback Tickets category in guild {}", guild_id);
    Ok(category.id)
}

/// Panel button pressed: open a private ticket channel.
///
/// Channel creation can take a moment, so the interaction is deferred and
/// every reply goes out as an ephemeral follow-up.
pub(super) async fn create_ticket(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
    guild_id: GuildId,
    category_key: &str,
) -> HandlerResult {
    component
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Defer(
                CreateInteractionResponseMessage::new().ephemeral(true),
            ),
        )
        .await?;

    let guild = guild_id.to_string();
    let user = component.user.id;

    // One open ticket per member per guild
    if let Some(existing) =
        TicketRepository::find_open_by_user(state.pool(), &user.to_string(), &guild).await?
    {
        component
            .create_followup(
                &ctx.http,
                CreateInteractionResponseFollowup::new()
                    .content(format!(
                        "You already have an open ticket: <#{}>",
                        existing.channel_id
                    ))
                    .ephemeral(true),
            )
            .await?;
        return Ok(());
    }

    // Stale panel buttons for deleted categories fail here
    let category = TicketCategoryRepository::get_by_key(state.pool(), &guild, category_key).await?;
    let Some(category) = category.filter(|c| c.is_active) else {
        component
            .create_followup(
                &ctx.http,
                CreateInteractionResponseFollowup::new()
                    .content("This ticket category no longer exists.")
                    .ephemeral(true),
            )
            .await?;
        return Ok(());
    };

    let parent =
        resolve_ticket_parent(ctx, guild_id, category.discord_category_id.as_deref()).await?;

    let ticket_id = format!(
        "ticket-{}-{}",
        category.category_key,
        chrono::Utc::now().timestamp()
    );
    let everyone = RoleId::new(guild_id.get());
    let channel = guild_id
        .create_channel(
            &ctx.http,
            CreateChannel::new(&ticket_id)
                .kind(ChannelType::Text)
                .category(parent)
                .permissions(vec![
                    PermissionOverwrite {
                        allow: Permissions::empty(),
                        deny: Permissions::VIEW_CHANNEL,
                        kind: PermissionOverwriteType::Role(everyone),
                    },
                    PermissionOverwrite {
                        allow: Permissions::VIEW_CHANNEL
                            | Permissions::SEND_MESSAGES
                            | Permissions::READ_MESSAGE_HISTORY,
                        deny: Permissions::empty(),
                        kind: PermissionOverwriteType::Member(user),
                    },
                ]),
        )
        .await?;

    let greeting = category.open_message.clone().unwrap_or_else(|| {
        "A staff member will be with you shortly. Describe your issue below.".to_string()
    });
    let embed = CreateEmbed::new()
        .title(category.category_name.clone())
        .description(greeting)
        .color(SUCCESS_EMBED_COLOR)
        .timestamp(Timestamp::now());
    let buttons = CreateActionRow::Buttons(vec![
        CreateButton::new(ComponentIntent::CloseTicket { ticket_id: ticket_id.clone() }.encode())
            .label("Close")
            .emoji(ReactionType::Unicode("🔒".to_string()))
            .style(ButtonStyle::Danger),
        CreateButton::new(ComponentIntent::RenameTicket { ticket_id: ticket_id.clone() }.encode())
            .label("Rename")
            .style(ButtonStyle::Secondary),
    ]);
    channel
        .send_message(
            &ctx.http,
            CreateMessage::new()
                .content(format!("<@{user}>"))
                .embed(embed)
                .components(vec![buttons]),
        )
        .await?;

    TicketRepository::create(
        state.pool(),
        &ticket_id,
        &user.to_string(),
        &guild,
        &channel.id.to_string(),
        &category.category_key,
        Some(&category.id),
    )
    .await?;

    component
        .create_followup(
            &ctx.http,
            CreateInteractionResponseFollowup::new()
                .content(format!("Your ticket is ready: <#{}>", channel.id))
                .ephemeral(true),
        )
        .await?;
    Ok(())
}

/// Close button pressed: ask for confirmation first
pub(super) async fn propose_close(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
    ticket_id: &str,
) -> HandlerResult {
    let Some(ticket) = TicketRepository::get_by_ticket_id(state.pool(), ticket_id).await? else {
        component
            .create_response(&ctx.http, replies::ephemeral_text("This ticket no longer exists."))
            .await?;
        return Ok(());
    };

    let permissions = component.member.as_ref().and_then(|m| m.permissions);
    if !can_touch_ticket(&ticket, component.user.id, permissions) {
        component
            .create_response(
                &ctx.http,
                replies::ephemeral_text("Only the ticket opener or the staff can close this ticket."),
            )
            .await?;
        return Ok(());
    }

    let buttons = CreateActionRow::Buttons(vec![
        CreateButton::new(
            ComponentIntent::ConfirmClose { ticket_id: ticket.ticket_id.clone() }.encode(),
        )
        .label("Close ticket")
        .style(ButtonStyle::Danger),
        CreateButton::new(ComponentIntent::CancelClose.encode())
            .label("Keep it open")
            .style(ButtonStyle::Secondary),
    ]);

    component
        .create_response(
            &ctx.http,
            replies::ephemeral(
                CreateInteractionResponseMessage::new()
                    .content("Close this ticket? The channel will be deleted.")
                    .components(vec![buttons]),
            ),
        )
        .await?;
    Ok(())
}

/// Close confirmed: mark the row closed, then delete the channel.
///
/// The close is conditional on the ticket still being open; the loser of a
/// double-click race is told so instead of closing twice.
pub(super) async fn confirm_close(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
    _guild_id: GuildId,
    ticket_id: &str,
) -> HandlerResult {
    let Some(ticket) = TicketRepository::get_by_ticket_id(state.pool(), ticket_id).await? else {
        component
            .create_response(&ctx.http, replies::ephemeral_text("This ticket no longer exists."))
            .await?;
        return Ok(());
    };

    let permissions = component.member.as_ref().and_then(|m| m.permissions);
    if !can_touch_ticket(&ticket, component.user.id, permissions) {
        component
            .create_response(
                &ctx.http,
                replies::ephemeral_text("Only the ticket opener or the staff can close this ticket."),
            )
            .await?;
        return Ok(());
    }

    let closed = TicketRepository::close_if_open(
        state.pool(),
        &ticket.ticket_id,
        &component.user.id.to_string(),
        None,
    )
    .await?;
    if !closed {
        component
            .create_response(&ctx.http, replies::ephemeral_text("This ticket is already closed."))
            .await?;
        return Ok(());
    }

    // Acknowledge before the channel disappears from under the interaction
    component
        .create_response(
            &ctx.http,
            replies::update_message(
                CreateInteractionResponseMessage::new()
                    .content("Ticket closed. This channel is being removed.")
                    .components(vec![]),
            ),
        )
        .await?;

    if let Ok(channel) = ticket.channel_id.parse::<u64>() {
        if let Err(e) = ChannelId::new(channel).delete(&ctx.http).await {
            error!("Failed to delete ticket channel {}: {}", ticket.channel_id, e);
        }
    }
    Ok(())
}

/// Close cancelled from the confirmation prompt
pub(super) async fn cancel_close(ctx: &Context, component: &ComponentInteraction) -> HandlerResult {
    component
        .create_response(
            &ctx.http,
            replies::update_message(
                CreateInteractionResponseMessage::new()
                    .content("The ticket stays open.")
                    .components(vec![]),
            ),
        )
        .await?;
    Ok(())
}

/// Rename button pressed: collect the new name through a modal
pub(super) async fn open_rename(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
    ticket_id: &str,
) -> HandlerResult {
    let Some(ticket) = TicketRepository::get_by_ticket_id(state.pool(), ticket_id).await? else {
        component
            .create_response(&ctx.http, replies::ephemeral_text("This ticket no longer exists."))
            .await?;
        return Ok(());
    };

    let permissions = component.member.as_ref().and_then(|m| m.permissions);
    if !can_touch_ticket(&ticket, component.user.id, permissions) {
        component
            .create_response(
                &ctx.http,
                replies::ephemeral_text("Only the ticket opener or the staff can rename this ticket."),
            )
            .await?;
        return Ok(());
    }

    let input = CreateInputText::new(InputTextStyle::Short, "New name", "name")
        .placeholder("billing-question")
        .required(true);
    let modal = CreateModal::new(
        ModalIntent::TicketRename { ticket_id: ticket.ticket_id.clone() }.encode(),
        "Rename ticket",
    )
    .components(vec![CreateActionRow::InputText(input)]);

    component
        .create_response(&ctx.http, CreateInteractionResponse::Modal(modal))
        .await?;
    Ok(())
}

/// Rename modal submitted: apply the slug to the channel name
pub(super) async fn handle_rename_modal(
    state: &AppState,
    ctx: &Context,
    modal: &ModalInteraction,
    ticket_id: &str,
) -> HandlerResult {
    let Some(ticket) = TicketRepository::get_by_ticket_id(state.pool(), ticket_id).await? else {
        modal
            .create_response(&ctx.http, replies::ephemeral_text("This ticket no longer exists."))
            .await?;
        return Ok(());
    };

    let permissions = modal.member.as_ref().and_then(|m| m.permissions);
    if !can_touch_ticket(&ticket, modal.user.id, permissions) {
        modal
            .create_response(
                &ctx.http,
                replies::ephemeral_text("Only the ticket opener or the staff can rename this ticket."),
            )
            .await?;
        return Ok(());
    }

    let Some(slug) = modal_field(modal, "name").and_then(|n| sanitize_channel_slug(&n)) else {
        modal
            .create_response(
                &ctx.http,
                replies::ephemeral_text("The new name must contain at least one letter or digit."),
            )
            .await?;
        return Ok(());
    };

    let name = format!("ticket-{slug}");
    let Ok(channel) = ticket.channel_id.parse::<u64>() else {
        modal
            .create_response(&ctx.http, replies::ephemeral_text("This ticket's channel is gone."))
            .await?;
        return Ok(());
    };
    ChannelId::new(channel)
        .edit(&ctx.http, EditChannel::new().name(&name))
        .await?;

    modal
        .create_response(
            &ctx.http,
            replies::ephemeral_text(format!("Channel renamed to **{name}**.")),
        )
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_parse_with_and_without_hash() {
        assert_eq!(parse_hex_color("#0099FF"), Some(0x0099FF));
        assert_eq!(parse_hex_color("ff0000"), Some(0xFF0000));
        assert_eq!(parse_hex_color("  #00FF00  "), Some(0x00FF00));
        assert_eq!(parse_hex_color("#12345"), None);
        assert_eq!(parse_hex_color("#GGGGGG"), None);
        assert_eq!(parse_hex_color(""), None);
    }

    #[test]
    fn channel_slugs_are_normalized() {
        assert_eq!(
            sanitize_channel_slug("Billing Question"),
            Some("billing-question".to_string())
        );
        assert_eq!(
            sanitize_channel_slug("  weird---name!! "),
            Some("weird-name".to_string())
        );
        assert_eq!(sanitize_channel_slug("???"), None);
        assert_eq!(sanitize_channel_slug(""), None);
    }

    #[test]
    fn style_numbers_map_to_button_styles() {
        assert_eq!(button_style(1), ButtonStyle::Primary);
        assert_eq!(button_style(2), ButtonStyle::Secondary);
        assert_eq!(button_style(3), ButtonStyle::Success);
        assert_eq!(button_style(4), ButtonStyle::Danger);
        // Out-of-range values stored by older rows degrade to secondary
        assert_eq!(button_style(0), ButtonStyle::Secondary);
        assert_eq!(button_style(99), ButtonStyle::Secondary);
    }

    #[test]
    fn ticket_access_is_opener_or_staff() {
        let ticket = Ticket {
            id: "tk_x".to_string(),
            ticket_id: "ticket-support-1".to_string(),
            user_id: "100".to_string(),
            guild_id: "g".to_string(),
            channel_id: "c".to_string(),
            category_id: None,
            ticket_type: "support".to_string(),
            status: concord_db::TicketStatus::Open,
            closed_by: None,
            close_reason: None,
            closed_at: None,
            created_at: 0,
            updated_at: 0,
        };

        assert!(can_touch_ticket(&ticket, UserId::new(100), None));
        assert!(!can_touch_ticket(&ticket, UserId::new(200), None));
        assert!(can_touch_ticket(
            &ticket,
            UserId::new(200),
            Some(Permissions::MANAGE_CHANNELS)
        ));
        assert!(can_touch_ticket(
            &ticket,
            UserId::new(200),
            Some(Permissions::ADMINISTRATOR)
        ));
        assert!(!can_touch_ticket(
            &ticket,
            UserId::new(200),
            Some(Permissions::SEND_MESSAGES)
        ));
    }
}
