//! Interaction dispatch.
//!
//! One exhaustive match per interaction kind: the intent parser is the only
//! boundary that touches custom id strings, the guard is the only boundary
//! that checks access, and every handler failure is contained here and
//! converted into a best-effort ephemeral reply.

use serenity::model::application::{
    CommandInteraction, ComponentInteraction, Interaction, ModalInteraction,
};
use serenity::prelude::*;
use tracing::error;

use super::bot::Bot;
use super::intent::{ComponentIntent, ModalIntent};
use super::{commands, guard, replies, roles, tickets};

/// Errors a workflow handler can surface to the dispatch boundary
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("database error: {0}")]
    Db(#[from] concord_db::DbError),

    #[error("discord error: {0}")]
    Discord(#[from] serenity::Error),
}

pub type HandlerResult = Result<(), HandlerError>;

const GENERIC_ERROR: &str = "Something went wrong while handling this action.";

impl Bot {
    pub(super) async fn handle_interaction(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::Component(component) => self.dispatch_component(ctx, component).await,
            Interaction::Modal(modal) => self.dispatch_modal(ctx, modal).await,
            Interaction::Command(command) => self.dispatch_command(ctx, command).await,
            _ => {}
        }
    }

    async fn dispatch_component(&self, ctx: Context, component: ComponentInteraction) {
        let Some(intent) = ComponentIntent::parse(&component.data.custom_id) else {
            // Unknown ids are inert by design
            return;
        };

        // Every component lives in a guild; ignore stray DM payloads
        let Some(guild_id) = component.guild_id else {
            return;
        };

        let permissions = component.member.as_ref().and_then(|m| m.permissions);
        if let Err(denial) = guard::evaluate(intent.policy(), component.user.id, permissions) {
            let _ = component
                .create_response(&ctx.http, replies::ephemeral_text(denial.message()))
                .await;
            return;
        }

        let state = &self.state;
        use ComponentIntent::*;
        let result = match intent {
            RoleRequestMenu { owner } => {
                roles::open_role_search(&ctx, &component, owner).await
            }
            RoleRemoveMenu { owner } => {
                roles::open_remove_menu(&ctx, &component, guild_id, owner).await
            }
            RoleListMenu { owner } => {
                roles::show_role_list(state, &ctx, &component, guild_id, owner).await
            }
            RoleGroupRequest { owner, group_id } => {
                roles::request_group(state, &ctx, &component, guild_id, owner, &group_id).await
            }
            RoleSelect { owner } => {
                roles::handle_role_select(state, &ctx, &component, guild_id, owner).await
            }
            RoleRemoveSelect { owner } => {
                roles::handle_remove_select(state, &ctx, &component, guild_id, owner).await
            }
            ApproveRole { requester, role_id } => {
                roles::resolve_single(state, &ctx, &component, guild_id, requester, role_id, true)
                    .await
            }
            DenyRole { requester, role_id } => {
                roles::resolve_single(state, &ctx, &component, guild_id, requester, role_id, false)
                    .await
            }
            ApproveRemoval { requester, role_id } => {
                roles::resolve_removal(state, &ctx, &component, guild_id, requester, role_id, true)
                    .await
            }
            DenyRemoval { requester, role_id } => {
                roles::resolve_removal(state, &ctx, &component, guild_id, requester, role_id, false)
                    .await
            }
            ApproveGroup { requester, group_id } => {
                roles::resolve_group(state, &ctx, &component, guild_id, requester, &group_id, true)
                    .await
            }
            DenyGroup { requester, group_id } => {
                roles::resolve_group(state, &ctx, &component, guild_id, requester, &group_id, false)
                    .await
            }
            PendingRequests { owner } => {
                roles::show_pending(state, &ctx, &component, guild_id, owner, false).await
            }
            PendingRefresh { owner } => {
                roles::show_pending(state, &ctx, &component, guild_id, owner, true).await
            }
            PendingClear { .. } => {
                roles::clear_pending(state, &ctx, &component, guild_id).await
            }
            PendingDelete { owner } => {
                roles::open_pending_delete(state, &ctx, &component, guild_id, owner).await
            }
            PendingDeleteSelect { .. } => {
                roles::handle_pending_delete_select(state, &ctx, &component).await
            }
            GroupCreate { owner } => roles::open_group_create(&ctx, &component, owner).await,
            GroupCreateSelect { .. } => {
                roles::handle_group_create_select(state, &ctx, &component, guild_id).await
            }
            GroupManage { owner } => {
                roles::open_group_manage(state, &ctx, &component, guild_id, owner).await
            }
            GroupDeleteSelect { .. } => {
                roles::handle_group_delete_select(state, &ctx, &component).await
            }
            GroupEditName { owner, group_id } => {
                roles::open_group_rename(state, &ctx, &component, owner, &group_id).await
            }
            GroupEditDesc { owner, group_id } => {
                roles::open_group_redescribe(state, &ctx, &component, owner, &group_id).await
            }
            GroupEditRequired { owner, group_id } => {
                roles::open_group_required(state, &ctx, &component, owner, &group_id).await
            }
            GroupRequiredSelect { group_id, .. } => {
                roles::handle_group_required_select(state, &ctx, &component, guild_id, &group_id)
                    .await
            }
            TicketCreatePanel { owner } => {
                tickets::open_panel_channel_select(&ctx, &component, owner).await
            }
            TicketPanelChannelSelect { owner } => {
                tickets::handle_panel_channel_select(&ctx, &component, owner).await
            }
            TicketManageCategories { owner } => {
                tickets::open_manage_categories(state, &ctx, &component, guild_id, owner).await
            }
            TicketCustomize { owner } => {
                tickets::open_panel_customize_select(state, &ctx, &component, guild_id, owner)
                    .await
            }
            TicketStats { .. } => {
                tickets::show_stats(state, &ctx, &component, guild_id).await
            }
            TicketDeletePanel { owner } => {
                tickets::open_panel_delete_select(state, &ctx, &component, guild_id, owner).await
            }
            TicketListPanels { .. } => {
                tickets::list_panels(state, &ctx, &component, guild_id).await
            }
            TicketBack { owner } => tickets::back_to_menu(&ctx, &component, owner).await,
            CategoryCreate { owner } => {
                tickets::open_category_target_select(&ctx, &component, guild_id, owner).await
            }
            CategoryTargetSelect { owner } => {
                tickets::handle_category_target_select(&ctx, &component, owner).await
            }
            CategoryStyleSelect { owner, target } => {
                tickets::handle_category_style_select(&ctx, &component, owner, target).await
            }
            CategoryEditSelect { owner } => {
                tickets::handle_category_edit_select(state, &ctx, &component, owner).await
            }
            CategoryEditStyleSelect { owner, category_id } => {
                tickets::handle_category_edit_style_select(
                    &ctx,
                    &component,
                    guild_id,
                    owner,
                    &category_id,
                )
                .await
            }
            CategoryEditTargetSelect { owner, category_id, style } => {
                tickets::handle_category_edit_target_select(
                    state,
                    &ctx,
                    &component,
                    guild_id,
                    owner,
                    &category_id,
                    style,
                )
                .await
            }
            CategoryDeleteSelect { owner } => {
                tickets::handle_category_delete_select(state, &ctx, &component, owner).await
            }
            CategoryDeleteConfirm { category_id, .. } => {
                tickets::handle_category_delete_confirm(state, &ctx, &component, &category_id)
                    .await
            }
            PanelCustomizeSelect { owner } => {
                tickets::handle_panel_customize_select(state, &ctx, &component, owner).await
            }
            PanelDeleteSelect { owner } => {
                tickets::handle_panel_delete_select(state, &ctx, &component, owner).await
            }
            PanelDeleteConfirm { panel_id, .. } => {
                tickets::handle_panel_delete_confirm(state, &ctx, &component, guild_id, &panel_id)
                    .await
            }
            CreateTicket { category_key } => {
                tickets::create_ticket(state, &ctx, &component, guild_id, &category_key).await
            }
            CloseTicket { ticket_id } => {
                tickets::propose_close(state, &ctx, &component, &ticket_id).await
            }
            ConfirmClose { ticket_id } => {
                tickets::confirm_close(state, &ctx, &component, guild_id, &ticket_id).await
            }
            CancelClose => tickets::cancel_close(&ctx, &component).await,
            RenameTicket { ticket_id } => {
                tickets::open_rename(state, &ctx, &component, &ticket_id).await
            }
        };

        if let Err(e) = result {
            error!(
                "Component handler failed for '{}': {}",
                component.data.custom_id, e
            );
            replies::send_component_error(&ctx, &component, GENERIC_ERROR).await;
        }
    }

    async fn dispatch_modal(&self, ctx: Context, modal: ModalInteraction) {
        let Some(intent) = ModalIntent::parse(&modal.data.custom_id) else {
            return;
        };

        let Some(guild_id) = modal.guild_id else {
            return;
        };

        let permissions = modal.member.as_ref().and_then(|m| m.permissions);
        if let Err(denial) = guard::evaluate(intent.policy(), modal.user.id, permissions) {
            let _ = modal
                .create_response(&ctx.http, replies::ephemeral_text(denial.message()))
                .await;
            return;
        }

        let state = &self.state;
        use ModalIntent::*;
        let result = match intent {
            RoleSearch { owner } => {
                roles::handle_role_search_modal(&ctx, &modal, guild_id, owner).await
            }
            GroupNameInput { group_id, .. } => {
                roles::handle_group_rename_modal(state, &ctx, &modal, &group_id).await
            }
            GroupDescInput { group_id, .. } => {
                roles::handle_group_redescribe_modal(state, &ctx, &modal, &group_id).await
            }
            PanelSetup { owner, channel_id } => {
                tickets::handle_panel_setup_modal(state, &ctx, &modal, guild_id, owner, channel_id)
                    .await
            }
            PanelCustomize { panel_id, .. } => {
                tickets::handle_panel_customize_modal(state, &ctx, &modal, guild_id, &panel_id)
                    .await
            }
            CategoryCreate { target, style, .. } => {
                tickets::handle_category_create_modal(state, &ctx, &modal, guild_id, target, style)
                    .await
            }
            CategoryEdit { category_id, style, target, .. } => {
                tickets::handle_category_edit_modal(
                    state,
                    &ctx,
                    &modal,
                    &category_id,
                    style,
                    target,
                )
                .await
            }
            TicketRename { ticket_id } => {
                tickets::handle_rename_modal(state, &ctx, &modal, &ticket_id).await
            }
        };

        if let Err(e) = result {
            error!("Modal handler failed for '{}': {}", modal.data.custom_id, e);
            replies::send_modal_error(&ctx, &modal, GENERIC_ERROR).await;
        }
    }

    async fn dispatch_command(&self, ctx: Context, command: CommandInteraction) {
        let result = match command.data.name.as_str() {
            "role" => commands::open_role_menu(&self.state, &ctx, &command).await,
            "ticket" => commands::open_ticket_menu(&ctx, &command).await,
            "info" => commands::show_info(&self.state, &ctx, &command).await,
            _ => Ok(()),
        };

        if let Err(e) = result {
            error!("Command handler failed for '{}': {}", command.data.name, e);
            let _ = command
                .create_response(&ctx.http, replies::ephemeral_text(GENERIC_ERROR))
                .await;
        }
    }
}
