//! Response policy helpers.
//!
//! Wizard steps, denials and errors are actor-only; only cross-party state
//! transitions (approval posts, outcome edits, ticket greetings) are public.

use serenity::builder::{
    CreateInteractionResponse, CreateInteractionResponseFollowup,
    CreateInteractionResponseMessage,
};
use serenity::model::application::{
    ActionRowComponent, ComponentInteraction, ModalInteraction,
};
use serenity::prelude::*;

pub const SUCCESS_EMBED_COLOR: u32 = 0x00_FF_00;
pub const ERROR_EMBED_COLOR: u32 = 0xFF_00_00;
pub const INFO_EMBED_COLOR: u32 = 0x00_99_FF;

/// An actor-only text reply
pub fn ephemeral_text(content: impl Into<String>) -> CreateInteractionResponse {
    CreateInteractionResponse::Message(
        CreateInteractionResponseMessage::new()
            .content(content)
            .ephemeral(true),
    )
}

/// An actor-only reply with arbitrary content (embeds, components)
pub fn ephemeral(message: CreateInteractionResponseMessage) -> CreateInteractionResponse {
    CreateInteractionResponse::Message(message.ephemeral(true))
}

/// Edit the message the component lives on (used for terminal outcome edits)
pub fn update_message(message: CreateInteractionResponseMessage) -> CreateInteractionResponse {
    CreateInteractionResponse::UpdateMessage(message)
}

/// Best-effort ephemeral error delivery for a component interaction.
///
/// A fresh reply and a follow-up are mutually exclusive; if the interaction
/// was already acknowledged the reply call fails and the follow-up is used.
pub async fn send_component_error(ctx: &Context, component: &ComponentInteraction, text: &str) {
    if component
        .create_response(&ctx.http, ephemeral_text(text))
        .await
        .is_err()
    {
        let _ = component
            .create_followup(
                &ctx.http,
                CreateInteractionResponseFollowup::new()
                    .content(text)
                    .ephemeral(true),
            )
            .await;
    }
}

/// Best-effort ephemeral error delivery for a modal submission
pub async fn send_modal_error(ctx: &Context, modal: &ModalInteraction, text: &str) {
    if modal
        .create_response(&ctx.http, ephemeral_text(text))
        .await
        .is_err()
    {
        let _ = modal
            .create_followup(
                &ctx.http,
                CreateInteractionResponseFollowup::new()
                    .content(text)
                    .ephemeral(true),
            )
            .await;
    }
}

/// Extract a submitted text field from a modal by its input custom id
pub fn modal_field(modal: &ModalInteraction, field_id: &str) -> Option<String> {
    for row in &modal.data.components {
        for component in &row.components {
            if let ActionRowComponent::InputText(input) = component {
                if input.custom_id == field_id {
                    return input.value.clone().filter(|v| !v.trim().is_empty());
                }
            }
        }
    }
    None
}
