use std::sync::Arc;

use serenity::async_trait;
use serenity::http::Http;
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::model::application::interaction::modal::ModalSubmitInteraction;
use serenity::model::id::{GuildId, UserId};
use serenity::model::prelude::component::{ActionRowComponent, InputTextStyle};
use serenity::model::prelude::interaction::InteractionResponseType;
use tracing::{error, info, warn};

use super::*;
use crate::error::{BotError, Result};
use crate::store::LinkStore;

/// Grants guild roles by name.
#[async_trait]
pub trait RoleGranter: Send + Sync {
    async fn grant(&self, user_id: UserId, role_name: &str) -> Result<()>;
}

/// The two halves of answering a submitted form: an immediate acknowledgement,
/// then the final text once the outcome is known.
#[async_trait]
pub trait FormResponder: Send + Sync {
    async fn acknowledge(&self) -> Result<()>;
    async fn finish(&self, content: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    Verified { steam_id: String, role_granted: bool },
    Rejected,
    StoreFailed,
}

impl FormOutcome {
    pub fn reply(&self) -> String {
        match self {
            FormOutcome::Verified { steam_id, .. } => format!(
                "✅ Your Steam ID ({}) has been verified! Your account is now linked.",
                steam_id
            ),
            FormOutcome::Rejected => "❌ Invalid Steam ID format. Please make sure you entered a valid 17-digit Steam ID.".to_string(),
            FormOutcome::StoreFailed => "❌ Your Steam ID could not be saved right now. Please try again later.".to_string(),
        }
    }
}

/// Validates the submitted Steam ID, stores the link and grants the verified role.
///
/// Storing and granting are independent steps: a failed role grant keeps the
/// stored link, and a failed store skips the role grant.
pub async fn submit<S, R>(store: &S, roles: &R, user_id: UserId, raw_input: &str) -> FormOutcome
where
    S: LinkStore + ?Sized,
    R: RoleGranter + ?Sized,
{
    if !is_valid_steam_id(raw_input) {
        return FormOutcome::Rejected;
    }

    let discord_id = user_id.0.to_string();

    if let Err(e) = store.upsert(&discord_id, raw_input).await {
        error!(%discord_id, steam_id = raw_input, step = "store", outcome = "failed", "Could not save Steam ID: {}", e);
        return FormOutcome::StoreFailed;
    }
    info!(%discord_id, steam_id = raw_input, step = "store", outcome = "ok", "Steam ID linked");

    let role_granted = match roles.grant(user_id, VERIFIED_ROLE).await {
        Ok(()) => {
            info!(%discord_id, step = "role", outcome = "ok", "Granted {} role", VERIFIED_ROLE);
            true
        }
        Err(e) => {
            warn!(%discord_id, step = "role", outcome = "failed", "Could not grant {} role: {}", VERIFIED_ROLE, e);
            false
        }
    };

    FormOutcome::Verified {
        steam_id: raw_input.to_string(),
        role_granted,
    }
}

/// Answers a submitted form. The acknowledgement goes out before any storage or
/// role work, so slow Discord or database calls cannot outlast the response window.
pub async fn answer<A, S, R>(
    responder: &A,
    store: &S,
    roles: &R,
    user_id: UserId,
    raw_input: &str,
) -> Result<FormOutcome>
where
    A: FormResponder + ?Sized,
    S: LinkStore + ?Sized,
    R: RoleGranter + ?Sized,
{
    responder.acknowledge().await?;

    let outcome = submit(store, roles, user_id, raw_input).await;
    if let FormOutcome::Verified { role_granted: false, .. } = &outcome {
        warn!(user = %user_id, "Linked without the {} role, it needs to be granted by hand", VERIFIED_ROLE);
    }

    responder.finish(&outcome.reply()).await?;
    Ok(outcome)
}

pub async fn show_modal(http: &Http, interaction: &MessageComponentInteraction) -> Result<()> {
    interaction
        .create_interaction_response(http, |res| {
            res.kind(InteractionResponseType::Modal)
                .interaction_response_data(|modal| {
                    modal
                        .custom_id(MODAL_ID)
                        .title(PROMPT_TITLE)
                        .components(|comp| {
                            comp.create_action_row(|row| {
                                row.create_input_text(|input| {
                                    input
                                        .custom_id(STEAM_ID_INPUT_ID)
                                        .label("Enter your Steam ID (17-digit number)")
                                        .placeholder("76561198xxxxxxxxx")
                                        .style(InputTextStyle::Short)
                                        .min_length(STEAM_ID_LENGTH)
                                        .max_length(STEAM_ID_LENGTH)
                                        .required(true)
                                })
                            })
                        })
                })
        })
        .await?;

    Ok(())
}

/// The raw text typed into the Steam ID field, if the form carried one.
pub fn submitted_steam_id(interaction: &ModalSubmitInteraction) -> Option<String> {
    interaction
        .data
        .components
        .iter()
        .flat_map(|row| row.components.iter())
        .find_map(|component| match component {
            ActionRowComponent::InputText(input) if input.custom_id == STEAM_ID_INPUT_ID => {
                Some(input.value.clone())
            }
            _ => None,
        })
}

pub struct ModalResponder<'a> {
    http: &'a Http,
    interaction: &'a ModalSubmitInteraction,
}

impl<'a> ModalResponder<'a> {
    pub fn new(http: &'a Http, interaction: &'a ModalSubmitInteraction) -> Self {
        Self { http, interaction }
    }
}

#[async_trait]
impl<'a> FormResponder for ModalResponder<'a> {
    async fn acknowledge(&self) -> Result<()> {
        self.interaction
            .create_interaction_response(self.http, |res| {
                res.kind(InteractionResponseType::DeferredChannelMessageWithSource)
                    .interaction_response_data(|msg| msg.ephemeral(true))
            })
            .await?;

        Ok(())
    }

    async fn finish(&self, content: &str) -> Result<()> {
        self.interaction
            .edit_original_interaction_response(self.http, |res| res.content(content))
            .await?;

        Ok(())
    }
}

pub struct DiscordRoles {
    http: Arc<Http>,
    guild_id: GuildId,
}

impl DiscordRoles {
    pub fn new(http: Arc<Http>, guild_id: GuildId) -> Self {
        Self { http, guild_id }
    }
}

#[async_trait]
impl RoleGranter for DiscordRoles {
    async fn grant(&self, user_id: UserId, role_name: &str) -> Result<()> {
        let roles = self.guild_id.roles(&self.http).await?;
        let role_id = roles
            .values()
            .find(|role| role.name == role_name)
            .map(|role| role.id)
            .ok_or_else(|| BotError::RoleNotFound {
                name: role_name.to_string(),
            })?;

        let mut member = self.guild_id.member(&*self.http, user_id).await?;
        member.add_role(&self.http, role_id).await?;

        Ok(())
    }
}
