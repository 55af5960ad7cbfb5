use std::sync::Arc;

use serenity::async_trait;
use serenity::http::Http;
use serenity::model::application::component::ButtonStyle;
use serenity::model::channel::Message;
use serenity::model::id::{ChannelId, MessageId, UserId};
use tracing::{error, info};

use super::*;
use crate::error::Result;

/// The parts of a posted message needed to recognise a verification prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedMessage {
    pub id: MessageId,
    pub author_id: UserId,
    pub embed_title: Option<String>,
}

impl From<&Message> for PostedMessage {
    fn from(msg: &Message) -> Self {
        Self {
            id: msg.id,
            author_id: msg.author.id,
            embed_title: msg.embeds.first().and_then(|e| e.title.clone()),
        }
    }
}

impl PostedMessage {
    pub fn is_prompt_from(&self, bot_id: UserId) -> bool {
        self.author_id == bot_id && self.embed_title.as_deref() == Some(PROMPT_TITLE)
    }
}

/// The channel the verification prompt lives in.
#[async_trait]
pub trait PromptChannel: Send + Sync {
    fn bot_id(&self) -> UserId;

    /// Newest messages first, at most `limit` of them.
    async fn recent_messages(&self, limit: u64) -> Result<Vec<PostedMessage>>;

    async fn send_prompt(&self) -> Result<()>;

    async fn delete_message(&self, id: MessageId) -> Result<()>;
}

/// Posts the prompt unless one is already among the recent messages.
/// Returns whether a new message was sent.
pub async fn ensure_prompt<C: PromptChannel + ?Sized>(channel: &C) -> Result<bool> {
    let bot_id = channel.bot_id();
    let messages = channel.recent_messages(PROMPT_LOOKBACK).await?;

    if messages.iter().any(|msg| msg.is_prompt_from(bot_id)) {
        info!("Verification message already exists in channel");
        return Ok(false);
    }

    channel.send_prompt().await?;
    info!("Verification message sent");
    Ok(true)
}

/// Deletes every recent prompt, then posts a fresh one. Individual deletion
/// failures are logged and skipped. Returns how many prompts were removed.
pub async fn reset_prompt<C: PromptChannel + ?Sized>(channel: &C) -> Result<usize> {
    let bot_id = channel.bot_id();
    let messages = channel.recent_messages(PROMPT_LOOKBACK).await?;

    let mut deleted = 0;
    for msg in messages.iter().filter(|msg| msg.is_prompt_from(bot_id)) {
        match channel.delete_message(msg.id).await {
            Ok(()) => deleted += 1,
            Err(e) => error!(message_id = %msg.id, "Could not delete verification message: {}", e),
        }
    }

    ensure_prompt(channel).await?;
    info!(deleted, "Verification message reset");
    Ok(deleted)
}

pub struct DiscordPromptChannel {
    http: Arc<Http>,
    channel_id: ChannelId,
    bot_id: UserId,
}

impl DiscordPromptChannel {
    pub fn new(http: Arc<Http>, channel_id: ChannelId, bot_id: UserId) -> Self {
        Self { http, channel_id, bot_id }
    }
}

#[async_trait]
impl PromptChannel for DiscordPromptChannel {
    fn bot_id(&self) -> UserId {
        self.bot_id
    }

    async fn recent_messages(&self, limit: u64) -> Result<Vec<PostedMessage>> {
        let messages = self
            .channel_id
            .messages(&self.http, |retriever| retriever.limit(limit))
            .await?;

        Ok(messages.iter().map(PostedMessage::from).collect())
    }

    async fn send_prompt(&self) -> Result<()> {
        self.channel_id
            .send_message(&self.http, |msg| {
                msg.embed(|e| {
                    e.colour(PROMPT_COLOUR)
                        .title(PROMPT_TITLE)
                        .description(PROMPT_DESCRIPTION)
                        .footer(|f| f.text(PROMPT_FOOTER))
                })
                .components(|comp| {
                    comp.create_action_row(|row| {
                        row.create_button(|btn| {
                            btn.custom_id(VERIFY_BUTTON_ID)
                                .label(VERIFY_BUTTON_LABEL)
                                .style(ButtonStyle::Primary)
                        })
                    })
                })
            })
            .await?;

        Ok(())
    }

    async fn delete_message(&self, id: MessageId) -> Result<()> {
        self.channel_id.delete_message(&self.http, id).await?;
        Ok(())
    }
}
