pub mod announce;
pub mod resetverify;

use std::future::Future;

use serenity::http::Http;
use serenity::model::application::command::Command;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::id::GuildId;
use serenity::model::prelude::interaction::InteractionResponseType;
use tracing::debug;

use crate::error::{BotError, Result};

/// Replaces the guild's whole slash command set with this bot's commands.
pub async fn register_guild_commands(http: &Http, guild_id: GuildId) -> Result<Vec<Command>> {
    let commands = guild_id
        .set_application_commands(http, |commands| {
            commands
                .create_application_command(|cmd| announce::register(cmd))
                .create_application_command(|cmd| resetverify::register(cmd))
        })
        .await?;

    Ok(commands)
}

pub async fn reply_ephemeral(
    http: &Http,
    command: &ApplicationCommandInteraction,
    content: impl ToString,
) -> Result<()> {
    command
        .create_interaction_response(http, |res| {
            res.kind(InteractionResponseType::ChannelMessageWithSource)
                .interaction_response_data(|msg| msg.content(content).ephemeral(true))
        })
        .await?;

    Ok(())
}

/// Tells the user a command failed, whether or not it was already acknowledged.
pub async fn report_failure(
    http: &Http,
    command: &ApplicationCommandInteraction,
    content: &str,
) -> Result<()> {
    let edit = async {
        command
            .edit_original_interaction_response(http, |res| res.content(content))
            .await?;
        Ok::<(), BotError>(())
    };

    edit_or_respond(edit, || reply_ephemeral(http, command, content)).await
}

// A deferred command only accepts edits; a fresh one only accepts a response.
async fn edit_or_respond<E, R, F>(edit: E, respond: R) -> Result<()>
where
    E: Future<Output = Result<()>>,
    R: FnOnce() -> F,
    F: Future<Output = Result<()>>,
{
    match edit.await {
        Ok(()) => Ok(()),
        Err(e) => {
            debug!("No response to edit, responding instead: {}", e);
            respond().await
        }
    }
}
