use std::sync::Arc;

use serenity::builder::CreateApplicationCommand;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::id::{ChannelId, UserId};
use serenity::model::prelude::interaction::InteractionResponseType;
use serenity::model::Permissions;
use serenity::prelude::Context;
use tracing::{error, info};

use crate::commands::reply_ephemeral;
use crate::config::Config;
use crate::error::Result;
use crate::verification::prompt::{reset_prompt, DiscordPromptChannel};

pub async fn run(
    config: &Config,
    bot_id: UserId,
    command: &ApplicationCommandInteraction,
    ctx: Arc<Context>,
) -> Result<()> {
    let channel_id = match verification_channel(config) {
        Ok(channel_id) => channel_id,
        Err(reply) => return reply_ephemeral(&ctx.http, command, reply).await,
    };

    // Up to ten deletions can outlast the initial response window.
    command
        .create_interaction_response(&ctx.http, |res| {
            res.kind(InteractionResponseType::DeferredChannelMessageWithSource)
                .interaction_response_data(|msg| msg.ephemeral(true))
        })
        .await?;

    let channel = DiscordPromptChannel::new(ctx.http.clone(), channel_id, bot_id);
    let content = match reset_prompt(&channel).await {
        Ok(deleted) => {
            info!(%channel_id, deleted, user = %command.user.id, "Verification message reset by admin");
            "Verification message has been reset in the verification channel".to_string()
        }
        Err(e) => {
            error!(%channel_id, "Could not reset verification message: {}", e);
            format!("Failed to reset the verification message: {}", e)
        }
    };

    command
        .edit_original_interaction_response(&ctx.http, |res| res.content(content))
        .await?;

    Ok(())
}

/// The channel to reset, or the reply explaining why there is none.
fn verification_channel(config: &Config) -> std::result::Result<ChannelId, &'static str> {
    config
        .verification_channel
        .ok_or("Error: VERIFICATION_CHANNEL_ID not set in environment variables")
}

pub fn register(command: &mut CreateApplicationCommand) -> &mut CreateApplicationCommand {
    command
        .name("resetverify")
        .description("Admin only: Reset the verification message in the verification channel")
        .default_member_permissions(Permissions::ADMINISTRATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::{lookup, BASE};

    #[test]
    fn test_missing_channel_is_explained() {
        let config = Config::from_lookup(lookup(BASE)).unwrap();

        assert_eq!(
            verification_channel(&config),
            Err("Error: VERIFICATION_CHANNEL_ID not set in environment variables")
        );
    }

    #[test]
    fn test_configured_channel_is_reset() {
        let mut pairs = BASE.to_vec();
        pairs.push(("VERIFICATION_CHANNEL_ID", "1349926567333199882"));
        let config = Config::from_lookup(lookup(&pairs)).unwrap();

        assert_eq!(verification_channel(&config), Ok(ChannelId(1349926567333199882)));
    }
}
