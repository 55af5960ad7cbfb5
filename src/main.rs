mod commands;
mod config;
mod error;
mod events;
mod store;
mod verification;

use std::sync::Arc;

use once_cell::sync::OnceCell;
use serenity::async_trait;
use serenity::http::Http;
use serenity::model::application::interaction::Interaction;
use serenity::model::gateway::Ready;
use serenity::model::id::UserId;
use serenity::prelude::*;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::events::BotEvent;
use crate::store::SqlLinkStore;
use crate::verification::form::{self, DiscordRoles, ModalResponder};
use crate::verification::prompt::{ensure_prompt, DiscordPromptChannel};

struct Bot {
    config: Config,
    links: SqlLinkStore,
    bot_id: OnceCell<UserId>,
}

impl Bot {
    async fn current_user_id(&self, http: &Http) -> Result<UserId> {
        if let Some(id) = self.bot_id.get() {
            return Ok(*id);
        }

        let id = http.get_current_user().await?.id;
        Ok(*self.bot_id.get_or_init(|| id))
    }

    async fn handle(&self, ctx: Arc<Context>, event: BotEvent) {
        match event {
            BotEvent::CommandInvoked(command) => {
                let result = match command.data.name.as_str() {
                    "announce" => commands::announce::run(&self.config, &command, ctx.clone()).await,
                    "resetverify" => match self.current_user_id(&ctx.http).await {
                        Ok(bot_id) => {
                            commands::resetverify::run(&self.config, bot_id, &command, ctx.clone()).await
                        }
                        Err(e) => Err(e),
                    },
                    _ => Ok(()),
                };

                if let Err(e) = result {
                    error!(command = %command.data.name, "Error executing command: {}", e);
                    if let Err(e) = commands::report_failure(
                        &ctx.http,
                        &command,
                        "There was an error executing this command.",
                    )
                    .await
                    {
                        error!(command = %command.data.name, "Could not report command failure: {}", e);
                    }
                }
            }
            BotEvent::ButtonActivated(component) => {
                if let Err(e) = form::show_modal(&ctx.http, &component).await {
                    error!(user = %component.user.id, "Could not open verification form: {}", e);
                }
            }
            BotEvent::FormSubmitted { interaction, steam_id } => {
                let guild_id = interaction.guild_id.unwrap_or(self.config.guild_id);
                let roles = DiscordRoles::new(ctx.http.clone(), guild_id);
                let responder = ModalResponder::new(&ctx.http, &interaction);

                if let Err(e) =
                    form::answer(&responder, &self.links, &roles, interaction.user.id, &steam_id).await
                {
                    error!(user = %interaction.user.id, "Could not answer verification form: {}", e);
                }
            }
        }
    }
}

#[async_trait]
impl EventHandler for Bot {
    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Some(event) = BotEvent::from_interaction(interaction) {
            self.handle(Arc::new(ctx), event).await;
        }
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);
        let bot_id = *self.bot_id.get_or_init(|| ready.user.id);

        match commands::register_guild_commands(&ctx.http, self.config.guild_id).await {
            Ok(registered) => info!(
                guild_id = %self.config.guild_id,
                count = registered.len(),
                "Successfully reloaded application (/) commands."
            ),
            Err(e) => error!("Could not register application commands: {}", e),
        }

        match self.config.verification_channel {
            Some(channel_id) => {
                let channel = DiscordPromptChannel::new(ctx.http.clone(), channel_id, bot_id);
                match ensure_prompt(&channel).await {
                    Ok(_) => info!(%channel_id, "Verification message set up"),
                    Err(e) => error!(%channel_id, "Could not set up verification message: {}", e),
                }
            }
            None => warn!("VERIFICATION_CHANNEL_ID not set in environment variables, skipping verification message"),
        }
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(true)
        .init();
}

async fn run() -> Result<()> {
    let config = Config::from_env()?;

    let links = SqlLinkStore::connect(&config).await?;
    links.ensure_schema().await?;

    let mut builder = Client::builder(config.token.clone(), GatewayIntents::GUILDS);
    if let Some(application_id) = config.application_id {
        builder = builder.application_id(application_id);
    }

    let bot = Bot {
        config,
        links,
        bot_id: OnceCell::new(),
    };

    let mut client = builder.event_handler(bot).await?;
    client.start().await?;

    Ok(())
}

#[tokio::main]
async fn main() {
    // A .env file is optional; real environment variables work just as well.
    dotenv::dotenv().ok();
    init_logging();

    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}
