use std::sync::Arc;

use serenity::builder::CreateApplicationCommand;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::channel::{Attachment, ChannelType};
use serenity::model::id::ChannelId;
use serenity::model::prelude::command::CommandOptionType;
use serenity::model::prelude::interaction::application_command::CommandDataOptionValue;
use serenity::model::{Permissions, Timestamp};
use serenity::prelude::Context;
use serenity::utils::Colour;
use tracing::{error, info};

use crate::commands::reply_ephemeral;
use crate::config::Config;
use crate::error::Result;

pub const DEFAULT_COLOUR: u32 = 0x0099FF;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCandidate {
    pub url: String,
    pub content_type: Option<String>,
}

impl From<&Attachment> for ImageCandidate {
    fn from(attachment: &Attachment) -> Self {
        Self {
            url: attachment.url.clone(),
            content_type: attachment.content_type.clone(),
        }
    }
}

impl ImageCandidate {
    /// Only attachments Discord reports as `image/*` may be embedded.
    pub fn image_url(&self) -> Option<&str> {
        match self.content_type.as_deref() {
            Some(kind) if kind.starts_with("image/") => Some(&self.url),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Announcement {
    pub title: String,
    pub body: String,
    pub colour: Colour,
    pub thumbnail: Option<String>,
    pub image: Option<String>,
}

impl Announcement {
    pub fn new(
        title: String,
        body: String,
        colour: Option<&str>,
        header: Option<&ImageCandidate>,
        image: Option<&ImageCandidate>,
    ) -> Self {
        Self {
            title,
            body,
            colour: colour.and_then(parse_hex_colour).unwrap_or(Colour::new(DEFAULT_COLOUR)),
            thumbnail: header.and_then(ImageCandidate::image_url).map(str::to_string),
            image: image.and_then(ImageCandidate::image_url).map(str::to_string),
        }
    }
}

fn parse_hex_colour(hex: &str) -> Option<Colour> {
    let hex = hex.trim().trim_start_matches('#');
    if hex.is_empty() || hex.len() > 6 {
        return None;
    }
    u32::from_str_radix(hex, 16).ok().map(Colour::new)
}

struct AnnounceOptions {
    title: String,
    body: String,
    channel: Option<ChannelId>,
    colour: Option<String>,
    header: Option<ImageCandidate>,
    image: Option<ImageCandidate>,
}

fn read_options(command: &ApplicationCommandInteraction) -> AnnounceOptions {
    let mut options = AnnounceOptions {
        title: String::new(),
        body: String::new(),
        channel: None,
        colour: None,
        header: None,
        image: None,
    };

    for option in &command.data.options {
        match (option.name.as_str(), option.resolved.as_ref()) {
            ("title", Some(CommandDataOptionValue::String(value))) => options.title = value.clone(),
            ("body", Some(CommandDataOptionValue::String(value))) => options.body = value.clone(),
            ("color", Some(CommandDataOptionValue::String(value))) => options.colour = Some(value.clone()),
            ("channel", Some(CommandDataOptionValue::Channel(channel))) => options.channel = Some(channel.id),
            ("header", Some(CommandDataOptionValue::Attachment(attachment))) => {
                options.header = Some(ImageCandidate::from(attachment))
            }
            ("image", Some(CommandDataOptionValue::Attachment(attachment))) => {
                options.image = Some(ImageCandidate::from(attachment))
            }
            _ => (),
        }
    }

    options
}

pub async fn run(config: &Config, command: &ApplicationCommandInteraction, ctx: Arc<Context>) -> Result<()> {
    let options = read_options(command);

    let channel_id = match options.channel.or(config.announce_channel) {
        Some(channel_id) => channel_id,
        None => {
            return reply_ephemeral(
                &ctx.http,
                command,
                "Error: Could not find the specified channel or the default channel.",
            )
            .await;
        }
    };

    let announcement = Announcement::new(
        options.title,
        options.body,
        options.colour.as_deref(),
        options.header.as_ref(),
        options.image.as_ref(),
    );

    let sent = channel_id
        .send_message(&ctx.http, |msg| {
            msg.embed(|e| {
                e.title(&announcement.title)
                    .description(&announcement.body)
                    .colour(announcement.colour)
                    .timestamp(Timestamp::now());

                if let Some(url) = &announcement.thumbnail {
                    e.thumbnail(url);
                }
                if let Some(url) = &announcement.image {
                    e.image(url);
                }

                e
            })
        })
        .await;

    match sent {
        Ok(_) => {
            info!(%channel_id, user = %command.user.id, "Announcement sent");
            reply_ephemeral(
                &ctx.http,
                command,
                format!("Announcement successfully sent to <#{}>!", channel_id.0),
            )
            .await
        }
        Err(e) => {
            error!(%channel_id, "Error in announce command: {}", e);
            reply_ephemeral(&ctx.http, command, format!("Failed to send announcement: {}", e)).await
        }
    }
}

pub fn register(command: &mut CreateApplicationCommand) -> &mut CreateApplicationCommand {
    command
        .name("announce")
        .description("Create an announcement embed")
        .default_member_permissions(Permissions::MANAGE_MESSAGES)
        .create_option(|option| {
            option
                .name("title")
                .description("The title of the announcement")
                .kind(CommandOptionType::String)
                .required(true)
        })
        .create_option(|option| {
            option
                .name("body")
                .description("The body text of the announcement")
                .kind(CommandOptionType::String)
                .required(true)
        })
        .create_option(|option| {
            option
                .name("channel")
                .description("The channel to send the announcement to")
                .kind(CommandOptionType::Channel)
                .channel_types(&[ChannelType::Text])
                .required(false)
        })
        .create_option(|option| {
            option
                .name("color")
                .description("The color of the embed (hex code without #)")
                .kind(CommandOptionType::String)
                .required(false)
        })
        .create_option(|option| {
            option
                .name("header")
                .description("Optional header image to include at the top of the announcement")
                .kind(CommandOptionType::Attachment)
                .required(false)
        })
        .create_option(|option| {
            option
                .name("image")
                .description("Optional image to include in the announcement body")
                .kind(CommandOptionType::Attachment)
                .required(false)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(url: &str, content_type: Option<&str>) -> ImageCandidate {
        ImageCandidate {
            url: url.to_string(),
            content_type: content_type.map(str::to_string),
        }
    }

    #[test]
    fn test_text_attachment_is_not_embedded() {
        let notes = candidate("https://cdn.example/notes.txt", Some("text/plain"));
        let banner = candidate("https://cdn.example/banner.png", Some("image/png"));

        let announcement = Announcement::new(
            "Wipe".into(),
            "Server wipe on Friday".into(),
            None,
            Some(&banner),
            Some(&notes),
        );

        assert_eq!(announcement.thumbnail.as_deref(), Some("https://cdn.example/banner.png"));
        assert_eq!(announcement.image, None);
    }

    #[test]
    fn test_attachment_without_content_type_is_not_embedded() {
        let unknown = candidate("https://cdn.example/blob", None);

        assert_eq!(unknown.image_url(), None);
    }

    #[test]
    fn test_image_attachments_are_embedded() {
        let header = candidate("https://cdn.example/a.gif", Some("image/gif"));
        let body = candidate("https://cdn.example/b.jpeg", Some("image/jpeg"));

        let announcement = Announcement::new("t".into(), "b".into(), None, Some(&header), Some(&body));

        assert_eq!(announcement.thumbnail.as_deref(), Some("https://cdn.example/a.gif"));
        assert_eq!(announcement.image.as_deref(), Some("https://cdn.example/b.jpeg"));
    }

    #[test]
    fn test_colour_parsing() {
        let colour = |input| Announcement::new("t".into(), "b".into(), input, None, None).colour;

        assert_eq!(colour(None), Colour::new(DEFAULT_COLOUR));
        assert_eq!(colour(Some("ff0000")), Colour::new(0xff0000));
        assert_eq!(colour(Some("#2ecc71")), Colour::new(0x2ecc71));
        assert_eq!(colour(Some("not a colour")), Colour::new(DEFAULT_COLOUR));
        assert_eq!(colour(Some("1234567")), Colour::new(DEFAULT_COLOUR));
        assert_eq!(colour(Some("")), Colour::new(DEFAULT_COLOUR));
    }
}
