use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::model::application::interaction::modal::ModalSubmitInteraction;
use serenity::model::application::interaction::Interaction;

use crate::verification::{form, MODAL_ID, VERIFY_BUTTON_ID};

/// The interactions this bot reacts to. Anything else is dropped at the door.
pub enum BotEvent {
    CommandInvoked(ApplicationCommandInteraction),
    ButtonActivated(MessageComponentInteraction),
    FormSubmitted {
        interaction: ModalSubmitInteraction,
        steam_id: String,
    },
}

impl BotEvent {
    pub fn from_interaction(interaction: Interaction) -> Option<Self> {
        match interaction {
            Interaction::ApplicationCommand(command) => Some(BotEvent::CommandInvoked(command)),
            Interaction::MessageComponent(component) if component.data.custom_id == VERIFY_BUTTON_ID => {
                Some(BotEvent::ButtonActivated(component))
            }
            Interaction::ModalSubmit(modal) if modal.data.custom_id == MODAL_ID => {
                let steam_id = form::submitted_steam_id(&modal).unwrap_or_default();
                Some(BotEvent::FormSubmitted {
                    interaction: modal,
                    steam_id,
                })
            }
            _ => None,
        }
    }
}
