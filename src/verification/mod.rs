pub mod form;
pub mod prompt;

use once_cell::sync::Lazy;
use regex::Regex;

pub const PROMPT_TITLE: &str = "Steam Account Verification";
pub const PROMPT_DESCRIPTION: &str = "Click the button below to verify your Steam account";
pub const PROMPT_FOOTER: &str = "This verification is only visible to you when interacted with";
pub const PROMPT_COLOUR: u32 = 0x0099FF;

pub const VERIFY_BUTTON_ID: &str = "verify-steam-button";
pub const VERIFY_BUTTON_LABEL: &str = "Verify with Steam";

pub const MODAL_ID: &str = "steam-id-modal";
pub const STEAM_ID_INPUT_ID: &str = "steam-id-input";

pub const VERIFIED_ROLE: &str = "Verified";

/// How many of the channel's newest messages are searched for an existing prompt.
pub const PROMPT_LOOKBACK: u64 = 10;

pub const STEAM_ID_LENGTH: u64 = 17;

// ASCII digits only; `\d` would also admit other Unicode decimal digits.
static STEAM_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^7656119[0-9]{10}$").expect("steam id pattern is valid"));

/// Checks the format of a 64-bit Steam ID. Nothing is looked up on Steam itself.
pub fn is_valid_steam_id(input: &str) -> bool {
    STEAM_ID.is_match(input)
}
