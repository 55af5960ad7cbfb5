use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    // Configuration errors
    #[error("Missing environment variable {key}")]
    MissingEnv { key: &'static str },

    #[error("Invalid value for {key}: {message}")]
    InvalidEnv { key: &'static str, message: String },

    // Storage errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    // Discord errors
    #[error("Discord API error: {0}")]
    Discord(#[from] serenity::Error),

    #[error("Role not found: {name}")]
    RoleNotFound { name: String },
}

pub type Result<T> = std::result::Result<T, BotError>;
