use miette::Diagnostic;
use thiserror::Error;

use crate::components::ews::EwsError;

/// Response code EWS returns when the address has no mailbox
const NON_EXISTENT_MAILBOX: &str = "ErrorNonExistentMailbox";
/// Response code EWS returns for a missing folder
const FOLDER_NOT_FOUND: &str = "ErrorFolderNotFound";

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Invalid JSON input from stdin.")]
    #[diagnostic(code(qq_ews_sync::input::invalid_json))]
    InvalidJson(#[source] serde_json::Error),

    #[error("Missing required fields in stdin JSON.")]
    #[diagnostic(code(qq_ews_sync::input::missing_fields))]
    MissingFields,

    #[error("Error reading stdin: {0}")]
    #[diagnostic(code(qq_ews_sync::input::read))]
    StdinRead(#[source] std::io::Error),

    #[error("Configuration or data error: {0}")]
    #[diagnostic(code(qq_ews_sync::config))]
    Configuration(String),

    #[error("QQ EWS Authentication failed. Check email and password/app-code.")]
    #[diagnostic(code(qq_ews_sync::ews::auth))]
    Auth,

    #[error("QQ EWS mailbox not found for {0}. Check the email address.")]
    #[diagnostic(code(qq_ews_sync::ews::mailbox_not_found))]
    MailboxNotFound(String),

    #[error("QQ EWS connection error: {0}")]
    #[diagnostic(code(qq_ews_sync::ews::transport))]
    Transport(String),

    #[error("QQ EWS rate limit exceeded. Try again later.")]
    #[diagnostic(code(qq_ews_sync::ews::rate_limit))]
    RateLimit,

    #[error("An unexpected error occurred during QQ EWS sync: {0}")]
    #[diagnostic(code(qq_ews_sync::ews::unknown))]
    Unknown(String),

    #[error("Could not find the Inbox folder.")]
    #[diagnostic(code(qq_ews_sync::inbox::folder_not_found))]
    FolderNotFound,

    #[error("Error accessing emails: {0}")]
    #[diagnostic(code(qq_ews_sync::inbox::read))]
    MailRead(String),

    #[error(transparent)]
    #[diagnostic(code(qq_ews_sync::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(qq_ews_sync::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(qq_ews_sync::other))]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl Error {
    /// Categorize a failure raised while establishing the session
    pub fn from_session(err: EwsError, email: &str) -> Self {
        match err {
            EwsError::Unauthorized => Error::Auth,
            _ if err.code() == Some(NON_EXISTENT_MAILBOX) => Error::MailboxNotFound(email.to_string()),
            EwsError::Throttled { .. } => Error::RateLimit,
            EwsError::Transport(message) => Error::Transport(message),
            other => Error::Unknown(other.to_string()),
        }
    }

    /// Categorize a failure raised while reading the inbox
    pub fn from_probe(err: EwsError) -> Self {
        match err {
            _ if err.code() == Some(FOLDER_NOT_FOUND) => Error::FolderNotFound,
            other => Error::MailRead(other.to_string()),
        }
    }
}

/// Type alias for Result with our Error type
pub type AppResult<T> = Result<T, Error>;

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Configuration(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
