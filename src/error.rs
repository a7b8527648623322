use thiserror::Error;

use crate::api::ApiError;
use crate::payload::ValidationError;

#[derive(Error, Debug)]
pub enum DeskError {
    #[error("Not in a voicedesk project. Run 'voicedesk init' first.")]
    NotInitialized,

    #[error("Already initialized. Remove .voicedesk/ to reinitialize.")]
    AlreadyInitialized,

    #[error("Not logged in. Run 'voicedesk login' first.")]
    NotLoggedIn,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Invalid route: {0}")]
    InvalidRoute(String),

    #[error("Unknown draft field: {0}")]
    UnknownField(String),

    #[error("Invalid value '{value}' for {field}")]
    InvalidValue { field: String, value: String },

    #[error("Wizard is on step '{0}', submission happens on the prompt step")]
    NotOnPromptStep(String),

    #[error("Wizard is already on its last step")]
    NoNextStep,

    #[error("No row selected")]
    NoSelection,

    #[error("No confirmation is pending")]
    NoPendingConfirm,

    #[error("Another change is already being saved")]
    MutationInFlight,

    #[error("Confirmation needed. Use --yes in non-interactive mode.")]
    ConfirmationRequired,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl DeskError {
    /// Text for the transient notification shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            DeskError::Validation(e) => e.to_string(),
            DeskError::Api(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

impl From<rusqlite::Error> for DeskError {
    fn from(e: rusqlite::Error) -> Self {
        DeskError::Storage(format!("SQLite error: {}", e))
    }
}

pub type Result<T> = std::result::Result<T, DeskError>;
