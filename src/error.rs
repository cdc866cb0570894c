use miette::Diagnostic;
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Missing environment variable(s): {}", .0.join(", "))]
    #[diagnostic(
        code(vestige::environment),
        help(
            "Set them in the environment or in a .env file. You can find these keys \
             on the Google API Console: https://console.cloud.google.com/apis/credentials"
        )
    )]
    Environment(Vec<String>),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(vestige::config))]
    Config(String),

    #[error("Authorization error: {0}")]
    #[diagnostic(
        code(vestige::authorization),
        help("Run the `authorize` binary to grant access again")
    )]
    Authorization(String),

    #[error("Google Calendar API error: {0}")]
    #[diagnostic(code(vestige::google_calendar))]
    GoogleCalendar(String),

    #[error(transparent)]
    #[diagnostic(code(vestige::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(vestige::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(vestige::other))]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type VestigeResult<T> = Result<T, Error>;

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create authorization errors
pub fn authorization_error(message: &str) -> Error {
    Error::Authorization(message.to_string())
}

/// Helper to create Google Calendar errors
pub fn google_calendar_error(message: &str) -> Error {
    Error::GoogleCalendar(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
