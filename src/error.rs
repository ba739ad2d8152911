use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeckError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Invalid repository '{0}': expected owner/name")]
    InvalidRepository(String),

    #[error("Invalid route: {0}")]
    InvalidRoute(String),

    #[error("Failed to open browser: {0}")]
    Browser(String),

    #[error("Failed to copy URL: {0}")]
    Clipboard(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for DeckError {
    fn from(err: reqwest::Error) -> Self {
        DeckError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for DeckError {
    fn from(err: serde_json::Error) -> Self {
        DeckError::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DeckError>;
