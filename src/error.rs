use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid URL '{0}'. Ensure the URL starts with http:// or https://")]
    InvalidTargetUrl(String),
    #[error("Invalid notification URL '{url}': {reason}")]
    InvalidNotificationUrl { url: String, reason: String },
    #[error("Invalid topic '{0}'. Topics may only contain letters, digits, '-' and '_'")]
    InvalidTopic(String),
    #[error("Missing notification configuration: {0}")]
    MissingNotificationConfig(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Environment variable fetching error: {0}")]
    EnvVar(#[from] dotenvy::Error),
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("Notification delivery failed with status {0}")]
    NotificationDelivery(StatusCode),
}

/// A network-level failure: nothing usable came back from the peer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("too many redirects: {0}")]
    Redirect(String),
    #[error("request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else if err.is_redirect() {
            TransportError::Redirect(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}
