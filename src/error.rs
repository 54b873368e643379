use std::fmt;

use reqwest::Method;
use reqwest::header::InvalidHeaderValue;

use crate::requests::Response;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    MaxRequestAttemptsExceeded(#[from] MaxRequestAttemptsExceededError),

    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),

    #[error("the scraper client has been closed")]
    Closed,
}

impl Error {
    /// The per-attempt error when exactly one attempt was configured.
    pub fn as_request_error(&self) -> Option<&RequestError> {
        match self {
            Error::Request(error) => Some(error),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("max_request_attempts must be a positive integer, but got {0}")]
    InvalidMaxRequestAttempts(i64),

    #[error("wait range minimum {min:?} is greater than its maximum {max:?}")]
    InvalidWaitRange {
        min: std::time::Duration,
        max: std::time::Duration,
    },

    #[error("wait seconds must be a finite, non-negative number, but got {0}")]
    InvalidWaitSeconds(f64),

    #[error("requests_per_second must be a positive integer")]
    InvalidRequestRate,

    #[error("failed to load env variables into config struct")]
    Env(#[from] envy::Error),

    #[error("failed to build the HTTP client")]
    Client(#[source] reqwest::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Connect,
    Timeout,
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportErrorKind::Connect => write!(f, "connection"),
            TransportErrorKind::Timeout => write!(f, "timeout"),
            TransportErrorKind::Other => write!(f, "transport"),
        }
    }
}

/// A failure below the HTTP layer: no response was received.
#[derive(Debug, thiserror::Error)]
#[error("{kind} error: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        let kind = if error.is_timeout() {
            TransportErrorKind::Timeout
        } else if error.is_connect() {
            TransportErrorKind::Connect
        } else {
            TransportErrorKind::Other
        };
        Self {
            kind,
            message: error.to_string(),
            source: Some(Box::new(error)),
        }
    }
}

/// Classification of a single failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    Status,
    AntiBotDetected,
    UnexpectedContent,
}

/// Why one attempt of a request failed. Any of these is followed by another
/// attempt while attempts remain.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("{} request to '{}' failed with HTTP status {}", .0.method, .0.url, .0.status)]
    Status(Box<Response>),

    #[error("the response from '{}' contains Anti-Bot content", .0.url)]
    AntiBotDetected(Box<Response>),

    #[error("the {} response from '{}' does not contain yad2 related content", .0.method, .0.url)]
    UnexpectedContent(Box<Response>),
}

impl RequestError {
    pub fn kind(&self) -> FailureKind {
        match self {
            RequestError::Transport(_) => FailureKind::Transport,
            RequestError::Status(_) => FailureKind::Status,
            RequestError::AntiBotDetected(_) => FailureKind::AntiBotDetected,
            RequestError::UnexpectedContent(_) => FailureKind::UnexpectedContent,
        }
    }

    /// The offending response, when one was received.
    pub fn response(&self) -> Option<&Response> {
        match self {
            RequestError::Transport(_) => None,
            RequestError::Status(response)
            | RequestError::AntiBotDetected(response)
            | RequestError::UnexpectedContent(response) => Some(response),
        }
    }
}

/// Raised when every configured attempt failed. Chains from the last error.
#[derive(Debug)]
pub struct MaxRequestAttemptsExceededError {
    pub method: Method,
    pub url: String,
    pub max_attempts: u32,
    pub errors: Vec<RequestError>,
}

impl fmt::Display for MaxRequestAttemptsExceededError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "All {} attempts for {} request to '{}' have failed",
            self.max_attempts, self.method, self.url
        )
    }
}

impl std::error::Error for MaxRequestAttemptsExceededError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.errors
            .last()
            .map(|error| error as &(dyn std::error::Error + 'static))
    }
}
