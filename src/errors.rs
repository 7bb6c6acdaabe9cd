use reqwest::StatusCode;
use thiserror::Error;

use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum ClipError {
    #[error("{0} is not configured")]
    Config(&'static str),

    #[error("{service} request failed: {status}. {body}")]
    Http {
        service: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("{service} request failed: {message}")]
    Transport {
        service: &'static str,
        message: String,
    },

    #[error("{service} error: {message}")]
    Provider {
        service: &'static str,
        message: String,
    },

    #[error("extracted content is empty: {0}")]
    EmptyContent(&'static str),

    #[error("model reply contained no content")]
    EmptyResponse,

    #[error("malformed analysis reply: {0}")]
    MalformedResponse(String),

    #[error("page scripting unavailable: {0}")]
    Environment(String),

    #[error("no target tab: {0}")]
    TabResolution(String),

    #[error("this page cannot be read")]
    RestrictedPage,

    #[error("bookmark title is required")]
    MissingTitle,

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Coarse taxonomy bucket used by front ends to pick a message and a remedy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Http,
    Provider,
    EmptyContent,
    EmptyResponse,
    MalformedResponse,
    Environment,
    RestrictedPage,
    Input,
    Storage,
}

impl ErrorKind {
    /// Whether the user has to change settings before a retry can succeed.
    pub fn needs_settings(&self) -> bool {
        matches!(self, Self::Config)
    }
}

impl ClipError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::Http { .. } | Self::Transport { .. } => ErrorKind::Http,
            Self::Provider { .. } => ErrorKind::Provider,
            Self::EmptyContent(_) => ErrorKind::EmptyContent,
            Self::EmptyResponse => ErrorKind::EmptyResponse,
            Self::MalformedResponse(_) => ErrorKind::MalformedResponse,
            Self::Environment(_) | Self::TabResolution(_) => ErrorKind::Environment,
            Self::RestrictedPage => ErrorKind::RestrictedPage,
            Self::MissingTitle => ErrorKind::Input,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Map a transport-level reqwest failure for the named service.
    pub fn from_reqwest_error(service: &'static str, err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            Self::Http {
                service,
                status,
                body: String::new(),
            }
        } else if err.is_timeout() {
            Self::Transport {
                service,
                message: "request timed out".to_string(),
            }
        } else {
            Self::Transport {
                service,
                message: err.to_string(),
            }
        }
    }

    /// Status line shown to the user once the error reaches the session boundary.
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(what) => format!("Please configure {what} in the settings first"),
            Self::Http {
                service,
                status,
                body,
            } => {
                if body.is_empty() {
                    format!("{service} request failed ({status})")
                } else {
                    format!("{service} request failed ({status}): {body}")
                }
            }
            Self::Transport { service, message } => {
                format!("Could not reach {service}: {message}")
            }
            Self::Provider { service, message } => format!("{service} reported: {message}"),
            Self::EmptyContent(hint) => format!("No page content was extracted, {hint}"),
            Self::EmptyResponse => {
                "The model returned an empty reply, please try again".to_string()
            }
            Self::MalformedResponse(reason) => {
                format!("Could not understand the model reply: {reason}")
            }
            Self::Environment(reason) => format!("Page extraction is unavailable: {reason}"),
            Self::TabResolution(reason) => format!("Could not find the page to read: {reason}"),
            Self::RestrictedPage => {
                "This page cannot be read (browser-internal pages are off limits)".to_string()
            }
            Self::MissingTitle => "A title is required before saving".to_string(),
            Self::Storage(err) => format!("Settings storage failed: {err}"),
        }
    }
}
