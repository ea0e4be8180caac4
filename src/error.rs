use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use anyhow::Error as ANYHOW_ERROR;
use reqwest::Error as REQWEST_ERROR;
use serde::Serialize;
use serde_json::Error as JSON_ERROR;
use std::{env::VarError, io::Error as IO_ERROR, num::ParseIntError};
use thiserror::Error;
use tokio::task::JoinError;
use tracing::{error, warn};
use tracing::subscriber::SetGlobalDefaultError as TRACING_GLOBAL_DEFAULT_ERROR;
use url::ParseError as URL_ERROR;

use crate::provider::PageError;

pub const MISSING_KEYS_MESSAGE: &str = "Missing API keys";
pub const RATE_LIMIT_MESSAGE: &str = "Kraken rate limit hit. Try again after a short pause and avoid repeated rapid requests.";
const SERVER_ERROR_MESSAGE: &str = "Server error";

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] IO_ERROR),

    #[error("{0}")]
    URL(#[from] URL_ERROR),

    #[error("{0}")]
    INT(#[from] ParseIntError),

    #[error("{0}")]
    VAR(#[from] VarError),

    #[error("{0}")]
    TokioJoinError(#[from] JoinError),

    #[error("{0}")]
    JsonError(#[from] JSON_ERROR),

    #[error("{0}")]
    REQWEST(#[from] REQWEST_ERROR),

    #[error("{0}")]
    AnyHowError(#[from] ANYHOW_ERROR),

    #[error("Tracing error: {0}")]
    SetGlobalDefaultError(#[from] TRACING_GLOBAL_DEFAULT_ERROR),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Upstream rate limit exceeded")]
    RateLimited,

    #[error("Kraken API error: {0}")]
    UpstreamError(String),

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Cancelled")]
    Cancelled,
}

impl Error {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::RateLimited)
    }

    /// Message shown to the caller. Only the joined upstream message and
    /// input problems are passed through, everything else is generic.
    pub fn public_message(&self) -> String {
        match self {
            Error::InvalidInput(message) => message.to_owned(),
            Error::RateLimited => String::from(RATE_LIMIT_MESSAGE),
            Error::UpstreamError(_) => self.to_string(),
            _ => String::from(SERVER_ERROR_MESSAGE),
        }
    }
}

impl From<PageError> for Error {
    fn from(value: PageError) -> Self {
        match value {
            PageError::RateLimited => Error::RateLimited,
            PageError::Upstream(detail) => Error::UpstreamError(detail),
            PageError::Transport(detail) => Error::TransportError(detail),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Error::Cancelled => StatusCode::NO_CONTENT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        if let Error::Cancelled = self {
            return HttpResponse::build(status).finish();
        }

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("{}", self);
        } else if self.is_retryable() {
            warn!("{}, caller told to retry later", self);
        }

        HttpResponse::build(status).json(ErrorResponse {
            ok: false,
            error: self.public_message(),
        })
    }
}
