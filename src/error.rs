// Error types for hublook.
// Classifies fetch outcomes: not-found, other HTTP failures, transport errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// HTTP 404: the requested login does not exist. A domain outcome, not a
    /// transport failure; consumers render it as a literal not-found state.
    #[error("not found: {message}")]
    NotFound { message: String },

    /// Any other non-2xx response.
    #[error("HTTP {code}: {message}")]
    Status { code: u16, message: String },

    /// Transport failure: DNS, connection refused, timeout.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// A URI template placeholder had no matching parameter. Programming
    /// error; never sent over the network.
    #[error("unresolved URI placeholder `:{0}`")]
    UnresolvedPlaceholder(String),
}

impl Error {
    /// HTTP status behind this error, or 0 when no response was received.
    pub fn code(&self) -> u16 {
        match self {
            Error::NotFound { .. } => 404,
            Error::Status { code, .. } => *code,
            Error::Network(err) => err.status().map(|s| s.as_u16()).unwrap_or(0),
            Error::Json(_) | Error::UnresolvedPlaceholder(_) => 0,
        }
    }

    /// Whether this is the "no such login" outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
