use std::time::Duration;
use thiserror::Error;

/// Failures reported by the EWS client before they are categorized for output
#[derive(Debug, Error)]
pub enum EwsError {
    /// The endpoint rejected the credentials (HTTP 401)
    #[error("The server rejected the credentials (HTTP 401)")]
    Unauthorized,

    /// A non-success response code, from a ResponseMessage or a SOAP fault
    #[error("{code}: {message}")]
    Response { code: String, message: String },

    /// The server kept throttling until the retry budget ran out
    #[error("Server busy, gave up after waiting {waited:?}")]
    Throttled { waited: Duration },

    /// DNS, TLS, connection or HTTP-level failure
    #[error("{0}")]
    Transport(String),

    /// The response was not the SOAP document we asked for
    #[error("Malformed EWS response: {0}")]
    Malformed(String),
}

impl EwsError {
    /// The EWS response code, when the server sent one
    pub fn code(&self) -> Option<&str> {
        match self {
            EwsError::Response { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// Render a reqwest error together with its source chain
pub(crate) fn describe(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
