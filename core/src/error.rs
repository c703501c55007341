//! Error type delivered to the failure half of a callback pair.
//!
//! # Design
//! Callers see exactly one kind of error, "request failed". Transport
//! errors, non-2xx responses and parameter encoding problems all collapse
//! into `RequestError`; `FailureCause` only records what happened underneath
//! so it can be logged or inspected.

use thiserror::Error;

/// A dispatched request did not complete successfully.
#[derive(Debug, Error)]
#[error("request to {url} failed: {cause}")]
pub struct RequestError {
    url: String,
    #[source]
    cause: FailureCause,
}

/// What went wrong underneath a `RequestError`.
#[derive(Debug, Error)]
pub enum FailureCause {
    /// The request never produced an HTTP response (DNS, connect, timeout, I/O).
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The parameter mapping could not be encoded into a request body.
    #[error("could not encode parameters: {0}")]
    Encode(String),
}

impl RequestError {
    pub fn new(url: impl Into<String>, cause: FailureCause) -> Self {
        Self {
            url: url.into(),
            cause,
        }
    }

    pub fn transport(url: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::new(url, FailureCause::Transport(err.to_string()))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn cause(&self) -> &FailureCause {
        &self.cause
    }

    /// HTTP status of the failed response, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self.cause {
            FailureCause::Status { status, .. } => Some(status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn display_includes_url_and_cause() {
        let err = RequestError::new(
            "http://10.8.31.5:8090/analysis/appsflyer_post/x",
            FailureCause::Status {
                status: 503,
                body: "busy".to_string(),
            },
        );
        assert_eq!(
            err.to_string(),
            "request to http://10.8.31.5:8090/analysis/appsflyer_post/x failed: HTTP 503: busy"
        );
        assert_eq!(err.status(), Some(503));
    }

    #[test]
    fn cause_is_exposed_as_source() {
        let err = RequestError::transport("http://h:8090/", "connection refused");
        let source = err.source().expect("source");
        assert_eq!(source.to_string(), "transport error: connection refused");
        assert!(err.status().is_none());
    }
}
