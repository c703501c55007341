//! HTTP transport types.
//!
//! # Design
//! Requests and responses are plain data. `build_post` turns a URL and a
//! parameter mapping into an `HttpRequest` without touching the network, and
//! `HttpResponse::into_outcome` maps whatever the transport returned onto the
//! success/failure split the callback pair expects. The poster in between is
//! the only part that does I/O, so everything here is testable without a
//! server.

use std::time::Duration;

use crate::error::{FailureCause, RequestError};
use crate::params::RequestParams;

/// Per-request timeout overrides. `None` falls back to the poster's defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timeouts {
    pub connect: Option<Duration>,
    pub read: Option<Duration>,
    pub write: Option<Duration>,
}

impl Timeouts {
    pub fn is_empty(&self) -> bool {
        self.connect.is_none() && self.read.is_none() && self.write.is_none()
    }

    /// Fill unset fields from `defaults`.
    pub fn or(self, defaults: Timeouts) -> Timeouts {
        Timeouts {
            connect: self.connect.or(defaults.connect),
            read: self.read.or(defaults.read),
            write: self.write.or(defaults.write),
        }
    }
}

/// A POST request described as plain data.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub timeouts: Timeouts,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Build a POST of `params` to `url`.
///
/// The encoding's content-type header comes first, followed by the caller's
/// headers in name order. A caller-supplied content type replaces the
/// encoding's, so only one is ever sent.
pub fn build_post(url: &str, params: &RequestParams) -> Result<HttpRequest, RequestError> {
    let (content_type, body) = params
        .encode_body()
        .map_err(|cause| RequestError::new(url, cause))?;

    let mut headers = Vec::with_capacity(params.headers().len() + 1);
    let caller_sets_content_type = params
        .headers()
        .keys()
        .any(|name| name.eq_ignore_ascii_case("content-type"));
    if !caller_sets_content_type {
        headers.push(("content-type".to_string(), content_type.to_string()));
    }
    headers.extend(
        params
            .headers()
            .iter()
            .map(|(name, value)| (name.clone(), value.clone())),
    );

    Ok(HttpRequest {
        url: url.to_string(),
        headers,
        body,
        timeouts: params.timeouts(),
    })
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Map the response onto the callback outcome for a request to `url`.
    ///
    /// 2xx yields the body, or `None` when it is empty. Any other status is a
    /// failure carrying the status and body.
    pub fn into_outcome(self, url: &str) -> Result<Option<String>, RequestError> {
        if !self.is_success() {
            return Err(RequestError::new(
                url,
                FailureCause::Status {
                    status: self.status,
                    body: self.body,
                },
            ));
        }
        if self.body.is_empty() {
            Ok(None)
        } else {
            Ok(Some(self.body))
        }
    }
}
