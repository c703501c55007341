//! Request dispatch.
//!
//! # Design
//! `HttpPoster` is the capability the rest of the crate depends on: submit a
//! POST and return immediately, then complete the callback pair exactly once
//! from some other thread. `UreqPoster` is the production implementation;
//! tests substitute their own.
//!
//! `EventDispatcher` is passed around as an ordinary value rather than
//! reached through a global. It holds no per-request state, so every
//! `dispatch` is independent.

use std::sync::Arc;

use tokio::runtime::Handle;
use ureq::Agent;
use uuid::Uuid;

use crate::callback::Callbacks;
use crate::config::PosterConfig;
use crate::endpoint::EventEndpoint;
use crate::error::RequestError;
use crate::http::{build_post, HttpRequest, HttpResponse, Timeouts};
use crate::params::RequestParams;

/// Something that can send a POST without blocking the caller.
///
/// Implementations must call `callbacks.complete` exactly once per `post`,
/// including when the request cannot even be built.
pub trait HttpPoster: Send + Sync {
    fn post(&self, url: &str, params: &RequestParams, callbacks: Callbacks);
}

impl<P: HttpPoster + ?Sized> HttpPoster for Arc<P> {
    fn post(&self, url: &str, params: &RequestParams, callbacks: Callbacks) {
        (**self).post(url, params, callbacks)
    }
}

impl<P: HttpPoster + ?Sized> HttpPoster for &P {
    fn post(&self, url: &str, params: &RequestParams, callbacks: Callbacks) {
        (**self).post(url, params, callbacks)
    }
}

/// Blocking `ureq` transport run on the tokio blocking pool.
///
/// Non-2xx responses are data, not transport errors; `into_outcome` decides
/// which callback fires. Connections are pooled by the shared agent.
#[derive(Clone)]
pub struct UreqPoster {
    agent: Agent,
    defaults: Timeouts,
    runtime: Handle,
}

impl UreqPoster {
    pub fn new(config: &PosterConfig, runtime: Handle) -> Self {
        let defaults = config.timeouts();
        Self {
            agent: agent_with(defaults),
            defaults,
            runtime,
        }
    }

    /// Send `request` on the calling thread and wait for the outcome.
    pub fn send(&self, request: &HttpRequest) -> Result<Option<String>, RequestError> {
        let response = self
            .execute(request)
            .map_err(|e| RequestError::transport(&request.url, e))?;
        tracing::debug!(status = response.status, "response received");
        response.into_outcome(&request.url)
    }

    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ureq::Error> {
        let agent = if request.timeouts.is_empty() {
            self.agent.clone()
        } else {
            agent_with(request.timeouts.or(self.defaults))
        };

        let mut builder = agent.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        let mut response = builder.send(request.body.as_bytes())?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        let body = response.body_mut().read_to_string()?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

impl HttpPoster for UreqPoster {
    fn post(&self, url: &str, params: &RequestParams, callbacks: Callbacks) {
        let request = build_post(url, params);
        let poster = self.clone();
        let span = tracing::Span::current();
        let pending = PendingCallbacks::new(url, callbacks);
        // A runtime that has shut down drops the closure unrun; `pending`
        // then fails the request from its `Drop`.
        self.runtime.spawn_blocking(move || {
            let _entered = span.enter();
            let outcome = request.and_then(|request| poster.send(&request));
            if let Err(err) = &outcome {
                tracing::debug!(error = %err, "request failed");
            }
            pending.finish(outcome);
        });
    }
}

/// A callback pair that fails its request if dropped before `finish`.
struct PendingCallbacks {
    url: String,
    callbacks: Option<Callbacks>,
}

impl PendingCallbacks {
    fn new(url: &str, callbacks: Callbacks) -> Self {
        Self {
            url: url.to_string(),
            callbacks: Some(callbacks),
        }
    }

    fn finish(mut self, outcome: Result<Option<String>, RequestError>) {
        if let Some(callbacks) = self.callbacks.take() {
            callbacks.complete(outcome);
        }
    }
}

impl Drop for PendingCallbacks {
    fn drop(&mut self) {
        if let Some(callbacks) = self.callbacks.take() {
            tracing::warn!(url = %self.url, "request dropped before completion");
            callbacks.complete(Err(RequestError::transport(&self.url, "poster shut down")));
        }
    }
}

fn agent_with(timeouts: Timeouts) -> Agent {
    Agent::config_builder()
        .http_status_as_error(false)
        .timeout_connect(timeouts.connect)
        .timeout_send_body(timeouts.write)
        .timeout_recv_response(timeouts.read)
        .timeout_recv_body(timeouts.read)
        .build()
        .into()
}

/// Builds event URLs and hands requests to an `HttpPoster`.
#[derive(Debug, Clone)]
pub struct EventDispatcher<P> {
    poster: P,
    endpoint: EventEndpoint,
}

impl<P: HttpPoster> EventDispatcher<P> {
    pub fn new(poster: P) -> Self {
        Self::with_endpoint(poster, EventEndpoint::default())
    }

    pub fn with_endpoint(poster: P, endpoint: EventEndpoint) -> Self {
        Self { poster, endpoint }
    }

    /// Post `params` as `event` to the collector at `address`.
    ///
    /// Returns as soon as the poster has accepted the request. The returned
    /// id tags every log line for this request.
    pub fn dispatch(
        &self,
        address: &str,
        event: &str,
        params: &RequestParams,
        callbacks: Callbacks,
    ) -> Uuid {
        let id = Uuid::new_v4();
        let url = self.endpoint.url(address, event);
        let span = tracing::info_span!("dispatch", %id, event, url = %url);
        let _entered = span.enter();
        tracing::debug!(params = params.len(), encoding = ?params.encoding(), "dispatching event");
        self.poster.post(&url, params, callbacks);
        id
    }
}
