//! Completion handlers for a dispatched request.

use crate::error::RequestError;

type OnSuccess = Box<dyn FnOnce(Option<String>) + Send + 'static>;
type OnFailure = Box<dyn FnOnce(RequestError) + Send + 'static>;

/// A success handler and a failure handler for one request.
///
/// `complete` consumes the pair, so at most one handler ever runs, and every
/// poster calls `complete` exactly once. The handlers run on whatever thread
/// the poster finishes on, never necessarily the caller's.
pub struct Callbacks {
    on_success: OnSuccess,
    on_failure: OnFailure,
}

impl Callbacks {
    pub fn new<S, F>(on_success: S, on_failure: F) -> Self
    where
        S: FnOnce(Option<String>) + Send + 'static,
        F: FnOnce(RequestError) + Send + 'static,
    {
        Self {
            on_success: Box::new(on_success),
            on_failure: Box::new(on_failure),
        }
    }

    /// Handlers that observe nothing. Failures are swallowed.
    pub fn noop() -> Self {
        Self::new(|_| {}, |_| {})
    }

    /// Handlers that report the outcome through `tracing` and nothing else.
    pub fn logged(label: impl Into<String>) -> Self {
        let label = label.into();
        let failure_label = label.clone();
        Self::new(
            move |response| {
                tracing::info!(
                    request = %label,
                    response = response.as_deref().unwrap_or(""),
                    "request succeeded"
                );
            },
            move |err| {
                tracing::warn!(request = %failure_label, error = %err, "request failed");
            },
        )
    }

    /// Run the handler matching `outcome`.
    pub fn complete(self, outcome: Result<Option<String>, RequestError>) {
        match outcome {
            Ok(response) => (self.on_success)(response),
            Err(err) => (self.on_failure)(err),
        }
    }
}

impl std::fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callbacks").finish_non_exhaustive()
    }
}
