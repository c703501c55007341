//! Client core for posting analytics events to a collector.
//!
//! # Overview
//! A trigger builds the collector URL from a server address and an event
//! name, fills a `RequestParams` mapping, and hands both to an
//! `EventDispatcher` together with a `Callbacks` pair. The dispatcher returns
//! immediately; exactly one of the two callbacks fires later on a thread the
//! poster owns.
//!
//! # Design
//! - URL building, body encoding and response interpretation are pure and
//!   live in `endpoint`, `params` and `http`.
//! - All I/O sits behind the `HttpPoster` trait. `UreqPoster` is the real
//!   one; tests supply doubles.
//! - Every failure is a `RequestError`. There is no retry and nothing is
//!   fatal to the caller.

pub mod callback;
pub mod config;
pub mod dispatch;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod params;

pub use callback::Callbacks;
pub use config::PosterConfig;
pub use dispatch::{EventDispatcher, HttpPoster, UreqPoster};
pub use endpoint::{build_url, EventEndpoint};
pub use error::{FailureCause, RequestError};
pub use http::{build_post, HttpRequest, HttpResponse, Timeouts};
pub use params::{BodyEncoding, EventReport, RequestParams};
