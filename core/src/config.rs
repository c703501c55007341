//! Transport timeouts for `UreqPoster`, loadable from a config file.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::http::Timeouts;

/// Default connect/read/write timeout, in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 20_000;

/// Transport settings for `UreqPoster`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PosterConfig {
    /// Time allowed to establish the connection.
    pub connect_timeout_ms: u64,
    /// Time allowed to receive the response, headers and body each.
    pub read_timeout_ms: u64,
    /// Time allowed to send the request body.
    pub write_timeout_ms: u64,
}

impl Default for PosterConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: DEFAULT_TIMEOUT_MS,
            read_timeout_ms: DEFAULT_TIMEOUT_MS,
            write_timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl PosterConfig {
    /// A zero value means "use the default" rather than "no time at all".
    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            connect: Some(millis_or_default(self.connect_timeout_ms)),
            read: Some(millis_or_default(self.read_timeout_ms)),
            write: Some(millis_or_default(self.write_timeout_ms)),
        }
    }
}

fn millis_or_default(ms: u64) -> Duration {
    if ms > 0 {
        Duration::from_millis(ms)
    } else {
        Duration::from_millis(DEFAULT_TIMEOUT_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_twenty_seconds() {
        let timeouts = PosterConfig::default().timeouts();
        assert_eq!(timeouts.connect, Some(Duration::from_secs(20)));
        assert_eq!(timeouts.read, Some(Duration::from_secs(20)));
        assert_eq!(timeouts.write, Some(Duration::from_secs(20)));
    }

    #[test]
    fn zero_falls_back_to_default() {
        let cfg = PosterConfig {
            connect_timeout_ms: 0,
            read_timeout_ms: 500,
            write_timeout_ms: 0,
        };
        let timeouts = cfg.timeouts();
        assert_eq!(timeouts.connect, Some(Duration::from_secs(20)));
        assert_eq!(timeouts.read, Some(Duration::from_millis(500)));
    }

    #[test]
    fn missing_fields_use_defaults() {
        let cfg: PosterConfig = serde_json::from_str(r#"{"read_timeout_ms":1000}"#).unwrap();
        assert_eq!(cfg.read_timeout_ms, 1000);
        assert_eq!(cfg.connect_timeout_ms, DEFAULT_TIMEOUT_MS);
    }
}
