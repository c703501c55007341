//! Event URL templating.
//!
//! A collector URL is the host template with the server address substituted,
//! followed directly by the path template with the event name substituted.
//! Nothing is validated or escaped here; a malformed address still yields a
//! URL-shaped string and the HTTP layer reports the problem.

/// Host part of the collector URL. `{0}` is the server address.
pub const LOG_HOST_TEMPLATE: &str = "http://{0}:8090/";

/// Path part of the collector URL. `{0}` is the event name.
pub const POST_EVENT_TEMPLATE: &str = "analysis/appsflyer_post/{0}";

/// Substitute `value` for every `{0}` in `template`.
pub fn format_template(template: &str, value: &str) -> String {
    template.replace("{0}", value)
}

/// Build the collector URL for `event` on the server at `address`.
///
/// Always `http://{address}:8090/analysis/appsflyer_post/{event}`.
pub fn build_url(address: &str, event: &str) -> String {
    EventEndpoint::default().url(address, event)
}

/// A host/path template pair.
///
/// The two halves are concatenated without separator normalization, so the
/// host template must end where the path template begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventEndpoint {
    pub host_template: String,
    pub path_template: String,
}

impl Default for EventEndpoint {
    fn default() -> Self {
        Self {
            host_template: LOG_HOST_TEMPLATE.to_string(),
            path_template: POST_EVENT_TEMPLATE.to_string(),
        }
    }
}

impl EventEndpoint {
    pub fn new(host_template: &str, path_template: &str) -> Self {
        Self {
            host_template: host_template.to_string(),
            path_template: path_template.to_string(),
        }
    }

    pub fn url(&self, address: &str, event: &str) -> String {
        let host = format_template(&self.host_template, address);
        let path = format_template(&self.path_template, event);
        host + &path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_collector_url() {
        assert_eq!(
            build_url("10.8.31.5", "test_event"),
            "http://10.8.31.5:8090/analysis/appsflyer_post/test_event"
        );
    }

    #[test]
    fn matches_concatenation_for_plain_inputs() {
        let cases = [
            ("localhost", "install"),
            ("192.168.0.1", "af_purchase"),
            ("collector.internal", "a-b_c.d"),
        ];
        for (address, event) in cases {
            assert_eq!(
                build_url(address, event),
                format!("http://{address}:8090/analysis/appsflyer_post/{event}")
            );
        }
    }

    #[test]
    fn same_inputs_same_url() {
        let first = build_url("10.0.0.7", "open");
        let second = build_url("10.0.0.7", "open");
        assert_eq!(first, second);
    }

    #[test]
    fn inputs_are_not_validated() {
        assert_eq!(build_url("", ""), "http://:8090/analysis/appsflyer_post/");
        assert_eq!(
            build_url("not a host", "has space"),
            "http://not a host:8090/analysis/appsflyer_post/has space"
        );
    }

    #[test]
    fn custom_templates_concatenate_verbatim() {
        let endpoint = EventEndpoint::new("https://{0}/", "v2/events/{0}");
        assert_eq!(
            endpoint.url("example.org", "signup"),
            "https://example.org/v2/events/signup"
        );

        let misaligned = EventEndpoint::new("http://{0}", "events/{0}");
        assert_eq!(misaligned.url("h", "e"), "http://hevents/e");
    }

    #[test]
    fn every_placeholder_is_replaced() {
        assert_eq!(format_template("{0}/{0}", "x"), "x/x");
        assert_eq!(format_template("no placeholder", "x"), "no placeholder");
    }
}
