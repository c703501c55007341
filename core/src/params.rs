//! Parameter mapping sent as the body of an event POST.
//!
//! # Design
//! `RequestParams` is created fresh for each request and owned by the call
//! site. Values are plain strings; keys are unique and a later `put` replaces
//! an earlier one. Besides the mapping itself it carries the request headers,
//! the body encoding and optional per-request timeout overrides, which are
//! all copied into the `HttpRequest` by `build_post`.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::error::FailureCause;
use crate::http::Timeouts;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

/// How the parameter mapping is written into the request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyEncoding {
    /// A JSON object of string values.
    #[default]
    Json,
    /// `application/x-www-form-urlencoded` pairs.
    Form,
}

impl BodyEncoding {
    pub fn content_type(self) -> &'static str {
        match self {
            BodyEncoding::Json => JSON_CONTENT_TYPE,
            BodyEncoding::Form => FORM_CONTENT_TYPE,
        }
    }
}

/// String key/value pairs for one request, plus per-request options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    values: BTreeMap<String, String>,
    headers: BTreeMap<String, String>,
    encoding: BodyEncoding,
    raw_json: Option<String>,
    timeouts: Timeouts,
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut params = Self::new();
        params.put_all(pairs);
        params
    }

    /// Insert `value` under `key`, replacing any previous value.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn put_all<K, V, I>(&mut self, pairs: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in pairs {
            self.put(key, value);
        }
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn with_encoding(&mut self, encoding: BodyEncoding) -> &mut Self {
        self.encoding = encoding;
        self
    }

    pub fn encoding(&self) -> BodyEncoding {
        self.encoding
    }

    /// Send `json` verbatim instead of serializing the mapping.
    ///
    /// Only honoured with `BodyEncoding::Json`; an empty string is ignored.
    pub fn with_raw_json(&mut self, json: impl Into<String>) -> &mut Self {
        self.raw_json = Some(json.into());
        self
    }

    pub fn connect_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.timeouts.connect = Some(timeout);
        self
    }

    pub fn read_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.timeouts.read = Some(timeout);
        self
    }

    pub fn write_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.timeouts.write = Some(timeout);
        self
    }

    pub fn timeouts(&self) -> Timeouts {
        self.timeouts
    }

    /// Encode the mapping into `(content type, body)` for the chosen encoding.
    pub fn encode_body(&self) -> Result<(&'static str, String), FailureCause> {
        let body = match self.encoding {
            BodyEncoding::Json => match self.raw_json.as_deref() {
                Some(raw) if !raw.is_empty() => raw.to_string(),
                _ => serde_json::to_string(&self.values)
                    .map_err(|e| FailureCause::Encode(e.to_string()))?,
            },
            BodyEncoding::Form => form_urlencoded::Serializer::new(String::new())
                .extend_pairs(self.values.iter())
                .finish(),
        };
        Ok((self.encoding.content_type(), body))
    }
}

/// The event payload reported by the demo trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventReport {
    pub event_name: String,
    pub platform: String,
    pub domain: String,
    pub content: String,
    pub app_type: String,
    pub version_name: String,
    pub sdk_name: String,
    pub sdk_version: String,
}

impl Default for EventReport {
    fn default() -> Self {
        Self {
            event_name: "logTag-eventName".to_string(),
            platform: "Android-logTag".to_string(),
            domain: String::new(),
            content: "123333333333333".to_string(),
            app_type: String::new(),
            version_name: String::new(),
            sdk_name: String::new(),
            sdk_version: String::new(),
        }
    }
}

impl EventReport {
    pub fn into_params(self) -> RequestParams {
        RequestParams::from_pairs([
            ("eventName", self.event_name),
            ("platform", self.platform),
            ("domain", self.domain),
            ("content", self.content),
            ("appType", self.app_type),
            ("versionName", self.version_name),
            ("sdkName", self.sdk_name),
            ("sdkVersion", self.sdk_version),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_replaces_existing_value() {
        let mut params = RequestParams::new();
        params.put("platform", "ios").put("platform", "android");
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("platform"), Some("android"));
    }

    #[test]
    fn empty_values_are_kept() {
        let mut params = RequestParams::new();
        params.put("domain", "");
        assert!(params.has("domain"));
        assert_eq!(params.get("domain"), Some(""));
    }

    #[test]
    fn remove_drops_key() {
        let mut params = RequestParams::from_pairs([("a", "1"), ("b", "2")]);
        assert_eq!(params.remove("a").as_deref(), Some("1"));
        assert!(!params.has("a"));
        assert!(params.remove("a").is_none());
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn json_body_is_object_of_strings() {
        let params = RequestParams::from_pairs([("eventName", "open"), ("content", "")]);
        let (content_type, body) = params.encode_body().unwrap();
        assert_eq!(content_type, JSON_CONTENT_TYPE);
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value, serde_json::json!({"eventName": "open", "content": ""}));
    }

    #[test]
    fn raw_json_overrides_mapping() {
        let mut params = RequestParams::from_pairs([("ignored", "x")]);
        params.with_raw_json(r#"{"custom":true}"#);
        let (_, body) = params.encode_body().unwrap();
        assert_eq!(body, r#"{"custom":true}"#);

        params.with_raw_json("");
        let (_, body) = params.encode_body().unwrap();
        assert_eq!(body, r#"{"ignored":"x"}"#);
    }

    #[test]
    fn form_body_is_urlencoded() {
        let mut params = RequestParams::from_pairs([("b", "x y"), ("a", "1&2")]);
        params.with_encoding(BodyEncoding::Form);
        let (content_type, body) = params.encode_body().unwrap();
        assert_eq!(content_type, FORM_CONTENT_TYPE);
        assert_eq!(body, "a=1%262&b=x+y");
    }

    #[test]
    fn timeouts_default_to_unset() {
        let mut params = RequestParams::new();
        assert_eq!(params.timeouts(), Timeouts::default());
        params.read_timeout(Duration::from_millis(1500));
        assert_eq!(params.timeouts().read, Some(Duration::from_millis(1500)));
        assert!(params.timeouts().connect.is_none());
    }

    #[test]
    fn event_report_has_demo_keys() {
        let params = EventReport::default().into_params();
        let keys: Vec<&str> = params.iter().map(|(k, _)| k).collect();
        let mut expected = vec![
            "eventName",
            "platform",
            "domain",
            "content",
            "appType",
            "versionName",
            "sdkName",
            "sdkVersion",
        ];
        expected.sort_unstable();
        assert_eq!(keys, expected);
        assert_eq!(params.get("eventName"), Some("logTag-eventName"));
        assert_eq!(params.get("platform"), Some("Android-logTag"));
        assert_eq!(params.get("content"), Some("123333333333333"));
        assert_eq!(params.get("sdkVersion"), Some(""));
    }

    #[test]
    fn event_report_fills_missing_fields_from_default() {
        let report: EventReport = serde_json::from_str(r#"{"eventName":"install"}"#).unwrap();
        assert_eq!(report.event_name, "install");
        assert_eq!(report.platform, "Android-logTag");
    }
}
