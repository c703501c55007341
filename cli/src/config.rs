use anyhow::Result;
use event_post_core::{BodyEncoding, EventReport, PosterConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Settings loaded from `~/.config/event-post/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Collector address substituted into the host template.
    pub server_address: String,
    /// Event name used by `demo`.
    pub event_name: String,
    /// Body encoding for outgoing parameters: "json" (default) or "form".
    pub encoding: BodyEncoding,
    /// How long the CLI waits for a callback before giving up, in seconds.
    pub wait_secs: u64,
    /// Extra headers sent with every request.
    pub headers: BTreeMap<String, String>,
    /// Transport timeouts.
    pub transport: PosterConfig,
    /// Payload sent by `demo`.
    pub report: EventReport,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_address: "10.8.31.5".to_string(),
            event_name: "test_event".to_string(),
            encoding: BodyEncoding::Json,
            wait_secs: 30,
            headers: BTreeMap::new(),
            transport: PosterConfig::default(),
            report: EventReport::default(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("event-post")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<AppConfig> {
    load_or_init_at(&config_path()?)
}

pub fn load_or_init_at(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        let default_cfg = AppConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server_address, "10.8.31.5");
        assert_eq!(cfg.event_name, "test_event");
        assert_eq!(cfg.encoding, BodyEncoding::Json);
        assert_eq!(cfg.transport.connect_timeout_ms, 20_000);
        assert!(cfg.headers.is_empty());
    }

    #[test]
    fn config_toml_roundtrip() {
        let mut cfg = AppConfig::default();
        cfg.headers.insert("x-app".to_string(), "demo".to_string());
        cfg.encoding = BodyEncoding::Form;
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: AppConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let toml = r#"
server_address = "192.168.1.20"

[report]
platform = "linux"
"#;
        let cfg: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.server_address, "192.168.1.20");
        assert_eq!(cfg.event_name, "test_event");
        assert_eq!(cfg.report.platform, "linux");
        assert_eq!(cfg.report.content, "123333333333333");
        assert_eq!(cfg.transport, PosterConfig::default());
    }

    #[test]
    fn load_or_init_writes_default_then_reads_it_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let created = load_or_init_at(&path).unwrap();
        assert!(path.exists());
        assert_eq!(created, AppConfig::default());

        fs::write(&path, "event_name = \"install\"\nwait_secs = 5\n").unwrap();
        let loaded = load_or_init_at(&path).unwrap();
        assert_eq!(loaded.event_name, "install");
        assert_eq!(loaded.wait_secs, 5);
    }

    #[test]
    fn invalid_encoding_is_rejected() {
        let result: Result<AppConfig, _> = toml::from_str("encoding = \"xml\"");
        assert!(result.is_err());
    }
}
