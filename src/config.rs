// src/config.rs
//! Service configuration. Loaded from a TOML or JSON file, with an
//! env-var-only fallback so small deployments can skip the file entirely.

use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

const ENV_PATH: &str = "EVENTS_CONFIG_PATH";
const ENV_ENDPOINT: &str = "EVENTS_ENDPOINT";
const ENV_SOURCE_ID: &str = "EVENTS_SOURCE_ID";

fn default_bind_addr() -> String {
    "0.0.0.0:5000".to_string()
}
fn default_cache_ttl_secs() -> u64 {
    30 * 60
}
fn default_cache_dir() -> String {
    "cache".to_string()
}
fn default_refresh_delay_secs() -> u64 {
    2
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Upstream row-source endpoint; `?id=<source_id>` is appended.
    pub events_endpoint: String,
    pub source_id: String,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
    /// Delay before the background refresh that follows a fresh-cache load.
    #[serde(default = "default_refresh_delay_secs")]
    pub refresh_delay_secs: u64,
    /// Interval for the cache-warming task; 0 disables it.
    #[serde(default)]
    pub refresh_interval_secs: u64,
}

impl ServiceConfig {
    /// Load using env var + fallbacks:
    /// 1) $EVENTS_CONFIG_PATH
    /// 2) config/service.toml
    /// 3) config/service.json
    /// 4) $EVENTS_ENDPOINT / $EVENTS_SOURCE_ID with defaults for the rest
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = env::var(ENV_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("EVENTS_CONFIG_PATH points to non-existent path"));
        }
        let toml_p = PathBuf::from("config/service.toml");
        if toml_p.exists() {
            return Self::load_from(&toml_p);
        }
        let json_p = PathBuf::from("config/service.json");
        if json_p.exists() {
            return Self::load_from(&json_p);
        }
        Self::from_env()
    }

    /// Load from an explicit path. Supports TOML or JSON formats.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        if ext == "json" {
            serde_json::from_str(&content)
                .with_context(|| format!("parsing JSON config {}", path.display()))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("parsing TOML config {}", path.display()))
        }
    }

    fn from_env() -> Result<Self> {
        let events_endpoint = env::var(ENV_ENDPOINT)
            .map_err(|_| anyhow!("no config file found and EVENTS_ENDPOINT is not set"))?;
        let source_id = env::var(ENV_SOURCE_ID)
            .map_err(|_| anyhow!("no config file found and EVENTS_SOURCE_ID is not set"))?;
        Ok(Self {
            events_endpoint,
            source_id,
            bind_addr: default_bind_addr(),
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_dir: default_cache_dir(),
            refresh_delay_secs: default_refresh_delay_secs(),
            refresh_interval_secs: 0,
        })
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_and_json_formats_parse() {
        let toml_cfg = r#"
            events_endpoint = "https://backend.example/api/sheets-events"
            source_id = "sheet-1"
            cache_ttl_secs = 60
        "#;
        let dir = tempfile::tempdir().unwrap();
        let toml_p = dir.path().join("service.toml");
        fs::write(&toml_p, toml_cfg).unwrap();
        let cfg = ServiceConfig::load_from(&toml_p).unwrap();
        assert_eq!(cfg.source_id, "sheet-1");
        assert_eq!(cfg.cache_ttl(), Duration::from_secs(60));
        assert_eq!(cfg.bind_addr, "0.0.0.0:5000");

        let json_p = dir.path().join("service.json");
        fs::write(
            &json_p,
            r#"{"events_endpoint": "https://backend.example/api/sheets-events", "source_id": "sheet-2"}"#,
        )
        .unwrap();
        let cfg = ServiceConfig::load_from(&json_p).unwrap();
        assert_eq!(cfg.source_id, "sheet-2");
        assert_eq!(cfg.cache_ttl_secs, 30 * 60);
    }

    #[serial_test::serial]
    #[test]
    fn env_fallback_requires_endpoint_and_source() {
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();

        env::remove_var(ENV_PATH);
        env::remove_var(ENV_ENDPOINT);
        env::remove_var(ENV_SOURCE_ID);

        assert!(ServiceConfig::load_default().is_err());

        env::set_var(ENV_ENDPOINT, "https://backend.example/api/sheets-events");
        env::set_var(ENV_SOURCE_ID, "sheet-9");
        let cfg = ServiceConfig::load_default().unwrap();
        assert_eq!(cfg.source_id, "sheet-9");
        env::remove_var(ENV_ENDPOINT);
        env::remove_var(ENV_SOURCE_ID);

        env::set_current_dir(&old).unwrap();
    }
}
