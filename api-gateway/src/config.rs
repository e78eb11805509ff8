//! Gateway configuration loading and parsing
//!
//! Values come from an optional TOML file and are then overridden by the
//! process environment. Both are read once at startup.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::registry::FieldKind;

const DEFAULT_CONFIG_PATH: &str = "/etc/toolhub/config.toml";

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub uploads: UploadLimits,
    #[serde(default)]
    pub status: StatusPollConfig,
    /// Extra webhooks; an entry named like a built-in replaces it
    #[serde(default)]
    pub webhooks: Vec<WebhookEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// n8n webhook base, e.g. `https://n8n.example.com/webhook`
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub access_client_id: String,
    #[serde(default)]
    pub access_client_secret: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            access_client_id: String::new(),
            access_client_secret: String::new(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct UploadLimits {
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: u64,
    #[serde(default = "default_max_total_size")]
    pub max_total_size_bytes: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_files: default_max_files(),
            max_file_size_bytes: default_max_file_size(),
            max_total_size_bytes: default_max_total_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusPollConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_poll_connected")]
    pub connected_interval_ms: u64,
    #[serde(default = "default_poll_down")]
    pub down_interval_ms: u64,
    #[serde(default = "default_check_timeout")]
    pub check_timeout_ms: u64,
}

impl Default for StatusPollConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            connected_interval_ms: default_poll_connected(),
            down_interval_ms: default_poll_down(),
            check_timeout_ms: default_check_timeout(),
        }
    }
}

/// A webhook declared in the config file
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEntry {
    pub name: String,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub types: BTreeMap<String, FieldKind>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

// Default value functions
fn default_listen_addr() -> String { "0.0.0.0:3000".into() }
fn default_body_limit() -> usize { 32 * 1024 * 1024 }
fn default_timeout_ms() -> u64 { 180_000 }
fn default_max_files() -> usize { 3 }
fn default_max_file_size() -> u64 { 8 * 1024 * 1024 }
fn default_max_total_size() -> u64 { 24 * 1024 * 1024 }
fn default_true() -> bool { true }
fn default_poll_connected() -> u64 { 10_000 }
fn default_poll_down() -> u64 { 30_000 }
fn default_check_timeout() -> u64 { 10_000 }

impl GatewayConfig {
    /// Override file values with environment variables. `lookup` is
    /// `std::env::var` in production.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("N8N_WEBHOOK_URL") {
            self.upstream.base_url = v;
        }
        if let Some(v) = lookup("CF_ACCESS_CLIENT_ID") {
            self.upstream.access_client_id = v;
        }
        if let Some(v) = lookup("CF_ACCESS_CLIENT_SECRET") {
            self.upstream.access_client_secret = v;
        }
        if let Some(v) = lookup("TOOLHUB_LISTEN_ADDR") {
            self.server.listen_addr = v;
        }

        override_number(&lookup, "API_TIMEOUT_MS", &mut self.upstream.timeout_ms);
        override_number(&lookup, "MAX_UPLOAD_FILES", &mut self.uploads.max_files);
        override_number(&lookup, "MAX_FILE_SIZE_BYTES", &mut self.uploads.max_file_size_bytes);
        override_number(&lookup, "MAX_TOTAL_SIZE_BYTES", &mut self.uploads.max_total_size_bytes);
        override_number(&lookup, "STATUS_POLL_CONNECTED_MS", &mut self.status.connected_interval_ms);
        override_number(&lookup, "STATUS_POLL_DOWN_MS", &mut self.status.down_interval_ms);
    }
}

fn override_number<F, T>(lookup: &F, key: &str, target: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    if let Some(raw) = lookup(key) {
        match raw.trim().parse::<T>() {
            Ok(v) => *target = v,
            Err(_) => tracing::warn!("Ignoring {key}={raw:?}: not a number"),
        }
    }
}

/// Load configuration from `path`, falling back to defaults when the file
/// does not exist. Environment overrides are not applied here.
pub fn load_file(path: &Path) -> Result<GatewayConfig> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: GatewayConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        Ok(config)
    } else {
        tracing::warn!("Config file not found at {}, using defaults", path.display());
        Ok(GatewayConfig::default())
    }
}

/// Load configuration from $TOOLHUB_CONFIG (or /etc/toolhub/config.toml)
/// and apply environment overrides.
pub fn load_config() -> Result<GatewayConfig> {
    let config_path =
        std::env::var("TOOLHUB_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    let mut config = load_file(Path::new(&config_path))?;
    config.apply_env(|key| std::env::var(key).ok());

    if config.upstream.base_url.is_empty() {
        tracing::warn!("N8N_WEBHOOK_URL is not set, every webhook call will fail");
    }
    Ok(config)
}
