use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::core::booking::DeliveryMode;
use crate::core::store::KeyValueStore;

pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DEFAULT_API_HOST: &str = "127.0.0.1";
pub const DEFAULT_API_PORT: u16 = 17990;
pub const DEFAULT_SIMULATED_DELAY_MS: u64 = 1500;
pub const DEFAULT_WEBHOOK_URL: &str = "https://script.google.com/macros/s/AKfycbxUCj3Pek5fYXDM-osRsxsf3nat9Gep-j_gadk2mz2hKbfbtC10bpWMjZn3cexm0mE5Tg/exec";
pub const LEGACY_FORM_URL: &str = "https://docs.google.com/forms/d/e/1FAIpQLSfkDtMsm43gX8W2iggUV9bdHy05yJY35HQKbtcQ_45LX9-Xrw/viewform?embedded=true";

/// Key under which a webhook URL edited at runtime is persisted.
pub const WEBHOOK_OVERRIDE_KEY: &str = "webhook_url";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_host: String,
    pub api_port: u16,
    /// Empty means "no endpoint": submissions are simulated locally.
    pub webhook_url: String,
    pub delivery_mode: DeliveryMode,
    pub simulated_delay_ms: u64,
    pub legacy_form_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_host: DEFAULT_API_HOST.to_string(),
            api_port: DEFAULT_API_PORT,
            webhook_url: DEFAULT_WEBHOOK_URL.to_string(),
            delivery_mode: DeliveryMode::default(),
            simulated_delay_ms: DEFAULT_SIMULATED_DELAY_MS,
            legacy_form_url: LEGACY_FORM_URL.to_string(),
        }
    }
}

impl Settings {
    /// Defaults, then `<data_dir>/config.toml`, then `FLASHFIX_*` variables.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(CONFIG_FILE_NAME);
        let mut settings = if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let parsed =
                Self::from_toml(&raw).with_context(|| format!("parsing {}", path.display()))?;
            info!("Loaded settings from {}", path.display());
            parsed
        } else {
            Self::default()
        };
        settings.apply_env(|name| std::env::var(name).ok());
        Ok(settings)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Apply environment overrides through `lookup` so tests need not touch
    /// the process environment. Unparseable values are logged and skipped.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("FLASHFIX_API_HOST") {
            self.api_host = host;
        }
        if let Some(port) = lookup("FLASHFIX_API_PORT") {
            match port.parse() {
                Ok(port) => self.api_port = port,
                Err(_) => warn!("Ignoring FLASHFIX_API_PORT={}: not a port number", port),
            }
        }
        if let Some(url) = lookup("FLASHFIX_WEBHOOK_URL") {
            self.webhook_url = url;
        }
        if let Some(mode) = lookup("FLASHFIX_DELIVERY_MODE") {
            match mode.parse() {
                Ok(mode) => self.delivery_mode = mode,
                Err(e) => warn!("Ignoring FLASHFIX_DELIVERY_MODE: {}", e),
            }
        }
    }

    /// A webhook URL saved at runtime wins over every other source.
    pub async fn apply_runtime_override(&mut self, store: &dyn KeyValueStore) {
        match store.get(WEBHOOK_OVERRIDE_KEY).await {
            Ok(Some(url)) => {
                info!("Using webhook URL saved from the dashboard");
                self.webhook_url = url;
            }
            Ok(None) => {}
            Err(e) => warn!("Could not read saved webhook URL: {}", e),
        }
    }

    pub fn webhook_configured(&self) -> bool {
        !self.webhook_url.trim().is_empty()
    }

    pub fn simulated_delay(&self) -> Duration {
        Duration::from_millis(self.simulated_delay_ms)
    }
}

/// Whether `endpoint` parses as an http(s) URL. Informational only: an
/// invalid endpoint is still stored and fails at submission time.
pub fn is_valid_endpoint(endpoint: &str) -> bool {
    url::Url::parse(endpoint.trim())
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}
