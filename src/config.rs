//! Configuration management: defaults, an optional TOML file, and
//! environment overrides, in that order.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "mediascout.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub browser: BrowserSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Bind host for the HTTP API.
    pub host: String,
    /// Bind port for the HTTP API.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8600,
        }
    }
}

/// Browser launch configuration for crawl sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Run in headless mode (default: true).
    /// Set to false to watch a crawl for debugging.
    pub headless: bool,

    /// Explicit Chrome/Chromium executable. Discovered from common
    /// install paths (or `CHROMIUM_PATH`) when unset.
    pub executable: Option<PathBuf>,

    /// Proxy server URL (e.g., "socks5://127.0.0.1:1080").
    pub proxy: Option<String>,

    /// Additional Chrome arguments appended to the stealth launch set.
    pub chrome_args: Vec<String>,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            executable: None,
            proxy: None,
            chrome_args: Vec::new(),
        }
    }
}

/// Load settings from `path` (or [`DEFAULT_CONFIG_FILE`] if present),
/// then apply `MEDIASCOUT_*` environment overrides.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = match path {
        Some(path) => read_settings_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if default.exists() {
                read_settings_file(default)
                    .with_context(|| format!("failed to load {DEFAULT_CONFIG_FILE}"))?
            } else {
                Settings::default()
            }
        }
    };

    if let Ok(host) = std::env::var("MEDIASCOUT_HOST") {
        settings.server.host = host;
    }
    if let Ok(port) = std::env::var("MEDIASCOUT_PORT") {
        settings.server.port = port
            .parse()
            .context("MEDIASCOUT_PORT must be a port number")?;
    }
    if let Ok(value) = std::env::var("MEDIASCOUT_HEADLESS") {
        settings.browser.headless = value != "0" && !value.eq_ignore_ascii_case("false");
    }

    Ok(settings)
}

fn read_settings_file(path: &Path) -> anyhow::Result<Settings> {
    let raw = fs::read_to_string(path)?;
    Ok(toml::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.port, 8600);
        assert!(settings.browser.headless);
        assert!(settings.browser.executable.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [server]
            port = 9000

            [browser]
            headless = false
            "#,
        )
        .unwrap();
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert!(!settings.browser.headless);
    }
}
