//! Configuration types and loading.
//!
//! Config is loaded once at startup from a JSON file (e.g. `~/.relay/config.json`)
//! and then overridden from the environment. The resolved value is passed explicitly
//! to the gateway and the outbound clients; nothing reads the environment afterwards.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Generative-language API (Gemini) settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Messenger platform credentials and Graph API endpoint.
    #[serde(default)]
    pub messenger: MessengerConfig,
}

/// Listener bind, port, and environment name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Port for HTTP (default 5000). Overridden by PORT env.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bind address (default "0.0.0.0"; the platform must reach the webhook).
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Environment name reported by /health. Overridden by RELAY_ENV env.
    #[serde(default = "default_environment")]
    pub environment: String,
}

fn default_port() -> u16 {
    5000
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
            environment: default_environment(),
        }
    }
}

/// Gemini generateContent settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiConfig {
    /// API key. Overridden by GEMINI_API_KEY env.
    pub api_key: Option<String>,

    /// Model name, e.g. "gemini-1.5-flash".
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// API root up to and including the version segment.
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_output_tokens() -> u32 {
    500
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_gemini_model(),
            base_url: default_gemini_base_url(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

/// Messenger (Graph API) credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessengerConfig {
    /// Token echoed during the webhook subscription handshake. Overridden by VERIFY_TOKEN env.
    pub verify_token: Option<String>,

    /// Page access token for the Send API. Overridden by PAGE_ACCESS_TOKEN env.
    pub page_access_token: Option<String>,

    /// App secret used to sign webhook deliveries. Overridden by APP_SECRET env.
    pub app_secret: Option<String>,

    #[serde(default = "default_graph_api_base")]
    pub graph_api_base: String,

    #[serde(default = "default_graph_api_version")]
    pub graph_api_version: String,
}

fn default_graph_api_base() -> String {
    "https://graph.facebook.com".to_string()
}

fn default_graph_api_version() -> String {
    "v18.0".to_string()
}

impl Default for MessengerConfig {
    fn default() -> Self {
        Self {
            verify_token: None,
            page_access_token: None,
            app_secret: None,
            graph_api_base: default_graph_api_base(),
            graph_api_version: default_graph_api_version(),
        }
    }
}

impl Config {
    /// True when a Gemini API key is set.
    pub fn gemini_configured(&self) -> bool {
        non_empty(self.gemini.api_key.as_deref()).is_some()
    }

    /// True when a page access token is set (replies can be delivered).
    pub fn messenger_configured(&self) -> bool {
        non_empty(self.messenger.page_access_token.as_deref()).is_some()
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from a lookup function (env in production, a map in tests).
    /// Blank values are ignored; an unparsable PORT is logged and ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key).and_then(|v| non_empty(Some(v.as_str())).map(str::to_string))
        };

        if let Some(v) = get("GEMINI_API_KEY") {
            self.gemini.api_key = Some(v);
        }
        if let Some(v) = get("VERIFY_TOKEN") {
            self.messenger.verify_token = Some(v);
        }
        if let Some(v) = get("PAGE_ACCESS_TOKEN") {
            self.messenger.page_access_token = Some(v);
        }
        if let Some(v) = get("APP_SECRET") {
            self.messenger.app_secret = Some(v);
        }
        if let Some(v) = get("RELAY_ENV") {
            self.server.environment = v;
        }
        if let Some(v) = get("PORT") {
            match v.parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(_) => log::warn!("ignoring invalid PORT value: {}", v),
            }
        }
    }
}

/// Trimmed value, or None when absent or blank.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("RELAY_CONFIG_PATH").map(PathBuf::from).unwrap_or_else(|_| {
        dirs::home_dir()
            .map(|h| h.join(".relay").join("config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    })
}

/// Load config from the given path (or the default). Missing file => default config.
/// Environment overrides are applied on top. Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let mut config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    config.apply_env_overrides();
    Ok((config, path))
}
