//! User settings for the clipper.
//!
//! `Settings` is the flat record the extension persisted under a single
//! storage key. It is passed explicitly to every pipeline call; nothing reads
//! it from global state. Empty credentials may be filled from the environment
//! with [`Settings::with_env_fallbacks`], which mirrors the build-time env
//! values the extension fell back to.

use serde::{Deserialize, Serialize};
use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Environment variable names consulted for empty settings.
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_OPENAI_API_ENDPOINT: &str = "OPENAI_API_ENDPOINT";
pub const ENV_TAVILY_API_KEY: &str = "TAVILY_API_KEY";
pub const ENV_CUBOX_API_URL: &str = "CUBOX_API_URL";
/// Location of the JSON store used by the command-line front end.
pub const ENV_STORE_PATH: &str = "CUBOX_CLIPPER_STORE";

pub const DEFAULT_OPENAI_API_ENDPOINT: &str = "https://api.chatanywhere.tech";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_KEYBOARD_SHORTCUT: &str = "Ctrl+Shift+S";

/// Persisted configuration record. Field names match the stored camelCase keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub openai_api_key: String,
    pub openai_api_endpoint: String,
    pub openai_model: String,
    pub tavily_api_key: String,
    pub cubox_api_url: String,
    pub keyboard_shortcut: String,
    pub auto_analyze: bool,
    pub enable_tavily: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            openai_api_endpoint: DEFAULT_OPENAI_API_ENDPOINT.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            tavily_api_key: String::new(),
            cubox_api_url: String::new(),
            keyboard_shortcut: DEFAULT_KEYBOARD_SHORTCUT.to_string(),
            auto_analyze: false,
            enable_tavily: true,
        }
    }
}

impl Settings {
    /// Fill empty credentials and endpoints from the environment.
    ///
    /// Stored values always win; the environment only covers gaps.
    pub fn with_env_fallbacks(mut self) -> Self {
        fill_from_env(&mut self.openai_api_key, ENV_OPENAI_API_KEY);
        fill_from_env(&mut self.openai_api_endpoint, ENV_OPENAI_API_ENDPOINT);
        fill_from_env(&mut self.tavily_api_key, ENV_TAVILY_API_KEY);
        fill_from_env(&mut self.cubox_api_url, ENV_CUBOX_API_URL);
        self
    }

    /// Check that configured endpoints look like http(s) URLs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_endpoint("openaiApiEndpoint", &self.openai_api_endpoint)?;
        check_endpoint("cuboxApiUrl", &self.cubox_api_url)?;
        Ok(())
    }

    pub fn openai_api_key(&self) -> Option<&str> {
        non_empty(&self.openai_api_key)
    }

    pub fn tavily_api_key(&self) -> Option<&str> {
        non_empty(&self.tavily_api_key)
    }

    pub fn cubox_api_url(&self) -> Option<&str> {
        non_empty(&self.cubox_api_url)
    }

    pub fn openai_api_endpoint(&self) -> Option<&str> {
        non_empty(&self.openai_api_endpoint)
    }

    pub fn openai_model(&self) -> Option<&str> {
        non_empty(&self.openai_model)
    }

    /// Update one field by its stored key name, parsing booleans as needed.
    pub fn set_field(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "openaiApiKey" => self.openai_api_key = value.to_string(),
            "openaiApiEndpoint" => self.openai_api_endpoint = value.to_string(),
            "openaiModel" => self.openai_model = value.to_string(),
            "tavilyApiKey" => self.tavily_api_key = value.to_string(),
            "cuboxApiUrl" => self.cubox_api_url = value.to_string(),
            "keyboardShortcut" => self.keyboard_shortcut = value.to_string(),
            "autoAnalyze" => self.auto_analyze = parse_flag("autoAnalyze", value)?,
            "enableTavily" => self.enable_tavily = parse_flag("enableTavily", value)?,
            _ => return Err(ConfigError::UnknownField(key.to_string())),
        }
        Ok(())
    }

    /// Copy fit for display, with API keys masked.
    pub fn masked(&self) -> Self {
        let mut shown = self.clone();
        shown.openai_api_key = mask_secret(&self.openai_api_key);
        shown.tavily_api_key = mask_secret(&self.tavily_api_key);
        shown
    }
}

/// Characters of a secret left visible when masking.
const MASK_VISIBLE_TAIL: usize = 4;

/// `****` plus the last few characters; short secrets are hidden entirely.
fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.is_empty() {
        return String::new();
    }
    if chars.len() <= MASK_VISIBLE_TAIL * 2 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - MASK_VISIBLE_TAIL..].iter().collect();
    format!("****{tail}")
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn fill_from_env(slot: &mut String, var: &str) {
    if slot.trim().is_empty()
        && let Ok(value) = env::var(var)
        && !value.trim().is_empty()
    {
        *slot = value;
    }
}

fn check_endpoint(field: &'static str, value: &str) -> Result<(), ConfigError> {
    let Some(value) = non_empty(value) else {
        return Ok(());
    };
    match url::Url::parse(value) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        Ok(parsed) => Err(ConfigError::InvalidValue {
            field,
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        }),
        Err(e) => Err(ConfigError::InvalidValue {
            field,
            reason: e.to_string(),
        }),
    }
}

fn parse_flag(field: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            field,
            reason: format!("expected a boolean, got '{other}'"),
        }),
    }
}

/// Errors that can occur while building or editing settings.
#[derive(Debug)]
pub enum ConfigError {
    InvalidValue { field: &'static str, reason: String },
    UnknownField(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "invalid value for '{}': {}", field, reason)
            }
            ConfigError::UnknownField(key) => write!(f, "unknown setting '{}'", key),
        }
    }
}

impl Error for ConfigError {}
