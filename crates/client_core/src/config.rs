use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use tracing::warn;
use url::Url;

use crate::error::SettingsError;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_STATUS_EXPIRY_MS: u64 = 5_000;
pub const SETTINGS_FILE: &str = "analyst.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base_url: Url,
    pub status_expiry: Duration,
    pub disable_input_while_pending: bool,
    pub request_timeout: Option<Duration>,
}

impl ClientSettings {
    /// Default policy pointed at `raw_base_url`.
    pub fn for_base_url(raw_base_url: &str) -> Result<Self, SettingsError> {
        RawSettings {
            api_url: raw_base_url.to_string(),
            ..RawSettings::default()
        }
        .finish()
    }

    pub fn with_api_url(mut self, raw_base_url: &str) -> Result<Self, SettingsError> {
        self.api_base_url = parse_base_url(raw_base_url)?;
        Ok(self)
    }

    pub fn with_status_expiry(mut self, expiry: Duration) -> Self {
        self.status_expiry = expiry;
        self
    }
}

/// Unvalidated settings while layers are being applied.
#[derive(Debug, Clone)]
pub struct RawSettings {
    pub api_url: String,
    pub status_expiry_ms: u64,
    pub disable_input_while_pending: bool,
    pub request_timeout_ms: Option<u64>,
}

impl Default for RawSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_BASE_URL.into(),
            status_expiry_ms: DEFAULT_STATUS_EXPIRY_MS,
            disable_input_while_pending: true,
            request_timeout_ms: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    api_url: Option<String>,
    status_expiry_ms: Option<u64>,
    disable_input_while_pending: Option<bool>,
    request_timeout_ms: Option<u64>,
}

impl RawSettings {
    pub fn apply_file(&mut self, path: &str, raw: &str) -> Result<(), SettingsError> {
        let file: SettingsFile = toml::from_str(raw).map_err(|source| SettingsError::Parse {
            path: path.to_string(),
            source,
        })?;
        if let Some(v) = file.api_url {
            self.api_url = v;
        }
        if let Some(v) = file.status_expiry_ms {
            self.status_expiry_ms = v;
        }
        if let Some(v) = file.disable_input_while_pending {
            self.disable_input_while_pending = v;
        }
        if let Some(v) = file.request_timeout_ms {
            self.request_timeout_ms = Some(v);
        }
        Ok(())
    }

    /// Applies environment overrides; later names in each group win.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("ANALYST_API_URL") {
            self.api_url = v;
        }
        if let Some(v) = lookup("APP__API_URL") {
            self.api_url = v;
        }

        if let Some(v) = lookup("APP__STATUS_EXPIRY_MS") {
            match v.trim().parse::<u64>() {
                Ok(parsed) => self.status_expiry_ms = parsed,
                Err(_) => warn!(value = %v, "ignoring invalid APP__STATUS_EXPIRY_MS"),
            }
        }

        if let Some(v) = lookup("APP__DISABLE_INPUT_WHILE_PENDING") {
            match parse_flag(&v) {
                Some(parsed) => self.disable_input_while_pending = parsed,
                None => warn!(value = %v, "ignoring invalid APP__DISABLE_INPUT_WHILE_PENDING"),
            }
        }

        if let Some(v) = lookup("APP__REQUEST_TIMEOUT_MS") {
            match v.trim().parse::<u64>() {
                Ok(0) => self.request_timeout_ms = None,
                Ok(parsed) => self.request_timeout_ms = Some(parsed),
                Err(_) => warn!(value = %v, "ignoring invalid APP__REQUEST_TIMEOUT_MS"),
            }
        }
    }

    pub fn finish(self) -> Result<ClientSettings, SettingsError> {
        Ok(ClientSettings {
            api_base_url: parse_base_url(&self.api_url)?,
            status_expiry: Duration::from_millis(self.status_expiry_ms),
            disable_input_while_pending: self.disable_input_while_pending,
            request_timeout: self.request_timeout_ms.map(Duration::from_millis),
        })
    }
}

/// Defaults, then `analyst.toml` (or `explicit_file`), then the process environment.
pub fn load_settings(explicit_file: Option<&Path>) -> Result<ClientSettings, SettingsError> {
    let mut settings = RawSettings::default();

    match explicit_file {
        Some(path) => {
            let display = path.display().to_string();
            let raw = fs::read_to_string(path).map_err(|source| SettingsError::Read {
                path: display.clone(),
                source,
            })?;
            settings.apply_file(&display, &raw)?;
        }
        None => {
            if let Ok(raw) = fs::read_to_string(SETTINGS_FILE) {
                settings.apply_file(SETTINGS_FILE, &raw)?;
            }
        }
    }

    settings.apply_env(|name| std::env::var(name).ok());
    settings.finish()
}

/// Parses a service address so that endpoint paths join beneath it.
pub fn parse_base_url(raw: &str) -> Result<Url, SettingsError> {
    let trimmed = raw.trim();
    let mut url = Url::parse(trimmed).map_err(|source| SettingsError::InvalidUrl {
        raw: trimmed.to_string(),
        source,
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(SettingsError::UnsupportedScheme(trimmed.to_string()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
