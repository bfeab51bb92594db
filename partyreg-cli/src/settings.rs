//! User settings: `settings.json` in the config directory, then environment
//! overrides.

use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::portals::Role;

pub const API_URL_VAR: &str = "PARTYREG_API_URL";
pub const TOKEN_VAR: &str = "PARTYREG_TOKEN";
pub const PAGE_SIZE_VAR: &str = "PARTYREG_PAGE_SIZE";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not read settings: {0}")]
    Io(#[from] io::Error),

    #[error("invalid settings file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// API base, e.g. `https://parties.unc.edu/api`.
    pub api_url: String,
    /// Bearer token of the signed-in session.
    pub token: Option<String>,
    pub refresh_token: Option<String>,
    /// Token endpoint used to renew `token` on a 401.
    pub refresh_url: Option<String>,
    pub page_size: usize,
    pub role: Role,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000/api".to_string(),
            token: None,
            refresh_token: None,
            refresh_url: None,
            page_size: tablekit::DEFAULT_PAGE_SIZE,
            role: Role::Staff,
            timeout_secs: None,
        }
    }
}

impl Settings {
    /// Reads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        match fs::read_to_string(path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("no settings at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Applies `PARTYREG_*` overrides from the process environment.
    pub fn apply_env(self) -> Result<Self, SettingsError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`. Empty values are ignored.
    pub fn apply_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, SettingsError> {
        let get = |key| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(API_URL_VAR) {
            self.api_url = url;
        }
        if let Some(token) = get(TOKEN_VAR) {
            self.token = Some(token);
        }
        if let Some(raw) = get(PAGE_SIZE_VAR) {
            self.page_size = match raw.trim().parse::<usize>() {
                Ok(size) if size > 0 => size,
                _ => {
                    return Err(SettingsError::InvalidValue {
                        key: PAGE_SIZE_VAR,
                        value: raw,
                    });
                }
            };
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides_file_values() {
        let settings = Settings {
            api_url: "https://file.example.edu/api".into(),
            ..Settings::default()
        }
        .apply_overrides(env(&[
            (API_URL_VAR, "https://env.example.edu/api"),
            (TOKEN_VAR, "abc"),
            (PAGE_SIZE_VAR, "50"),
        ]))
        .unwrap();

        assert_eq!(settings.api_url, "https://env.example.edu/api");
        assert_eq!(settings.token.as_deref(), Some("abc"));
        assert_eq!(settings.page_size, 50);
    }

    #[test]
    fn test_blank_override_ignored() {
        let settings = Settings::default()
            .apply_overrides(env(&[(API_URL_VAR, "  ")]))
            .unwrap();
        assert_eq!(settings.api_url, Settings::default().api_url);
    }

    #[test]
    fn test_bad_page_size_rejected() {
        let result = Settings::default().apply_overrides(env(&[(PAGE_SIZE_VAR, "0")]));
        assert!(matches!(result, Err(SettingsError::InvalidValue { .. })));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let path = std::env::temp_dir().join(format!("partyreg-settings-{}.json", std::process::id()));
        fs::write(&path, r#"{"api_url": "https://x.edu/api", "role": "police"}"#).unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.api_url, "https://x.edu/api");
        assert_eq!(settings.role, Role::Police);
        assert_eq!(settings.page_size, 25);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_is_default() {
        let settings = Settings::load(Path::new("/nonexistent/partyreg/settings.json")).unwrap();
        assert_eq!(settings, Settings::default());
    }
}
