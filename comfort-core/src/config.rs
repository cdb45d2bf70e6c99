use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api/v1";
pub const API_URL_ENV: &str = "COMFORT_API_URL";
pub const ACCESS_TOKEN_ENV: &str = "COMFORT_ACCESS_TOKEN";

/// Identity provider settings. Only `access_token` is consumed by this crate;
/// the rest is kept so the login flow can be driven from the same file.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AuthConfig {
    pub domain: Option<String>,
    pub client_id: Option<String>,
    pub audience: Option<String>,
    pub redirect_uri: Option<String>,
    pub access_token: Option<String>,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_url = "http://localhost:8080/api/v1"
///
/// [auth]
/// access_token = "..."
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub request_timeout_secs: u64,
    pub guard_timeout_ms: u64,
    pub auth: AuthConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: 10,
            guard_timeout_ms: 5000,
            auth: AuthConfig::default(),
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "comfort", "comfort-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Apply `COMFORT_API_URL` / `COMFORT_ACCESS_TOKEN` from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var(API_URL_ENV).ok(),
            std::env::var(ACCESS_TOKEN_ENV).ok(),
        )
    }

    fn with_overrides(mut self, api_url: Option<String>, token: Option<String>) -> Self {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api_url = url;
        }
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.auth.access_token = Some(token);
        }
        self
    }

    /// Parsed API base URL. Only http and https are accepted.
    pub fn api_base_url(&self) -> Result<Url> {
        let url = Url::parse(self.api_url.trim())
            .with_context(|| format!("Invalid API URL '{}'", self.api_url))?;

        if !matches!(url.scheme(), "http" | "https") {
            bail!(
                "Invalid API URL '{}': expected an http or https address.\n\
                 Hint: run `comfort configure` to fix it.",
                self.api_url
            );
        }

        Ok(url)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn guard_timeout(&self) -> Duration {
        Duration::from_millis(self.guard_timeout_ms)
    }

    pub fn access_token(&self) -> Option<&str> {
        self.auth
            .access_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
    }

    pub fn set_access_token(&mut self, token: String) {
        self.auth.access_token = Some(token);
    }

    pub fn clear_access_token(&mut self) {
        self.auth.access_token = None;
    }

    pub fn is_signed_in(&self) -> bool {
        self.access_token().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_backend() {
        let cfg = Config::default();
        assert_eq!(cfg.api_url, DEFAULT_API_URL);
        assert_eq!(cfg.request_timeout(), Duration::from_secs(10));
        assert_eq!(cfg.guard_timeout(), Duration::from_millis(5000));
        assert!(!cfg.is_signed_in());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg = Config::from_toml(
            r#"
            api_url = "https://weather.example.com/api/v1"

            [auth]
            audience = "https://weather-index.com"
            access_token = "tok"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.api_url, "https://weather.example.com/api/v1");
        assert_eq!(cfg.request_timeout_secs, 10);
        assert_eq!(cfg.auth.audience.as_deref(), Some("https://weather-index.com"));
        assert_eq!(cfg.access_token(), Some("tok"));
    }

    #[test]
    fn toml_roundtrip() {
        let mut cfg = Config::default();
        cfg.set_access_token("abc".into());

        let text = toml::to_string_pretty(&cfg).unwrap();
        let back = Config::from_toml(&text).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn rejects_non_http_urls() {
        let cfg = Config {
            api_url: "ftp://example.com/api".into(),
            ..Config::default()
        };
        let err = cfg.api_base_url().unwrap_err();
        assert!(err.to_string().contains("expected an http or https address"));

        let cfg = Config {
            api_url: "not a url".into(),
            ..Config::default()
        };
        assert!(cfg.api_base_url().is_err());
    }

    #[test]
    fn overrides_replace_file_values() {
        let cfg = Config::default().with_overrides(
            Some("https://other.example.com/api/v1".into()),
            Some("env-token".into()),
        );
        assert_eq!(cfg.api_url, "https://other.example.com/api/v1");
        assert_eq!(cfg.access_token(), Some("env-token"));
    }

    #[test]
    fn blank_overrides_are_ignored() {
        let mut cfg = Config::default();
        cfg.set_access_token("file-token".into());

        let cfg = cfg.with_overrides(Some("  ".into()), Some(String::new()));
        assert_eq!(cfg.api_url, DEFAULT_API_URL);
        assert_eq!(cfg.access_token(), Some("file-token"));
    }

    #[test]
    fn clearing_token_signs_out() {
        let mut cfg = Config::default();
        cfg.set_access_token("abc".into());
        assert!(cfg.is_signed_in());

        cfg.clear_access_token();
        assert!(!cfg.is_signed_in());
    }
}
