//! Client configuration.
//!
//! Settings are read from `~/.config/planpal/config.toml` unless
//! `--config` points elsewhere. Every section and key is optional.
//!
//! `google.client_id` may be a secret reference (`pass::entry` or
//! `env::NAME`, see [`crate::secret`]).

use std::path::{Path, PathBuf};
use std::time::Duration;

use planpal_core::TracingConfig;
use serde::{Deserialize, Serialize};
use url::Url;

/// Default backend hosting `/agent` and `/auth/google`.
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";

/// Default OAuth redirect URI; must match the one registered with Google.
pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8765/callback";

/// Configuration for the planpal client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Debug logging, same as `--debug`.
    pub debug: bool,

    /// Backend settings.
    pub backend: BackendSettings,

    /// Google sign-in settings.
    pub google: GoogleSettings,

    /// Session storage settings.
    pub storage: StorageSettings,
}

/// Where the agent and exchange endpoints live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    /// Base URL of the backend.
    pub base_url: String,

    /// Request timeout in seconds.
    pub timeout: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            timeout: 30,
        }
    }
}

/// Google OAuth settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleSettings {
    /// OAuth client ID (supports `pass::` and `env::` prefixes).
    pub client_id: Option<String>,

    /// Fixed redirect URI the loopback listener binds to.
    pub redirect_uri: String,
}

impl Default for GoogleSettings {
    fn default() -> Self {
        Self {
            client_id: None,
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
        }
    }
}

impl GoogleSettings {
    /// Resolves the client id, expanding secret references.
    ///
    /// Returns `Ok(None)` when no client id is configured.
    pub fn resolve_client_id(&self) -> Result<Option<String>, String> {
        let Some(raw) = self.client_id.as_deref() else {
            return Ok(None);
        };
        let resolved = crate::secret::resolve(raw)
            .map_err(|e| format!("failed to resolve google.client_id: {}", e))?;
        let resolved = resolved.trim();
        if resolved.is_empty() {
            Ok(None)
        } else {
            Ok(Some(resolved.to_string()))
        }
    }
}

/// Session storage settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Directory holding the stored session.
    pub session_dir: Option<PathBuf>,
}

impl ClientConfig {
    /// Loads configuration from the default path.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("failed to read config: {}", e))?;
        toml::from_str(&content).map_err(|e| format!("failed to parse config: {}", e))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("planpal")
    }

    /// Returns the default data directory path.
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("planpal")
    }

    /// Returns the session directory.
    pub fn session_dir(&self) -> PathBuf {
        self.storage
            .session_dir
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join("session"))
    }

    /// Parses the backend base URL.
    pub fn backend_url(&self) -> Result<Url, String> {
        Url::parse(&self.backend.base_url)
            .map_err(|e| format!("invalid backend.base_url `{}`: {}", self.backend.base_url, e))
    }

    /// Parses the OAuth redirect URI.
    pub fn redirect_uri(&self) -> Result<Url, String> {
        Url::parse(&self.google.redirect_uri).map_err(|e| {
            format!(
                "invalid google.redirect_uri `{}`: {}",
                self.google.redirect_uri, e
            )
        })
    }

    /// Returns the logging preset; `cli_debug` is the `--debug` flag.
    pub fn tracing(&self, cli_debug: bool) -> TracingConfig {
        if cli_debug || self.debug {
            TracingConfig::cli_debug()
        } else {
            TracingConfig::default()
        }
    }

    /// Returns the request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.backend.timeout.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert!(!config.debug);
        assert_eq!(config.backend.base_url, DEFAULT_BACKEND_URL);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.google.redirect_uri, DEFAULT_REDIRECT_URI);
        assert!(config.google.client_id.is_none());
        assert!(config.session_dir().ends_with("planpal/session"));
    }

    #[test]
    fn parses_full_file() {
        let toml_content = r#"
debug = true

[backend]
base_url = "https://planpal.example.com"
timeout = 10

[google]
client_id = "id.apps.googleusercontent.com"
redirect_uri = "http://localhost:9000/oauth"

[storage]
session_dir = "/tmp/planpal-session"
"#;
        let config: ClientConfig = toml::from_str(toml_content).unwrap();
        assert!(config.debug);
        assert_eq!(
            config.backend_url().unwrap().as_str(),
            "https://planpal.example.com/"
        );
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(
            config.redirect_uri().unwrap().as_str(),
            "http://localhost:9000/oauth"
        );
        assert_eq!(
            config.session_dir(),
            PathBuf::from("/tmp/planpal-session")
        );
        assert_eq!(
            config.google.resolve_client_id().unwrap().as_deref(),
            Some("id.apps.googleusercontent.com")
        );
    }

    #[test]
    fn debug_setting_enables_debug_logging() {
        let quiet = ClientConfig::default();
        assert_eq!(quiet.tracing(false).level, tracing::Level::WARN);
        assert_eq!(quiet.tracing(true).level, tracing::Level::DEBUG);

        let config: ClientConfig = toml::from_str("debug = true\n").unwrap();
        assert_eq!(config.tracing(false).level, tracing::Level::DEBUG);
        assert!(config.tracing(false).verbose);
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let config: ClientConfig = toml::from_str("[google]\n").unwrap();
        assert_eq!(config.google.redirect_uri, DEFAULT_REDIRECT_URI);
        assert_eq!(config.google.resolve_client_id().unwrap(), None);
        assert_eq!(config.backend.base_url, DEFAULT_BACKEND_URL);
    }

    #[test]
    fn client_id_env_reference() {
        unsafe {
            std::env::set_var("_PLANPAL_CONFIG_TEST_ID", "env-id.apps.googleusercontent.com");
        }
        let config: ClientConfig =
            toml::from_str("[google]\nclient_id = \"env::_PLANPAL_CONFIG_TEST_ID\"\n").unwrap();
        assert_eq!(
            config.google.resolve_client_id().unwrap().as_deref(),
            Some("env-id.apps.googleusercontent.com")
        );
        unsafe {
            std::env::remove_var("_PLANPAL_CONFIG_TEST_ID");
        }
    }

    #[test]
    fn invalid_urls_are_reported() {
        let mut config = ClientConfig::default();
        config.backend.base_url = "not a url".to_string();
        assert!(config.backend_url().unwrap_err().contains("backend.base_url"));

        config.google.redirect_uri = "::".to_string();
        assert!(config.redirect_uri().is_err());
    }

    #[test]
    fn load_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[backend]\ntimeout = 5\n").unwrap();

        let config = ClientConfig::load_from(&path).unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(5));

        assert!(ClientConfig::load_from(&tmp.path().join("missing.toml")).is_err());
    }
}
