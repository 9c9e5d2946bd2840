use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

use crate::utils::paths::get_config_path;

/// Default port for the reference backend server
pub const DEFAULT_API_PORT: u16 = 48373;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,

    /// Base URL of the backend the TUI talks to
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Prefix prepended to every generated object key
    #[serde(default = "default_upload_prefix")]
    pub upload_prefix: String,

    #[serde(default = "default_upload_title")]
    pub upload_title: String,

    /// Timeout for one-shot requests; live subscriptions are not bounded by it
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_theme() -> String {
    "default".to_string()
}

fn default_backend_url() -> String {
    format!("http://127.0.0.1:{DEFAULT_API_PORT}")
}

fn default_api_port() -> u16 {
    DEFAULT_API_PORT
}

fn default_upload_prefix() -> String {
    crate::upload::DEFAULT_KEY_PREFIX.to_string()
}

fn default_upload_title() -> String {
    crate::upload::DEFAULT_TITLE.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            backend_url: default_backend_url(),
            api_port: default_api_port(),
            upload_prefix: default_upload_prefix(),
            upload_title: default_upload_title(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = get_config_path()?;

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config at {}", config_path.display()))?;

        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// True when the TUI should manage the bundled server itself.
    pub fn uses_local_server(&self) -> bool {
        let local = format!("http://127.0.0.1:{}", self.api_port);
        let localhost = format!("http://localhost:{}", self.api_port);
        let url = self.backend_url.trim_end_matches('/');
        url == local || url == localhost
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::ffi::OsString;

    /// Points `HOME` at a scratch directory for the life of the guard.
    struct TempHome {
        _dir: tempfile::TempDir,
        previous: Option<OsString>,
    }

    impl TempHome {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let previous = std::env::var_os("HOME");
            // SAFETY: every test that touches HOME is #[serial].
            unsafe { std::env::set_var("HOME", dir.path()) };
            Self { _dir: dir, previous }
        }
    }

    impl Drop for TempHome {
        fn drop(&mut self) {
            match self.previous.take() {
                // SAFETY: see TempHome::new.
                Some(home) => unsafe { std::env::set_var("HOME", home) },
                None => unsafe { std::env::remove_var("HOME") },
            }
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.theme, "default");
        assert_eq!(config.backend_url, "http://127.0.0.1:48373");
        assert_eq!(config.upload_prefix, "uploads/");
        assert_eq!(config.upload_title, "File Upload");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("backend_url"));
        assert!(toml_str.contains("upload_prefix"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml_str = r#"
        theme = "dark"
        upload_prefix = "docs/"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.theme, "dark");
        assert_eq!(config.upload_prefix, "docs/");
        assert_eq!(config.api_port, DEFAULT_API_PORT);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_uses_local_server() {
        let mut config = Config::default();
        assert!(config.uses_local_server());

        config.backend_url = "http://localhost:48373/".to_string();
        assert!(config.uses_local_server());

        config.backend_url = "https://api.example.com".to_string();
        assert!(!config.uses_local_server());
    }

    #[test]
    #[serial]
    fn test_missing_file_loads_defaults() {
        let _home = TempHome::new();
        let config = Config::load().unwrap();
        assert_eq!(config.api_port, DEFAULT_API_PORT);
    }

    #[test]
    #[serial]
    fn test_load_reads_config_file() {
        let _home = TempHome::new();
        let path = get_config_path().unwrap();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            "theme = \"light\"\nupload_prefix = \"inbox/\"\ntimeout_secs = 5\n",
        )
        .unwrap();

        let loaded = Config::load().unwrap();

        assert_eq!(loaded.theme, "light");
        assert_eq!(loaded.upload_prefix, "inbox/");
        assert_eq!(loaded.request_timeout(), Duration::from_secs(5));
    }
}
