use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::constants;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub catalog: CatalogConfig,

    pub store: StoreConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Emit logs as JSON lines instead of the human readable format.
    pub json_logs: bool,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    pub max_db_connections: u32,

    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/cinetrend.db".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: String,

    /// TMDB v4 read access token, sent as a bearer token.
    pub api_token: String,

    /// Prefix joined with a movie's poster path to build poster URLs.
    pub image_base_url: String,

    /// Quiet period before a typed query is sent to the catalog.
    pub debounce_ms: u64,

    /// 0 disables the timeout.
    pub request_timeout_seconds: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: constants::tmdb::API_BASE_URL.to_string(),
            api_token: String::new(),
            image_base_url: constants::tmdb::IMAGE_BASE_URL.to_string(),
            debounce_ms: u64::try_from(constants::intervals::SEARCH_DEBOUNCE.as_millis())
                .unwrap_or(500),
            request_timeout_seconds: 0,
        }
    }
}

impl CatalogConfig {
    #[must_use]
    pub const fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Sqlite,
    Appwrite,
}

impl std::str::FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "appwrite" => Ok(Self::Appwrite),
            other => anyhow::bail!("Unknown store backend '{other}' (expected sqlite or appwrite)"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,

    pub endpoint: String,

    pub project_id: String,

    pub database_id: String,

    pub collection_id: String,

    /// Server API key. Optional when the collection allows guest access.
    pub api_key: Option<String>,

    /// 0 disables the timeout.
    pub request_timeout_seconds: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Sqlite,
            endpoint: constants::appwrite::DEFAULT_ENDPOINT.to_string(),
            project_id: String::new(),
            database_id: String::new(),
            collection_id: String::new(),
            api_key: None,
            request_timeout_seconds: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 6790,
            cors_allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:5173".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
        }
    }
}

impl Config {
    /// Loads the first config file found, then applies environment overrides.
    ///
    /// A `.env` file in the working directory is read first, so the same
    /// variables can live there instead of the shell environment.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::load_file()?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        for path in &Self::config_paths() {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Overrides file values with `CINETREND_*` variables resolved by `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |target: &mut String, key: &str| {
            if let Some(value) = lookup(key) {
                *target = value;
            }
        };

        set(&mut self.catalog.api_token, "CINETREND_TMDB_TOKEN");
        set(&mut self.catalog.base_url, "CINETREND_TMDB_BASE_URL");
        set(&mut self.general.database_path, "CINETREND_DATABASE_PATH");
        set(&mut self.store.endpoint, "CINETREND_APPWRITE_ENDPOINT");
        set(&mut self.store.project_id, "CINETREND_APPWRITE_PROJECT_ID");
        set(&mut self.store.database_id, "CINETREND_APPWRITE_DATABASE_ID");
        set(&mut self.store.collection_id, "CINETREND_APPWRITE_COLLECTION_ID");

        if let Some(key) = lookup("CINETREND_APPWRITE_API_KEY") {
            self.store.api_key = Some(key);
        }

        if let Some(backend) = lookup("CINETREND_STORE_BACKEND") {
            self.store.backend = backend
                .parse()
                .context("Invalid CINETREND_STORE_BACKEND")?;
        }

        Ok(())
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("cinetrend").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".cinetrend").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            Self::default().save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.catalog.base_url.is_empty() {
            anyhow::bail!("Catalog base URL cannot be empty");
        }

        if self.catalog.debounce_ms == 0 {
            anyhow::bail!("Search debounce must be > 0 ms");
        }

        if self.store.backend == StoreBackend::Appwrite {
            let missing: Vec<&str> = [
                ("endpoint", &self.store.endpoint),
                ("project_id", &self.store.project_id),
                ("database_id", &self.store.database_id),
                ("collection_id", &self.store.collection_id),
            ]
            .into_iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(name, _)| name)
            .collect();

            if !missing.is_empty() {
                anyhow::bail!(
                    "Appwrite store is missing configuration: {}",
                    missing.join(", ")
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.catalog.debounce_ms, 500);
        assert_eq!(config.catalog.base_url, "https://api.themoviedb.org/3");
        assert_eq!(config.store.backend, StoreBackend::Sqlite);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[catalog]"));
        assert!(toml_str.contains("[store]"));
        assert!(toml_str.contains("backend = \"sqlite\""));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [catalog]
            debounce_ms = 250

            [store]
            backend = "appwrite"
            project_id = "proj"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.catalog.debounce_window(), Duration::from_millis(250));
        assert_eq!(config.store.backend, StoreBackend::Appwrite);
        assert_eq!(config.store.project_id, "proj");

        assert_eq!(config.catalog.image_base_url, "https://image.tmdb.org/t/p/w500");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("CINETREND_TMDB_TOKEN", "secret"),
            ("CINETREND_STORE_BACKEND", "Appwrite"),
            ("CINETREND_APPWRITE_PROJECT_ID", "p"),
            ("CINETREND_APPWRITE_DATABASE_ID", "d"),
            ("CINETREND_APPWRITE_COLLECTION_ID", "c"),
            ("CINETREND_APPWRITE_API_KEY", "k"),
        ]);

        let mut config = Config::default();
        config
            .apply_env_overrides(|key| env.get(key).map(|v| (*v).to_string()))
            .unwrap();

        assert_eq!(config.catalog.api_token, "secret");
        assert_eq!(config.store.backend, StoreBackend::Appwrite);
        assert_eq!(config.store.collection_id, "c");
        assert_eq!(config.store.api_key.as_deref(), Some("k"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_backend_override() {
        let mut config = Config::default();
        let result = config.apply_env_overrides(|key| {
            (key == "CINETREND_STORE_BACKEND").then(|| "redis".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_appwrite_missing_ids() {
        let mut config = Config::default();
        config.store.backend = StoreBackend::Appwrite;
        config.store.project_id = "p".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("database_id"));
        assert!(err.contains("collection_id"));
        assert!(!err.contains("project_id"));
    }

    #[test]
    fn test_validate_zero_debounce() {
        let mut config = Config::default();
        config.catalog.debounce_ms = 0;
        assert!(config.validate().is_err());
    }
}
