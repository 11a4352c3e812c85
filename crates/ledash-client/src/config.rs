use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::DriverApi;
use crate::dashboard::Dashboard;
use crate::datastore::{DEFAULT_PANEL_ID, PanelStore};
use crate::error::{ClientError, Result};
use crate::http::HttpDriver;
use crate::memory::MemoryDriver;

pub const DEFAULT_DRIVER_URL: &str = "http://localhost:3001";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Http,
    Datastore,
    Memory,
}

impl BackendKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Datastore => "datastore",
            Self::Memory => "memory",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "datastore" => Ok(Self::Datastore),
            "memory" => Ok(Self::Memory),
            other => Err(format!(
                "unknown backend: {other} (expected http, datastore or memory)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatastoreConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub panel_id: String,
}

impl Default for DatastoreConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: None,
            panel_id: DEFAULT_PANEL_ID.to_string(),
        }
    }
}

/// Everything needed to reach a panel. Missing fields take their defaults,
/// so `{}` is a valid config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub backend: BackendKind,
    pub driver_url: String,
    pub datastore: DatastoreConfig,
    pub poll_interval_ms: u64,
    pub request_timeout_ms: Option<u64>,
    pub health_window_secs: u64,
    pub flash_duration_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Http,
            driver_url: DEFAULT_DRIVER_URL.to_string(),
            datastore: DatastoreConfig::default(),
            poll_interval_ms: 500,
            request_timeout_ms: None,
            health_window_secs: 10,
            flash_duration_ms: 1000,
        }
    }
}

impl ClientConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| ClientError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ClientError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn write_to_path(&self, path: &Path) -> Result<()> {
        let io_error = |source| ClientError::ConfigIo {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let content = serde_json::to_string_pretty(self).map_err(|source| {
            ClientError::ConfigParse {
                path: path.to_path_buf(),
                source,
            }
        })?;
        fs::write(path, content).map_err(io_error)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    #[must_use]
    pub fn health_window(&self) -> Duration {
        Duration::from_secs(self.health_window_secs)
    }

    #[must_use]
    pub fn flash_duration(&self) -> Duration {
        Duration::from_millis(self.flash_duration_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(ClientError::config("poll_interval_ms must be positive"));
        }
        if self.request_timeout_ms == Some(0) {
            return Err(ClientError::config("request_timeout_ms must be positive"));
        }
        match self.backend {
            BackendKind::Http if self.driver_url.trim().is_empty() => {
                Err(ClientError::config("driver_url is required for the http backend"))
            }
            BackendKind::Datastore if self.datastore.url.trim().is_empty() => Err(
                ClientError::config("datastore.url is required for the datastore backend"),
            ),
            _ => Ok(()),
        }
    }

    /// Builds the binding for the configured backend.
    pub fn connect(&self) -> Result<Arc<dyn DriverApi>> {
        self.validate()?;
        let api: Arc<dyn DriverApi> = match self.backend {
            BackendKind::Http => Arc::new(HttpDriver::new(
                &self.driver_url,
                self.request_timeout(),
            )?),
            BackendKind::Datastore => Arc::new(
                PanelStore::new(
                    &self.datastore.url,
                    self.datastore.api_key.as_deref(),
                    &self.datastore.panel_id,
                    self.request_timeout(),
                )?
                .with_health_window(self.health_window()),
            ),
            BackendKind::Memory => Arc::new(MemoryDriver::new()),
        };
        Ok(api)
    }

    pub fn dashboard(&self) -> Result<Dashboard> {
        Ok(Dashboard::new(self.connect()?).with_flash_duration(self.flash_duration()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_the_default() {
        let config: ClientConfig = serde_json::from_str("{}").expect("parse");
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
        assert_eq!(config.datastore.panel_id, DEFAULT_PANEL_ID);
    }

    #[test]
    fn backend_names_are_lowercase() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"backend": "datastore", "datastore": {"url": "https://x"}}"#)
                .expect("parse");
        assert_eq!(config.backend, BackendKind::Datastore);
        assert_eq!("Memory".parse::<BackendKind>(), Ok(BackendKind::Memory));
        assert!("sqlite".parse::<BackendKind>().is_err());
    }

    #[test]
    fn datastore_needs_a_url() {
        let config = ClientConfig {
            backend: BackendKind::Datastore,
            ..ClientConfig::default()
        };
        let error = config.connect().err().expect("missing url");
        assert!(error.to_string().contains("datastore.url"));
    }

    #[test]
    fn zero_intervals_are_rejected() {
        let config = ClientConfig {
            poll_interval_ms: 0,
            ..ClientConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("ledash.json");
        let config = ClientConfig {
            backend: BackendKind::Memory,
            request_timeout_ms: Some(2500),
            ..ClientConfig::default()
        };
        config.write_to_path(&path).expect("write");
        assert_eq!(ClientConfig::from_path(&path).expect("read"), config);
    }

    #[test]
    fn unreadable_and_malformed_files_are_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            ClientConfig::from_path(&missing),
            Err(ClientError::ConfigIo { .. })
        ));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ backend: ").expect("write");
        assert!(matches!(
            ClientConfig::from_path(&broken),
            Err(ClientError::ConfigParse { .. })
        ));
    }

    #[test]
    fn memory_backend_connects_offline() {
        let config = ClientConfig {
            backend: BackendKind::Memory,
            ..ClientConfig::default()
        };
        let api = config.connect().expect("connect");
        assert_eq!(api.backend(), "memory");
        assert!(api.get_health().expect("health").is_healthy);
    }
}
