use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DashboardConfig {
    pub server: ServerConfig,
    pub api: ApiConfig,
    pub uploads: UploadConfig,
    pub ui: UiConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ApiConfig {
    /// Backend base URL used for new sessions. Each session may override it.
    pub base_url: String,
    pub api_prefix: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UploadConfig {
    pub max_upload_size: usize,
    /// Advertised in the file pickers; the backend decides what it accepts.
    pub accepted_extensions: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UiConfig {
    pub title: String,
    pub preview_rows: usize,
    /// Sessions idle for longer than this are dropped.
    pub session_ttl_secs: u64,
    pub max_sessions: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8501,
                cors_origins: vec!["http://localhost:8501".to_string()],
            },
            api: ApiConfig {
                base_url: "http://localhost:80".to_string(),
                api_prefix: "/api/v1".to_string(),
            },
            uploads: UploadConfig {
                max_upload_size: 200 * 1024 * 1024, // 200MB
                accepted_extensions: ["csv", "parquet", "json", "pkl", "feather"]
                    .iter()
                    .map(|ext| ext.to_string())
                    .collect(),
            },
            ui: UiConfig {
                title: "MLOps Dashboard".to_string(),
                preview_rows: 5,
                session_ttl_secs: 60 * 60,
                max_sessions: 1000,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl DashboardConfig {
    /// Layers defaults, the config file at `path` (which must exist when
    /// given) and `MLOPS_DASHBOARD_*` environment variables (nested keys
    /// separated by `__`).
    pub fn load(path: Option<&str>) -> Result<Self, ::config::ConfigError> {
        let mut builder =
            ::config::Config::builder().add_source(::config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(::config::File::with_name(path));
        }

        builder
            .add_source(
                ::config::Environment::with_prefix("MLOPS_DASHBOARD")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }

    /// Value for the `accept` attribute of file inputs.
    pub fn accept_attribute(&self) -> String {
        self.uploads
            .accepted_extensions
            .iter()
            .map(|ext| format!(".{}", ext.trim_start_matches('.')))
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_local_backend() {
        let config = DashboardConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:80");
        assert_eq!(config.api.api_prefix, "/api/v1");
        assert_eq!(config.ui.preview_rows, 5);
    }

    #[test]
    fn test_load_without_file_yields_defaults() {
        let config = DashboardConfig::load(None).unwrap();
        assert_eq!(config.server.port, DashboardConfig::default().server.port);
        assert_eq!(config.uploads.accepted_extensions.len(), 5);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        assert!(DashboardConfig::load(Some("/nonexistent/mlops-dashboard.yaml")).is_err());
    }

    #[test]
    fn test_explicit_file_overrides_defaults() {
        let path = std::env::temp_dir().join(format!("mlops-dashboard-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[server]\nport = 9100\n\n[ui]\nmax_sessions = 10\n").unwrap();

        let config = DashboardConfig::load(path.to_str()).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.ui.max_sessions, 10);
        assert_eq!(config.ui.session_ttl_secs, 3600);
    }

    #[test]
    fn test_accept_attribute() {
        let mut config = DashboardConfig::default();
        config.uploads.accepted_extensions = vec!["csv".into(), ".parquet".into()];
        assert_eq!(config.accept_attribute(), ".csv,.parquet");
    }
}
