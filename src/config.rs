use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Port to bind the server to
    #[serde(default = "default_port")]
    pub port: u16,

    /// Whether to bind to all interfaces (0.0.0.0) or just localhost
    #[serde(default = "default_bind_all")]
    pub bind_all: bool,

    /// CSV dataset with one row per course section
    #[serde(default = "default_dataset_path")]
    pub dataset_path: String,

    /// Directory receiving exported report documents
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Explicit conversion backend executable. When unset, the backend's own
    /// discovery searches the system.
    #[serde(default)]
    pub browser_path: Option<PathBuf>,

    /// Upper bound on a single document conversion
    #[serde(default = "default_convert_timeout_secs")]
    pub convert_timeout_secs: u64,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

fn default_port() -> u16 {
    8080
}

fn default_bind_all() -> bool {
    true
}

fn default_dataset_path() -> String {
    "data/class_profile.csv".to_string()
}

fn default_output_dir() -> String {
    "exports".to_string()
}

fn default_convert_timeout_secs() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_all: default_bind_all(),
            dataset_path: default_dataset_path(),
            output_dir: default_output_dir(),
            browser_path: None,
            convert_timeout_secs: default_convert_timeout_secs(),
            log_level: default_log_level(),
            log_dir: default_log_dir(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file: {}", e))?;

        Ok(config)
    }

    /// Load from file when present, falling back to defaults otherwise.
    pub fn load_or_default(path: &str) -> anyhow::Result<Self> {
        if std::path::Path::new(path).exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn server_address(&self) -> String {
        let host = if self.bind_all { "0.0.0.0" } else { "127.0.0.1" };
        format!("{}:{}", host, self.port)
    }
}
