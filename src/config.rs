use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub polling: Polling,
    #[serde(default)]
    pub scan: Scan,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: Default::default(),
            polling: Default::default(),
            scan: Default::default(),
            output: Default::default(),
            logging: Default::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub base_url: String,
    pub connect_timeout_seconds: u64,
    pub request_timeout_seconds: u64,
}

impl Server {
    /// Effective base URL. The `SCANWATCH_BASE_URL` environment variable wins
    /// over the configured value.
    pub fn resolve_base_url(&self) -> String {
        if let Ok(env_val) = std::env::var("SCANWATCH_BASE_URL") {
            if !env_val.trim().is_empty() {
                return env_val;
            }
        }
        self.base_url.clone()
    }
}

impl Default for Server {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8001".into(),
            connect_timeout_seconds: 5,
            request_timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Polling {
    pub interval_seconds: u64,
    /// "retry" keeps polling after a failed status query; "abort" gives up.
    pub on_transport_error: String,
}

impl Default for Polling {
    fn default() -> Self {
        Self {
            interval_seconds: 3,
            on_transport_error: "retry".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scan {
    pub default_type: String,
}

impl Default for Scan {
    fn default() -> Self {
        Self {
            default_type: "quick".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Output {
    pub print_summary: bool,
    pub write_report_json: bool,
    pub report_path: String,
}

impl Default for Output {
    fn default() -> Self {
        Self {
            print_summary: true,
            write_report_json: false,
            report_path: "".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: false,
            file_path: "".into(),
        }
    }
}
