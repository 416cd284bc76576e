use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use engine_logging::engine_info;
use interpreter_core::SubmissionMode;
use interpreter_engine::{SubmitSettings, DEFAULT_ENDPOINT};
use serde::{Deserialize, Serialize};

const CONFIG_FILENAME: &str = "interpreter.ron";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub endpoint: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub default_mode: String,
    pub allow_logging: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        let settings = SubmitSettings::default();
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            connect_timeout_secs: settings.connect_timeout.as_secs(),
            request_timeout_secs: settings.request_timeout.as_secs(),
            default_mode: SubmissionMode::default().to_string(),
            allow_logging: false,
        }
    }
}

impl AppConfig {
    pub fn submit_settings(&self) -> SubmitSettings {
        SubmitSettings {
            endpoint: self.endpoint.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    pub fn mode(&self) -> anyhow::Result<SubmissionMode> {
        self.default_mode
            .parse()
            .with_context(|| format!("invalid default_mode in config: {:?}", self.default_mode))
    }
}

/// Loads the config at `explicit`, or `./interpreter.ron` if it exists, or defaults.
pub(crate) fn load(explicit: Option<&Path>) -> anyhow::Result<AppConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let path = PathBuf::from(CONFIG_FILENAME);
            if !path.exists() {
                return Ok(AppConfig::default());
            }
            path
        }
    };

    let content = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config from {}", path.display()))?;
    let config: AppConfig = ron::from_str(&content)
        .with_context(|| format!("failed to parse config from {}", path.display()))?;
    engine_info!("Loaded config from {:?}", path);
    Ok(config)
}
