//! Configuration loading from a TOML file with environment variable overrides.
//!
//! Looks for `matterhub.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use matterhub_adapter_chip_tool::{ChipToolConfig, ChipToolError};
use matterhub_domain::scene::Scene;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Controller executable and command parameters.
    pub chip_tool: ChipToolConfig,
    /// Background scene loop.
    pub automation: AutomationConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
    /// File every log line is appended to. Empty disables the file.
    pub file: PathBuf,
    /// Number of recent lines kept in memory for `/api/logs`.
    pub history: usize,
    /// Lines buffered for live subscribers (log file, SSE) before they lag.
    pub buffer: usize,
}

/// Automation loop configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AutomationConfig {
    pub enabled: bool,
    /// Built-in scene labels run in order on every pass.
    pub program: Vec<String>,
    /// Pause between checks while no device is registered.
    pub idle_interval_ms: u64,
    /// Overrides the per-step pause of every scene in the program.
    pub step_delay_ms: Option<u64>,
}

impl Config {
    /// Load configuration from `matterhub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("matterhub.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("MATTERHUB_HOST") {
            self.server.host = val;
        }
        if let Some(port) = var("MATTERHUB_PORT").and_then(|val| val.parse().ok()) {
            self.server.port = port;
        }
        if let Some(val) = var("MATTERHUB_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Some(val) = var("MATTERHUB_CHIP_TOOL") {
            self.chip_tool.path = PathBuf::from(val);
        }
        if let Some(val) = var("MATTERHUB_LOG_FILE") {
            self.logging.file = PathBuf::from(val);
        }
        if let Some(val) = var("MATTERHUB_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.logging.buffer == 0 {
            return Err(ConfigError::Validation(
                "logging buffer must be non-zero".to_string(),
            ));
        }
        if self.automation.idle_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "automation idle interval must be non-zero".to_string(),
            ));
        }
        if let Some(label) = self
            .automation
            .program
            .iter()
            .find(|label| Scene::builtin(label).is_none())
        {
            return Err(ConfigError::Validation(format!(
                "unknown scene `{label}` in automation program"
            )));
        }
        self.chip_tool.validate()?;
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl LoggingConfig {
    /// The log file, unless disabled.
    #[must_use]
    pub fn file(&self) -> Option<&PathBuf> {
        (!self.file.as_os_str().is_empty()).then_some(&self.file)
    }
}

impl AutomationConfig {
    /// Resolve the program into scenes, applying the step delay override.
    ///
    /// Unknown labels are skipped; [`Config::load`] rejects them up front.
    #[must_use]
    pub fn scenes(&self) -> Vec<Scene> {
        self.program
            .iter()
            .filter_map(|label| Scene::builtin(label))
            .map(|scene| match self.step_delay_ms {
                Some(ms) => scene.with_step_delay(Duration::from_millis(ms)),
                None => scene,
            })
            .collect()
    }

    #[must_use]
    pub fn idle_interval(&self) -> Duration {
        Duration::from_millis(self.idle_interval_ms)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "matterhubd=info,matterhub=info,tower_http=debug".to_string(),
            file: PathBuf::from("matter_controller.log"),
            history: 256,
            buffer: 4096,
        }
    }
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            program: vec!["cycle".to_string()],
            idle_interval_ms: 2_000,
            step_delay_ms: None,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// The controller executable is missing.
    #[error("invalid controller configuration")]
    ChipTool(#[from] ChipToolError),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
