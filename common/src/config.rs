use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub detector: DetectorConfig,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub driver: DriverConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub sink: SinkConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetectorConfig {
    /// Maximum quantized channel difference still treated as "same".
    #[serde(default = "default_tolerance")]
    pub tolerance: i32,
    /// Split comparisons across rows on the rayon pool.
    #[serde(default)]
    pub parallel: bool,
}

/// Comparison grid. Captured frames are resized to this before diffing.
#[derive(Debug, Clone, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_grid_width")]
    pub width: u32,
    #[serde(default = "default_grid_height")]
    pub height: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_source_kind")]
    pub kind: String,
    #[serde(default = "default_source_path")]
    pub path: String,
    #[serde(default)]
    pub repeat: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DriverConfig {
    #[serde(default = "default_fps")]
    pub fps: f64,
    /// Stop after this many ticks. Runs until the source ends or ctrl-c otherwise.
    #[serde(default)]
    pub max_ticks: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    /// Display units per grid cell.
    #[serde(default = "default_scale")]
    pub scale: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SinkConfig {
    #[serde(default = "default_sink_kind")]
    pub kind: String,
    /// Output file for the `jsonl` sink; stdout when unset.
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            parallel: false,
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: default_grid_width(),
            height: default_grid_height(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: default_source_kind(),
            path: default_source_path(),
            repeat: false,
        }
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            max_ticks: None,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            scale: default_scale(),
        }
    }
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            kind: default_sink_kind(),
            path: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl DriverConfig {
    /// Time between ticks, floored at 1 ms.
    pub fn period(&self) -> Result<Duration, ConfigError> {
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "driver.fps must be positive, got {}",
                self.fps
            )));
        }
        let period = Duration::try_from_secs_f64(1.0 / self.fps).map_err(|_| {
            ConfigError::Invalid(format!("driver.fps {} gives an unusable tick period", self.fps))
        })?;
        Ok(period.max(Duration::from_millis(1)))
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFile(path.display().to_string(), e))?;
        let config = Self::parse(&content)?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.detector.tolerance < 0 {
            return Err(ConfigError::Invalid(format!(
                "detector.tolerance must be >= 0, got {}",
                self.detector.tolerance
            )));
        }
        if self.grid.width == 0 || self.grid.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "grid must be non-empty, got {}x{}",
                self.grid.width, self.grid.height
            )));
        }
        self.driver.period()?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    ReadFile(String, std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

// Default value functions
fn default_tolerance() -> i32 {
    40
}
fn default_grid_width() -> u32 {
    64
}
fn default_grid_height() -> u32 {
    48
}
fn default_source_kind() -> String {
    "directory".into()
}
fn default_source_path() -> String {
    "frames".into()
}
fn default_fps() -> f64 {
    60.0
}
fn default_scale() -> u32 {
    10
}
fn default_sink_kind() -> String {
    "log".into()
}
fn default_log_level() -> String {
    "info".into()
}
