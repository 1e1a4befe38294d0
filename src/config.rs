use crate::caption::EditPolicy;
use crate::error::{CaptionError, Result};
use crate::subtitle::StyleConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Srt,
    Vtt,
    Ass,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Srt => write!(f, "srt"),
            OutputFormat::Vtt => write!(f, "vtt"),
            OutputFormat::Ass => write!(f, "ass"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim_start_matches('.').to_lowercase().as_str() {
            "srt" => Ok(OutputFormat::Srt),
            "vtt" | "webvtt" => Ok(OutputFormat::Vtt),
            "ass" | "ssa" => Ok(OutputFormat::Ass),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!(
                "Unknown format: {}. Use 'srt', 'vtt', 'ass', or 'json'",
                s
            )),
        }
    }
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Srt => "srt",
            OutputFormat::Vtt => "vtt",
            OutputFormat::Ass => "ass",
            OutputFormat::Json => "json",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Srt => "application/x-subrip",
            OutputFormat::Vtt => "text/vtt",
            OutputFormat::Ass => "text/plain",
            OutputFormat::Json => "application/json",
        }
    }

    /// Guess the format from a file's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| e.parse().ok())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub default_format: OutputFormat,
    pub policy: EditPolicy,
    pub style: StyleConfig,
}

impl Config {
    /// Load the user config file (if any), then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_file_path() {
            Some(path) if path.exists() => Self::load_from_file(&path)?,
            _ => Self::default(),
        };

        config.apply_env();
        Ok(config)
    }

    /// Read a TOML config file. A file that fails to parse falls back to
    /// defaults rather than aborting.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        match toml::from_str::<Config>(&contents) {
            Ok(config) => {
                debug!("Loaded config from {}", path.display());
                Ok(config)
            }
            Err(e) => {
                warn!("Ignoring unreadable config {}: {}", path.display(), e);
                Ok(Self::default())
            }
        }
    }

    fn apply_env(&mut self) {
        if let Ok(format) = std::env::var("CAPTIONKIT_DEFAULT_FORMAT") {
            if let Ok(f) = format.parse() {
                self.default_format = f;
            }
        }
        if let Ok(capacity) = std::env::var("CAPTIONKIT_HISTORY_CAPACITY") {
            if let Ok(c) = capacity.parse() {
                self.policy.history_capacity = c;
            }
        }
        if let Ok(min) = std::env::var("CAPTIONKIT_MIN_DURATION") {
            if let Ok(m) = min.parse() {
                self.policy.min_duration = m;
            }
        }
        if let Ok(allow) = std::env::var("CAPTIONKIT_ALLOW_OVERLAP") {
            if let Ok(a) = allow.parse() {
                self.policy.allow_overlap = a;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        let policy = &self.policy;

        if !(policy.epsilon > 0.0) {
            return Err(CaptionError::Config(
                "Overlap epsilon must be greater than 0".to_string(),
            ));
        }
        if !(policy.min_duration > 0.0) {
            return Err(CaptionError::Config(
                "Minimum caption duration must be greater than 0".to_string(),
            ));
        }
        if policy.history_capacity == 0 {
            return Err(CaptionError::Config(
                "History capacity must be greater than 0".to_string(),
            ));
        }

        self.style.validate()
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("captionkit").join("config.toml"))
    }
}
