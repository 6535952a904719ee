//! Configuration management for the gesture recognition application

use crate::{
    classifier::GestureThresholds,
    constants::{DEFAULT_CAMERA_INDEX, DEFAULT_MIN_HAND_CONFIDENCE, DEFAULT_REFRESH_MS},
    Error, Result,
};
use log::{warn, LevelFilter};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Capture device configuration
    pub camera: CameraConfig,

    /// Display loop configuration
    pub gui: GuiConfig,

    /// Classifier thresholds
    pub gesture_thresholds: GestureThresholds,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Hand landmark model configuration
    pub model: ModelConfig,
}

/// Capture device configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Device index passed to the capture library
    pub index: i32,
}

/// Display loop configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuiConfig {
    /// Interval between frame iterations in milliseconds
    pub refresh_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level name, e.g. "INFO", "debug", "WARNING"
    pub level: String,
}

/// Hand landmark model configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the hand landmark ONNX model
    pub hand_landmarks: PathBuf,

    /// Minimum hand presence score (0.0-1.0)
    pub min_confidence: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            index: DEFAULT_CAMERA_INDEX,
        }
    }
}

impl Default for GuiConfig {
    fn default() -> Self {
        Self {
            refresh_ms: DEFAULT_REFRESH_MS,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            hand_landmarks: PathBuf::from("assets/hand_landmark.onnx"),
            min_confidence: DEFAULT_MIN_HAND_CONFIDENCE,
        }
    }
}

impl LoggingConfig {
    /// Parse the configured level name
    ///
    /// Accepts Rust level names plus `WARNING` and `CRITICAL`, in any case.
    /// Returns `None` for an unknown name.
    #[must_use]
    pub fn parse_level(&self) -> Option<LevelFilter> {
        match self.level.trim().to_ascii_lowercase().as_str() {
            "off" => Some(LevelFilter::Off),
            "critical" | "error" => Some(LevelFilter::Error),
            "warning" | "warn" => Some(LevelFilter::Warn),
            "info" => Some(LevelFilter::Info),
            "debug" => Some(LevelFilter::Debug),
            "trace" => Some(LevelFilter::Trace),
            _ => None,
        }
    }

    /// Configured level, or `Info` when the name is not recognised
    #[must_use]
    pub fn level_filter(&self) -> LevelFilter {
        self.parse_level().unwrap_or(LevelFilter::Info)
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// Missing groups and fields take their defaults. An empty document
    /// yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid YAML, or
    /// its top level is not a mapping
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] for a non-mapping top level, or a YAML
    /// error for malformed input
    pub fn from_yaml(content: &str) -> Result<Self> {
        let value: serde_yaml::Value = serde_yaml::from_str(content)?;
        match value {
            serde_yaml::Value::Null => Ok(Self::default()),
            serde_yaml::Value::Mapping(_) => Ok(serde_yaml::from_value(value)?),
            other => Err(Error::ConfigError(format!(
                "top level must be a mapping, found {}",
                yaml_kind(&other)
            ))),
        }
    }

    /// Load configuration, falling back to defaults on any problem
    ///
    /// A missing, unreadable or malformed file yields the default
    /// configuration; invalid values are reset one by one (see
    /// [`Config::sanitize`]). Each problem is logged as a warning.
    #[must_use]
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let (config, warnings) = Self::load_with_warnings(path);
        for warning in &warnings {
            warn!("{}", warning);
        }
        config
    }

    /// Like [`Config::load_or_default`], but hand the warnings back instead of
    /// logging them
    ///
    /// Used before the logger exists, since the logger itself is configured
    /// from the result.
    #[must_use]
    pub fn load_with_warnings<P: AsRef<Path>>(path: P) -> (Self, Vec<String>) {
        let path = path.as_ref();
        let mut warnings = Vec::new();
        let mut config = if path.exists() {
            Self::from_file(path).unwrap_or_else(|e| {
                warnings.push(format!("Failed to load config file {}: {}. Using defaults.", path.display(), e));
                Self::default()
            })
        } else {
            warnings.push(format!("Config file {} not found, using defaults", path.display()));
            Self::default()
        };
        warnings.extend(config.sanitize().into_iter().map(|reset| format!("Config: {reset}")));
        (config, warnings)
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] describing the first invalid value
    pub fn validate(&self) -> Result<()> {
        let t = &self.gesture_thresholds;
        if !t.extended_min.is_finite() || t.extended_min < 0.0 {
            return Err(Error::ConfigError(
                "extended_min must be a finite non-negative number".to_string(),
            ));
        }
        if !t.together_max.is_finite() || t.together_max < 0.0 {
            return Err(Error::ConfigError(
                "together_max must be a finite non-negative number".to_string(),
            ));
        }
        if t.together_max > t.extended_min {
            return Err(Error::ConfigError(format!(
                "together_max ({}) must not exceed extended_min ({})",
                t.together_max, t.extended_min
            )));
        }

        if self.gui.refresh_ms == 0 {
            return Err(Error::ConfigError("refresh_ms must be greater than 0".to_string()));
        }

        if !(0.0..=1.0).contains(&self.model.min_confidence) {
            return Err(Error::ConfigError(
                "min_confidence must be between 0.0 and 1.0".to_string(),
            ));
        }

        if self.logging.parse_level().is_none() {
            return Err(Error::ConfigError(format!(
                "unknown logging level: {}",
                self.logging.level
            )));
        }

        Ok(())
    }

    /// Reset every invalid value to its default, keeping the valid ones
    ///
    /// Checks the same rules as [`Config::validate`]. Returns one message per
    /// reset so the caller can report them once logging is up. Thresholds
    /// that contradict each other are reset as a pair.
    pub fn sanitize(&mut self) -> Vec<String> {
        let mut resets = Vec::new();
        let defaults = Self::default();

        let t = &mut self.gesture_thresholds;
        if !t.extended_min.is_finite() || t.extended_min < 0.0 {
            resets.push(format!(
                "invalid extended_min {}, using {}",
                t.extended_min, defaults.gesture_thresholds.extended_min
            ));
            t.extended_min = defaults.gesture_thresholds.extended_min;
        }
        if !t.together_max.is_finite() || t.together_max < 0.0 {
            resets.push(format!(
                "invalid together_max {}, using {}",
                t.together_max, defaults.gesture_thresholds.together_max
            ));
            t.together_max = defaults.gesture_thresholds.together_max;
        }
        if t.together_max > t.extended_min {
            resets.push(format!(
                "together_max ({}) exceeds extended_min ({}), using default thresholds",
                t.together_max, t.extended_min
            ));
            *t = defaults.gesture_thresholds;
        }

        if self.gui.refresh_ms == 0 {
            resets.push(format!("refresh_ms must be greater than 0, using {}", defaults.gui.refresh_ms));
            self.gui = defaults.gui;
        }

        if !(0.0..=1.0).contains(&self.model.min_confidence) {
            resets.push(format!(
                "min_confidence {} is outside 0.0..=1.0, using {}",
                self.model.min_confidence, defaults.model.min_confidence
            ));
            self.model.min_confidence = defaults.model.min_confidence;
        }

        if self.logging.parse_level().is_none() {
            resets.push(format!(
                "unknown logging level {}, using {}",
                self.logging.level, defaults.logging.level
            ));
            self.logging = defaults.logging;
        }

        resets
    }
}

fn yaml_kind(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "a boolean",
        serde_yaml::Value::Number(_) => "a number",
        serde_yaml::Value::String(_) => "a string",
        serde_yaml::Value::Sequence(_) => "a sequence",
        serde_yaml::Value::Mapping(_) => "a mapping",
        serde_yaml::Value::Tagged(_) => "a tagged value",
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Makaton gesture recognition configuration

camera:
  index: 0

gui:
  # Interval between frame iterations
  refresh_ms: 10

gesture_thresholds:
  # Every thumb-to-fingertip distance above this: Hello
  extended_min: 0.2
  # Every thumb-to-fingertip distance below this: Goodbye
  together_max: 0.1

logging:
  # trace, debug, info, warning, error, critical
  level: "INFO"

model:
  hand_landmarks: "assets/hand_landmark.onnx"
  min_confidence: 0.5
"#;
