use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::calibrate::DEFAULT_THRESHOLD;
use crate::error::MarkError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Optional `cpumark` settings file.
///
/// ```toml
/// [reference]
/// file = "marksdata/cpumarks.csv"
/// delimiter = ";"
///
/// [calibration]
/// history = "our_cpunames_and_marks.json"
/// threshold = 3.0
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarksConfig {
    #[serde(default)]
    pub reference: ReferenceConfig,
    #[serde(default)]
    pub calibration: CalibrationConfig,
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReferenceConfig {
    #[serde(default = "default_reference_file")]
    pub file: PathBuf,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            file: default_reference_file(),
            delimiter: default_delimiter(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CalibrationConfig {
    #[serde(default = "default_history_file")]
    pub history: PathBuf,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            history: default_history_file(),
            threshold: default_threshold(),
        }
    }
}

fn default_reference_file() -> PathBuf {
    PathBuf::from("marksdata").join("cpumarks.csv")
}

fn default_delimiter() -> String {
    ";".into()
}

fn default_history_file() -> PathBuf {
    PathBuf::from("our_cpunames_and_marks.json")
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl MarksConfig {
    pub fn from_toml(input: &str) -> Result<Self, MarkError> {
        let config: MarksConfig =
            toml::from_str(input).map_err(|e| MarkError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MarkError> {
        if self.reference.file.as_os_str().is_empty() {
            return Err(MarkError::ConfigValidation("reference.file must not be empty".into()));
        }
        self.delimiter()?;
        let t = self.calibration.threshold;
        if !t.is_finite() || t < 0.0 {
            return Err(MarkError::ConfigValidation(format!(
                "calibration.threshold must be a non-negative percentage, got {t}"
            )));
        }
        Ok(())
    }

    /// The reference delimiter as the single byte the CSV reader wants.
    pub fn delimiter(&self) -> Result<u8, MarkError> {
        match self.reference.delimiter.as_bytes() {
            [b] if b.is_ascii() => Ok(*b),
            _ => Err(MarkError::ConfigValidation(format!(
                "reference.delimiter must be one ASCII character, got \"{}\"",
                self.reference.delimiter
            ))),
        }
    }

    /// Make relative paths relative to `base_dir` (the config file's directory).
    pub fn resolve_paths(mut self, base_dir: &Path) -> Self {
        if self.reference.file.is_relative() {
            self.reference.file = base_dir.join(&self.reference.file);
        }
        if self.calibration.history.is_relative() {
            self.calibration.history = base_dir.join(&self.calibration.history);
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
