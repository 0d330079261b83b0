#![forbid(unsafe_code)]

//! Tunable parameters for the tour engine.
//!
//! [`TourConfig`] gathers every timing and geometry constant the engine
//! uses. It can be loaded from TOML or JSON at startup; missing fields keep
//! their defaults.
//!
//! ```toml
//! phase_transition_ms = 1500
//! margin = 12
//!
//! [tooltip]
//! width = 280
//! height = 160
//!
//! [retry]
//! max_retries = 3
//!
//! [retry.backoff]
//! kind = "schedule"
//! offsets_ms = [100, 400, 1200]
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use waypoint_core::geometry::Size;
use waypoint_runtime::retry::{BackoffStrategy, RetryPolicy};
use web_time::Duration;

use crate::catalog::CatalogError;

/// Retry offsets for locating a step's target, in ms after step activation.
pub const DEFAULT_RETRY_OFFSETS_MS: [u64; 5] = [100, 300, 600, 1000, 2000];
pub const DEFAULT_PHASE_TRANSITION_MS: u64 = 2000;
pub const DEFAULT_AUTO_ADVANCE_MS: u64 = 3000;

/// Engine parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TourConfig {
    /// Schedule for re-attempting target resolution.
    pub retry: RetryPolicy,
    /// How long the phase interstitial suppresses step rendering.
    pub phase_transition_ms: u64,
    /// Delay for `auto` steps that do not set their own.
    pub default_auto_advance_ms: u64,
    /// Tooltip footprint used for placement.
    pub tooltip: Size,
    /// Gap between target and tooltip, and minimum distance to viewport edges.
    pub margin: i32,
    /// Padding added around the target to form the highlight cutout.
    pub highlight_padding: i32,
    /// Distance of the fallback tooltip from the viewport bottom.
    pub fallback_bottom_offset: i32,
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::schedule(DEFAULT_RETRY_OFFSETS_MS),
            phase_transition_ms: DEFAULT_PHASE_TRANSITION_MS,
            default_auto_advance_ms: DEFAULT_AUTO_ADVANCE_MS,
            tooltip: Size::new(320, 180),
            margin: 16,
            highlight_padding: 6,
            fallback_bottom_offset: 80,
        }
    }
}

impl TourConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(ConfigError::Toml)?;
        config.checked()
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s).map_err(ConfigError::Json)?;
        config.checked()
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    fn checked(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if let BackoffStrategy::Schedule { offsets_ms } = &self.retry.backoff {
            if offsets_ms.windows(2).any(|w| w[1] < w[0]) {
                errors.push(format!(
                    "retry.backoff.offsets_ms must be non-decreasing, got {offsets_ms:?}"
                ));
            }
            if self.retry.max_retries as usize > offsets_ms.len() {
                errors.push(format!(
                    "retry.max_retries ({}) exceeds the {} scheduled offsets",
                    self.retry.max_retries,
                    offsets_ms.len()
                ));
            }
        }
        if self.default_auto_advance_ms == 0 {
            errors.push("default_auto_advance_ms must be > 0".into());
        }
        if self.tooltip.is_empty() {
            errors.push(format!(
                "tooltip must have positive width and height, got {}x{}",
                self.tooltip.width, self.tooltip.height
            ));
        }
        if self.margin < 0 {
            errors.push(format!("margin must be >= 0, got {}", self.margin));
        }
        if self.highlight_padding < 0 {
            errors.push(format!(
                "highlight_padding must be >= 0, got {}",
                self.highlight_padding
            ));
        }
        if self.fallback_bottom_offset < 0 {
            errors.push(format!(
                "fallback_bottom_offset must be >= 0, got {}",
                self.fallback_bottom_offset
            ));
        }

        errors
    }

    #[must_use]
    pub fn phase_transition(&self) -> Duration {
        Duration::from_millis(self.phase_transition_ms)
    }
}

/// Errors from loading configuration or catalog files.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    Toml(toml::de::Error),
    /// JSON parse error.
    Json(serde_json::Error),
    /// Out-of-range parameters.
    Validation(Vec<String>),
    /// The file parsed but describes an invalid step catalog.
    Catalog(CatalogError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "config I/O error: {e}"),
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
            Self::Catalog(e) => write!(f, "invalid catalog: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Toml(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Catalog(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
