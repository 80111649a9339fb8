//! Editor tunables.

use crate::history::DEFAULT_HISTORY_LIMIT;
use crate::snap::{GRID_SIZE, NODE_SNAP_THRESHOLD, WALL_SNAP_THRESHOLD};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pixels per meter for length labels.
pub const PIXELS_PER_METER: f64 = 50.0;
/// Side length of images added by paste.
pub const PASTED_IMAGE_SIZE: f64 = 200.0;
/// Pointer slop for hit testing, in world pixels.
pub const HIT_TOLERANCE: f64 = 7.0;

/// Errors when reading or writing a config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} must be a positive finite number, got {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

/// Configuration for an [`Editor`](crate::editor::Editor).
///
/// Missing fields in JSON fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub grid_size: f64,
    pub node_snap_threshold: f64,
    pub wall_snap_threshold: f64,
    pub history_limit: usize,
    pub pixels_per_meter: f64,
    pub pasted_image_size: f64,
    pub hit_tolerance: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            node_snap_threshold: NODE_SNAP_THRESHOLD,
            wall_snap_threshold: WALL_SNAP_THRESHOLD,
            history_limit: DEFAULT_HISTORY_LIMIT,
            pixels_per_meter: PIXELS_PER_METER,
            pasted_image_size: PASTED_IMAGE_SIZE,
            hit_tolerance: HIT_TOLERANCE,
        }
    }
}

impl EditorConfig {
    /// Parse and validate a config from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that every length is usable. Thresholds may be zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("grid_size", self.grid_size),
            ("pixels_per_meter", self.pixels_per_meter),
            ("pasted_image_size", self.pasted_image_size),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::OutOfRange { field, value });
            }
        }
        let non_negative = [
            ("node_snap_threshold", self.node_snap_threshold),
            ("wall_snap_threshold", self.wall_snap_threshold),
            ("hit_tolerance", self.hit_tolerance),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::OutOfRange { field, value });
            }
        }
        Ok(())
    }

    /// History limit, never below one.
    pub fn effective_history_limit(&self) -> usize {
        self.history_limit.max(1)
    }
}
