use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CURVE_ANGLE, DEFAULT_JUNCTION_ENTRY_LENGTH, DEFAULT_PIECE_LENGTH, DEFAULT_SHORT_LENGTH,
    DEFAULT_ZONE_SIZE, MAX_CONNECT_ANGLE, MAX_CONNECT_DISTANCE, REVERSAL_TOLERANCE,
};
use crate::error::{Result, TrackError};

/// Tunables for a track network and the tools that build on it
///
/// Every field falls back to its default when missing from a config file, so
/// older files keep loading after new settings are added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackConfig {
    #[serde(default = "default_zone_size")]
    pub zone_size: f32,
    #[serde(default = "default_max_connect_distance")]
    pub max_connect_distance: f32,
    #[serde(default = "default_max_connect_angle")]
    pub max_connect_angle: f32,
    #[serde(default = "default_reversal_tolerance")]
    pub reversal_tolerance: f32,
    #[serde(default = "default_piece_length")]
    pub piece_length: f32,
    #[serde(default = "default_short_length")]
    pub short_length: f32,
    #[serde(default = "default_curve_angle")]
    pub curve_angle: f32,
    #[serde(default = "default_junction_entry_length")]
    pub junction_entry_length: f32,
}

fn default_zone_size() -> f32 {
    DEFAULT_ZONE_SIZE
}

fn default_max_connect_distance() -> f32 {
    MAX_CONNECT_DISTANCE
}

fn default_max_connect_angle() -> f32 {
    MAX_CONNECT_ANGLE
}

fn default_reversal_tolerance() -> f32 {
    REVERSAL_TOLERANCE
}

fn default_piece_length() -> f32 {
    DEFAULT_PIECE_LENGTH
}

fn default_short_length() -> f32 {
    DEFAULT_SHORT_LENGTH
}

fn default_curve_angle() -> f32 {
    DEFAULT_CURVE_ANGLE
}

fn default_junction_entry_length() -> f32 {
    DEFAULT_JUNCTION_ENTRY_LENGTH
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            zone_size: DEFAULT_ZONE_SIZE,
            max_connect_distance: MAX_CONNECT_DISTANCE,
            max_connect_angle: MAX_CONNECT_ANGLE,
            reversal_tolerance: REVERSAL_TOLERANCE,
            piece_length: DEFAULT_PIECE_LENGTH,
            short_length: DEFAULT_SHORT_LENGTH,
            curve_angle: DEFAULT_CURVE_ANGLE,
            junction_entry_length: DEFAULT_JUNCTION_ENTRY_LENGTH,
        }
    }
}

impl TrackConfig {
    /// Check that every value is usable
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the zone size or a piece length is not
    /// positive, or if a tolerance is negative
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("zone_size", self.zone_size),
            ("piece_length", self.piece_length),
            ("short_length", self.short_length),
            ("junction_entry_length", self.junction_entry_length),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(TrackError::InvalidParameter(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        let non_negative = [
            ("max_connect_distance", self.max_connect_distance),
            ("max_connect_angle", self.max_connect_angle),
            ("reversal_tolerance", self.reversal_tolerance),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(TrackError::InvalidParameter(format!(
                    "{name} must not be negative, got {value}"
                )));
            }
        }

        if !self.curve_angle.is_finite() {
            return Err(TrackError::InvalidParameter(
                "curve_angle must be finite".to_string(),
            ));
        }

        Ok(())
    }

    /// Parse a config from JSON and validate it
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a value is out of range
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the config as pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
