//! Field configuration and color parsing.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::simulation::particle::MAX_PARTICLES;

/// Errors raised while loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Host-supplied settings for a particle field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Requested particle count before viewport and tier limits.
    pub particle_count: usize,
    /// Global opacity multiplier applied in the fragment stage.
    pub opacity: f32,
    /// Pointer influence radius in pixels.
    pub influence_radius: f32,
    /// Starting tint as a hex string.
    pub initial_color: String,
    /// Seed for particle creation and wander jitter. Equal seeds replay
    /// the same field.
    pub seed: u32,
    /// Seconds for each half of the wallpaper transition ramp.
    pub transition_secs: f64,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            particle_count: 80,
            opacity: 0.6,
            influence_radius: 150.0,
            initial_color: "#ffffff".to_string(),
            seed: 0x5eed_1234,
            transition_secs: 0.8,
        }
    }
}

impl FieldConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str::<Self>(json)?.validated())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Clamp every field into its usable range.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        self.particle_count = self.particle_count.clamp(1, MAX_PARTICLES);
        self.opacity = if self.opacity.is_finite() {
            self.opacity.clamp(0.0, 1.0)
        } else {
            defaults.opacity
        };
        if !(self.influence_radius.is_finite() && self.influence_radius > 0.0) {
            self.influence_radius = defaults.influence_radius;
        }
        if parse_hex_color(&self.initial_color).is_none() {
            log::warn!(
                "Invalid initial color {:?}, using {}",
                self.initial_color,
                defaults.initial_color
            );
            self.initial_color = defaults.initial_color;
        }
        if !(self.transition_secs.is_finite() && self.transition_secs > 0.0) {
            self.transition_secs = defaults.transition_secs;
        }
        self
    }

    /// Initial tint as RGB in [0, 1].
    pub fn initial_rgb(&self) -> [f32; 3] {
        parse_hex_color(&self.initial_color).unwrap_or([1.0, 1.0, 1.0])
    }
}

/// Parse hex color to RGB floats.
///
/// Accepts `#rgb`, `#rrggbb` and `#rrggbbaa` (alpha is ignored), with or
/// without the leading `#`.
pub fn parse_hex_color(hex: &str) -> Option<[f32; 3]> {
    let hex = hex.trim().trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        3 => {
            let mut rgb = [0.0; 3];
            for (channel, digit) in rgb.iter_mut().zip(hex.chars()) {
                let value = digit.to_digit(16)? as f32;
                *channel = (value * 17.0) / 255.0;
            }
            Some(rgb)
        }
        6 | 8 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()? as f32 / 255.0;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()? as f32 / 255.0;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()? as f32 / 255.0;
            Some([r, g, b])
        }
        _ => None,
    }
}
