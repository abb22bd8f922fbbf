// src/config.rs

//! Defines the configuration for the mask compositor.
//!
//! The configuration can be deserialized from a JSON file. Every field has a
//! default, so a partial file (or `{}`) is valid and only overrides what it
//! names.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use log::debug;

use crate::color::BlendTarget;
use crate::compositor::{CompositeFlags, GrayscaleMode, PrecisionBits};
use crate::error::Result;
use crate::gamma::{self, GammaParameters, DEFAULT_LUMINANCE_BITS};

// --- Top-Level Configuration Structure ---

/// Complete configuration for a [`MaskCompositor`](crate::MaskCompositor).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)] // Missing fields take their defaults.
pub struct CompositorConfig {
    /// Gamma parameters for the primary table set.
    pub primary: GammaParameters,
    /// Gamma parameters for the alternate table set (`ALTERNATE_TABLES`).
    pub alternate: GammaParameters,
    /// Significant bits per background channel when selecting tables.
    pub luminance_bits: u8,
    /// Stages applied by default when compositing.
    pub flags: CompositeFlags,
    /// Low bits dropped per channel under `REDUCE_PRECISION`.
    pub precision: PrecisionBits,
    /// Channel collapse used by grayscale compositing.
    pub grayscale_mode: GrayscaleMode,
    /// Foreground and background bytes of the final blend.
    pub target: BlendTarget,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        CompositorConfig {
            primary: GammaParameters::default(),
            alternate: alternate_parameters(),
            luminance_bits: DEFAULT_LUMINANCE_BITS,
            flags: CompositeFlags::default(),
            precision: PrecisionBits::default(),
            grayscale_mode: GrayscaleMode::default(),
            target: BlendTarget::default(),
        }
    }
}

/// The alternate set keeps full contrast with a heavier gamma.
fn alternate_parameters() -> GammaParameters {
    GammaParameters::new(1.0, 2.3, 2.3)
}

// --- Loading ---

impl CompositorConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: CompositorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let config = Self::from_json_str(&contents)?;
        debug!("Loaded compositor config from {}", path.display());
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks both gamma sets, the luminance bits and the precision bits.
    pub fn validate(&self) -> Result<()> {
        self.primary.validate()?;
        self.alternate.validate()?;
        gamma::validate_luminance_bits(self.luminance_bits)?;
        self.precision.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Channel;
    use crate::error::Error;

    #[test]
    fn test_defaults() {
        let config = CompositorConfig::default();
        assert_eq!(config.primary, GammaParameters::new(1.0, 1.8, 1.8));
        assert_eq!(config.alternate, GammaParameters::new(1.0, 2.3, 2.3));
        assert_eq!(config.luminance_bits, 3);
        assert_eq!(config.flags, CompositeFlags::APPLY_CORRECTION);
        assert_eq!(config.precision, PrecisionBits::new(3, 2, 3));
        assert_eq!(config.grayscale_mode, GrayscaleMode::Average);
        assert_eq!(config.target, BlendTarget::new(0, 255));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_json_gives_defaults() {
        let config = CompositorConfig::from_json_str("{}").unwrap();
        assert_eq!(config, CompositorConfig::default());
    }

    #[test]
    fn test_partial_json_overrides_named_fields() {
        let json = r#"{
            "primary": { "paint_gamma": 2.2 },
            "grayscale_mode": { "single_channel": "Red" },
            "target": { "foreground": 255 }
        }"#;
        let config = CompositorConfig::from_json_str(json).unwrap();
        assert_eq!(config.primary, GammaParameters::new(1.0, 2.2, 1.8));
        assert_eq!(config.grayscale_mode, GrayscaleMode::SingleChannel(Channel::Red));
        assert_eq!(config.target, BlendTarget::new(255, 255));
        assert_eq!(config.alternate, CompositorConfig::default().alternate);
    }

    #[test]
    fn test_json_round_trip() {
        let config = CompositorConfig {
            luminance_bits: 4,
            flags: CompositeFlags::APPLY_CORRECTION | CompositeFlags::REDUCE_PRECISION,
            precision: PrecisionBits::uniform(3),
            grayscale_mode: GrayscaleMode::SingleChannel(Channel::Green),
            ..CompositorConfig::default()
        };
        let json = config.to_json_string().unwrap();
        assert_eq!(CompositorConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        for json in [
            r#"{ "primary": { "device_gamma": 0.0 } }"#,
            r#"{ "alternate": { "contrast": 1.5 } }"#,
            r#"{ "luminance_bits": 0 }"#,
            r#"{ "precision": { "green": 8 } }"#,
        ] {
            assert!(
                matches!(
                    CompositorConfig::from_json_str(json),
                    Err(Error::Configuration { .. })
                ),
                "{} should be rejected",
                json
            );
        }
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            CompositorConfig::from_json_str("{ luminance_bits: }"),
            Err(Error::ConfigParse(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            CompositorConfig::load("/nonexistent/mask-gamma.json"),
            Err(Error::Io(_))
        ));
    }
}
