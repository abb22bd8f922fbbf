// src/compositor/options.rs

//! Per-call compositing options.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::color::{BlendTarget, Channel};
use crate::error::{Error, Result};

bitflags! {
    /// Stages applied to each coverage value before the blend.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct CompositeFlags: u8 {
        /// Look coverage up in the pre-blend's correction tables.
        const APPLY_CORRECTION = 1 << 0;
        /// Drop low bits of each corrected coverage value.
        const REDUCE_PRECISION = 1 << 1;
        /// Use the alternate gamma parameters instead of the primary ones.
        /// Only meaningful to [`MaskCompositor`](super::MaskCompositor).
        const ALTERNATE_TABLES = 1 << 2;
    }
}

impl Default for CompositeFlags {
    fn default() -> Self {
        CompositeFlags::APPLY_CORRECTION
    }
}

/// Which gamma parameter set a pre-blend is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TableSet {
    #[default]
    Primary,
    /// The second table set, tuned for a heavier device gamma.
    Alternate,
}

impl TableSet {
    pub fn from_flags(flags: CompositeFlags) -> Self {
        if flags.contains(CompositeFlags::ALTERNATE_TABLES) {
            TableSet::Alternate
        } else {
            TableSet::Primary
        }
    }
}

/// Low bits dropped per channel when precision reduction is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct PrecisionBits {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Default for PrecisionBits {
    fn default() -> Self {
        PrecisionBits {
            red: 3,
            green: 2,
            blue: 3,
        }
    }
}

impl PrecisionBits {
    pub const MAX: u8 = 7;

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// The same shift on every channel.
    pub const fn uniform(bits: u8) -> Self {
        Self::new(bits, bits, bits)
    }

    pub fn get(&self, channel: Channel) -> u8 {
        match channel {
            Channel::Red => self.red,
            Channel::Green => self.green,
            Channel::Blue => self.blue,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for channel in Channel::ALL {
            let bits = self.get(channel);
            if bits > Self::MAX {
                return Err(Error::configuration(format!(
                    "{:?} precision bits must be at most {}, got {}",
                    channel,
                    Self::MAX,
                    bits
                )));
            }
        }
        Ok(())
    }

    /// Clears the low bits of `value` for `channel`. A shift of 8 or more
    /// clears every bit.
    #[inline]
    pub fn reduce(&self, channel: Channel, value: u8) -> u8 {
        let bits = u32::from(self.get(channel));
        value
            .checked_shr(bits)
            .and_then(|high| high.checked_shl(bits))
            .unwrap_or(0)
    }
}

/// How a three-channel mask collapses to one coverage value in grayscale
/// mode. The collapsed value is always corrected with the green table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrayscaleMode {
    /// Mean of the three coverage channels.
    #[default]
    Average,
    /// One coverage channel read as-is. `SingleChannel(Red)` reproduces
    /// renderers that read red coverage through the green table.
    SingleChannel(Channel),
}

impl GrayscaleMode {
    #[inline]
    pub fn collapse(&self, rgb: &[u8]) -> u8 {
        match self {
            GrayscaleMode::Average => {
                let sum: u16 = rgb[..3].iter().map(|&c| u16::from(c)).sum();
                (sum / 3) as u8
            }
            GrayscaleMode::SingleChannel(channel) => rgb[channel.rgb_offset()],
        }
    }
}

/// Options for [`composite_mask`](super::composite_mask).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompositeOptions {
    pub flags: CompositeFlags,
    pub precision: PrecisionBits,
    pub target: BlendTarget,
}

impl CompositeOptions {
    pub fn with_flags(mut self, flags: CompositeFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_precision(mut self, precision: PrecisionBits) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_target(mut self, target: BlendTarget) -> Self {
        self.target = target;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_flags_apply_correction_only() {
        let options = CompositeOptions::default();
        assert_eq!(options.flags, CompositeFlags::APPLY_CORRECTION);
        assert_eq!(options.precision, PrecisionBits::new(3, 2, 3));
        assert_eq!(TableSet::from_flags(options.flags), TableSet::Primary);
        assert_eq!(
            TableSet::from_flags(CompositeFlags::ALTERNATE_TABLES),
            TableSet::Alternate
        );
    }

    #[test]
    fn test_precision_reduce() {
        let bits = PrecisionBits::default();
        assert_eq!(bits.reduce(Channel::Red, 0xFF), 0xF8);
        assert_eq!(bits.reduce(Channel::Green, 0xFF), 0xFC);
        assert_eq!(bits.reduce(Channel::Blue, 137), 136);
        assert_eq!(PrecisionBits::uniform(0).reduce(Channel::Red, 137), 137);
    }

    #[test]
    fn test_precision_reduce_out_of_range_clears_value() {
        let bits = PrecisionBits::new(8, 0, 200);
        assert_eq!(bits.reduce(Channel::Red, 200), 0);
        assert_eq!(bits.reduce(Channel::Green, 200), 200);
        assert_eq!(bits.reduce(Channel::Blue, 255), 0);
        assert_eq!(PrecisionBits::uniform(7).reduce(Channel::Green, 200), 128);
    }

    #[test]
    fn test_precision_validate() {
        assert!(PrecisionBits::uniform(7).validate().is_ok());
        assert!(matches!(
            PrecisionBits::new(3, 8, 3).validate(),
            Err(Error::Configuration { .. })
        ));
    }

    #[test]
    fn test_grayscale_collapse() {
        let rgb = [30u8, 60, 91];
        assert_eq!(GrayscaleMode::Average.collapse(&rgb), 60);
        assert_eq!(GrayscaleMode::SingleChannel(Channel::Red).collapse(&rgb), 30);
        assert_eq!(GrayscaleMode::SingleChannel(Channel::Blue).collapse(&rgb), 91);
        assert_eq!(GrayscaleMode::Average.collapse(&[255, 255, 255]), 255);
    }
}
