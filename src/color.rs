// src/color.rs

//! Colors used for gamma modeling and the final blend.
//!
//! `LuminanceColor` only drives table selection; it never reaches the output
//! pixels. `BlendTarget` holds the two byte values the corrected coverage is
//! blended between.

use serde::{Deserialize, Serialize};

use crate::luminance;

/// One subpixel color channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    /// Byte offset of this channel inside an R, G, B coverage triple.
    pub const fn rgb_offset(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }
}

/// A background (or foreground) color used purely for gamma modeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LuminanceColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl LuminanceColor {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// A gray with all three channels set to `v`.
    pub const fn gray(v: u8) -> Self {
        Self { r: v, g: v, b: v }
    }

    /// Channels in R, G, B order.
    pub fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Quantizes every channel to its top `bits` bits and expands the result
    /// back to the full byte range.
    ///
    /// Colors with the same canonical form share the same correction tables.
    /// `bits` must be in `1..=8`; callers validate it beforehand.
    pub fn canonical(&self, bits: u8) -> Self {
        Self {
            r: canonical_channel(self.r, bits),
            g: canonical_channel(self.g, bits),
            b: canonical_channel(self.b, bits),
        }
    }

    /// Reduces the color to a single gray level under `gamma`.
    pub fn luminance(&self, gamma: f32) -> u8 {
        luminance::compute_luminance(gamma, self.r, self.g, self.b)
    }
}

impl From<[u8; 3]> for LuminanceColor {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

/// Index of the bucket `value` falls into when keeping `bits` bits.
#[inline]
pub(crate) fn bucket(value: u8, bits: u8) -> usize {
    usize::from(value >> (8 - bits))
}

/// Expands a `bits`-wide level to 0..=255 by replicating its bit pattern.
///
/// For three bits this is `v << 5 | v << 2 | v >> 1`, so level 0 maps to 0
/// and the top level maps to 255.
pub(crate) fn expand_level(level: usize, bits: u8) -> u8 {
    let level = level as u32;
    let width = i32::from(bits);
    let mut shift = 8 - width;
    let mut out = 0u32;
    while shift > -width {
        out |= if shift >= 0 {
            level << shift
        } else {
            level >> -shift
        };
        shift -= width;
    }
    out as u8
}

#[inline]
fn canonical_channel(value: u8, bits: u8) -> u8 {
    expand_level(bucket(value, bits), bits)
}

/// The two byte values a corrected coverage is blended between.
///
/// Coverage 0 yields `background`, full coverage yields `foreground`. The
/// default draws black ink on white.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendTarget {
    pub foreground: u8,
    pub background: u8,
}

impl Default for BlendTarget {
    fn default() -> Self {
        BlendTarget {
            foreground: 0x00,
            background: 0xFF,
        }
    }
}

impl BlendTarget {
    pub const fn new(foreground: u8, background: u8) -> Self {
        Self {
            foreground,
            background,
        }
    }

    /// Moves from `background` toward `foreground` by `coverage / 255`,
    /// truncating toward zero.
    ///
    /// Equal endpoints give a constant and `new(0, 255).blend(c)` is `255 - c`.
    #[inline]
    pub fn blend(&self, coverage: u8) -> u8 {
        let background = f32::from(self.background);
        let delta = f32::from(self.foreground) - background;
        (background + delta * f32::from(coverage) / 255.0) as u8
    }
}
