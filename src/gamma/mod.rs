// src/gamma/mod.rs

//! Gamma parameters, per-luminance table sets and pre-blends.
//!
//! A [`MaskGamma`] owns one correction table per quantized luminance level
//! for a single [`GammaParameters`] set. A [`PreBlend`] picks the three tables
//! (R, G, B) matching one background color out of it.

pub mod table;


use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::color::{self, Channel, LuminanceColor};
use crate::error::{Error, Result};

pub use table::{build_correcting_lut, CorrectionTable};

/// Significant bits kept per background channel when selecting tables.
/// Three bits gives 8 levels per channel, 512 canonical colors.
pub const DEFAULT_LUMINANCE_BITS: u8 = 3;

/// Smoothing contrast level used when the system reports none.
const DEFAULT_SMOOTHING_CONTRAST: u32 = 1400;
const MIN_SMOOTHING_CONTRAST: u32 = 1000;
const MAX_SMOOTHING_CONTRAST: u32 = 2200;

/// Contrast and gamma settings for table construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GammaParameters {
    /// Edge contrast enhancement, in `[0, 1]`.
    pub contrast: f32,
    /// Gamma of the source (paint) color space. Must be positive.
    pub paint_gamma: f32,
    /// Gamma of the destination (device) color space. Must be positive.
    pub device_gamma: f32,
}

impl Default for GammaParameters {
    fn default() -> Self {
        GammaParameters {
            contrast: 1.0,
            paint_gamma: 1.8,
            device_gamma: 1.8,
        }
    }
}

impl GammaParameters {
    pub const fn new(contrast: f32, paint_gamma: f32, device_gamma: f32) -> Self {
        Self {
            contrast,
            paint_gamma,
            device_gamma,
        }
    }

    /// Derives both gammas from a font smoothing contrast level
    /// (`gamma = level / 1000`). Level 0 means "not reported" and selects
    /// the system default of 1400.
    pub fn from_smoothing_contrast(contrast: f32, level: u32) -> Result<Self> {
        let level = if level == 0 {
            DEFAULT_SMOOTHING_CONTRAST
        } else {
            level
        };
        if !(MIN_SMOOTHING_CONTRAST..=MAX_SMOOTHING_CONTRAST).contains(&level) {
            return Err(Error::configuration(format!(
                "smoothing contrast level {} outside {}..={}",
                level, MIN_SMOOTHING_CONTRAST, MAX_SMOOTHING_CONTRAST
            )));
        }
        let gamma = level as f32 / 1000.0;
        let params = Self::new(contrast, gamma, gamma);
        params.validate()?;
        Ok(params)
    }

    /// Rejects non-positive or non-finite gammas and contrast outside `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if !self.contrast.is_finite() || !(0.0..=1.0).contains(&self.contrast) {
            return Err(Error::configuration(format!(
                "contrast {} outside [0, 1]",
                self.contrast
            )));
        }
        for (name, gamma) in [
            ("paint_gamma", self.paint_gamma),
            ("device_gamma", self.device_gamma),
        ] {
            if !gamma.is_finite() || gamma <= 0.0 {
                return Err(Error::configuration(format!(
                    "{} must be a positive finite number, got {}",
                    name, gamma
                )));
            }
        }
        Ok(())
    }

    /// True when every table would map coverage to itself.
    pub fn is_identity(&self) -> bool {
        self.contrast == 0.0 && self.paint_gamma == 1.0 && self.device_gamma == 1.0
    }

    /// Hashable identity of the parameter set (bit patterns of the floats).
    pub(crate) fn key(&self) -> [u32; 3] {
        [
            self.contrast.to_bits(),
            self.paint_gamma.to_bits(),
            self.device_gamma.to_bits(),
        ]
    }
}

pub(crate) fn validate_luminance_bits(bits: u8) -> Result<()> {
    if (1..=8).contains(&bits) {
        Ok(())
    } else {
        Err(Error::configuration(format!(
            "luminance bits must be in 1..=8, got {}",
            bits
        )))
    }
}

/// All correction tables for one parameter set, one per luminance level.
#[derive(Debug)]
pub struct MaskGamma {
    params: GammaParameters,
    luminance_bits: u8,
    tables: Vec<Arc<CorrectionTable>>,
}

impl MaskGamma {
    /// Builds `2^luminance_bits` tables; table `i` is built for the source
    /// intensity obtained by expanding level `i` to a full byte.
    pub fn new(params: GammaParameters, luminance_bits: u8) -> Result<Self> {
        params.validate()?;
        validate_luminance_bits(luminance_bits)?;

        let levels = 1usize << luminance_bits;
        let tables = (0..levels)
            .map(|level| {
                let src_i = color::expand_level(level, luminance_bits);
                Arc::new(CorrectionTable::build(src_i, &params))
            })
            .collect();

        debug!(
            "MaskGamma: built {} correction tables for {:?}",
            levels, params
        );

        Ok(MaskGamma {
            params,
            luminance_bits,
            tables,
        })
    }

    /// Selects the R, G and B tables for `background`.
    pub fn pre_blend(&self, background: LuminanceColor) -> PreBlend {
        let bits = self.luminance_bits;
        let pick = |value: u8| Arc::clone(&self.tables[color::bucket(value, bits)]);
        PreBlend {
            r: pick(background.r),
            g: pick(background.g),
            b: pick(background.b),
            color: background.canonical(bits),
            params: self.params,
        }
    }

    pub fn params(&self) -> &GammaParameters {
        &self.params
    }

    pub fn luminance_bits(&self) -> u8 {
        self.luminance_bits
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }
}

/// The three per-channel correction tables for one canonical background
/// color and one parameter set. Cloning shares the tables.
#[derive(Debug, Clone, PartialEq)]
pub struct PreBlend {
    r: Arc<CorrectionTable>,
    g: Arc<CorrectionTable>,
    b: Arc<CorrectionTable>,
    color: LuminanceColor,
    params: GammaParameters,
}

impl PreBlend {
    pub fn r(&self) -> &CorrectionTable {
        &self.r
    }

    pub fn g(&self) -> &CorrectionTable {
        &self.g
    }

    pub fn b(&self) -> &CorrectionTable {
        &self.b
    }

    pub fn table(&self, channel: Channel) -> &CorrectionTable {
        match channel {
            Channel::Red => &self.r,
            Channel::Green => &self.g,
            Channel::Blue => &self.b,
        }
    }

    /// The canonical (quantized) background color the tables were built for.
    pub fn color(&self) -> LuminanceColor {
        self.color
    }

    pub fn params(&self) -> &GammaParameters {
        &self.params
    }

    /// False when applying the tables would not change any value.
    pub fn is_applicable(&self) -> bool {
        !self.params.is_identity()
    }
}

/// Builds a pre-blend for `background` with the default luminance bits,
/// without any caching.
pub fn build_pre_blend(background: LuminanceColor, params: &GammaParameters) -> Result<PreBlend> {
    build_pre_blend_with_bits(background, params, DEFAULT_LUMINANCE_BITS)
}

/// Builds only the tables `background` needs. Produces the same tables a
/// [`MaskGamma`] with the same parameters and bits would select.
pub fn build_pre_blend_with_bits(
    background: LuminanceColor,
    params: &GammaParameters,
    luminance_bits: u8,
) -> Result<PreBlend> {
    params.validate()?;
    validate_luminance_bits(luminance_bits)?;

    let canonical = background.canonical(luminance_bits);
    let mut built: Vec<(u8, Arc<CorrectionTable>)> = Vec::with_capacity(3);
    let mut table_for = |src_i: u8| {
        if let Some((_, table)) = built.iter().find(|(level, _)| *level == src_i) {
            return Arc::clone(table);
        }
        let table = Arc::new(CorrectionTable::build(src_i, params));
        built.push((src_i, Arc::clone(&table)));
        table
    };

    let r = table_for(canonical.r);
    let g = table_for(canonical.g);
    let b = table_for(canonical.b);

    Ok(PreBlend {
        r,
        g,
        b,
        color: canonical,
        params: *params,
    })
}
