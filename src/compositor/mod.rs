// src/compositor/mod.rs

//! Turns subpixel coverage masks into opaque BGRA bitmaps.
//!
//! Each coverage value runs through up to three stages: gamma correction via
//! the pre-blend's tables, optional precision reduction, and a linear blend
//! between the target's foreground and background bytes.

mod mask;
mod options;


use log::{debug, trace, warn};

use crate::cache::PreBlendCache;
use crate::color::{BlendTarget, Channel, LuminanceColor};
use crate::config::CompositorConfig;
use crate::error::Result;
use crate::gamma::{GammaParameters, PreBlend};
use crate::instrument;

pub use mask::{CoverageMask, MaskBounds, OutputBitmap};
pub use options::{CompositeFlags, CompositeOptions, GrayscaleMode, PrecisionBits, TableSet};

const OPAQUE: u8 = 0xFF;

/// Composites `mask` into a new BGRA bitmap of the same size.
///
/// Per channel the raw coverage is corrected through the matching table of
/// `pre_blend` (when `APPLY_CORRECTION` is set), reduced (when
/// `REDUCE_PRECISION` is set) and blended. The tables come from `pre_blend`
/// alone; `ALTERNATE_TABLES` only selects tables in
/// [`MaskCompositor::composite`] and is reported with a warning here.
pub fn composite_mask(
    mask: &CoverageMask<'_>,
    pre_blend: &PreBlend,
    options: &CompositeOptions,
) -> Result<OutputBitmap> {
    options.precision.validate()?;
    if options.flags.contains(CompositeFlags::ALTERNATE_TABLES) {
        warn!(
            "composite_mask: ALTERNATE_TABLES has no effect here, using the tables of {:?}",
            pre_blend.params()
        );
    }

    let correct = options.flags.contains(CompositeFlags::APPLY_CORRECTION)
        && pre_blend.is_applicable();
    let reduce = options.flags.contains(CompositeFlags::REDUCE_PRECISION);
    let target = options.target;

    trace!(
        "composite_mask: {}x{} flags={:?} background={:?}",
        mask.width(),
        mask.height(),
        options.flags,
        pre_blend.color()
    );

    let mut output = OutputBitmap::allocate(mask.width(), mask.height())?;
    for (src, dst) in mask.pixels().zip(output.pixels_mut()) {
        let [r, g, b] = Channel::ALL.map(|channel| {
            let mut coverage = src[channel.rgb_offset()];
            if correct {
                coverage = pre_blend.table(channel).apply(coverage);
            }
            if reduce {
                coverage = options.precision.reduce(channel, coverage);
            }
            target.blend(coverage)
        });
        dst.copy_from_slice(&[b, g, r, OPAQUE]);
    }

    Ok(output)
}

/// Composites `mask` as grayscale: each pixel collapses to one coverage value
/// per `mode`, is corrected with the green table and blended once. No
/// precision reduction is applied.
pub fn composite_grayscale(
    mask: &CoverageMask<'_>,
    pre_blend: &PreBlend,
    mode: GrayscaleMode,
    target: BlendTarget,
) -> Result<OutputBitmap> {
    let correct = pre_blend.is_applicable();
    let table = pre_blend.g();

    trace!(
        "composite_grayscale: {}x{} mode={:?} background={:?}",
        mask.width(),
        mask.height(),
        mode,
        pre_blend.color()
    );

    let mut output = OutputBitmap::allocate(mask.width(), mask.height())?;
    for (src, dst) in mask.pixels().zip(output.pixels_mut()) {
        let mut coverage = mode.collapse(src);
        if correct {
            coverage = table.apply(coverage);
        }
        let value = target.blend(coverage);
        dst.copy_from_slice(&[value, value, value, OPAQUE]);
    }

    Ok(output)
}

/// Compositing service: a validated configuration plus the table cache it
/// draws pre-blends from. Shareable across threads.
#[derive(Debug)]
pub struct MaskCompositor {
    config: CompositorConfig,
    cache: PreBlendCache,
}

impl MaskCompositor {
    pub fn new(config: CompositorConfig) -> Result<Self> {
        config.validate()?;
        let cache = PreBlendCache::with_luminance_bits(config.luminance_bits)?;
        debug!(
            "MaskCompositor: primary={:?} alternate={:?} luminance_bits={}",
            config.primary, config.alternate, config.luminance_bits
        );
        Ok(MaskCompositor { config, cache })
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    pub fn cache(&self) -> &PreBlendCache {
        &self.cache
    }

    pub fn params(&self, table_set: TableSet) -> &GammaParameters {
        match table_set {
            TableSet::Primary => &self.config.primary,
            TableSet::Alternate => &self.config.alternate,
        }
    }

    /// Options built from the configured flags, precision and target.
    pub fn default_options(&self) -> CompositeOptions {
        CompositeOptions {
            flags: self.config.flags,
            precision: self.config.precision,
            target: self.config.target,
        }
    }

    pub fn pre_blend(&self, background: LuminanceColor, table_set: TableSet) -> Result<PreBlend> {
        self.cache.pre_blend(background, self.params(table_set))
    }

    /// Composites `mask` against `background`, taking the tables from the
    /// set `options.flags` selects.
    pub fn composite(
        &self,
        mask: &CoverageMask<'_>,
        background: LuminanceColor,
        options: &CompositeOptions,
    ) -> Result<OutputBitmap> {
        let pre_blend = self.pre_blend(background, TableSet::from_flags(options.flags))?;
        instrument::timed("composite", || composite_mask(mask, &pre_blend, options))
    }

    /// Grayscale counterpart of [`composite`](Self::composite). The background
    /// is reduced to its luminance under the primary device gamma first.
    pub fn composite_grayscale(
        &self,
        mask: &CoverageMask<'_>,
        background: LuminanceColor,
    ) -> Result<OutputBitmap> {
        let gray = background.luminance(self.config.primary.device_gamma);
        let pre_blend = self.pre_blend(LuminanceColor::gray(gray), TableSet::Primary)?;
        instrument::timed("composite_grayscale", || {
            composite_grayscale(
                mask,
                &pre_blend,
                self.config.grayscale_mode,
                self.config.target,
            )
        })
    }
}
