//! Gamma-corrected compositing of subpixel glyph coverage masks.
//!
//! Coverage is corrected through per-background lookup tables, optionally
//! reduced in precision, and blended into an opaque BGRA bitmap.

pub mod cache;
pub mod color;
pub mod compositor;
pub mod config;
pub mod error;
pub mod gamma;
pub mod instrument;
pub mod luminance;

pub use cache::{CacheStatsSnapshot, PreBlendCache};
pub use color::{BlendTarget, Channel, LuminanceColor};
pub use compositor::{
    composite_grayscale, composite_mask, CompositeFlags, CompositeOptions, CoverageMask,
    GrayscaleMode, MaskBounds, MaskCompositor, OutputBitmap, PrecisionBits, TableSet,
};
pub use config::CompositorConfig;
pub use error::{Error, Result};
pub use gamma::{
    build_pre_blend, build_pre_blend_with_bits, CorrectionTable, GammaParameters, MaskGamma,
    PreBlend,
};
