// src/luminance.rs

//! Perceptual luminance model.
//!
//! Converts normalized channel intensities to and from linear luminance under
//! a gamma exponent. The trait exists so table building can be parameterized
//! over the curve; `GammaLuminance` is the only curve in use.

/// Rec. 709 luma coefficients, applied in linear space.
const LUMA_R: f32 = 0.2126;
const LUMA_G: f32 = 0.7152;
const LUMA_B: f32 = 0.0722;

/// A luminance curve parameterized by gamma.
///
/// Both directions operate on values normalized to `[0, 1]`. Implementations
/// must satisfy `from_luma(g, to_luma(g, x)) ≈ x` for every `x` in `[0, 1]`
/// and `g > 0`.
pub trait ColorSpaceLuminance: Send + Sync {
    /// Converts a normalized intensity to linear luminance.
    fn to_luma(&self, gamma: f32, luminance: f32) -> f32;

    /// Converts linear luminance back to a normalized intensity.
    fn from_luma(&self, gamma: f32, luma: f32) -> f32;
}

/// Plain power-law curve: `luma = value^gamma`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GammaLuminance;

impl ColorSpaceLuminance for GammaLuminance {
    #[inline]
    fn to_luma(&self, gamma: f32, luminance: f32) -> f32 {
        luminance.powf(gamma)
    }

    #[inline]
    fn from_luma(&self, gamma: f32, luma: f32) -> f32 {
        luma.powf(gamma.recip())
    }
}

/// The curve used for a given gamma.
pub fn fetch(_gamma: f32) -> &'static dyn ColorSpaceLuminance {
    static GAMMA: GammaLuminance = GammaLuminance;
    &GAMMA
}

/// Reduces an RGB color to a single gray level under `gamma`.
///
/// Each channel is linearized, weighted with Rec. 709 coefficients and the
/// sum converted back, rounded to the nearest byte.
pub fn compute_luminance(gamma: f32, r: u8, g: u8, b: u8) -> u8 {
    let curve = fetch(gamma);
    let lin_r = curve.to_luma(gamma, f32::from(r) / 255.0);
    let lin_g = curve.to_luma(gamma, f32::from(g) / 255.0);
    let lin_b = curve.to_luma(gamma, f32::from(b) / 255.0);
    let luma = lin_r * LUMA_R + lin_g * LUMA_G + lin_b * LUMA_B;
    let value = curve.from_luma(gamma, luma.clamp(0.0, 1.0));
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}
