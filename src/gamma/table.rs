// src/gamma/table.rs

//! Construction of 256-entry coverage correction tables.
//!
//! A table maps raw coverage to the coverage that, once linearly blended by
//! the compositor, produces the perceptually correct result for one source
//! luminance level.

use std::fmt;

use super::GammaParameters;
use crate::luminance::{self, ColorSpaceLuminance};

/// Source and destination closer than this are blended with the contrast
/// curve alone; dividing by their difference is unstable.
const STABILITY_THRESHOLD: f32 = 1.0 / 256.0;

/// An immutable 256-entry byte-to-byte lookup table.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CorrectionTable([u8; 256]);

impl CorrectionTable {
    /// Builds the table for source intensity `src_i` under `params`.
    ///
    /// Parameters are expected to be validated already.
    pub fn build(src_i: u8, params: &GammaParameters) -> Self {
        let mut table = [0u8; 256];
        build_correcting_lut(
            &mut table,
            src_i,
            params.contrast,
            luminance::fetch(params.paint_gamma),
            params.paint_gamma,
            luminance::fetch(params.device_gamma),
            params.device_gamma,
        );
        CorrectionTable(table)
    }

    /// The table mapping every value to itself.
    pub fn identity() -> Self {
        let mut table = [0u8; 256];
        for (i, entry) in table.iter_mut().enumerate() {
            *entry = i as u8;
        }
        CorrectionTable(table)
    }

    #[inline]
    pub fn apply(&self, value: u8) -> u8 {
        self.0[usize::from(value)]
    }

    pub fn as_slice(&self) -> &[u8; 256] {
        &self.0
    }

    pub fn is_identity(&self) -> bool {
        self.0.iter().enumerate().all(|(i, &v)| usize::from(v) == i)
    }
}

impl fmt::Debug for CorrectionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The full table is noise in logs; show the shape of the curve.
        write!(
            f,
            "CorrectionTable[0]={} [64]={} [128]={} [192]={} [255]={}",
            self.0[0], self.0[64], self.0[128], self.0[192], self.0[255]
        )
    }
}

#[inline]
pub(crate) fn apply_contrast(srca: f32, contrast: f32) -> f32 {
    srca + ((1.0 - srca) * contrast * srca)
}

#[inline]
fn clamp_round(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Fills `table` with the correction curve for source intensity `src_i`.
///
/// The destination is guessed as the perceptual inverse of the source
/// (`1 - src`), which keeps neighboring tables close for desaturated colors.
pub fn build_correcting_lut(
    table: &mut [u8; 256],
    src_i: u8,
    contrast: f32,
    src_convert: &dyn ColorSpaceLuminance,
    src_gamma: f32,
    dst_convert: &dyn ColorSpaceLuminance,
    dst_gamma: f32,
) {
    let src = f32::from(src_i) / 255.0;
    build_for_source(
        table,
        src,
        contrast,
        src_convert,
        src_gamma,
        dst_convert,
        dst_gamma,
    );
}

pub(crate) fn build_for_source(
    table: &mut [u8; 256],
    src: f32,
    contrast: f32,
    src_convert: &dyn ColorSpaceLuminance,
    src_gamma: f32,
    dst_convert: &dyn ColorSpaceLuminance,
    dst_gamma: f32,
) {
    let lin_src = src_convert.to_luma(src_gamma, src);
    let dst = 1.0 - src;
    let lin_dst = dst_convert.to_luma(dst_gamma, dst);

    // Contrast tapers off to 0 as the destination approaches white.
    let adjusted_contrast = contrast * lin_dst;

    if (src - dst).abs() < STABILITY_THRESHOLD {
        for (i, entry) in table.iter_mut().enumerate() {
            // Divide rather than accumulate 1/255 so entry 255 is exactly 1.0.
            let raw_srca = i as f32 / 255.0;
            let srca = apply_contrast(raw_srca, adjusted_contrast);
            *entry = clamp_round(255.0 * srca);
        }
        return;
    }

    for (i, entry) in table.iter_mut().enumerate() {
        let raw_srca = i as f32 / 255.0;
        let srca = apply_contrast(raw_srca, adjusted_contrast);
        let dsta = 1.0 - srca;

        let lin_out = lin_src * srca + dsta * lin_dst;
        let out = dst_convert.from_luma(dst_gamma, lin_out);

        // Undo the linear blend the compositor performs afterwards.
        let result = (out - dst) / (src - dst);
        *entry = clamp_round(255.0 * result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::luminance::GammaLuminance;

    fn params(contrast: f32, gamma: f32) -> GammaParameters {
        GammaParameters::new(contrast, gamma, gamma)
    }

    #[test]
    fn test_identity_table() {
        let table = CorrectionTable::identity();
        assert!(table.is_identity());
        assert_eq!(table.apply(0), 0);
        assert_eq!(table.apply(200), 200);
    }

    #[test]
    fn test_zero_contrast_unit_gamma_is_identity() {
        for &src_i in &[0u8, 36, 73, 109, 146, 182, 219, 255] {
            let table = CorrectionTable::build(src_i, &params(0.0, 1.0));
            for i in 0..=255u8 {
                let diff = (i16::from(table.apply(i)) - i16::from(i)).abs();
                assert!(diff <= 1, "src {} entry {} = {}", src_i, i, table.apply(i));
            }
        }
    }

    #[test]
    fn test_endpoints_for_black_source() {
        let table = CorrectionTable::build(0, &params(1.0, 1.8));
        assert_eq!(table.apply(0), 0);
        assert_eq!(table.apply(255), 255);
    }

    #[test]
    fn test_black_source_matches_closed_form() {
        // src = 0, dst = 1: result = 1 - (1 - srca)^(1/g) with srca = 2a - a^2.
        let gamma = 1.8f32;
        let table = CorrectionTable::build(0, &params(1.0, gamma));
        for i in 0..=255u32 {
            let a = i as f32 / 255.0;
            let srca = a + (1.0 - a) * a;
            let expected = 255.0 * (1.0 - (1.0 - srca).powf(1.0 / gamma));
            let got = f32::from(table.apply(i as u8));
            assert!((got - expected).abs() <= 1.0, "entry {}: {} vs {}", i, got, expected);
        }
    }

    #[test]
    fn test_tables_are_monotonic() {
        for &contrast in &[0.0f32, 0.25, 0.5, 1.0] {
            for &gamma in &[1.0f32, 1.4, 1.8, 2.3, 3.0] {
                for src_i in (0..=255u16).step_by(17) {
                    let table = CorrectionTable::build(src_i as u8, &params(contrast, gamma));
                    let entries = table.as_slice();
                    for pair in entries.windows(2) {
                        assert!(
                            pair[0] <= pair[1],
                            "contrast {} gamma {} src {} not monotonic: {:?}",
                            contrast,
                            gamma,
                            src_i,
                            table
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_stability_guard_uses_contrast_curve() {
        // src == dst == 0.5 takes the guarded branch.
        let curve = GammaLuminance;
        let mut table = [0u8; 256];
        build_for_source(&mut table, 0.5, 1.0, &curve, 1.8, &curve, 1.8);

        let adjusted = 0.5f32.powf(1.8);
        for (i, &entry) in table.iter().enumerate() {
            let expected = clamp_round(255.0 * apply_contrast(i as f32 / 255.0, adjusted));
            assert_eq!(entry, expected, "entry {}", i);
        }
        assert_eq!(table[0], 0);
        assert_eq!(table[255], 255);
    }

    #[test]
    fn test_contrast_darkens_partial_coverage() {
        let plain = CorrectionTable::build(0, &params(0.0, 1.0));
        let contrasted = CorrectionTable::build(0, &params(1.0, 1.0));
        assert!(contrasted.apply(128) > plain.apply(128));
    }

    #[test]
    fn test_apply_contrast_fixed_points() {
        for &c in &[0.0f32, 0.5, 1.0] {
            assert_eq!(apply_contrast(0.0, c), 0.0);
            assert_eq!(apply_contrast(1.0, c), 1.0);
        }
        assert_eq!(apply_contrast(0.5, 1.0), 0.75);
    }

    #[test]
    fn test_clamp_round() {
        assert_eq!(clamp_round(-3.0), 0);
        assert_eq!(clamp_round(300.0), 255);
        assert_eq!(clamp_round(127.5), 128);
        assert_eq!(clamp_round(127.49), 127);
    }
}
