// src/compositor/mask.rs

//! Input coverage masks and output bitmaps.

use log::warn;

use crate::error::{Error, Result};

/// Bounding rectangle of a rasterized mask, as reported by the rasterizer.
///
/// Edges are exclusive on the right and bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MaskBounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl MaskBounds {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Width in pixels; negative for inverted bounds.
    pub fn width(&self) -> i64 {
        i64::from(self.right) - i64::from(self.left)
    }

    /// Height in pixels; negative for inverted bounds.
    pub fn height(&self) -> i64 {
        i64::from(self.bottom) - i64::from(self.top)
    }
}

/// A read-only subpixel coverage mask: `width × height` pixels of three
/// bytes (R, G, B coverage), rows tightly packed.
#[derive(Debug, Clone, Copy)]
pub struct CoverageMask<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
}

impl<'a> CoverageMask<'a> {
    pub const BYTES_PER_PIXEL: usize = 3;

    /// Wraps `data` after checking the dimensions are non-zero and the buffer
    /// holds at least `width * height * 3` bytes.
    pub fn new(data: &'a [u8], width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::input(format!(
                "mask must have a non-zero area, got {}x{}",
                width, height
            )));
        }

        let required = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(Self::BYTES_PER_PIXEL))
            .ok_or_else(|| {
                Error::input(format!("mask dimensions {}x{} overflow", width, height))
            })?;

        if data.len() < required {
            return Err(Error::input(format!(
                "mask buffer holds {} bytes, {}x{} needs {}",
                data.len(),
                width,
                height,
                required
            )));
        }
        if data.len() > required {
            warn!(
                "CoverageMask: ignoring {} trailing bytes past {}x{} mask",
                data.len() - required,
                width,
                height
            );
        }

        Ok(CoverageMask {
            data: &data[..required],
            width,
            height,
        })
    }

    /// Wraps `data` sized by a rasterizer bounding rectangle.
    pub fn from_bounds(data: &'a [u8], bounds: MaskBounds) -> Result<Self> {
        let (width, height) = (bounds.width(), bounds.height());
        if width <= 0 || height <= 0 {
            return Err(Error::input(format!(
                "mask bounds {:?} have a non-positive size {}x{}",
                bounds, width, height
            )));
        }
        let width = u32::try_from(width)
            .map_err(|_| Error::input(format!("mask width {} too large", width)))?;
        let height = u32::try_from(height)
            .map_err(|_| Error::input(format!("mask height {} too large", height)))?;
        Self::new(data, width, height)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Coverage triples in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = &'a [u8]> + 'a {
        self.data.chunks_exact(Self::BYTES_PER_PIXEL)
    }

    /// Coverage at `(x, y)`, or `None` outside the mask.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * Self::BYTES_PER_PIXEL;
        Some([self.data[idx], self.data[idx + 1], self.data[idx + 2]])
    }
}

/// A composited bitmap: `width × height` pixels of B, G, R, A bytes with
/// alpha always 255. Owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputBitmap {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl OutputBitmap {
    pub const BYTES_PER_PIXEL: usize = 4;

    /// Reserves a zeroed bitmap, reporting allocation failure instead of
    /// aborting.
    pub(crate) fn allocate(width: u32, height: u32) -> Result<Self> {
        let bytes = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(Self::BYTES_PER_PIXEL))
            .ok_or(Error::Allocation { bytes: usize::MAX })?;

        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(bytes)
            .map_err(|_| Error::Allocation { bytes })?;
        pixels.resize(bytes, 0);

        Ok(OutputBitmap {
            pixels,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.width as usize * Self::BYTES_PER_PIXEL
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.pixels
    }

    /// The B, G, R, A bytes at `(x, y)`, or `None` outside the bitmap.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y as usize * self.stride() + x as usize * Self::BYTES_PER_PIXEL;
        let mut out = [0u8; 4];
        out.copy_from_slice(&self.pixels[idx..idx + Self::BYTES_PER_PIXEL]);
        Some(out)
    }

    pub(crate) fn pixels_mut(&mut self) -> std::slice::ChunksExactMut<'_, u8> {
        self.pixels.chunks_exact_mut(Self::BYTES_PER_PIXEL)
    }
}
