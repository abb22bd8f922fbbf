// src/cache.rs

//! Thread-safe cache of correction table sets.
//!
//! Building a table set costs a few hundred `powf` calls per table, while the
//! same configuration is reused for every glyph drawn with it. The cache is an
//! explicit object owned by whoever composites; there is no process-wide
//! state. Entries are immutable once built.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use log::{debug, trace};
use once_cell::sync::OnceCell;

use crate::color::LuminanceColor;
use crate::error::Result;
use crate::gamma::{self, GammaParameters, MaskGamma, PreBlend, DEFAULT_LUMINANCE_BITS};

/// Cache key: bit patterns of contrast, paint gamma and device gamma.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct GammaKey([u32; 3]);

/// Counters for cache performance.
#[derive(Debug, Default)]
struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    builds: AtomicU64,
}

/// Point-in-time copy of the cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    /// Table sets actually built. Concurrent misses on one key build once.
    pub builds: u64,
}

/// Cache of [`MaskGamma`] table sets keyed by gamma parameters.
///
/// Each entry is a `OnceCell`, so the map shard is only held long enough to
/// find or insert the cell; the tables are built outside of it.
#[derive(Debug)]
pub struct PreBlendCache {
    luminance_bits: u8,
    entries: DashMap<GammaKey, Arc<OnceCell<Arc<MaskGamma>>>>,
    stats: CacheStats,
}

impl Default for PreBlendCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PreBlendCache {
    /// Creates an empty cache quantizing backgrounds to
    /// [`DEFAULT_LUMINANCE_BITS`] bits per channel.
    pub fn new() -> Self {
        PreBlendCache {
            luminance_bits: DEFAULT_LUMINANCE_BITS,
            entries: DashMap::new(),
            stats: CacheStats::default(),
        }
    }

    /// Creates an empty cache with a custom luminance bit count (`1..=8`).
    pub fn with_luminance_bits(luminance_bits: u8) -> Result<Self> {
        gamma::validate_luminance_bits(luminance_bits)?;
        Ok(PreBlendCache {
            luminance_bits,
            ..Self::new()
        })
    }

    pub fn luminance_bits(&self) -> u8 {
        self.luminance_bits
    }

    /// Returns the table set for `params`, building it on first use.
    pub fn mask_gamma(&self, params: &GammaParameters) -> Result<Arc<MaskGamma>> {
        params.validate()?;
        let key = GammaKey(params.key());

        // Release the read guard before `entry` takes the shard for writing.
        let existing = self.entries.get(&key).map(|entry| Arc::clone(entry.value()));
        let cell = match existing {
            Some(cell) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                cell
            }
            None => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                Arc::clone(self.entries.entry(key).or_default().value())
            }
        };

        let gamma = cell.get_or_try_init(|| {
            self.stats.builds.fetch_add(1, Ordering::Relaxed);
            debug!(
                "PreBlendCache: building table set for {:?} ({} luminance bits)",
                params, self.luminance_bits
            );
            MaskGamma::new(*params, self.luminance_bits).map(Arc::new)
        })?;

        Ok(Arc::clone(gamma))
    }

    /// Returns the pre-blend for `background` under `params`.
    ///
    /// Value-identical to [`gamma::build_pre_blend_with_bits`] with the
    /// cache's luminance bits.
    pub fn pre_blend(
        &self,
        background: LuminanceColor,
        params: &GammaParameters,
    ) -> Result<PreBlend> {
        let gamma = self.mask_gamma(params)?;
        let pre_blend = gamma.pre_blend(background);
        trace!(
            "PreBlendCache: {:?} -> canonical {:?}",
            background,
            pre_blend.color()
        );
        Ok(pre_blend)
    }

    /// Number of parameter sets currently cached.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every cached table set. Pre-blends handed out earlier stay valid.
    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            hits: self.stats.hits.load(Ordering::Relaxed),
            misses: self.stats.misses.load(Ordering::Relaxed),
            builds: self.stats.builds.load(Ordering::Relaxed),
        }
    }
}
