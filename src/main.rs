// In src/main.rs

// Headless driver: composites a synthetic coverage ramp with every flag
// combination and logs the resulting pixel rows.

use mask_gamma::{
    instrument::ElapsedTimer, CompositeFlags, CompositorConfig, CoverageMask, LuminanceColor,
    MaskCompositor, OutputBitmap,
};

use anyhow::Context; // For context on Results
use log::info;

// Ramp dimensions: one column per coverage step.
const RAMP_STEPS: u32 = 16;
const RAMP_ROWS: u32 = 2;

/// Main entry point for the `mask-gamma` demo.
fn main() -> anyhow::Result<()> {
    // Initialize the logger. Default filter is "info" if RUST_LOG is not set.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    info!("Starting mask-gamma...");

    // --- Configuration ---
    let config = match std::env::args().nth(1) {
        Some(path) => CompositorConfig::load(&path)
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => CompositorConfig::default(),
    };
    info!("Configuration: {:?}", config);

    let compositor = MaskCompositor::new(config).context("Invalid compositor configuration")?;

    // --- Synthetic mask ---
    // Row 0 is a gray ramp; row 1 ramps red coverage only.
    let mut data = Vec::with_capacity((RAMP_STEPS * RAMP_ROWS) as usize * 3);
    for step in 0..RAMP_STEPS {
        let v = ramp_value(step);
        data.extend_from_slice(&[v, v, v]);
    }
    for step in 0..RAMP_STEPS {
        data.extend_from_slice(&[ramp_value(step), 0, 0]);
    }
    let mask = CoverageMask::new(&data, RAMP_STEPS, RAMP_ROWS).context("Invalid ramp mask")?;

    // --- Composite ---
    let flag_sets = [
        CompositeFlags::empty(),
        CompositeFlags::APPLY_CORRECTION,
        CompositeFlags::APPLY_CORRECTION | CompositeFlags::REDUCE_PRECISION,
        CompositeFlags::APPLY_CORRECTION | CompositeFlags::ALTERNATE_TABLES,
        CompositeFlags::all(),
    ];

    for background in [LuminanceColor::BLACK, LuminanceColor::WHITE] {
        for flags in flag_sets {
            let options = compositor.default_options().with_flags(flags);
            let timer = ElapsedTimer::start("ramp");
            let output = compositor
                .composite(&mask, background, &options)
                .with_context(|| format!("Failed to composite with {:?}", flags))?;
            let elapsed = timer.finish();
            info!(
                "background={:?} flags={:?} ({:.3} ms)",
                background,
                flags,
                elapsed.as_secs_f64() * 1000.0
            );
            log_rows(&output);
        }

        let timer = ElapsedTimer::start("ramp grayscale");
        let output = compositor
            .composite_grayscale(&mask, background)
            .context("Failed to composite grayscale")?;
        timer.finish();
        info!(
            "background={:?} grayscale={:?}",
            background,
            compositor.config().grayscale_mode
        );
        log_rows(&output);
    }

    let stats = compositor.cache().stats();
    info!(
        "Cache: {} table sets, {} hits, {} misses, {} builds",
        compositor.cache().len(),
        stats.hits,
        stats.misses,
        stats.builds
    );

    Ok(())
}

fn ramp_value(step: u32) -> u8 {
    (step * 255 / (RAMP_STEPS - 1)) as u8
}

/// Logs each row as space-separated `BBGGRR` hex triples.
fn log_rows(bitmap: &OutputBitmap) {
    for row in bitmap.as_bytes().chunks_exact(bitmap.stride()) {
        let line: Vec<String> = row
            .chunks_exact(OutputBitmap::BYTES_PER_PIXEL)
            .map(|px| format!("{:02x}{:02x}{:02x}", px[0], px[1], px[2]))
            .collect();
        info!("  {}", line.join(" "));
    }
}
