//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::PairingConfig;
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;
use crate::pipeline::load_config;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo<'a> {
    config: &'a PairingConfig,
    filter: FilterInfo,
}

#[derive(Serialize)]
struct FilterInfo {
    order: usize,
    sample_rate_hz: f64,
    nyquist_hz: f64,
    section_count: usize,
    /// Gain at characteristic frequencies (Hz, dB)
    gain_db: Vec<(f64, f64)>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sections: Vec<SectionInfo>,
}

#[derive(Serialize)]
struct SectionInfo {
    b: [f64; 3],
    a: [f64; 2],
}

/// Frequencies at which the filter response is reported
const PROBE_HZ: [f64; 6] = [0.1, 0.5, 1.0, 2.0, 5.0, 11.5];

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    info!("Designing conditioning filter");

    let sample_rate_hz = config.collection.sample_rate_hz;
    let design = conditioning::design(&config.filter, sample_rate_hz)
        .context("Failed to design conditioning filter")?;
    let nyquist_hz = sample_rate_hz / 2.0;

    let filter = FilterInfo {
        order: design.order(),
        sample_rate_hz,
        nyquist_hz,
        section_count: design.sections().len(),
        gain_db: PROBE_HZ
            .iter()
            .filter(|&&hz| hz < nyquist_hz)
            .map(|&hz| (hz, design.gain_db(hz)))
            .collect(),
        sections: if args.sections {
            design
                .sections()
                .iter()
                .map(|s| SectionInfo { b: s.b, a: s.a })
                .collect()
        } else {
            Vec::new()
        },
    };

    if args.json {
        let info = ConfigInfo {
            config: &config,
            filter,
        };
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&config, &filter);
    }

    Ok(())
}

fn print_config_info(config: &PairingConfig, filter: &FilterInfo) {
    println!("\n=== Pairing Configuration ===\n");
    println!("Collection:");
    println!(
        "  {} Hz x {} s = {} samples (offset {} s)",
        config.collection.sample_rate_hz,
        config.collection.duration_s,
        config.collection.expected_samples(),
        config.collection.offset_s
    );

    println!("\nFilter: {:?}", config.filter.kind);
    println!(
        "  Chebyshev II, order {}, {} dB stopband, {} sections",
        filter.order, config.filter.stopband_db, filter.section_count
    );
    for (hz, db) in &filter.gain_db {
        println!("  {:>6.2} Hz: {:>8.2} dB", hz, db);
    }
    for (i, section) in filter.sections.iter().enumerate() {
        println!(
            "  section {}: b = {:?}, a = [1, {:.6}, {:.6}]",
            i, section.b, section.a[0], section.a[1]
        );
    }

    let seg = &config.segmentation;
    println!("\nSegmentation:");
    println!(
        "  {} cycles of {} samples (radius {} / {}, min length {}, shift {})",
        seg.cycles_wanted,
        seg.target_cycle_length,
        seg.autocorrelation_radius,
        seg.minima_radius,
        seg.min_cycle_length,
        seg.half_cycle_shift
    );

    println!("\nProtocol:");
    println!(
        "  {} bits per cycle, {} exchanged, threshold {:.2}",
        config.quantization.bits_per_cycle,
        config.protocol.top_bits,
        config.protocol.similarity_threshold
    );
    println!();
}
