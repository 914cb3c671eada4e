//! `fingerprint` command implementation.

use anyhow::{Context, Result};
use contracts::SampleSource;
use protocol::{Derivation, LocalPipeline};
use serde::Serialize;
use tracing::info;

use crate::cli::FingerprintArgs;
use crate::pipeline::{load_config, AnySource};

/// Fingerprint output for JSON
#[derive(Serialize)]
struct FingerprintOutput<'a> {
    source: &'a str,
    offset_s: f64,
    #[serde(flatten)]
    derivation: &'a Derivation,
    #[serde(skip_serializing_if = "Option::is_none")]
    bit_string: Option<String>,
}

/// Execute the `fingerprint` command
pub async fn run_fingerprint(args: &FingerprintArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(offset) = args.offset {
        config.collection.offset_s = offset;
    }
    config_loader::ConfigLoader::validate(&config).context("Invalid configuration")?;

    let mut source = AnySource::from_args(&args.source, &config.collection)?;
    let samples = source
        .collect(&config.collection)
        .await
        .context("Failed to collect samples")?;

    let pipeline = LocalPipeline::new(&config).context("Failed to build pipeline")?;
    let derivation = pipeline.derive(&samples);
    let bits = derivation.fingerprint.as_ref().map_or(0, |fp| fp.len());
    observability::record_fingerprint_derived(bits);
    info!(
        samples = derivation.samples,
        cycles = derivation.cycles,
        bits,
        "Fingerprint derived"
    );

    let output = FingerprintOutput {
        source: source.name(),
        offset_s: config.collection.offset_s,
        derivation: &derivation,
        bit_string: derivation.fingerprint.as_ref().map(|fp| fp.bit_string()),
    };

    if args.json {
        let json = serde_json::to_string_pretty(&output)
            .context("Failed to serialize fingerprint")?;
        println!("{json}");
    } else {
        print_fingerprint(&output);
    }
    Ok(())
}

fn print_fingerprint(output: &FingerprintOutput<'_>) {
    let derivation = output.derivation;
    println!("\n=== Fingerprint ===\n");
    println!("Source: {} (offset {:.1}s)", output.source, output.offset_s);
    println!("Samples: {}", derivation.samples);
    match derivation.half_cycle_period {
        Some(period) => println!("Half-cycle period: {} samples", period),
        None => println!("Half-cycle period: not detected"),
    }
    println!("Gait cycles: {}", derivation.cycles);
    if derivation.short_cycle_found {
        println!("  (at least one short cycle was upsampled)");
    }
    match (&derivation.fingerprint, &output.bit_string) {
        (Some(fp), Some(bits)) => {
            println!("Bits ({}): {}", fp.len(), bits);
            let mean = fp.reliability().iter().sum::<f64>() / fp.len() as f64;
            println!("Mean reliability: {:.4}", mean);
        }
        _ => println!("No fingerprint: insufficient gait data"),
    }
    println!();
}
