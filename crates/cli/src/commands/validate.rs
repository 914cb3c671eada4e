//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{FilterKind, PairingConfig};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    filter: FilterKind,
    expected_samples: usize,
    cycles_wanted: usize,
    fingerprint_bits: usize,
    top_bits: usize,
    similarity_threshold: f64,
}

impl ValidationResult {
    fn invalid(config_path: String, error: impl Into<String>) -> Self {
        Self {
            valid: false,
            config_path,
            error: Some(error.into()),
            warnings: None,
            summary: None,
        }
    }

    fn valid(config_path: String, config: &PairingConfig) -> Self {
        let warnings = collect_warnings(config);
        Self {
            valid: true,
            config_path,
            error: None,
            warnings: (!warnings.is_empty()).then_some(warnings),
            summary: Some(ConfigSummary::from(config)),
        }
    }
}

impl From<&PairingConfig> for ConfigSummary {
    fn from(config: &PairingConfig) -> Self {
        Self {
            version: format!("{:?}", config.version),
            filter: config.filter.kind,
            expected_samples: config.collection.expected_samples(),
            cycles_wanted: config.segmentation.cycles_wanted,
            fingerprint_bits: config
                .segmentation
                .cycles_wanted
                .saturating_mul(config.quantization.bits_per_cycle),
            top_bits: config.protocol.top_bits,
            similarity_threshold: config.protocol.similarity_threshold,
        }
    }
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);
    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{json}");
    } else {
        print_validation_result(&result);
    }

    if !result.valid {
        anyhow::bail!("Configuration validation failed");
    }
    Ok(())
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();
    if !args.config.exists() {
        return ValidationResult::invalid(config_path.clone(), format!("File not found: {config_path}"));
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => ValidationResult::valid(config_path, &config),
        Err(e) => ValidationResult::invalid(config_path, e.to_string()),
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &PairingConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.segmentation.cycles_wanted == 0 {
        warnings.push(
            "segmentation.cycles_wanted is 0 - fingerprint length depends on the window".to_string(),
        );
    }

    if config.protocol.similarity_threshold <= 0.5 {
        warnings.push(format!(
            "protocol.similarity_threshold {} does not exceed chance agreement (0.5)",
            config.protocol.similarity_threshold
        ));
    }

    // a window shorter than two wanted cycles at a slow 1 Hz gait rarely yields them
    let seconds_needed = config.segmentation.cycles_wanted as f64 * 2.0;
    if config.collection.duration_s < seconds_needed {
        warnings.push(format!(
            "collection.duration_s {} may be too short for {} gait cycles",
            config.collection.duration_s, config.segmentation.cycles_wanted
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    let Some(ref summary) = result.summary else {
        println!("✗ {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("  {error}");
        }
        return;
    };

    println!("✓ {}", result.config_path);
    println!(
        "  {} / {:?} filter / {} samples per attempt",
        summary.version, summary.filter, summary.expected_samples
    );
    println!(
        "  {} cycles -> {} bits, {} exchanged, threshold {:.2}",
        summary.cycles_wanted, summary.fingerprint_bits, summary.top_bits, summary.similarity_threshold
    );
    for warning in result.warnings.iter().flatten() {
        println!("  ⚠ {warning}");
    }
}
