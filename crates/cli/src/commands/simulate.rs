//! `simulate` command implementation.

use anyhow::{Context, Result};
use protocol::StreamChannel;
use tracing::info;

use crate::cli::SimulateArgs;
use crate::pipeline::{load_config, AnySource, AttemptLoop, StopPolicy};

/// In-memory stream capacity per direction
const DUPLEX_CAPACITY: usize = 64 * 1024;

/// Execute the `simulate` command
pub async fn run_simulate(args: &SimulateArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    config_loader::ConfigLoader::validate(&config).context("Invalid configuration")?;

    let step_hz = ingestion::WalkerConfig::default().step_hz;
    let right_step_hz = args.right_step_hz.unwrap_or(step_hz);
    info!(
        left_seed = args.left_seed,
        right_seed = args.right_seed,
        step_hz,
        right_step_hz,
        "Simulating two devices"
    );

    let (left_stream, right_stream) = tokio::io::duplex(DUPLEX_CAPACITY);
    let left_channel = StreamChannel::new("left", left_stream)
        .with_max_values(config.protocol.max_message_values);
    let right_channel = StreamChannel::new("right", right_stream)
        .with_max_values(config.protocol.max_message_values);

    let policy = StopPolicy::from_count(args.attempts);
    let left = AttemptLoop::new("left", config.clone(), policy).with_json(args.json);
    let right = AttemptLoop::new("right", config, policy).with_json(args.json);

    let (left_stats, right_stats) = tokio::join!(
        left.run(AnySource::synthetic("left", args.left_seed, step_hz), left_channel),
        right.run(
            AnySource::synthetic("right", args.right_seed, right_step_hz),
            right_channel
        )
    );
    let left_stats = left_stats?;
    let right_stats = right_stats?;

    if !args.json {
        left_stats.print_summary();
        right_stats.print_summary();
    }
    println!(
        "\nPaired: {}",
        if left_stats.paired() && right_stats.paired() {
            "yes"
        } else {
            "no"
        }
    );
    Ok(())
}
