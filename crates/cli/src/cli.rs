//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// gait-pair - pair two devices carried by the same walker
#[derive(Parser, Debug)]
#[command(
    name = "gait-pair",
    author,
    version,
    about = "Gait-fingerprint device pairing",
    long_about = "Derives a gait fingerprint from vertical acceleration and pairs with a \n\
                  peer device over TCP when both fingerprints agree."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "GAIT_PAIR_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "GAIT_PAIR_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pair with a peer device over TCP
    Pair(PairArgs),

    /// Derive the local fingerprint offline
    Fingerprint(FingerprintArgs),

    /// Run two parties in-process over an in-memory stream
    Simulate(SimulateArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display the effective configuration and filter design
    Info(InfoArgs),
}

/// Sample source selection shared by `pair` and `fingerprint`
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Recorded `timestamp_ms,value` file (synthetic walker when omitted)
    #[arg(long, env = "GAIT_PAIR_RECORDING")]
    pub recording: Option<PathBuf>,

    /// Seconds the recording slice advances per attempt (defaults to the window length)
    #[arg(long, requires = "recording")]
    pub stride: Option<f64>,

    /// Noise seed of the synthetic walker
    #[arg(long, default_value = "0", env = "GAIT_PAIR_SEED")]
    pub seed: u64,

    /// Step frequency of the synthetic walker (Hz)
    #[arg(long, default_value = "1.9")]
    pub step_hz: f64,
}

/// Arguments for the `pair` command
#[derive(Parser, Debug, Clone)]
pub struct PairArgs {
    /// Path to configuration file (built-in defaults when omitted)
    #[arg(short, long, env = "GAIT_PAIR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Wait for the peer on this address
    #[arg(long, conflicts_with = "connect", required_unless_present = "connect")]
    pub listen: Option<String>,

    /// Connect to a listening peer
    #[arg(long, env = "GAIT_PAIR_PEER")]
    pub connect: Option<String>,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Number of attempts (0 = until secure, failed or errored)
    #[arg(long, default_value = "1", env = "GAIT_PAIR_ATTEMPTS")]
    pub attempts: u64,

    /// Exchange timeout in seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "GAIT_PAIR_TIMEOUT")]
    pub timeout: u64,

    /// Override the similarity threshold from configuration
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "GAIT_PAIR_METRICS_PORT")]
    pub metrics_port: u16,

    /// Print attempt reports as JSON lines
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `fingerprint` command
#[derive(Parser, Debug)]
pub struct FingerprintArgs {
    /// Path to configuration file (built-in defaults when omitted)
    #[arg(short, long, env = "GAIT_PAIR_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Override the collection offset (seconds)
    #[arg(long)]
    pub offset: Option<f64>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `simulate` command
#[derive(Parser, Debug)]
pub struct SimulateArgs {
    /// Path to configuration file (built-in defaults when omitted)
    #[arg(short, long, env = "GAIT_PAIR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Noise seed of the left device
    #[arg(long, default_value = "0")]
    pub left_seed: u64,

    /// Noise seed of the right device
    #[arg(long, default_value = "0")]
    pub right_seed: u64,

    /// Step frequency of the right walker (same walker as the left when omitted)
    #[arg(long)]
    pub right_step_hz: Option<f64>,

    /// Number of attempts (0 = until secure, failed or errored)
    #[arg(long, default_value = "1")]
    pub attempts: u64,

    /// Print attempt reports as JSON lines
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "pairing.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file (built-in defaults when omitted)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show filter second-order sections
    #[arg(long)]
    pub sections: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_pair_requires_peer() {
        assert!(Cli::try_parse_from(["gait-pair", "pair"]).is_err());
        assert!(Cli::try_parse_from([
            "gait-pair", "pair", "--listen", "0.0.0.0:7070", "--connect", "peer:7070"
        ])
        .is_err());

        let cli = Cli::try_parse_from([
            "gait-pair", "pair", "--connect", "127.0.0.1:7070", "--attempts", "0",
        ])
        .unwrap();
        let Commands::Pair(args) = cli.command else {
            panic!("expected pair");
        };
        assert_eq!(args.attempts, 0);
        assert!(args.source.recording.is_none());
    }

    #[test]
    fn test_stride_requires_recording() {
        assert!(Cli::try_parse_from([
            "gait-pair", "fingerprint", "--stride", "5"
        ])
        .is_err());
    }
}
