//! `pair` command implementation.

use std::time::Duration;

use anyhow::{Context, Result};
use protocol::{PeerListener, StreamChannel};
use tokio::net::TcpStream;
use tracing::{info, warn};

use crate::cli::PairArgs;
use crate::error::CliError;
use crate::pipeline::{load_config, AnySource, AttemptLoop, StopPolicy};

/// Execute the `pair` command
pub async fn run_pair(args: &PairArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(threshold) = args.threshold {
        info!(threshold, "Overriding similarity threshold from CLI");
        config.protocol.similarity_threshold = threshold;
    }
    config_loader::ConfigLoader::validate(&config).context("Invalid configuration")?;

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    let source = AnySource::from_args(&args.source, &config.collection)?;
    let channel = open_channel(args)
        .await?
        .with_max_values(config.protocol.max_message_values);
    let channel = if args.timeout > 0 {
        channel.with_timeout(Duration::from_secs(args.timeout))
    } else {
        channel
    };

    let attempts = AttemptLoop::new("local", config, StopPolicy::from_count(args.attempts))
        .with_json(args.json);
    let shutdown_signal = setup_shutdown_signal();

    tokio::select! {
        result = attempts.run(source, channel) => {
            let stats = result.context("Pairing failed")?;
            if !args.json {
                stats.print_summary();
            }
            if !stats.paired() {
                anyhow::bail!("Devices were not paired");
            }
        }
        _ = shutdown_signal => {
            warn!("Received shutdown signal, abandoning attempt");
        }
    }

    Ok(())
}

async fn open_channel(args: &PairArgs) -> Result<StreamChannel<TcpStream>, CliError> {
    if let Some(ref addr) = args.listen {
        let listener = PeerListener::bind(addr.as_str())
            .await
            .map_err(|e| CliError::peer_connection(addr, e.to_string()))?;
        info!(addr = %addr, "Waiting for peer");
        let channel = listener
            .accept()
            .await
            .map_err(|e| CliError::peer_connection(addr, e.to_string()))?;
        observability::record_peer_connected("listener");
        return Ok(channel);
    }

    let addr = args.connect.as_deref().unwrap_or_default();
    let channel = StreamChannel::connect(addr)
        .await
        .map_err(|e| CliError::peer_connection(addr, e.to_string()))?;
    observability::record_peer_connected("connector");
    Ok(channel)
}

/// Setup Ctrl+C and SIGTERM signal handlers
///
/// Resolves only on a signal; a handler that cannot be installed never fires.
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
