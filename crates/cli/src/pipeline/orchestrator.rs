//! Attempt loop - runs pairing attempts back to back on one channel.

use std::time::Instant;

use anyhow::{Context, Result};
use contracts::{Decision, PairingConfig, PeerChannel, SampleSource};
use protocol::{AttemptReport, PairingSession};
use tracing::{info, warn};

use super::RunStats;

/// When the loop stops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopPolicy {
    /// Exactly this many attempts, unless one ends `Errored`
    Attempts(u64),
    /// Until an attempt ends `Secure`, `Failed` or `Errored`
    UntilDecided,
}

impl StopPolicy {
    /// `0` means unbounded
    pub fn from_count(attempts: u64) -> Self {
        if attempts == 0 {
            Self::UntilDecided
        } else {
            Self::Attempts(attempts)
        }
    }

    fn should_stop(self, attempt: u64, decision: Decision) -> bool {
        if decision == Decision::Errored {
            return true;
        }
        match self {
            Self::Attempts(limit) => attempt >= limit,
            Self::UntilDecided => matches!(decision, Decision::Secure | Decision::Failed),
        }
    }
}

/// Repeated pairing attempts, each from a fresh session
#[derive(Debug, Clone)]
pub struct AttemptLoop {
    label: String,
    config: PairingConfig,
    policy: StopPolicy,
    json: bool,
}

impl AttemptLoop {
    pub fn new(label: impl Into<String>, config: PairingConfig, policy: StopPolicy) -> Self {
        Self {
            label: label.into(),
            config,
            policy,
            json: false,
        }
    }

    /// Print reports as JSON lines instead of text
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Run attempts until the stop policy triggers
    ///
    /// Takes the channel by value so the peer sees the stream close as soon
    /// as this side stops.
    pub async fn run<S, C>(&self, mut source: S, mut channel: C) -> Result<RunStats>
    where
        S: SampleSource,
        C: PeerChannel,
    {
        let start = Instant::now();
        let mut stats = RunStats::new(self.label.clone());

        for attempt in 1.. {
            let session = PairingSession::new(self.config.clone())
                .context("Failed to build pairing session")?
                .with_attempt(attempt);
            let report = session.run(&mut source, &mut channel).await;
            self.print_report(&report)?;
            stats.record(&report);

            if report.decision() == Decision::Errored {
                warn!(party = %self.label, attempt, outcome = %report.outcome, "Channel fault, stopping");
            }
            if self.policy.should_stop(attempt, report.decision()) {
                break;
            }
        }

        stats.duration = start.elapsed();
        if let Some(decision) = stats.last_decision {
            observability::record_run_finished(decision, stats.attempts);
        }
        info!(
            party = %self.label,
            attempts = stats.attempts,
            paired = stats.paired(),
            duration_secs = stats.duration.as_secs_f64(),
            "Attempt loop finished"
        );
        Ok(stats)
    }

    fn print_report(&self, report: &AttemptReport) -> Result<()> {
        if self.json {
            let line = serde_json::to_string(report).context("Failed to serialize attempt report")?;
            println!("{line}");
        } else {
            println!(
                "[{}] attempt {}: {} ({} cycles, {} bits{})",
                self.label,
                report.attempt,
                report.outcome,
                report.cycles,
                report.fingerprint_bits,
                if report.short_cycle_found {
                    ", short cycle"
                } else {
                    ""
                }
            );
        }
        Ok(())
    }
}
