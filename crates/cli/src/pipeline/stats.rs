//! Run statistics across attempts.

use std::time::Duration;

use contracts::Decision;
use observability::PairingMetricsAggregator;
use protocol::AttemptReport;

/// Statistics from one attempt loop
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Party label (`local`, `left`, `right`, ...)
    pub label: String,

    /// Attempts executed
    pub attempts: u64,

    /// Decision of the last attempt
    pub last_decision: Option<Decision>,

    /// Total wall time
    pub duration: Duration,

    /// Per-attempt aggregates
    pub metrics: PairingMetricsAggregator,
}

impl RunStats {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn record(&mut self, report: &AttemptReport) {
        self.attempts += 1;
        self.last_decision = Some(report.decision());
        self.metrics.update(
            &report.outcome,
            report.cycles,
            report.short_cycle_found,
            report.elapsed,
        );
    }

    /// Whether the run ended with a secure pairing
    pub fn paired(&self) -> bool {
        self.last_decision == Some(Decision::Secure)
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== {} ===", self.label);
        println!("Duration: {:.2}s", self.duration.as_secs_f64());
        match self.last_decision {
            Some(decision) => println!("Final decision: {decision}"),
            None => println!("Final decision: none"),
        }
        print!("{}", self.metrics.summary());
    }
}
