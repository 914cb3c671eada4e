//! PairingSession - one pairing attempt as a state machine
//!
//! ```text
//! Idle → Collecting → Filtering → Segmenting → Quantizing
//!      → ExchangingReliability → AligningBits → ExchangingFingerprint
//!      → Deciding → Secure | Blocked
//! ```
//!
//! `Failed` is reachable from `Collecting`, `Blocked` from `AligningBits` and
//! `Deciding`, `Errored` from every exchanging or processing state.

use std::time::{Duration, Instant};

use contracts::{
    render_bits, BlockReason, ContractError, Decision, PairingConfig, PairingOutcome,
    PairingState, PeerChannel, SampleSource,
};
use fingerprint::{select_top, similarity};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::pipeline::LocalPipeline;
use crate::tiebreak;

/// Summary of one finished attempt
#[derive(Debug, Clone, Serialize)]
pub struct AttemptReport {
    /// Attempt number (1-based, as assigned by the caller)
    pub attempt: u64,

    /// Final decision
    pub outcome: PairingOutcome,

    /// Every state visited, starting at `Idle`
    pub transitions: Vec<PairingState>,

    /// Samples collected
    pub samples: usize,

    /// Estimated half-gait-cycle period (samples)
    pub half_cycle_period: Option<usize>,

    /// Gait cycles segmented
    pub cycles: usize,

    /// Whether any cycle had to be upsampled
    pub short_cycle_found: bool,

    /// Local fingerprint length before alignment
    pub fingerprint_bits: usize,

    /// Whether the tie-break made this side rank with the peer's reliability
    pub adopted_peer_reliability: bool,

    /// Wall time of the attempt
    pub elapsed: Duration,
}

impl AttemptReport {
    pub fn decision(&self) -> Decision {
        self.outcome.decision
    }

    /// Terminal state of the attempt
    pub fn final_state(&self) -> PairingState {
        self.transitions
            .last()
            .copied()
            .unwrap_or(PairingState::Idle)
    }
}

/// One pairing attempt
///
/// A session is single-use: [`PairingSession::run`] consumes it. Dropping
/// the `run` future abandons the attempt; the next attempt starts from a
/// fresh session at `Idle` with a zeroed filter.
#[derive(Debug)]
pub struct PairingSession {
    config: PairingConfig,
    pipeline: LocalPipeline,
    attempt: u64,
    state: PairingState,
    transitions: Vec<PairingState>,
    started: Instant,
    stage_started: Instant,
    diagnostics: Diagnostics,
}

#[derive(Debug, Default)]
struct Diagnostics {
    samples: usize,
    half_cycle_period: Option<usize>,
    cycles: usize,
    short_cycle_found: bool,
    fingerprint_bits: usize,
    adopted_peer_reliability: bool,
}

impl PairingSession {
    /// # Errors
    /// The filter cannot be designed from `config`.
    pub fn new(config: PairingConfig) -> Result<Self, ContractError> {
        let pipeline = LocalPipeline::new(&config)?;
        let now = Instant::now();
        Ok(Self {
            config,
            pipeline,
            attempt: 1,
            state: PairingState::Idle,
            transitions: vec![PairingState::Idle],
            started: now,
            stage_started: now,
            diagnostics: Diagnostics::default(),
        })
    }

    /// Set the attempt number reported in logs and the report
    pub fn with_attempt(mut self, attempt: u64) -> Self {
        self.attempt = attempt;
        self
    }

    pub fn state(&self) -> PairingState {
        self.state
    }

    pub fn config(&self) -> &PairingConfig {
        &self.config
    }

    /// Run the attempt to a terminal state
    ///
    /// Never returns an error: every failure is folded into the outcome.
    #[instrument(
        name = "pairing_attempt",
        skip_all,
        fields(attempt = self.attempt, source = %source.name(), channel = %channel.name())
    )]
    pub async fn run<S, C>(mut self, source: &mut S, channel: &mut C) -> AttemptReport
    where
        S: SampleSource,
        C: PeerChannel,
    {
        self.started = Instant::now();
        self.stage_started = self.started;

        self.advance(PairingState::Collecting);
        let samples = match source.collect(&self.config.collection).await {
            Ok(samples) if samples.is_empty() => {
                return self.finish(PairingOutcome::failed("sample source delivered no samples"));
            }
            Ok(samples) => samples,
            Err(e) => return self.finish(PairingOutcome::failed(e.to_string())),
        };
        self.diagnostics.samples = samples.len();

        self.advance(PairingState::Filtering);
        let filtered = self.pipeline.filter(&samples);

        self.advance(PairingState::Segmenting);
        let segmentation = self.pipeline.segment(&filtered);
        self.diagnostics.half_cycle_period = segmentation.half_cycle_period;
        self.diagnostics.cycles = segmentation.cycles.len();
        self.diagnostics.short_cycle_found = segmentation.short_cycle_found;
        metrics::histogram!("pairing_gait_cycles").record(segmentation.cycles.len() as f64);
        if segmentation.short_cycle_found {
            metrics::counter!("pairing_short_cycles_total").increment(1);
        }

        self.advance(PairingState::Quantizing);
        let local = match self.pipeline.quantize(&segmentation) {
            Ok(fp) => Some(fp),
            Err(e) => {
                info!(error = %e, "no local fingerprint, sending empty reliability");
                None
            }
        };
        self.diagnostics.fingerprint_bits = local.as_ref().map_or(0, |fp| fp.len());
        let local_reliability = local
            .as_ref()
            .map(|fp| fp.reliability().to_vec())
            .unwrap_or_default();

        self.advance(PairingState::ExchangingReliability);
        let peer_reliability = match channel.exchange_reliability(&local_reliability).await {
            Ok(peer) => peer,
            Err(e) => return self.errored(e),
        };

        self.advance(PairingState::AligningBits);
        let Some(local) = local else {
            return self.finish(PairingOutcome::blocked(
                BlockReason::InsufficientData,
                "local window produced no fingerprint",
            ));
        };
        if peer_reliability.is_empty() {
            return self.finish(PairingOutcome::blocked(
                BlockReason::InsufficientData,
                "peer produced no fingerprint",
            ));
        }

        let adopt = tiebreak::adopts_peer(local.reliability(), &peer_reliability);
        self.diagnostics.adopted_peer_reliability = adopt;
        let peer_len = peer_reliability.len();
        let ranking = if adopt {
            peer_reliability
        } else {
            local.reliability().to_vec()
        };
        let aligned = local.realign(ranking, peer_len);
        let top_bits = self.config.protocol.top_bits;
        metrics::histogram!("pairing_aligned_bits").record(aligned.len() as f64);
        debug!(aligned = aligned.len(), adopt, "fingerprint aligned");

        if aligned.len() < top_bits {
            let err = ContractError::TooFewAlignedBits {
                aligned: aligned.len(),
                required: top_bits,
            };
            return self.finish(
                PairingOutcome::blocked(BlockReason::TooFewAlignedBits, err.to_string())
                    .with_aligned_bits(aligned.len()),
            );
        }
        let aligned_bits = aligned.len();
        let local_top = match select_top(&aligned, top_bits) {
            Ok(bits) => bits,
            Err(e) => {
                return self.finish(
                    PairingOutcome::blocked(BlockReason::TooFewAlignedBits, e.to_string())
                        .with_aligned_bits(aligned_bits),
                )
            }
        };
        debug!(bits = %render_bits(&local_top), "local top bits");

        self.advance(PairingState::ExchangingFingerprint);
        let peer_top = match channel.exchange_fingerprint(&local_top).await {
            Ok(bits) => bits,
            Err(e) => return self.errored(e),
        };
        if peer_top.len() != top_bits {
            return self.errored(ContractError::malformed(
                "fingerprint",
                format!("expected {top_bits} bits, peer sent {}", peer_top.len()),
            ));
        }

        self.advance(PairingState::Deciding);
        let score = match similarity(&local_top, &peer_top) {
            Ok(score) => score,
            Err(e) => return self.errored(e),
        };
        metrics::histogram!("pairing_similarity").record(score);

        let outcome = if score >= self.config.protocol.similarity_threshold {
            PairingOutcome::secure(score, aligned_bits)
        } else {
            PairingOutcome::blocked(
                BlockReason::LowSimilarity,
                format!(
                    "similarity {score:.3} below threshold {:.3}",
                    self.config.protocol.similarity_threshold
                ),
            )
            .with_similarity(score)
            .with_aligned_bits(aligned_bits)
        };
        self.finish(outcome)
    }

    fn advance(&mut self, next: PairingState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        let now = Instant::now();
        metrics::histogram!("pairing_stage_duration_seconds", "stage" => self.state.as_str())
            .record(now.duration_since(self.stage_started).as_secs_f64());
        debug!(from = %self.state, to = %next, "state transition");
        self.stage_started = now;
        self.state = next;
        self.transitions.push(next);
    }

    fn errored(self, err: ContractError) -> AttemptReport {
        warn!(state = %self.state, error = %err, "transport fault");
        self.finish(PairingOutcome::errored(err.to_string()))
    }

    fn finish(mut self, outcome: PairingOutcome) -> AttemptReport {
        self.advance(outcome.terminal_state());
        let elapsed = self.started.elapsed();

        metrics::counter!("pairing_attempts_total", "outcome" => outcome.decision.as_str())
            .increment(1);
        metrics::histogram!("pairing_attempt_duration_seconds").record(elapsed.as_secs_f64());
        info!(
            decision = %outcome.decision,
            similarity = ?outcome.similarity,
            aligned_bits = ?outcome.aligned_bits,
            cycles = self.diagnostics.cycles,
            elapsed_ms = elapsed.as_millis() as u64,
            "pairing attempt finished"
        );

        AttemptReport {
            attempt: self.attempt,
            outcome,
            transitions: self.transitions,
            samples: self.diagnostics.samples,
            half_cycle_period: self.diagnostics.half_cycle_period,
            cycles: self.diagnostics.cycles,
            short_cycle_found: self.diagnostics.short_cycle_found,
            fingerprint_bits: self.diagnostics.fingerprint_bits,
            adopted_peer_reliability: self.diagnostics.adopted_peer_reliability,
            elapsed,
        }
    }
}
