//! PairingOutcome - protocol output
//!
//! Attempt state machine and the decision handed to the presentation layer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pairing attempt state
///
/// Transitions are strictly sequential; a retry restarts at `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingState {
    Idle,
    Collecting,
    Filtering,
    Segmenting,
    Quantizing,
    ExchangingReliability,
    AligningBits,
    ExchangingFingerprint,
    Deciding,
    Secure,
    Blocked,
    Failed,
    Errored,
}

impl PairingState {
    /// Whether the attempt has reached a decision
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Secure | Self::Blocked | Self::Failed | Self::Errored
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Collecting => "collecting",
            Self::Filtering => "filtering",
            Self::Segmenting => "segmenting",
            Self::Quantizing => "quantizing",
            Self::ExchangingReliability => "exchanging_reliability",
            Self::AligningBits => "aligning_bits",
            Self::ExchangingFingerprint => "exchanging_fingerprint",
            Self::Deciding => "deciding",
            Self::Secure => "secure",
            Self::Blocked => "blocked",
            Self::Failed => "failed",
            Self::Errored => "errored",
        }
    }

    /// Whether `next` is a legal successor of `self`
    pub fn can_advance_to(self, next: PairingState) -> bool {
        use PairingState::*;
        match (self, next) {
            (Idle, Collecting)
            | (Collecting, Filtering)
            | (Filtering, Segmenting)
            | (Segmenting, Quantizing)
            | (Quantizing, ExchangingReliability)
            | (ExchangingReliability, AligningBits)
            | (AligningBits, ExchangingFingerprint)
            | (ExchangingFingerprint, Deciding)
            | (Deciding, Secure) => true,
            (from, Blocked) => matches!(from, AligningBits | Deciding),
            (from, Failed) => matches!(from, Collecting),
            (from, Errored) => !from.is_terminal() && from != Idle,
            _ => false,
        }
    }
}

impl fmt::Display for PairingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final decision of one attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Secure,
    Blocked,
    Failed,
    Errored,
}

impl Decision {
    /// Whether the caller may restart a fresh attempt
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Blocked | Self::Secure | Self::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Secure => "secure",
            Self::Blocked => "blocked",
            Self::Failed => "failed",
            Self::Errored => "errored",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an attempt was blocked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    /// Local or peer pipeline produced no fingerprint
    InsufficientData,
    /// Aligned fingerprint shorter than the exchanged bit count
    TooFewAlignedBits,
    /// Similarity below threshold
    LowSimilarity,
}

/// Outcome of one pairing attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairingOutcome {
    /// Decision
    pub decision: Decision,

    /// Block reason (only for `Blocked`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<BlockReason>,

    /// Fraction of matching exchanged bits
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,

    /// Aligned fingerprint length after the reliability exchange
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aligned_bits: Option<usize>,

    /// Diagnostic message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PairingOutcome {
    pub fn secure(similarity: f64, aligned_bits: usize) -> Self {
        Self {
            decision: Decision::Secure,
            reason: None,
            similarity: Some(similarity),
            aligned_bits: Some(aligned_bits),
            message: None,
        }
    }

    pub fn blocked(reason: BlockReason, message: impl Into<String>) -> Self {
        Self {
            decision: Decision::Blocked,
            reason: Some(reason),
            similarity: None,
            aligned_bits: None,
            message: Some(message.into()),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            decision: Decision::Failed,
            reason: None,
            similarity: None,
            aligned_bits: None,
            message: Some(message.into()),
        }
    }

    pub fn errored(message: impl Into<String>) -> Self {
        Self {
            decision: Decision::Errored,
            reason: None,
            similarity: None,
            aligned_bits: None,
            message: Some(message.into()),
        }
    }

    /// Attach the similarity score
    pub fn with_similarity(mut self, similarity: f64) -> Self {
        self.similarity = Some(similarity);
        self
    }

    /// Attach the aligned bit count
    pub fn with_aligned_bits(mut self, aligned_bits: usize) -> Self {
        self.aligned_bits = Some(aligned_bits);
        self
    }

    /// Terminal state matching the decision
    pub fn terminal_state(&self) -> PairingState {
        match self.decision {
            Decision::Secure => PairingState::Secure,
            Decision::Blocked => PairingState::Blocked,
            Decision::Failed => PairingState::Failed,
            Decision::Errored => PairingState::Errored,
        }
    }
}

impl fmt::Display for PairingOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.decision)?;
        if let Some(similarity) = self.similarity {
            write!(f, " (similarity {:.3})", similarity)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}
