//! Gait cycles and fingerprints - pipeline intermediate data
//!
//! `Fingerprint` keeps bits and reliabilities index-aligned; every reordering
//! or truncation goes through it so the two vectors never drift apart.

use serde::{Deserialize, Serialize};

use crate::ContractError;

/// One full step cycle (two paired half-cycles), resampled to a fixed length
pub type GaitCycle = Vec<f64>;

/// Result of one segmentation run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Segmentation {
    /// Resampled gait cycles (all the same length)
    pub cycles: Vec<GaitCycle>,

    /// Estimated half-gait-cycle period in samples (None if undetectable)
    pub half_cycle_period: Option<usize>,

    /// Whether any cycle had to be upsampled before resampling
    pub short_cycle_found: bool,
}

impl Segmentation {
    /// Whether no cycle could be built
    pub fn is_empty(&self) -> bool {
        self.cycles.is_empty()
    }
}

/// Fingerprint bits with the reliability backing each bit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fingerprint {
    bits: Vec<u8>,
    reliability: Vec<f64>,
}

impl Fingerprint {
    /// Build a fingerprint, enforcing `len(bits) == len(reliability)` and 0/1 bits
    pub fn new(bits: Vec<u8>, reliability: Vec<f64>) -> Result<Self, ContractError> {
        if bits.len() != reliability.len() {
            return Err(ContractError::Other(format!(
                "fingerprint has {} bits but {} reliabilities",
                bits.len(),
                reliability.len()
            )));
        }
        if let Some(bad) = bits.iter().find(|&&b| b > 1) {
            return Err(ContractError::Other(format!(
                "fingerprint bit out of range: {bad}"
            )));
        }
        Ok(Self { bits, reliability })
    }

    /// Fingerprint bits in cycle-major, window-minor order
    pub fn bits(&self) -> &[u8] {
        &self.bits
    }

    /// Reliability per bit
    pub fn reliability(&self) -> &[f64] {
        &self.reliability
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Replace the reliability vector (e.g. with the peer's) and truncate both
    /// vectors to the common prefix of length `min(self, replacement, limit)`.
    pub fn realign(mut self, reliability: Vec<f64>, limit: usize) -> Self {
        let aligned = self.bits.len().min(reliability.len()).min(limit);
        self.reliability = reliability;
        self.bits.truncate(aligned);
        self.reliability.truncate(aligned);
        self
    }

    /// Render bits as a `0`/`1` string
    pub fn bit_string(&self) -> String {
        render_bits(&self.bits)
    }
}

/// Render a bit slice as a `0`/`1` string
pub fn render_bits(bits: &[u8]) -> String {
    bits.iter().map(|b| if *b == 0 { '0' } else { '1' }).collect()
}
