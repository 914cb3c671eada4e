//! Quantizer

use contracts::{ContractError, Fingerprint, GaitCycle};

/// Derives fingerprint bits from gait cycles
#[derive(Debug, Clone, Copy)]
pub struct Quantizer {
    bits_per_cycle: usize,
}

impl Default for Quantizer {
    fn default() -> Self {
        Self { bits_per_cycle: 4 }
    }
}

impl Quantizer {
    pub fn new(bits_per_cycle: usize) -> Self {
        Self { bits_per_cycle }
    }

    pub fn bits_per_cycle(&self) -> usize {
        self.bits_per_cycle
    }

    /// Quantize `cycles` against their elementwise mean
    ///
    /// Each cycle of length `L` is cut into `bits_per_cycle` windows of
    /// `L / bits_per_cycle` samples; remainder samples are ignored. For every
    /// window the signed difference `Σ (cycle − reference)` gives the bit
    /// (`> 0` → 1, otherwise 0, so an exact tie is 0) and its magnitude the
    /// reliability. Output is cycle-major, window-minor.
    ///
    /// # Errors
    /// - `InsufficientData` for no cycles or windows shorter than one sample
    /// - `Other` when cycles differ in length
    pub fn quantize(&self, cycles: &[GaitCycle]) -> Result<Fingerprint, ContractError> {
        let Some(first) = cycles.first() else {
            return Err(ContractError::insufficient_data(
                "quantizer",
                "no gait cycles to quantize",
            ));
        };
        if self.bits_per_cycle == 0 {
            return Err(ContractError::config_validation(
                "quantization.bits_per_cycle",
                "bits_per_cycle must be > 0",
            ));
        }

        let len = first.len();
        if let Some(bad) = cycles.iter().find(|c| c.len() != len) {
            return Err(ContractError::Other(format!(
                "gait cycles differ in length: {} vs {}",
                len,
                bad.len()
            )));
        }

        let window = len / self.bits_per_cycle;
        if window == 0 {
            return Err(ContractError::insufficient_data(
                "quantizer",
                format!(
                    "cycle length {len} too short for {} bits per cycle",
                    self.bits_per_cycle
                ),
            ));
        }

        let reference = mean_cycle(cycles, len);
        let total = cycles.len() * self.bits_per_cycle;
        let mut bits = Vec::with_capacity(total);
        let mut reliability = Vec::with_capacity(total);

        for cycle in cycles {
            for w in 0..self.bits_per_cycle {
                let range = w * window..(w + 1) * window;
                let diff: f64 = cycle[range.clone()]
                    .iter()
                    .zip(&reference[range])
                    .map(|(c, r)| c - r)
                    .sum();
                bits.push(u8::from(diff > 0.0));
                reliability.push(diff.abs());
            }
        }

        tracing::debug!(
            cycles = cycles.len(),
            bits = bits.len(),
            dropped_per_cycle = len - window * self.bits_per_cycle,
            "fingerprint quantized"
        );

        Fingerprint::new(bits, reliability)
    }
}

/// Elementwise mean of equal-length cycles
fn mean_cycle(cycles: &[GaitCycle], len: usize) -> Vec<f64> {
    let mut mean = vec![0.0; len];
    for cycle in cycles {
        for (m, v) in mean.iter_mut().zip(cycle) {
            *m += v;
        }
    }
    let count = cycles.len() as f64;
    mean.iter_mut().for_each(|m| *m /= count);
    mean
}
