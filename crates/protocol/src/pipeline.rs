//! Local fingerprint derivation (collection excluded)

use contracts::{ContractError, Fingerprint, PairingConfig, Segmentation};
use conditioning::SignalConditioner;
use fingerprint::Quantizer;
use gait_cycles::GaitCycleSegmenter;
use serde::Serialize;

/// Filter → segment → quantize for one attempt
///
/// Owns a fresh [`SignalConditioner`]; build a new pipeline per attempt.
#[derive(Debug)]
pub struct LocalPipeline {
    conditioner: SignalConditioner,
    segmenter: GaitCycleSegmenter,
    quantizer: Quantizer,
}

/// Everything derived locally from one sample window
#[derive(Debug, Clone, Serialize)]
pub struct Derivation {
    pub samples: usize,
    pub half_cycle_period: Option<usize>,
    pub cycles: usize,
    pub short_cycle_found: bool,
    /// `None` when the window held too little gait structure
    pub fingerprint: Option<Fingerprint>,
}

impl LocalPipeline {
    /// # Errors
    /// Filter design rejects the configuration.
    pub fn new(config: &PairingConfig) -> Result<Self, ContractError> {
        Ok(Self {
            conditioner: SignalConditioner::new(&config.filter, config.collection.sample_rate_hz)?,
            segmenter: GaitCycleSegmenter::new(config.segmentation.clone()),
            quantizer: Quantizer::new(config.quantization.bits_per_cycle),
        })
    }

    pub fn filter(&mut self, samples: &[f64]) -> Vec<f64> {
        self.conditioner.process(samples)
    }

    pub fn segment(&self, filtered: &[f64]) -> Segmentation {
        self.segmenter.detect_cycles(filtered)
    }

    /// Quantize; an empty segmentation yields `InsufficientData`
    pub fn quantize(&self, segmentation: &Segmentation) -> Result<Fingerprint, ContractError> {
        self.quantizer.quantize(&segmentation.cycles)
    }

    /// Run all three stages
    pub fn derive(mut self, samples: &[f64]) -> Derivation {
        let filtered = self.filter(samples);
        let segmentation = self.segment(&filtered);
        let fingerprint = self.quantize(&segmentation).ok();
        Derivation {
            samples: samples.len(),
            half_cycle_period: segmentation.half_cycle_period,
            cycles: segmentation.cycles.len(),
            short_cycle_found: segmentation.short_cycle_found,
            fingerprint,
        }
    }
}
