//! Streaming SOS filter.

use contracts::{ContractError, FilterConfig};

use crate::design::{design, FilterDesign};

/// Delay lines of a biquad cascade (two per section)
///
/// Owned by a single conditioner; never shared between attempts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    delay: Vec<[f64; 2]>,
}

impl FilterState {
    /// All-zero state for `sections` biquads
    pub fn zeroed(sections: usize) -> Self {
        Self {
            delay: vec![[0.0; 2]; sections],
        }
    }

    /// Whether every delay element is exactly zero
    pub fn is_zero(&self) -> bool {
        self.delay.iter().flatten().all(|v| *v == 0.0)
    }

    pub fn reset(&mut self) {
        self.delay.iter_mut().for_each(|d| *d = [0.0; 2]);
    }
}

impl FilterDesign {
    /// Advance `state` by one sample (direct form II transposed per section)
    ///
    /// Non-finite input propagates to the output and poisons the state until
    /// it is reset.
    pub fn step(&self, state: &mut FilterState, sample: f64) -> f64 {
        let mut x = sample;
        for (section, d) in self.sections().iter().zip(state.delay.iter_mut()) {
            let y = section.b[0] * x + d[0];
            d[0] = section.b[1] * x - section.a[0] * y + d[1];
            d[1] = section.b[2] * x - section.a[1] * y;
            x = y;
        }
        x
    }

    /// Fresh state sized for this design
    pub fn initial_state(&self) -> FilterState {
        FilterState::zeroed(self.sections().len())
    }
}

/// Causal IIR conditioner for one pairing attempt
#[derive(Debug, Clone)]
pub struct SignalConditioner {
    design: FilterDesign,
    state: FilterState,
    processed: u64,
}

impl SignalConditioner {
    /// Design the configured filter and start from an all-zero state
    pub fn new(config: &FilterConfig, sample_rate_hz: f64) -> Result<Self, ContractError> {
        Ok(Self::from_design(design(config, sample_rate_hz)?))
    }

    pub fn from_design(design: FilterDesign) -> Self {
        let state = design.initial_state();
        Self {
            design,
            state,
            processed: 0,
        }
    }

    /// Filter one sample
    pub fn filter(&mut self, sample: f64) -> f64 {
        self.processed += 1;
        self.design.step(&mut self.state, sample)
    }

    /// Filter a block of samples in order; equivalent to repeated [`filter`](Self::filter)
    pub fn process(&mut self, samples: &[f64]) -> Vec<f64> {
        samples.iter().map(|&x| self.filter(x)).collect()
    }

    /// Zero the delay lines, keeping the coefficients
    pub fn reset(&mut self) {
        self.state.reset();
        self.processed = 0;
    }

    /// Number of leading outputs affected by the start-up transient
    pub fn warm_up_len(&self) -> usize {
        self.design.order()
    }

    /// Samples filtered since construction or the last reset
    pub fn processed(&self) -> u64 {
        self.processed
    }

    pub fn design(&self) -> &FilterDesign {
        &self.design
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }
}
