//! GaitCycleSegmenter

use contracts::{GaitCycle, Segmentation, SegmentationConfig};
use tracing::{debug, warn};

use crate::autocorrelation::{autocorrelation, local_maxima, mean_distance};
use crate::minima::find_minima;
use crate::resample::{resample, upsample_linear};

/// Detects gait cycles in a conditioned signal
#[derive(Debug, Clone, Default)]
pub struct GaitCycleSegmenter {
    config: SegmentationConfig,
}

impl GaitCycleSegmenter {
    pub fn new(config: SegmentationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SegmentationConfig {
        &self.config
    }

    /// Detect cycles using the configured count and length
    pub fn detect_cycles(&self, filtered: &[f64]) -> Segmentation {
        self.detect(
            filtered,
            self.config.cycles_wanted,
            self.config.target_cycle_length,
        )
    }

    /// Detect at most `cycles_wanted` cycles (0 = unbounded), each resampled
    /// to `target_length` samples
    pub fn detect(
        &self,
        filtered: &[f64],
        cycles_wanted: usize,
        target_length: usize,
    ) -> Segmentation {
        if target_length == 0 {
            return Segmentation::default();
        }
        if let Some(pos) = filtered.iter().position(|v| !v.is_finite()) {
            warn!(index = pos, "non-finite sample in conditioned signal, no cycles");
            return Segmentation::default();
        }

        let Some(period) = self.half_cycle_period(filtered) else {
            debug!(samples = filtered.len(), "no periodicity detected");
            return Segmentation::default();
        };

        let boundaries = self.boundaries(filtered, period, cycles_wanted);
        let halves: Vec<&[f64]> = boundaries
            .windows(2)
            .map(|w| &filtered[w[0]..w[1]])
            .collect();

        let mut short_cycle_found = false;
        let mut cycles: Vec<GaitCycle> = halves
            .chunks_exact(2)
            .map(|pair| {
                let mut cycle = Vec::with_capacity(pair[0].len() + pair[1].len());
                cycle.extend_from_slice(pair[0]);
                cycle.extend_from_slice(pair[1]);
                cycle
            })
            .map(|cycle| {
                if cycle.len() < self.config.min_cycle_length {
                    short_cycle_found = true;
                    debug!(len = cycle.len(), "upsampling short cycle");
                    upsample_linear(&cycle, self.config.min_cycle_length)
                } else {
                    cycle
                }
            })
            .map(|cycle| resample(&cycle, target_length))
            .collect();

        if cycles_wanted > 0 {
            cycles.truncate(cycles_wanted);
        }

        debug!(
            half_cycle_period = period,
            boundaries = boundaries.len(),
            half_cycles = halves.len(),
            cycles = cycles.len(),
            short_cycle_found,
            "segmentation complete"
        );

        Segmentation {
            cycles,
            half_cycle_period: Some(period),
            short_cycle_found,
        }
    }

    /// Half-cycle period in samples: the rounded-up mean spacing of the
    /// autocorrelation maxima
    pub fn half_cycle_period(&self, filtered: &[f64]) -> Option<usize> {
        let r = autocorrelation(filtered)?;
        let maxima = local_maxima(&r, self.config.autocorrelation_radius);
        let mean = mean_distance(&maxima)?;
        Some(mean.ceil() as usize)
    }

    /// Retained half-cycle boundaries: first minimum dropped as a boundary
    /// artifact, then `half_cycle_shift` more
    fn boundaries(&self, filtered: &[f64], period: usize, cycles_wanted: usize) -> Vec<usize> {
        let shift = self.config.half_cycle_shift;
        let limit = (cycles_wanted > 0).then(|| {
            cycles_wanted
                .saturating_mul(2)
                .saturating_add(2)
                .saturating_add(shift)
        });
        let minima = find_minima(filtered, period, self.config.minima_radius, limit);
        minima.into_iter().skip(shift.saturating_add(1)).collect()
    }
}
