//! # Gait Cycles
//!
//! Splits a conditioned acceleration signal into fixed-length gait cycles.
//!
//! 1. Autocorrelation maxima estimate the half-cycle period
//! 2. Minima of the signal spaced by that period mark half-cycle boundaries
//! 3. Consecutive half-cycles pair into full cycles
//! 4. Every cycle is resampled in the frequency domain to a common length
//!
//! Segmentation never fails: too little structure yields an empty
//! [`Segmentation`](contracts::Segmentation) which callers treat as
//! insufficient data.

mod autocorrelation;
mod minima;
mod resample;
mod segmenter;

pub use autocorrelation::{autocorrelation, local_maxima, mean_distance};
pub use minima::find_minima;
pub use resample::{resample, upsample_linear};
pub use segmenter::GaitCycleSegmenter;
