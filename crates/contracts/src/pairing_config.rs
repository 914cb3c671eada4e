//! Pairing configuration contracts that can be shared across crates.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete configuration of one pairing device
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct PairingConfig {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Sample collection window
    #[serde(default)]
    #[validate(nested)]
    pub collection: CollectionConfig,

    /// Signal conditioning filter
    #[serde(default)]
    #[validate(nested)]
    pub filter: FilterConfig,

    /// Gait cycle segmentation
    #[serde(default)]
    #[validate(nested)]
    pub segmentation: SegmentationConfig,

    /// Fingerprint quantization
    #[serde(default)]
    #[validate(nested)]
    pub quantization: QuantizationConfig,

    /// Exchange protocol
    #[serde(default)]
    #[validate(nested)]
    pub protocol: ProtocolConfig,
}

/// Sample collection configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CollectionConfig {
    /// Nominal sample rate of the vertical acceleration stream (Hz)
    #[validate(range(exclusive_min = 0.0))]
    pub sample_rate_hz: f64,

    /// Seconds of samples per attempt
    #[validate(range(exclusive_min = 0.0))]
    pub duration_s: f64,

    /// Offset into a recording before the slice starts (seconds)
    #[validate(range(min = 0.0))]
    pub offset_s: f64,
}

impl CollectionConfig {
    /// Number of samples one attempt expects at the nominal rate
    pub fn expected_samples(&self) -> usize {
        (self.sample_rate_hz * self.duration_s).round() as usize
    }
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 50.0,
            duration_s: 18.0,
            offset_s: 0.0,
        }
    }
}

/// Response type of the conditioning filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    /// Remove gravity and slow drift
    #[default]
    HighPass,
    /// Additionally suppress high-frequency jitter above `band_high_hz`
    BandPass,
}

/// Chebyshev type II filter configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct FilterConfig {
    /// Response type
    #[serde(default)]
    pub kind: FilterKind,

    /// Prototype order (number of analog poles)
    #[validate(range(min = 1, max = 16))]
    pub order: usize,

    /// Stopband attenuation (dB)
    #[validate(range(exclusive_min = 0.0))]
    pub stopband_db: f64,

    /// Cutoff (stopband edge) for high-pass, lower band edge for band-pass (Hz)
    #[validate(range(exclusive_min = 0.0))]
    pub cutoff_hz: f64,

    /// Upper band edge for band-pass (Hz)
    #[validate(range(exclusive_min = 0.0))]
    pub band_high_hz: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            kind: FilterKind::HighPass,
            order: 5,
            stopband_db: 10.0,
            cutoff_hz: 0.5,
            band_high_hz: 11.5,
        }
    }
}

/// Gait cycle segmentation configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Neighbourhood radius for autocorrelation maxima
    #[validate(range(min = 1))]
    pub autocorrelation_radius: usize,

    /// Search radius around the expected position of the next minimum
    pub minima_radius: usize,

    /// Number of gait cycles wanted (0 = as many as the signal holds)
    pub cycles_wanted: usize,

    /// Resampled length of every gait cycle
    #[validate(range(min = 1))]
    pub target_cycle_length: usize,

    /// Cycles shorter than this are linearly upsampled before resampling
    #[validate(range(min = 2))]
    pub min_cycle_length: usize,

    /// Leading half-cycles dropped after the boundary artifact
    pub half_cycle_shift: usize,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            autocorrelation_radius: 15,
            minima_radius: 10,
            cycles_wanted: 12,
            target_cycle_length: 40,
            min_cycle_length: 40,
            half_cycle_shift: 0,
        }
    }
}

/// Quantization configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct QuantizationConfig {
    /// Fingerprint bits derived from each gait cycle
    #[validate(range(min = 1))]
    pub bits_per_cycle: usize,
}

impl Default for QuantizationConfig {
    fn default() -> Self {
        Self { bits_per_cycle: 4 }
    }
}

/// Exchange protocol configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Ranked fingerprint bits exchanged with the peer
    #[validate(range(min = 1))]
    pub top_bits: usize,

    /// Minimum similarity for a secure decision
    #[validate(range(min = 0.0, max = 1.0))]
    pub similarity_threshold: f64,

    /// Upper bound on values read before a sentinel must appear
    #[validate(range(min = 1))]
    pub max_message_values: usize,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            top_bits: 32,
            similarity_threshold: 0.70,
            max_message_values: 4096,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = PairingConfig::default();
        assert_eq!(config.collection.expected_samples(), 900);
        assert_eq!(config.filter.order, 5);
        assert_eq!(config.segmentation.cycles_wanted, 12);
        assert_eq!(config.quantization.bits_per_cycle, 4);
        assert_eq!(config.protocol.top_bits, 32);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_range_validation() {
        let mut config = PairingConfig::default();
        config.protocol.similarity_threshold = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_filter_kind_serde() {
        let json = serde_json::to_string(&FilterKind::BandPass).unwrap();
        assert_eq!(json, "\"band_pass\"");
    }
}
