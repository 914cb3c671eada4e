//! SampleSource trait - sensor collaborator abstraction
//!
//! Delivers rotated, earth-relative vertical acceleration for one attempt.
//! Recorded, synthetic and live sources share this interface.

use crate::{CollectionConfig, ContractError};

/// Vertical acceleration source
///
/// # Example
///
/// ```ignore
/// let mut source = ingestion::SyntheticWalker::new("left", WalkerConfig::default());
/// let samples = source.collect(&config.collection).await?;
/// ```
#[trait_variant::make(SampleSource: Send)]
pub trait LocalSampleSource {
    /// Source name (used for logging)
    fn name(&self) -> &str;

    /// Collect one attempt's worth of samples
    ///
    /// Returns samples in arrival order. May return fewer samples than
    /// `config.expected_samples()` if the source runs dry.
    async fn collect(&mut self, config: &CollectionConfig) -> Result<Vec<f64>, ContractError>;
}
