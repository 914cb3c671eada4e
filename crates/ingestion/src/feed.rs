//! 实时样本通道
//!
//! 外部传感器通过 tokio mpsc 推送已旋转的垂直加速度值。

use std::sync::Arc;

use contracts::{CollectionConfig, ContractError, SampleSource};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::IngestionMetrics;
use crate::error::IngestionError;

/// Sample source fed through an mpsc channel
#[derive(Debug)]
pub struct ChannelSource {
    name: String,
    rx: mpsc::Receiver<f64>,
    metrics: Arc<IngestionMetrics>,
}

impl ChannelSource {
    pub fn new(name: impl Into<String>, rx: mpsc::Receiver<f64>) -> Self {
        Self {
            name: name.into(),
            rx,
            metrics: Arc::new(IngestionMetrics::new()),
        }
    }

    /// Create a source together with the sender feeding it
    pub fn channel(name: impl Into<String>, capacity: usize) -> (mpsc::Sender<f64>, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (tx, Self::new(name, rx))
    }

    pub fn metrics(&self) -> Arc<IngestionMetrics> {
        self.metrics.clone()
    }
}

impl SampleSource for ChannelSource {
    fn name(&self) -> &str {
        &self.name
    }

    /// Wait for one window of samples
    ///
    /// Non-finite values are discarded. If the sender goes away mid-window the
    /// samples received so far are returned; with none at all the collection
    /// fails.
    async fn collect(&mut self, config: &CollectionConfig) -> Result<Vec<f64>, ContractError> {
        let wanted = config.expected_samples();
        let mut samples = Vec::with_capacity(wanted);
        let mut rejected = 0usize;

        while samples.len() < wanted {
            match self.rx.recv().await {
                Some(v) if v.is_finite() => samples.push(v),
                Some(_) => rejected += 1,
                None => break,
            }
        }
        self.metrics.record_rejected(&self.name, rejected);

        if samples.is_empty() {
            return Err(IngestionError::ChannelClosed {
                source_name: self.name.clone(),
            }
            .into());
        }
        if samples.len() < wanted {
            warn!(
                source = %self.name,
                received = samples.len(),
                wanted,
                "sample feed closed before the window was full"
            );
        } else {
            debug!(source = %self.name, samples = samples.len(), "sample window received");
        }

        self.metrics.record_collection(&self.name, samples.len());
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short_window() -> CollectionConfig {
        CollectionConfig {
            sample_rate_hz: 10.0,
            duration_s: 1.0,
            offset_s: 0.0,
        }
    }

    #[tokio::test]
    async fn test_collects_one_window() {
        let (tx, mut source) = ChannelSource::channel("feed", 64);
        for i in 0..25 {
            tx.send(i as f64).await.unwrap();
        }
        let first = source.collect(&short_window()).await.unwrap();
        let second = source.collect(&short_window()).await.unwrap();
        assert_eq!(first, (0..10).map(f64::from).collect::<Vec<_>>());
        assert_eq!(second[0], 10.0);
    }

    #[tokio::test]
    async fn test_partial_window_on_close() {
        let (tx, mut source) = ChannelSource::channel("feed", 8);
        tx.send(1.0).await.unwrap();
        tx.send(f64::INFINITY).await.unwrap();
        tx.send(2.0).await.unwrap();
        drop(tx);
        let samples = source.collect(&short_window()).await.unwrap();
        assert_eq!(samples, vec![1.0, 2.0]);
        assert_eq!(source.metrics().snapshot().samples_rejected, 1);
    }

    #[tokio::test]
    async fn test_closed_without_samples_fails() {
        let (tx, mut source) = ChannelSource::channel("feed", 8);
        drop(tx);
        let err = source.collect(&short_window()).await.unwrap_err();
        assert!(matches!(err, ContractError::SampleSource { .. }));
    }
}
