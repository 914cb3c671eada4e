//! 录制数据源
//!
//! 文件每行 `timestamp_ms,value`，按时间偏移与时长切片。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use contracts::{CollectionConfig, ContractError, SampleSource};
use tracing::{debug, warn};

use crate::config::IngestionMetrics;
use crate::error::{IngestionError, Result};

/// One recorded sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordedSample {
    pub timestamp_ms: i64,
    pub value: f64,
}

/// Parse a recording; blank lines and `#` comments are skipped
pub fn parse_recording(source_name: &str, content: &str) -> Result<Vec<RecordedSample>> {
    let mut samples = Vec::new();
    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parse_failed = |message: String| IngestionError::ParseFailed {
            source_name: source_name.to_string(),
            line: idx + 1,
            message,
        };

        let (ts, value) = line
            .split_once(',')
            .ok_or_else(|| parse_failed(format!("expected 'timestamp_ms,value', got '{line}'")))?;
        let timestamp_ms = ts
            .trim()
            .parse::<i64>()
            .map_err(|e| parse_failed(format!("bad timestamp '{ts}': {e}")))?;
        let value = value
            .trim()
            .parse::<f64>()
            .map_err(|e| parse_failed(format!("bad value '{value}': {e}")))?;

        samples.push(RecordedSample {
            timestamp_ms,
            value,
        });
    }
    Ok(samples)
}

/// Cut `[start, start + duration_s)` out of a recording
///
/// `start` is the first sample at or after `first timestamp + offset_s`; the
/// window is measured from that sample.
pub fn slice_recording(samples: &[RecordedSample], offset_s: f64, duration_s: f64) -> Vec<f64> {
    let Some(first) = samples.first() else {
        return Vec::new();
    };
    let offset_ms = (offset_s * 1000.0).round() as i64;
    let duration_ms = (duration_s * 1000.0).round() as i64;

    let Some(begin) = samples
        .iter()
        .position(|s| s.timestamp_ms >= first.timestamp_ms + offset_ms)
    else {
        return Vec::new();
    };
    let begin_ms = samples[begin].timestamp_ms;

    samples[begin..]
        .iter()
        .take_while(|s| s.timestamp_ms < begin_ms + duration_ms)
        .map(|s| s.value)
        .collect()
}

/// Sample source backed by a recorded file
///
/// Each collection re-reads the file; successive attempts move the slice by
/// `stride_s` seconds.
#[derive(Debug)]
pub struct RecordingSource {
    name: String,
    path: PathBuf,
    stride_s: f64,
    attempt: u32,
    metrics: Arc<IngestionMetrics>,
}

impl RecordingSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "recording".to_string());
        Self {
            name,
            path,
            stride_s: 0.0,
            attempt: 0,
            metrics: Arc::new(IngestionMetrics::new()),
        }
    }

    /// Advance the slice by `stride_s` seconds per attempt
    pub fn with_stride(mut self, stride_s: f64) -> Self {
        self.stride_s = stride_s.max(0.0);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<IngestionMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metrics(&self) -> Arc<IngestionMetrics> {
        self.metrics.clone()
    }

    async fn read_slice(&self, config: &CollectionConfig) -> Result<Vec<f64>> {
        let content =
            tokio::fs::read_to_string(&self.path)
                .await
                .map_err(|source| IngestionError::Read {
                    source_name: self.name.clone(),
                    source,
                })?;
        let records = parse_recording(&self.name, &content)?;

        let offset_s = config.offset_s + self.stride_s * f64::from(self.attempt);
        let slice = slice_recording(&records, offset_s, config.duration_s);

        let before = slice.len();
        let samples: Vec<f64> = slice.into_iter().filter(|v| v.is_finite()).collect();
        if samples.len() < before {
            warn!(
                source = %self.name,
                rejected = before - samples.len(),
                "dropping non-finite recorded samples"
            );
            self.metrics.record_rejected(&self.name, before - samples.len());
        }

        if samples.is_empty() {
            return Err(IngestionError::EmptySlice {
                source_name: self.name.clone(),
                offset_s,
            });
        }

        debug!(
            source = %self.name,
            offset_s,
            samples = samples.len(),
            expected = config.expected_samples(),
            "recording slice loaded"
        );
        Ok(samples)
    }
}

impl SampleSource for RecordingSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn collect(&mut self, config: &CollectionConfig) -> std::result::Result<Vec<f64>, ContractError> {
        let result = self.read_slice(config).await;
        self.attempt = self.attempt.saturating_add(1);
        let samples = result?;
        self.metrics.record_collection(&self.name, samples.len());
        Ok(samples)
    }
}
