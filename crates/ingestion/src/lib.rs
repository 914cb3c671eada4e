//! # Ingestion
//!
//! Sample sources feeding one pairing attempt with vertical acceleration.
//!
//! Responsibilities:
//! - Slice recorded `timestamp_ms,value` files by offset and duration
//! - Generate a synthetic walker for tests and simulation
//! - Receive live samples from an external sensor over tokio mpsc
//!
//! All sources implement [`contracts::SampleSource`] and count delivered and
//! rejected samples in [`IngestionMetrics`].
//!
//! ## Usage Example
//!
//! ```ignore
//! use contracts::{CollectionConfig, SampleSource};
//! use ingestion::{SyntheticWalker, WalkerConfig};
//!
//! let mut walker = SyntheticWalker::new("walker", WalkerConfig::default());
//! let samples = walker.collect(&CollectionConfig::default()).await?;
//! ```

mod config;
mod error;
mod feed;
mod recording;
mod synthetic;

pub use config::{IngestionMetrics, MetricsSnapshot};
pub use error::{IngestionError, Result};
pub use feed::ChannelSource;
pub use recording::{parse_recording, slice_recording, RecordedSample, RecordingSource};
pub use synthetic::{SyntheticWalker, WalkerConfig};
