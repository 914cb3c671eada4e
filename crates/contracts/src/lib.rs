//! # Contracts
//!
//! Frozen interface contracts, defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Sample Model
//! - One scalar stream of vertical acceleration (m/s²) per device
//! - Samples are implicitly time-ordered at `collection.sample_rate_hz`

mod error;
mod gait;
mod outcome;
mod pairing_config;
mod peer_channel;
mod sample_source;

pub use error::*;
pub use gait::*;
pub use outcome::*;
pub use pairing_config::*;
pub use peer_channel::{LocalPeerChannel, PeerChannel};
pub use sample_source::{LocalSampleSource, SampleSource};
