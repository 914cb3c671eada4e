//! # Fingerprint
//!
//! Turns gait cycles into fingerprint bits and ranks them by reliability.
//!
//! - [`Quantizer`]: one bit per cycle window, set when the window sum exceeds
//!   the mean cycle's
//! - [`select_top`]: the `k` most reliable bits, reproducible on both devices
//! - [`similarity`]: fraction of matching bits between two ranked selections

mod quantizer;
mod ranker;

pub use quantizer::Quantizer;
pub use ranker::{rank_indices, select_top, similarity};
