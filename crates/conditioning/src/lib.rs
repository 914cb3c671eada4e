//! # Conditioning
//!
//! Streaming conditioning of the vertical acceleration stream.
//!
//! A Chebyshev type II prototype is transformed into a digital high-pass
//! (gravity and drift removal) or band-pass filter and realized as a cascade
//! of second-order sections in direct form II transposed.
//!
//! Coefficients are immutable once designed; the delay lines live in a
//! [`FilterState`] owned by exactly one [`SignalConditioner`], so every
//! pairing attempt builds its own conditioner.

mod design;
mod filter;

pub use design::{design, Biquad, FilterDesign};
pub use filter::{FilterState, SignalConditioner};
