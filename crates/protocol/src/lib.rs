//! # Protocol
//!
//! Two-party pairing over an ordered byte stream.
//!
//! One attempt ([`PairingSession`]) collects a window of vertical
//! acceleration, derives a local fingerprint ([`LocalPipeline`]) and runs two
//! symmetric exchanges with the peer:
//!
//! 1. reliability vectors; the tie-break in [`tiebreak`] decides whose vector
//!    both sides rank with
//! 2. the `top_bits` most reliable fingerprint bits
//!
//! The attempt ends `Secure` when the fraction of matching bits reaches the
//! configured threshold.
//!
//! ## Usage Example
//!
//! ```ignore
//! use protocol::{PairingSession, PeerListener};
//!
//! let listener = PeerListener::bind("0.0.0.0:7070").await?;
//! let mut channel = listener.accept().await?;
//! let report = PairingSession::new(config)?.run(&mut source, &mut channel).await;
//! println!("{}", report.outcome);
//! ```

mod channel;
mod error;
mod pipeline;
mod session;
pub mod tiebreak;
pub mod wire;

pub use channel::{PeerListener, StreamChannel, DEFAULT_MAX_VALUES};
pub use error::ProtocolError;
pub use pipeline::{Derivation, LocalPipeline};
pub use session::{AttemptReport, PairingSession};
