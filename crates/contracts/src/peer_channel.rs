//! PeerChannel trait - exchange interface to the other device
//!
//! Defines the abstract interface of the channel collaborator.

use crate::ContractError;

/// Two-party rendezvous channel
///
/// Every exchange delivers the local message and returns the peer's. Both
/// devices must call the exchanges in the same order (reliability first,
/// then fingerprint) or both block on read.
#[trait_variant::make(PeerChannel: Send)]
pub trait LocalPeerChannel {
    /// Channel name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Send the local reliability vector and receive the peer's
    ///
    /// # Errors
    /// `ChannelFailure` on I/O errors, `MalformedMessage` on format violations
    async fn exchange_reliability(&mut self, local: &[f64]) -> Result<Vec<f64>, ContractError>;

    /// Send the locally ranked fingerprint bits and receive the peer's
    ///
    /// # Errors
    /// `ChannelFailure` on I/O errors, `MalformedMessage` on format violations
    async fn exchange_fingerprint(&mut self, local: &[u8]) -> Result<Vec<u8>, ContractError>;
}
