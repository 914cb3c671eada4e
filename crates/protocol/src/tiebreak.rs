//! Reliability tie-break
//!
//! Both parties compare the big-endian byte serialization of the two
//! reliability vectors lexicographically. The side holding the smaller key
//! adopts the peer's vector, so both end up ranking with the same one.

use bytes::{BufMut, BytesMut};

/// Order key of a reliability vector: its values as big-endian `f64` bytes
pub fn order_key(reliability: &[f64]) -> BytesMut {
    let mut key = BytesMut::with_capacity(reliability.len() * 8);
    for &v in reliability {
        key.put_f64(v);
    }
    key
}

/// Whether the local side must replace its vector with the peer's
pub fn adopts_peer(local: &[f64], peer: &[f64]) -> bool {
    order_key(local)[..] < order_key(peer)[..]
}
