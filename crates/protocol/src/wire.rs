//! Wire format
//!
//! Both messages are flat big-endian value sequences closed by a sentinel:
//!
//! | message     | value            | sentinel |
//! |-------------|------------------|----------|
//! | reliability | `f64`, finite ≥ 0 | `-1.0`   |
//! | fingerprint | `i32`, 0 or 1    | `-1`     |

use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::ProtocolError;

pub const RELIABILITY_SENTINEL: f64 = -1.0;
pub const FINGERPRINT_SENTINEL: i32 = -1;

pub(crate) const RELIABILITY: &str = "reliability";
pub(crate) const FINGERPRINT: &str = "fingerprint";

/// Encode a reliability vector followed by the sentinel
pub fn encode_reliability(values: &[f64]) -> Result<Bytes, ProtocolError> {
    let mut buf = BytesMut::with_capacity((values.len() + 1) * 8);
    for (i, &v) in values.iter().enumerate() {
        if !(v.is_finite() && v >= 0.0) {
            return Err(ProtocolError::malformed(
                RELIABILITY,
                format!("value {i} is not a finite non-negative number: {v}"),
            ));
        }
        buf.put_f64(v);
    }
    buf.put_f64(RELIABILITY_SENTINEL);
    Ok(buf.freeze())
}

/// Encode fingerprint bits followed by the sentinel
pub fn encode_fingerprint(bits: &[u8]) -> Result<Bytes, ProtocolError> {
    let mut buf = BytesMut::with_capacity((bits.len() + 1) * 4);
    for (i, &b) in bits.iter().enumerate() {
        if b > 1 {
            return Err(ProtocolError::malformed(
                FINGERPRINT,
                format!("bit {i} out of range: {b}"),
            ));
        }
        buf.put_i32(i32::from(b));
    }
    buf.put_i32(FINGERPRINT_SENTINEL);
    Ok(buf.freeze())
}

/// Read values until the reliability sentinel
///
/// More than `max_values` values without a sentinel is malformed.
pub async fn read_reliability<R>(reader: &mut R, max_values: usize) -> Result<Vec<f64>, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let mut values = Vec::new();
    loop {
        let v = reader
            .read_f64()
            .await
            .map_err(|e| ProtocolError::io("recv_reliability", e))?;
        if v == RELIABILITY_SENTINEL {
            return Ok(values);
        }
        if !(v.is_finite() && v >= 0.0) {
            return Err(ProtocolError::malformed(
                RELIABILITY,
                format!("value {} is not a finite non-negative number: {v}", values.len()),
            ));
        }
        if values.len() == max_values {
            return Err(ProtocolError::malformed(
                RELIABILITY,
                format!("no sentinel within {max_values} values"),
            ));
        }
        values.push(v);
    }
}

/// Read bits until the fingerprint sentinel
pub async fn read_fingerprint<R>(reader: &mut R, max_values: usize) -> Result<Vec<u8>, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let mut bits = Vec::new();
    loop {
        let v = reader
            .read_i32()
            .await
            .map_err(|e| ProtocolError::io("recv_fingerprint", e))?;
        let bit = match v {
            FINGERPRINT_SENTINEL => return Ok(bits),
            0 => 0,
            1 => 1,
            other => {
                return Err(ProtocolError::malformed(
                    FINGERPRINT,
                    format!("value {} out of range: {other}", bits.len()),
                ))
            }
        };
        if bits.len() == max_values {
            return Err(ProtocolError::malformed(
                FINGERPRINT,
                format!("no sentinel within {max_values} values"),
            ));
        }
        bits.push(bit);
    }
}
