//! Protocol error types

use contracts::ContractError;
use thiserror::Error;

/// Wire- and transport-level errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Message violates the wire format
    #[error("malformed {kind} message: {message}")]
    Malformed { kind: &'static str, message: String },

    /// Peer closed the stream before the sentinel
    #[error("peer closed the channel during {operation}")]
    Closed { operation: &'static str },

    /// Peer did not answer in time
    #[error("timed out after {millis} ms during {operation}")]
    Timeout { operation: &'static str, millis: u128 },

    /// I/O failure
    #[error("io error during {operation}: {source}")]
    Io {
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl ProtocolError {
    /// Create a malformed message error
    pub fn malformed(kind: &'static str, message: impl Into<String>) -> Self {
        Self::Malformed {
            kind,
            message: message.into(),
        }
    }

    /// Classify an I/O error; EOF means the peer went away
    pub fn io(operation: &'static str, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::UnexpectedEof {
            Self::Closed { operation }
        } else {
            Self::Io { operation, source }
        }
    }
}

impl From<ProtocolError> for ContractError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::Malformed { kind, message } => ContractError::malformed(kind, message),
            ProtocolError::Io { operation, source } => ContractError::channel_io(operation, source),
            ProtocolError::Closed { operation } => {
                ContractError::channel_failure(operation, "peer closed the channel")
            }
            ProtocolError::Timeout { operation, millis } => {
                ContractError::channel_failure(operation, format!("no answer within {millis} ms"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eof_is_closed() {
        let eof = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        assert!(matches!(
            ProtocolError::io("recv_reliability", eof),
            ProtocolError::Closed { .. }
        ));
    }

    #[test]
    fn test_all_errors_are_transport_faults() {
        let errors = [
            ProtocolError::malformed("fingerprint", "bit 2"),
            ProtocolError::Closed { operation: "recv" },
            ProtocolError::Timeout {
                operation: "recv",
                millis: 10,
            },
            ProtocolError::io("send", std::io::Error::other("reset")),
        ];
        for err in errors {
            let contract: ContractError = err.into();
            assert!(contract.is_transport_fault(), "{contract}");
        }
    }
}
