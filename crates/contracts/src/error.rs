//! Layered error definitions
//!
//! Categorized by source: config / pipeline / channel / source

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Pipeline Errors =====
    /// Too few half-cycles / minima / cycles to derive a fingerprint
    #[error("insufficient data in {stage}: {message}")]
    InsufficientData { stage: String, message: String },

    /// Aligned fingerprint shorter than the number of bits exchanged
    #[error("insufficient aligned bits: {aligned} < {required}")]
    TooFewAlignedBits { aligned: usize, required: usize },

    // ===== Channel Errors =====
    /// I/O failure or premature close during exchange
    #[error("channel failure during {operation}: {message}")]
    ChannelFailure {
        operation: String,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Peer message violates the wire format
    #[error("malformed {kind} message: {message}")]
    MalformedMessage { kind: String, message: String },

    // ===== Source Errors =====
    /// Sample source could not deliver samples
    #[error("sample source '{source_name}' error: {message}")]
    SampleSource {
        source_name: String,
        message: String,
    },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create insufficient data error
    pub fn insufficient_data(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InsufficientData {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Create channel failure from an I/O error
    pub fn channel_io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::ChannelFailure {
            operation: operation.into(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Create channel failure without an underlying I/O error
    pub fn channel_failure(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ChannelFailure {
            operation: operation.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create malformed message error
    pub fn malformed(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedMessage {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Create sample source error
    pub fn sample_source(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SampleSource {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Transport-level faults end an attempt as `Errored`; everything else
    /// degrades to a `Blocked` or `Failed` decision.
    pub fn is_transport_fault(&self) -> bool {
        matches!(
            self,
            Self::ChannelFailure { .. } | Self::MalformedMessage { .. }
        )
    }
}
