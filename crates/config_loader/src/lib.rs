//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate field ranges and cross-field constraints
//! - Produce a `PairingConfig`
//!
//! Every section is optional; missing sections fall back to the reference
//! device defaults (50 Hz, 18 s, order-5 high-pass, 12 cycles, 4 bits/cycle,
//! 32 exchanged bits, threshold 0.70).
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("pairing.toml")).unwrap();
//! println!("top bits: {}", config.protocol.top_bits);
//! ```

mod parser;
mod validator;

pub use contracts::PairingConfig;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<PairingConfig, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<PairingConfig, ContractError> {
        Self::parse_and_validate(content, format)
    }

    /// Validate an in-memory configuration (e.g. after CLI overrides)
    pub fn validate(config: &PairingConfig) -> Result<(), ContractError> {
        validator::validate(config)
    }

    /// Serialize PairingConfig to TOML string
    pub fn to_toml(config: &PairingConfig) -> Result<String, ContractError> {
        toml::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize PairingConfig to JSON string
    pub fn to_json(config: &PairingConfig) -> Result<String, ContractError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parse and validate configuration content
    fn parse_and_validate(
        content: &str,
        format: ConfigFormat,
    ) -> Result<PairingConfig, ContractError> {
        let config = parser::parse(content, format)?;
        validator::validate(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::FilterKind;
    use std::io::Write;

    const BAND_PASS_TOML: &str = r#"
[collection]
sample_rate_hz = 50.0
duration_s = 18.0
offset_s = 2.0

[filter]
kind = "band_pass"
order = 5
stopband_db = 10.0
cutoff_hz = 0.5
band_high_hz = 11.5

[protocol]
top_bits = 24
similarity_threshold = 0.75
max_message_values = 4096
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(BAND_PASS_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.filter.kind, FilterKind::BandPass);
        assert_eq!(config.collection.offset_s, 2.0);
        assert_eq!(config.protocol.top_bits, 24);
        // untouched sections keep defaults
        assert_eq!(config.segmentation.cycles_wanted, 12);
        assert_eq!(config.quantization.bits_per_cycle, 4);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = ConfigLoader::load_from_str("", ConfigFormat::Toml).unwrap();
        assert_eq!(config.collection.expected_samples(), 900);
        assert_eq!(config.protocol.similarity_threshold, 0.70);
    }

    #[test]
    fn test_round_trip_toml() {
        let config = ConfigLoader::load_from_str(BAND_PASS_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&config).unwrap();
        let config2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(config.filter.kind, config2.filter.kind);
        assert_eq!(config.protocol.top_bits, config2.protocol.top_bits);
    }

    #[test]
    fn test_round_trip_json() {
        let config = ConfigLoader::load_from_str(BAND_PASS_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&config).unwrap();
        let config2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(config.collection.offset_s, config2.collection.offset_s);
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(BAND_PASS_TOML.as_bytes()).unwrap();
        let config = ConfigLoader::load_from_path(file.path()).unwrap();
        assert_eq!(config.protocol.similarity_threshold, 0.75);
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        let err = ConfigLoader::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let content = r#"
[filter]
order = 5
stopband_db = 10.0
cutoff_hz = 30.0
band_high_hz = 11.5
"#;
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Nyquist"));
    }
}
