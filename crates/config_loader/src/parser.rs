//! 配置解析模块
//!
//! 支持 TOML (主要) 和 JSON (可选) 格式。

use contracts::{ContractError, PairingConfig};

/// 配置文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML 格式 (推荐)
    Toml,
    /// JSON 格式
    Json,
}

impl ConfigFormat {
    /// 从文件扩展名推断格式
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// 解析 TOML 格式配置
pub fn parse_toml(content: &str) -> Result<PairingConfig, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// 解析 JSON 格式配置
pub fn parse_json(content: &str) -> Result<PairingConfig, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// 根据格式解析配置
pub fn parse(content: &str, format: ConfigFormat) -> Result<PairingConfig, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::FilterKind;

    #[test]
    fn test_parse_toml_partial_section() {
        let content = r#"
[segmentation]
cycles_wanted = 0
half_cycle_shift = 1
"#;
        let config = parse_toml(content).unwrap();
        assert_eq!(config.segmentation.cycles_wanted, 0);
        assert_eq!(config.segmentation.half_cycle_shift, 1);
        assert_eq!(config.segmentation.autocorrelation_radius, 15);
        assert_eq!(config.filter.kind, FilterKind::HighPass);
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "collection": { "sample_rate_hz": 100.0, "duration_s": 9.0 },
            "quantization": { "bits_per_cycle": 2 }
        }"#;
        let config = parse_json(content).unwrap();
        assert_eq!(config.collection.expected_samples(), 900);
        assert_eq!(config.quantization.bits_per_cycle, 2);
    }

    #[test]
    fn test_parse_invalid_toml() {
        let result = parse_toml("[protocol\ntop_bits = ");
        assert!(matches!(result, Err(ContractError::ConfigParse { .. })));
    }

    #[test]
    fn test_unknown_filter_kind() {
        let result = parse_toml("[filter]\nkind = \"notch\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_extension("TOML"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("json"), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
