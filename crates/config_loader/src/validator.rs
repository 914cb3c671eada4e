//! 配置校验模块
//!
//! 校验规则：
//! - 字段范围 (derive `Validate`)
//! - 截止频率低于 Nyquist 频率
//! - 带通滤波器上下边界有序
//! - 采集窗口至少覆盖一个目标周期
//! - 搜索半径小于采集窗口
//! - 交换位数不超过指纹可能的长度
//! - 可靠度消息不超过 `max_message_values`

use std::borrow::Cow;
use std::collections::HashMap;

use contracts::{ContractError, FilterKind, PairingConfig};
use validator::{Validate, ValidationErrorsKind};

/// 校验 PairingConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &PairingConfig) -> Result<(), ContractError> {
    validate_ranges(config)?;
    validate_filter(config)?;
    validate_segmentation(config)?;
    validate_protocol(config)?;
    Ok(())
}

/// 字段范围校验，按字段路径排序后报告第一个
fn validate_ranges(config: &PairingConfig) -> Result<(), ContractError> {
    let Err(errors) = config.validate() else {
        return Ok(());
    };
    let mut flat = Vec::new();
    flatten("", errors.errors(), &mut flat);
    flat.sort();
    match flat.into_iter().next() {
        Some((field, message)) => Err(ContractError::config_validation(field, message)),
        None => Ok(()),
    }
}

fn flatten(
    prefix: &str,
    errors: &HashMap<Cow<'static, str>, ValidationErrorsKind>,
    out: &mut Vec<(String, String)>,
) {
    for (name, kind) in errors {
        let path = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}.{name}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                for err in list {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("failed '{}' check", err.code));
                    out.push((path.clone(), message));
                }
            }
            ValidationErrorsKind::Struct(inner) => flatten(&path, inner.errors(), out),
            ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    flatten(&format!("{path}[{idx}]"), inner.errors(), out);
                }
            }
        }
    }
}

/// 校验滤波器频率
fn validate_filter(config: &PairingConfig) -> Result<(), ContractError> {
    let nyquist = config.collection.sample_rate_hz / 2.0;
    let filter = &config.filter;

    if filter.cutoff_hz >= nyquist {
        return Err(ContractError::config_validation(
            "filter.cutoff_hz",
            format!(
                "cutoff {} Hz must be below the Nyquist frequency {} Hz",
                filter.cutoff_hz, nyquist
            ),
        ));
    }

    if filter.kind == FilterKind::BandPass {
        if filter.band_high_hz <= filter.cutoff_hz {
            return Err(ContractError::config_validation(
                "filter.band_high_hz",
                format!(
                    "upper band edge ({}) must be above cutoff_hz ({})",
                    filter.band_high_hz, filter.cutoff_hz
                ),
            ));
        }
        if filter.band_high_hz >= nyquist {
            return Err(ContractError::config_validation(
                "filter.band_high_hz",
                format!(
                    "upper band edge {} Hz must be below the Nyquist frequency {} Hz",
                    filter.band_high_hz, nyquist
                ),
            ));
        }
    }

    Ok(())
}

/// 校验分段参数
fn validate_segmentation(config: &PairingConfig) -> Result<(), ContractError> {
    let seg = &config.segmentation;
    let samples = config.collection.expected_samples();

    if samples < seg.target_cycle_length {
        return Err(ContractError::config_validation(
            "collection.duration_s",
            format!(
                "window holds {} samples, fewer than one target cycle ({})",
                samples, seg.target_cycle_length
            ),
        ));
    }

    for (field, radius) in [
        ("segmentation.autocorrelation_radius", seg.autocorrelation_radius),
        ("segmentation.minima_radius", seg.minima_radius),
    ] {
        if radius >= samples {
            return Err(ContractError::config_validation(
                field,
                format!("radius {} must be below the window length ({} samples)", radius, samples),
            ));
        }
    }

    Ok(())
}

/// Upper bound on the fingerprint length, and so on the reliability message
///
/// With an unbounded cycle count every cycle spans at least two samples.
fn max_fingerprint_bits(config: &PairingConfig) -> usize {
    let cycles = match config.segmentation.cycles_wanted {
        0 => config.collection.expected_samples() / 2,
        wanted => wanted,
    };
    cycles.saturating_mul(config.quantization.bits_per_cycle)
}

/// 校验交换参数
fn validate_protocol(config: &PairingConfig) -> Result<(), ContractError> {
    let protocol = &config.protocol;

    if protocol.top_bits > protocol.max_message_values {
        return Err(ContractError::config_validation(
            "protocol.top_bits",
            format!(
                "top_bits ({}) exceeds max_message_values ({})",
                protocol.top_bits, protocol.max_message_values
            ),
        ));
    }

    let seg = &config.segmentation;
    let max_bits = max_fingerprint_bits(config);
    if seg.cycles_wanted > 0 && protocol.top_bits > max_bits {
        return Err(ContractError::config_validation(
            "protocol.top_bits",
            format!(
                "top_bits ({}) exceeds the longest possible fingerprint ({} cycles x {} bits)",
                protocol.top_bits, seg.cycles_wanted, config.quantization.bits_per_cycle
            ),
        ));
    }

    if max_bits > protocol.max_message_values {
        return Err(ContractError::config_validation(
            "segmentation.cycles_wanted",
            format!(
                "fingerprint may reach {} bits, more than max_message_values ({})",
                max_bits, protocol.max_message_values
            ),
        ));
    }

    if config.quantization.bits_per_cycle > config.segmentation.target_cycle_length {
        return Err(ContractError::config_validation(
            "quantization.bits_per_cycle",
            format!(
                "bits_per_cycle ({}) exceeds target_cycle_length ({})",
                config.quantization.bits_per_cycle, config.segmentation.target_cycle_length
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_defaults() {
        assert!(validate(&PairingConfig::default()).is_ok());
    }

    #[test]
    fn test_range_error_reports_nested_path() {
        let mut config = PairingConfig::default();
        config.filter.order = 0;
        let err = validate(&config).unwrap_err();
        match err {
            ContractError::ConfigValidation { field, .. } => assert_eq!(field, "filter.order"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_cutoff_above_nyquist() {
        let mut config = PairingConfig::default();
        config.filter.cutoff_hz = 25.0;
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("filter.cutoff_hz"));
    }

    #[test]
    fn test_band_edges_ordered() {
        let mut config = PairingConfig::default();
        config.filter.kind = FilterKind::BandPass;
        config.filter.band_high_hz = 0.4;
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("filter.band_high_hz"));

        // high-pass ignores the upper edge
        config.filter.kind = FilterKind::HighPass;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_band_edge_below_nyquist() {
        let mut config = PairingConfig::default();
        config.filter.kind = FilterKind::BandPass;
        config.filter.band_high_hz = 26.0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_top_bits_exceeds_fingerprint() {
        let mut config = PairingConfig::default();
        config.protocol.top_bits = 49;
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("longest possible fingerprint"));

        // unlimited cycles lift the bound
        config.segmentation.cycles_wanted = 0;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_window_shorter_than_cycle() {
        let mut config = PairingConfig::default();
        config.collection.duration_s = 0.5;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_radius_bounded_by_window() {
        let mut config = PairingConfig::default();
        config.segmentation.minima_radius = usize::MAX;
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("segmentation.minima_radius"));

        let mut config = PairingConfig::default();
        config.segmentation.autocorrelation_radius = 900;
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("segmentation.autocorrelation_radius"));

        config.segmentation.autocorrelation_radius = 899;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_reliability_message_fits_reader() {
        let mut config = PairingConfig::default();
        config.segmentation.cycles_wanted = 1100;
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("segmentation.cycles_wanted"));

        config.protocol.max_message_values = 4400;
        assert!(validate(&config).is_ok());

        // unbounded count: 900 samples give at most 450 cycles
        config.segmentation.cycles_wanted = 0;
        config.protocol.max_message_values = 1799;
        assert!(validate(&config).is_err());
        config.protocol.max_message_values = 1800;
        assert!(validate(&config).is_ok());
    }
}
