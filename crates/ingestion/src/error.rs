//! Ingestion 错误类型

use contracts::ContractError;
use thiserror::Error;

/// Ingestion 错误
#[derive(Debug, Error)]
pub enum IngestionError {
    /// 录制文件行解析失败
    #[error("failed to parse line {line} of {source_name}: {message}")]
    ParseFailed {
        /// 数据源名称
        source_name: String,
        /// 行号 (1-based)
        line: usize,
        /// 错误消息
        message: String,
    },

    /// 读取失败
    #[error("failed to read {source_name}: {source}")]
    Read {
        /// 数据源名称
        source_name: String,
        #[source]
        source: std::io::Error,
    },

    /// 通道已关闭
    #[error("sample channel closed for {source_name}")]
    ChannelClosed {
        /// 数据源名称
        source_name: String,
    },

    /// 切片内没有样本
    #[error("no samples in {source_name} for offset {offset_s}s")]
    EmptySlice {
        /// 数据源名称
        source_name: String,
        /// 切片偏移 (秒)
        offset_s: f64,
    },
}

impl IngestionError {
    fn source_name(&self) -> &str {
        match self {
            Self::ParseFailed { source_name, .. }
            | Self::Read { source_name, .. }
            | Self::ChannelClosed { source_name }
            | Self::EmptySlice { source_name, .. } => source_name,
        }
    }
}

impl From<IngestionError> for ContractError {
    fn from(err: IngestionError) -> Self {
        ContractError::sample_source(err.source_name().to_string(), err.to_string())
    }
}

/// Ingestion Result 类型别名
pub type Result<T> = std::result::Result<T, IngestionError>;
