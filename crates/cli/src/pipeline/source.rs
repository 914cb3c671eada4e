//! Configuration and sample source selection.

use std::path::Path;

use contracts::{CollectionConfig, ContractError, PairingConfig, SampleSource};
use ingestion::{RecordingSource, SyntheticWalker, WalkerConfig};
use tracing::info;

use crate::cli::SourceArgs;
use crate::error::{CliError, Result};

/// Load a configuration file, or the built-in defaults when `path` is `None`
pub fn load_config(path: Option<&Path>) -> Result<PairingConfig> {
    let Some(path) = path else {
        info!("No configuration file given, using defaults");
        return Ok(PairingConfig::default());
    };
    if !path.exists() {
        return Err(CliError::config_not_found(path.display().to_string()));
    }
    let config = config_loader::ConfigLoader::load_from_path(path)?;
    info!(config = %path.display(), "Configuration loaded");
    Ok(config)
}

/// Sample source chosen on the command line
#[derive(Debug)]
pub enum AnySource {
    Recording(RecordingSource),
    Synthetic(SyntheticWalker),
}

impl AnySource {
    /// Build the source described by `args`
    pub fn from_args(args: &SourceArgs, collection: &CollectionConfig) -> Result<Self> {
        match args.recording {
            Some(ref path) => {
                if !path.is_file() {
                    return Err(CliError::recording(
                        path.display().to_string(),
                        "not a readable file",
                    ));
                }
                let stride = args.stride.unwrap_or(collection.duration_s);
                info!(recording = %path.display(), stride_s = stride, "Using recorded samples");
                Ok(Self::Recording(RecordingSource::new(path).with_stride(stride)))
            }
            None => {
                info!(seed = args.seed, step_hz = args.step_hz, "Using synthetic walker");
                Ok(Self::synthetic("walker", args.seed, args.step_hz))
            }
        }
    }

    pub fn synthetic(name: &str, seed: u64, step_hz: f64) -> Self {
        Self::Synthetic(SyntheticWalker::new(
            name,
            WalkerConfig {
                seed,
                step_hz,
                ..WalkerConfig::default()
            },
        ))
    }
}

impl SampleSource for AnySource {
    fn name(&self) -> &str {
        match self {
            Self::Recording(source) => source.name(),
            Self::Synthetic(source) => source.name(),
        }
    }

    async fn collect(&mut self, config: &CollectionConfig) -> std::result::Result<Vec<f64>, ContractError> {
        match self {
            Self::Recording(source) => source.collect(config).await,
            Self::Synthetic(source) => source.collect(config).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn source_args(recording: Option<std::path::PathBuf>) -> SourceArgs {
        SourceArgs {
            recording,
            stride: None,
            seed: 3,
            step_hz: 1.8,
        }
    }

    #[test]
    fn test_missing_config_file() {
        let err = load_config(Some(Path::new("/nonexistent/pairing.toml"))).unwrap_err();
        assert!(matches!(err, CliError::ConfigNotFound { .. }));
    }

    #[test]
    fn test_defaults_without_file() {
        let config = load_config(None).unwrap();
        assert_eq!(config.protocol.top_bits, 32);
    }

    #[test]
    fn test_config_file_loaded() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[protocol]\nsimilarity_threshold = 0.8").unwrap();
        let config = load_config(Some(file.path())).unwrap();
        assert!((config.protocol.similarity_threshold - 0.8).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_synthetic_by_default() {
        let collection = CollectionConfig::default();
        let mut source = AnySource::from_args(&source_args(None), &collection).unwrap();
        assert!(matches!(source, AnySource::Synthetic(_)));
        assert_eq!(source.collect(&collection).await.unwrap().len(), 900);
    }

    #[test]
    fn test_missing_recording_rejected() {
        let args = source_args(Some("/nonexistent/walk.csv".into()));
        let err = AnySource::from_args(&args, &CollectionConfig::default()).unwrap_err();
        assert!(err.to_string().contains("not a readable file"));
    }
}
