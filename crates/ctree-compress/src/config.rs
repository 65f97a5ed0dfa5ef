//! Compressor job configuration
//!
//! ```toml
//! [compressor]
//! strategy = "dadda"
//! owner = "top.mult0"
//!
//! [ranks]
//! heights = [3, 3, 3, 0]
//! ```

use crate::error::{CompressError, Result};
use crate::strategy::Strategy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::error;

/// A compression job: which tree to build and over which ranks
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompressJob {
    #[serde(default)]
    pub compressor: CompressorConfig,
    #[serde(default)]
    pub ranks: RanksConfig,
}

/// `[compressor]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressorConfig {
    /// Strategy tag, validated by [`CompressJob::strategy`]
    #[serde(default = "default_strategy")]
    pub strategy: String,
    /// Naming prefix for created nodes
    #[serde(default = "default_owner")]
    pub owner: String,
}

impl Default for CompressorConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            owner: default_owner(),
        }
    }
}

/// `[ranks]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RanksConfig {
    /// Signals per weight, index 0 = 2^0
    #[serde(default)]
    pub heights: Vec<usize>,
}

fn default_strategy() -> String {
    Strategy::default().name().to_string()
}

fn default_owner() -> String {
    "top".to_string()
}

impl CompressJob {
    /// Resolve the configured strategy tag.
    ///
    /// An unknown tag is fatal for the enclosing synthesis run.
    pub fn strategy(&self) -> Result<Strategy> {
        self.compressor.strategy.parse().inspect_err(|e| {
            error!("{}", e);
        })
    }
}

/// Parse a job from a file path
pub fn from_path(path: impl AsRef<Path>) -> Result<CompressJob> {
    let contents =
        std::fs::read_to_string(path.as_ref()).map_err(|e| CompressError::Io(e.to_string()))?;
    from_str(&contents)
}

/// Parse a job from a string
pub fn from_str(s: &str) -> Result<CompressJob> {
    toml::from_str(s).map_err(|e| CompressError::Config(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_job() {
        let job = from_str(
            r#"
            [compressor]
            strategy = "dadda"
            owner = "top.mult0"

            [ranks]
            heights = [3, 3, 3, 0]
        "#,
        )
        .unwrap();

        assert_eq!(job.strategy().unwrap(), Strategy::Dadda);
        assert_eq!(job.compressor.owner, "top.mult0");
        assert_eq!(job.ranks.heights, vec![3, 3, 3, 0]);
    }

    #[test]
    fn test_defaults() {
        let job = from_str("[ranks]\nheights = [5]\n").unwrap();
        assert_eq!(job.strategy().unwrap(), Strategy::Wallace);
        assert_eq!(job.compressor.owner, "top");
    }

    #[test]
    fn test_unknown_strategy_is_fatal() {
        let job = from_str("[compressor]\nstrategy = \"booth\"\n").unwrap();
        assert!(matches!(
            job.strategy(),
            Err(CompressError::UnknownStrategy(tag)) if tag == "booth"
        ));
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            from_str("[ranks]\nheights = \"three\"\n"),
            Err(CompressError::Config(_))
        ));
    }
}
