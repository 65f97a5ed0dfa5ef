//! Error types for compressor tree construction

use ctree_netlist::NetlistError;
use thiserror::Error;

/// Result type for compressor operations
pub type Result<T> = std::result::Result<T, CompressError>;

/// Errors that can occur while building a compressor tree
#[derive(Debug, Error)]
pub enum CompressError {
    /// Strategy tag outside the supported set
    #[error("Unrecognized compressor tree strategy '{0}' (expected one of: wallace, dadda)")]
    UnknownStrategy(String),

    /// The carry-chain finisher was handed a rank holding more than two signals
    #[error("Rank of weight {weight} holds {height} signals, the carry chain takes at most 2")]
    RankTooHigh { weight: usize, height: usize },

    /// Wiring into the shared netlist failed
    #[error("Netlist error: {0}")]
    Netlist(#[from] NetlistError),

    /// Malformed job configuration
    #[error("Failed to parse compressor config: {0}")]
    Config(String),

    /// I/O error reading a job file
    #[error("I/O error: {0}")]
    Io(String),
}
