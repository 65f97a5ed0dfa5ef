//! Compressor tree strategy selection

use crate::error::CompressError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reduction scheme used to bring every rank down to at most two signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Greedy 3:2 reduction per stage (Asif & Kong's proposed Wallace tree)
    #[default]
    Wallace,
    /// Reduction against a decreasing height-bound schedule
    Dadda,
}

impl Strategy {
    /// All supported strategies
    pub const ALL: [Strategy; 2] = [Strategy::Wallace, Strategy::Dadda];

    /// Lowercase name
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Wallace => "wallace",
            Strategy::Dadda => "dadda",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = CompressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wallace" => Ok(Strategy::Wallace),
            "dadda" => Ok(Strategy::Dadda),
            _ => Err(CompressError::UnknownStrategy(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strategy() {
        assert_eq!("wallace".parse::<Strategy>().unwrap(), Strategy::Wallace);
        assert_eq!(" Dadda ".parse::<Strategy>().unwrap(), Strategy::Dadda);
        assert!(matches!(
            "booth".parse::<Strategy>(),
            Err(CompressError::UnknownStrategy(tag)) if tag == "booth"
        ));
    }

    #[test]
    fn test_display_roundtrip() {
        for strategy in Strategy::ALL {
            assert_eq!(strategy.to_string().parse::<Strategy>().unwrap(), strategy);
        }
    }
}
