//! Reducer interface shared by the compressor tree strategies

use crate::ranks::RankStructure;
use ctree_netlist::Netlist;
use std::fmt;

/// Result of reducing a rank structure to height ≤ 2
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReductionStats {
    /// Name of the reducer
    pub reducer: String,
    /// Number of reduction stages run
    pub stages: usize,
    /// Full adders inserted
    pub full_adders: usize,
    /// Half adders inserted
    pub half_adders: usize,
    /// Max rank height before the first stage, then after every stage
    pub stage_heights: Vec<usize>,
}

impl ReductionStats {
    /// Create empty stats for `reducer`
    pub fn new(reducer: &str) -> Self {
        Self {
            reducer: reducer.to_string(),
            ..Default::default()
        }
    }

    /// Full + half adders
    pub fn adders(&self) -> usize {
        self.full_adders + self.half_adders
    }

    /// Record the max height reached at the end of a stage
    pub(crate) fn end_stage(&mut self, max_height: usize) {
        self.stages += 1;
        self.stage_heights.push(max_height);
    }
}

impl fmt::Display for ReductionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let heights: Vec<String> = self.stage_heights.iter().map(|h| h.to_string()).collect();
        write!(
            f,
            "{}: {} stages, {} FA, {} HA, heights {}",
            self.reducer,
            self.stages,
            self.full_adders,
            self.half_adders,
            heights.join(" → ")
        )
    }
}

/// A compressor tree reduction scheme
pub trait Reducer {
    /// Get the name of this reducer
    fn name(&self) -> &str;

    /// Insert adder cells until every rank holds at most two signals.
    ///
    /// New cells are named under `owner` and appended to `netlist`.
    fn reduce(
        &mut self,
        ranks: &mut RankStructure,
        netlist: &mut Netlist,
        owner: &str,
    ) -> ReductionStats;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_display() {
        let mut stats = ReductionStats::new("wallace");
        stats.stage_heights.push(5);
        stats.full_adders = 2;
        stats.end_stage(3);
        stats.end_stage(2);

        assert_eq!(stats.adders(), 2);
        assert_eq!(
            stats.to_string(),
            "wallace: 2 stages, 2 FA, 0 HA, heights 5 → 3 → 2"
        );
    }
}
