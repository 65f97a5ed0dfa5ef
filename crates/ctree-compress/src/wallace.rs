//! Wallace tree reduction
//!
//! Follows Asif & Kong's proposed Wallace tree
//! (<https://doi.org/10.1155/2014/343960>). Every stage aims for
//! `⌊max/3⌋·2 + max mod 3` rows. Ranks are walked from the lowest weight:
//! as many full adders as fit are inserted, then a half adder is placed on a
//! leftover pair only when
//!
//! - this is the first rank of the stage with two or more signals, or
//! - this rank's adders + the previous rank's adders + the leftover height
//!   would overshoot the stage target.

use crate::cells::{full_adder, half_adder};
use crate::ranks::{RankStructure, StageRows};
use crate::reducer::{ReductionStats, Reducer};
use ctree_netlist::Netlist;
use tracing::debug;

/// Greedy 3:2 compressor tree
#[derive(Debug, Clone, Copy, Default)]
pub struct Wallace;

/// Row count a Wallace stage aims for, given the current max height
pub fn stage_target(max_height: usize) -> usize {
    (max_height / 3) * 2 + max_height % 3
}

impl Reducer for Wallace {
    fn name(&self) -> &str {
        "wallace"
    }

    fn reduce(
        &mut self,
        ranks: &mut RankStructure,
        netlist: &mut Netlist,
        owner: &str,
    ) -> ReductionStats {
        let mut stats = ReductionStats::new(self.name());
        let mut max_height = ranks.max_height();
        stats.stage_heights.push(max_height);

        while max_height > 2 {
            let target = stage_target(max_height);
            let mut is_first_reducible_rank = true;
            let mut last_adder_count = 0;
            let mut rows = StageRows::new(ranks.len());
            let adders_before = stats.adders();

            for i in 0..ranks.len() {
                let rank = &mut ranks[i];
                if rank.height() < 2 {
                    last_adder_count = 0;
                    continue;
                }

                let mut adder_count = 0;
                while let Some((a, b, c)) = rank.pop_triple() {
                    let out = full_adder(netlist, owner, a, b, c);
                    rows.push(i, out.sum);
                    rows.push(i + 1, out.carry);
                    adder_count += 1;
                    stats.full_adders += 1;
                    is_first_reducible_rank = false;
                }

                let height = rank.height();
                if height == 2
                    && (is_first_reducible_rank
                        || adder_count + last_adder_count + height > target)
                {
                    if let Some((a, b)) = rank.pop_pair() {
                        let out = half_adder(netlist, owner, a, b);
                        rows.push(i, out.sum);
                        rows.push(i + 1, out.carry);
                        adder_count += 1;
                        stats.half_adders += 1;
                        is_first_reducible_rank = false;
                    }
                }

                last_adder_count = adder_count;
            }

            ranks.merge(rows.into_rows());
            let previous = max_height;
            max_height = ranks.max_height();
            stats.end_stage(max_height);
            debug!(
                "wallace stage {}: target {}, {} adders, height {} -> {}",
                stats.stages,
                target,
                stats.adders() - adders_before,
                previous,
                max_height
            );
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_target() {
        assert_eq!(stage_target(3), 2);
        assert_eq!(stage_target(4), 3);
        assert_eq!(stage_target(5), 4);
        assert_eq!(stage_target(6), 4);
        assert_eq!(stage_target(9), 6);
    }

    #[test]
    fn test_single_rank_of_five() {
        let mut netlist = Netlist::new("w");
        let mut ranks = RankStructure::from_heights(&mut netlist, "x", &[5]);

        let stats = Wallace.reduce(&mut ranks, &mut netlist, "w");

        // stage 1: one FA, leftover pair kept (1 + 0 + 2 <= 4)
        // stage 2: one FA on the three remaining weight-0 signals
        assert_eq!(stats.stage_heights, vec![5, 3, 2]);
        assert_eq!((stats.full_adders, stats.half_adders), (2, 0));
        assert_eq!(ranks.heights(), vec![1, 2]);
    }

    #[test]
    fn test_first_reducible_rank_gets_half_adder() {
        let mut netlist = Netlist::new("w");
        let mut ranks = RankStructure::from_heights(&mut netlist, "x", &[2, 3]);

        let stats = Wallace.reduce(&mut ranks, &mut netlist, "w");

        // rank 0 is the first rank with height >= 2, so its pair is compressed
        assert_eq!((stats.full_adders, stats.half_adders), (1, 1));
        assert_eq!(stats.stages, 1);
        assert_eq!(ranks.heights(), vec![1, 2, 1]);
    }

    #[test]
    fn test_target_overshoot_inserts_half_adder() {
        let mut netlist = Netlist::new("w");
        let mut ranks = RankStructure::from_heights(&mut netlist, "x", &[3, 2]);

        let stats = Wallace.reduce(&mut ranks, &mut netlist, "w");

        // rank 1: 0 + 1 (carry from rank 0) + 2 > target 2
        assert_eq!((stats.full_adders, stats.half_adders), (1, 1));
        assert_eq!(ranks.heights(), vec![1, 2, 1]);
    }

    #[test]
    fn test_low_ranks_untouched() {
        let mut netlist = Netlist::new("w");
        let mut ranks = RankStructure::from_heights(&mut netlist, "x", &[2, 1, 2]);
        let before = ranks.clone();

        let stats = Wallace.reduce(&mut ranks, &mut netlist, "w");

        assert_eq!(stats.stages, 0);
        assert_eq!(stats.adders(), 0);
        assert_eq!(ranks, before);
    }
}
