//! Dadda tree reduction
//!
//! The height bounds `d` are the sequence 2, 3, 4, 6, 9, 13, ... (`d = ⌊3d/2⌋`)
//! truncated below the initial max height and walked from the top. A stage
//! only reduces a rank far enough that, together with the carries arriving
//! from the rank below, it ends the stage at height ≤ d:
//!
//! 0. `h' = height + carry_in + adders`
//! 1. `h' <= d`: leave the rank alone
//! 2. while `h' > d + 1`: full adder
//! 3. `h' == d + 1`: one half adder
//! 4. `carry_in` of the next rank = adders placed here

use crate::cells::{full_adder, half_adder};
use crate::ranks::{RankStructure, StageRows};
use crate::reducer::{ReductionStats, Reducer};
use ctree_netlist::Netlist;
use tracing::debug;

/// Compressor tree driven by Dadda's height-bound schedule
#[derive(Debug, Clone, Copy, Default)]
pub struct Dadda;

/// Every height bound strictly below `max_height`, in increasing order
pub fn height_schedule(max_height: usize) -> Vec<usize> {
    let mut schedule = Vec::new();
    let mut d = 2;
    while d < max_height {
        schedule.push(d);
        d = d * 3 / 2;
    }
    schedule
}

impl Reducer for Dadda {
    fn name(&self) -> &str {
        "dadda"
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

        let mut bounds = height_schedule(max_height);
        let mut d = bounds.pop().unwrap_or(2);

        while max_height > 2 {
            let mut carry_in = 0;
            let mut rows = StageRows::new(ranks.len());
            let adders_before = stats.adders();

            for i in 0..ranks.len() {
                let rank = &mut ranks[i];
                if rank.height() + carry_in <= d {
                    carry_in = 0;
                    continue;
                }

                let mut adder_count = 0;
                while rank.height() + carry_in + adder_count > d + 1 {
                    let Some((a, b, c)) = rank.pop_triple() else {
                        break;
                    };
                    let out = full_adder(netlist, owner, a, b, c);
                    rows.push(i, out.sum);
                    rows.push(i + 1, out.carry);
                    adder_count += 1;
                    stats.full_adders += 1;
                }

                if rank.height() + carry_in + adder_count == d + 1 {
                    if let Some((a, b)) = rank.pop_pair() {
                        let out = half_adder(netlist, owner, a, b);
                        rows.push(i, out.sum);
                        rows.push(i + 1, out.carry);
                        adder_count += 1;
                        stats.half_adders += 1;
                    }
                }

                carry_in = adder_count;
            }

            ranks.merge(rows.into_rows());
            let previous = max_height;
            max_height = ranks.max_height();
            stats.end_stage(max_height);
            debug!(
                "dadda stage {}: bound {}, {} adders, height {} -> {}",
                stats.stages,
                d,
                stats.adders() - adders_before,
                previous,
                max_height
            );

            // next bound strictly below the height just reached
            while let Some(next) = bounds.pop() {
                d = next;
                if d < max_height {
                    break;
                }
            }
        }

        stats
    }
}
