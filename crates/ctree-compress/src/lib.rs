//! CTREE Compress - Compressor trees for multi-operand addition
//!
//! Reduces a set of same-weighted partial-sum bits (multiplier partial
//! products, operands of a multi-input adder) to a single output word:
//!
//! ```text
//! RankStructure → Reducer (Wallace | Dadda) → height ≤ 2 → carry chain → bits
//! ```
//!
//! All cells are appended to a shared [`Netlist`]; nothing the caller created
//! is modified or removed.
//!
//! # Example
//!
//! ```ignore
//! use ctree_compress::{compress, RankStructure, Strategy};
//! use ctree_netlist::Netlist;
//!
//! let mut netlist = Netlist::new("top");
//! let ranks = RankStructure::from_heights(&mut netlist, "pp", &[3, 3, 3]);
//! let out = compress(Strategy::Dadda, ranks, &mut netlist, "top.mult0")?;
//! ```

pub mod cells;
pub mod config;
pub mod dadda;
pub mod error;
pub mod finish;
pub mod ranks;
pub mod reducer;
pub mod strategy;
pub mod verify;
pub mod wallace;

pub use cells::{full_adder, half_adder, AdderOutputs};
pub use config::CompressJob;
pub use dadda::{height_schedule, Dadda};
pub use error::{CompressError, Result};
pub use finish::{finish, Finished};
pub use ranks::{Rank, RankStructure};
pub use reducer::{Reducer, ReductionStats};
pub use strategy::Strategy;
pub use verify::{check_assignment, Check};
pub use wallace::Wallace;

use ctree_netlist::{Netlist, NodeId, Signal};
use tracing::{error, info};

/// Result of compressing one rank structure
#[derive(Debug, Clone)]
pub struct CompressOutput {
    /// Output bits, lowest weight first; the last one is the carry-out when
    /// a carry chain was built
    pub bits: Vec<Signal>,
    /// Carry-out of the final adder
    pub carry_out: Option<Signal>,
    /// Final carry-propagate adder, also present in the netlist's adder registry
    pub adder: Option<NodeId>,
    /// Every node created by this call, in creation order
    pub created: Vec<NodeId>,
    /// Reduction statistics
    pub stats: ReductionStats,
}

/// Compress `ranks` with the given strategy.
///
/// `ranks` is consumed. New gates are named under `owner`.
pub fn compress(
    strategy: Strategy,
    mut ranks: RankStructure,
    netlist: &mut Netlist,
    owner: &str,
) -> Result<CompressOutput> {
    let first = netlist.next_node_id();

    let stats = match strategy {
        Strategy::Wallace => Wallace.reduce(&mut ranks, netlist, owner),
        Strategy::Dadda => Dadda.reduce(&mut ranks, netlist, owner),
    };
    let finished = finish(ranks, netlist, owner)?;

    let created = (first.0..netlist.next_node_id().0).map(NodeId).collect::<Vec<_>>();
    info!(
        "{} compressed into {} bits ({} new nodes)",
        stats,
        finished.bits.len(),
        created.len()
    );

    Ok(CompressOutput {
        carry_out: finished.carry_out(),
        bits: finished.bits,
        adder: finished.adder,
        created,
        stats,
    })
}

/// Compress with a strategy named by an untyped tag (e.g. read from a config file).
///
/// An unrecognized tag is a fatal configuration error: it is logged and
/// returned without touching the netlist.
pub fn compress_tagged(
    tag: &str,
    ranks: RankStructure,
    netlist: &mut Netlist,
    owner: &str,
) -> Result<CompressOutput> {
    let strategy: Strategy = tag.parse().inspect_err(|e| {
        error!("{}", e);
    })?;
    compress(strategy, ranks, netlist, owner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compress_reports_created_nodes() {
        let mut netlist = Netlist::new("top");
        let ranks = RankStructure::from_heights(&mut netlist, "x", &[3]);
        let first = netlist.next_node_id();

        let out = compress(Strategy::Wallace, ranks, &mut netlist, "top").unwrap();

        // one FA (5 gates); sum and carry land on different weights, so no adder
        assert_eq!(out.stats.full_adders, 1);
        assert_eq!(out.adder, None);
        assert_eq!(out.created.len(), 5);
        assert_eq!(out.created[0], first);
        assert_eq!(out.bits.len(), 2);
    }

    #[test]
    fn test_unknown_tag_leaves_netlist_untouched() {
        let mut netlist = Netlist::new("top");
        let ranks = RankStructure::from_heights(&mut netlist, "x", &[3, 3]);
        let nodes = netlist.node_count();

        let result = compress_tagged("booth", ranks, &mut netlist, "top");

        assert!(matches!(result, Err(CompressError::UnknownStrategy(_))));
        assert_eq!(netlist.node_count(), nodes);
    }
}
