//! Carry-chain finisher
//!
//! Turns a rank structure of height ≤ 2 into one output bit per weight. Ranks
//! below the first pair pass straight through; from the first rank holding
//! two signals up to the top rank, a single carry-propagate adder absorbs both
//! rows and contributes one extra carry-out bit.
//!
//! ```text
//! weight:   4  3  2  1  0
//! row A:    x  x  x  x  x
//! row B:       x  x
//!           └─ ADD(4) ─┘  pass-through: bits 0, 1
//! ```

use crate::error::{CompressError, Result};
use crate::ranks::RankStructure;
use ctree_netlist::{Netlist, NodeId, Signal};
use tracing::debug;

/// Output of the finisher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finished {
    /// One bit per rank, then the adder's carry-out when an adder was built
    pub bits: Vec<Signal>,
    /// Carry-propagate adder, if one was instantiated
    pub adder: Option<NodeId>,
}

impl Finished {
    /// Trailing carry-out bit, present only when an adder was built
    pub fn carry_out(&self) -> Option<Signal> {
        self.adder.and(self.bits.last().copied())
    }
}

struct Chain {
    node: NodeId,
    start: usize,
    width: usize,
}

/// Emit the final output bits, building an adder where two rows remain.
///
/// Consumes `ranks`. A rank holding more than two signals is rejected before
/// anything is added to the netlist.
pub fn finish(ranks: RankStructure, netlist: &mut Netlist, owner: &str) -> Result<Finished> {
    if let Some((weight, rank)) = ranks.iter().enumerate().find(|(_, r)| r.height() > 2) {
        return Err(CompressError::RankTooHigh {
            weight,
            height: rank.height(),
        });
    }

    let rank_count = ranks.len();
    let mut bits = Vec::with_capacity(rank_count + 1);
    let mut chain: Option<Chain> = None;

    for (i, mut rank) in ranks.into_ranks().into_iter().enumerate() {
        if rank.height() > 1 && chain.is_none() {
            let width = rank_count - i;
            let node = netlist.add_adder(width, owner);
            netlist.register_adder(node)?;
            debug!("carry chain of width {} from weight {}", width, i);
            chain = Some(Chain {
                node,
                start: i,
                width,
            });
        }

        let bit = match &chain {
            Some(chain) => {
                let idx = i - chain.start;
                let a = rank.pop().unwrap_or_else(|| netlist.zero());
                let b = rank.pop().unwrap_or_else(|| netlist.zero());
                netlist.connect_input(chain.node, idx, a)?;
                netlist.connect_input(chain.node, chain.width + idx, b)?;
                netlist.add_output(chain.node, idx)?
            }
            None => rank.pop().unwrap_or_else(|| netlist.zero()),
        };
        bits.push(bit);
    }

    if let Some(chain) = &chain {
        bits.push(netlist.add_output(chain.node, chain.width)?);
    }

    Ok(Finished {
        bits,
        adder: chain.map(|c| c.node),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctree_netlist::GateKind;

    #[test]
    fn test_pass_through_without_pairs() {
        let mut netlist = Netlist::new("f");
        let ranks = RankStructure::from_heights(&mut netlist, "x", &[1, 0, 1]);
        let x0 = ranks[0].signals()[0];
        let x2 = ranks[2].signals()[0];
        let nodes_before = netlist.node_count();

        let finished = finish(ranks, &mut netlist, "f").unwrap();

        assert_eq!(finished.bits, vec![x0, netlist.zero(), x2]);
        assert_eq!(finished.adder, None);
        assert_eq!(finished.carry_out(), None);
        assert_eq!(netlist.node_count(), nodes_before);
    }

    #[test]
    fn test_adder_starts_at_first_pair() {
        let mut netlist = Netlist::new("f");
        let ranks = RankStructure::from_heights(&mut netlist, "x", &[1, 2, 1, 2]);
        let x0 = ranks[0].signals()[0];

        let finished = finish(ranks, &mut netlist, "f").unwrap();

        let adder = finished.adder.unwrap();
        assert_eq!(netlist.node(adder).unwrap().kind, GateKind::Add { width: 3 });
        assert_eq!(netlist.adders(), &[adder]);
        assert_eq!(finished.bits.len(), 5);
        assert_eq!(finished.bits[0], x0);
        assert_eq!(finished.carry_out(), finished.bits.last().copied());

        // weight 2 holds a single signal, paired with zero on port B
        let node = netlist.node(adder).unwrap();
        assert_eq!(node.inputs[3 + 1], Some(netlist.zero().net()));
        assert!(node.inputs.iter().all(Option::is_some));
    }

    #[test]
    fn test_empty_rank_inside_chain_is_zero_fed() {
        let mut netlist = Netlist::new("f");
        let ranks = RankStructure::from_heights(&mut netlist, "x", &[2, 0, 1]);

        let finished = finish(ranks, &mut netlist, "f").unwrap();

        let node = netlist.node(finished.adder.unwrap()).unwrap();
        assert_eq!(node.inputs[1], Some(netlist.zero().net()));
        assert_eq!(node.inputs[3 + 1], Some(netlist.zero().net()));
        assert_eq!(finished.bits.len(), 4);
    }

    #[test]
    fn test_rank_above_two_is_rejected() {
        let mut netlist = Netlist::new("f");
        let ranks = RankStructure::from_heights(&mut netlist, "x", &[2, 3]);
        let nodes_before = netlist.node_count();

        let err = finish(ranks, &mut netlist, "f").unwrap_err();

        assert!(matches!(
            err,
            CompressError::RankTooHigh {
                weight: 1,
                height: 3
            }
        ));
        assert_eq!(netlist.node_count(), nodes_before);
        assert!(netlist.adders().is_empty());
    }

    #[test]
    fn test_empty_structure() {
        let mut netlist = Netlist::new("f");
        let finished = finish(RankStructure::new(), &mut netlist, "f").unwrap();
        assert!(finished.bits.is_empty());
        assert_eq!(finished.adder, None);
        assert_eq!(netlist.node_count(), 1);
    }
}
