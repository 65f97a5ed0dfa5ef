//! Output checking
//!
//! Simulates a compressed netlist under one input assignment and compares the
//! output bits with the weighted sum of the original ranks. Both sides are
//! kept as bit vectors, so outputs of any width are checked.

use crate::error::Result;
use crate::ranks::RankStructure;
use ctree_netlist::{Netlist, NetlistError, Signal};
use std::collections::HashMap;
use std::fmt;

/// Expected and simulated output for one assignment, little-endian
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    pub expected: Vec<bool>,
    pub actual: Vec<bool>,
}

impl Check {
    /// Whether both sides encode the same number
    pub fn passed(&self) -> bool {
        trimmed(&self.expected) == trimmed(&self.actual)
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "expected 0b{}, got 0b{}",
            binary(&self.expected),
            binary(&self.actual)
        )
    }
}

fn trimmed(bits: &[bool]) -> &[bool] {
    let len = bits.iter().rposition(|b| *b).map_or(0, |i| i + 1);
    &bits[..len]
}

fn binary(bits: &[bool]) -> String {
    let bits = trimmed(bits);
    if bits.is_empty() {
        return "0".to_string();
    }
    bits.iter().rev().map(|b| if *b { '1' } else { '0' }).collect()
}

/// Evaluate `netlist` under `assignment` and compare `outputs` with the sum of `ranks`.
///
/// `ranks` is the structure as it was before compression.
pub fn check_assignment(
    ranks: &RankStructure,
    netlist: &Netlist,
    outputs: &[Signal],
    assignment: &HashMap<Signal, bool>,
) -> Result<Check> {
    let values = netlist.evaluate(assignment)?;

    let expected = ranks
        .weighted_bits(|s| assignment.get(&s).copied())
        .ok_or_else(|| NetlistError::UnassignedInput(unassigned(ranks, netlist, assignment)))?;

    let mut actual = Vec::with_capacity(outputs.len());
    for signal in outputs {
        let bit = values.get(*signal).ok_or_else(|| {
            NetlistError::UndrivenNet(netlist.signal_name(*signal).unwrap_or("?").to_string())
        })?;
        actual.push(bit);
    }

    Ok(Check { expected, actual })
}

fn unassigned(
    ranks: &RankStructure,
    netlist: &Netlist,
    assignment: &HashMap<Signal, bool>,
) -> String {
    ranks
        .iter()
        .flat_map(|r| r.signals().iter().copied())
        .find(|s| !assignment.contains_key(s))
        .and_then(|s| netlist.signal_name(s))
        .unwrap_or("?")
        .to_string()
}
