//! Half and full adder cells built from AND/OR/XOR primitives
//!
//! ```text
//! HA:  sum = a ^ b        carry = a & b
//! FA:  sum = a ^ b ^ c    carry = ab | ac | bc
//! ```

use ctree_netlist::{LogicOp, Netlist, Signal};
use tracing::trace;

/// Sum and carry produced by an adder cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdderOutputs {
    /// Same weight as the inputs
    pub sum: Signal,
    /// Next weight up
    pub carry: Signal,
}

/// out = a & b
pub fn and2(netlist: &mut Netlist, owner: &str, a: Signal, b: Signal) -> Signal {
    netlist.add_logic(LogicOp::And, owner, &[a, b])
}

/// Three-input full adder: one XOR3 for the sum, three AND2 feeding an OR3 for the carry
pub fn full_adder(
    netlist: &mut Netlist,
    owner: &str,
    a: Signal,
    b: Signal,
    c: Signal,
) -> AdderOutputs {
    let sum = netlist.add_logic(LogicOp::Xor, owner, &[a, b, c]);

    let ab = and2(netlist, owner, a, b);
    let ac = and2(netlist, owner, a, c);
    let bc = and2(netlist, owner, b, c);
    let carry = netlist.add_logic(LogicOp::Or, owner, &[ab, ac, bc]);

    trace!("FA({:?}, {:?}, {:?}) -> ({:?}, {:?})", a, b, c, sum, carry);
    AdderOutputs { sum, carry }
}

/// Two-input half adder
pub fn half_adder(netlist: &mut Netlist, owner: &str, a: Signal, b: Signal) -> AdderOutputs {
    let sum = netlist.add_logic(LogicOp::Xor, owner, &[a, b]);
    let carry = and2(netlist, owner, a, b);

    trace!("HA({:?}, {:?}) -> ({:?}, {:?})", a, b, sum, carry);
    AdderOutputs { sum, carry }
}
