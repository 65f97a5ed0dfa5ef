//! CTREE Netlist - Arena-owned gate netlist
//!
//! This crate provides the shared logic network that arithmetic compressors
//! append to:
//! - AND/OR/XOR primitives with any number of inputs
//! - Carry-propagate adder nodes wired port by port
//! - A constant-zero source and a registry of adder nodes
//! - Two-valued simulation for equivalence checks

pub mod error;
pub mod evaluate;
pub mod netlist;

pub use error::{NetlistError, Result};
pub use evaluate::Values;
pub use netlist::{
    GateKind, LogicOp, Net, NetId, Netlist, NetlistStats, Node, NodeId, Signal,
};
