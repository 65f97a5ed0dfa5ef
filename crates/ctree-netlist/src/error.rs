//! Error types for netlist construction and evaluation

use thiserror::Error;

/// Result type for netlist operations
pub type Result<T> = std::result::Result<T, NetlistError>;

/// Errors that can occur while wiring or simulating a netlist
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NetlistError {
    /// Node handle does not belong to this netlist
    #[error("Unknown node: {0}")]
    UnknownNode(u32),

    /// Net handle does not belong to this netlist
    #[error("Unknown net: {0}")]
    UnknownNet(u32),

    /// Port index exceeds the port count of the node
    #[error("Port {port} out of range for node {node} ({available} ports)")]
    PortOutOfRange {
        node: String,
        port: usize,
        available: usize,
    },

    /// Input port already has a net attached
    #[error("Port {port} of node {node} is already connected")]
    PortAlreadyConnected { node: String, port: usize },

    /// Operation requires an adder node
    #[error("Node {0} is not an adder")]
    NotAnAdder(String),

    /// Primary input has no value in the assignment
    #[error("No value assigned to primary input {0}")]
    UnassignedInput(String),

    /// Net has no driver
    #[error("Net {0} has no driver")]
    UndrivenNet(String),

    /// Node input port was never connected
    #[error("Port {port} of node {node} is not connected")]
    UnconnectedPort { node: String, port: usize },

    /// Combinational cycle through the named node
    #[error("Combinational loop through node {0}")]
    CombinationalLoop(String),
}
