//! Gate-Level Netlist Arena
//!
//! The netlist owns every node and net created during synthesis. Callers only
//! ever hold copyable handles ([`NodeId`], [`NetId`], [`Signal`]) into it, so
//! the arena outlives every cell a compressor builds.
//!
//! # Naming
//!
//! ```text
//! node:        <owner>^<KIND>~<id>      e.g. top.mul0^XOR~17
//! output net:  <node>~<port>            e.g. top.mul0^XOR~17~0
//! ```

use crate::error::{NetlistError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

// ============================================================================
// Handles
// ============================================================================

/// Unique identifier for a node in the netlist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Unique identifier for a net (wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NetId(pub u32);

/// A single-bit value carried by a net.
///
/// Signals are opaque to the compressor: it moves, consumes and produces them
/// but never looks at what they compute. Wiring the same signal into several
/// gates adds one fanout pin per use; the signal itself is never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Signal(NetId);

impl Signal {
    /// The net carrying this signal
    pub fn net(self) -> NetId {
        self.0
    }

    pub(crate) fn from_net(net: NetId) -> Self {
        Signal(net)
    }
}

// ============================================================================
// Node Types
// ============================================================================

/// Boolean operator for the n-input logic primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicOp {
    And,
    Or,
    Xor,
}

/// Kind of a netlist node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateKind {
    /// Primary input
    Input,
    /// Constant driver
    Const { value: bool },
    /// N-input AND gate
    And { inputs: usize },
    /// N-input OR gate
    Or { inputs: usize },
    /// N-input XOR gate (odd parity)
    Xor { inputs: usize },
    /// Carry-propagate adder.
    ///
    /// Inputs `A[0..width)` then `B[width..2*width)`, outputs `S[0..=width]`
    /// where `S[width]` is the carry-out.
    Add { width: usize },
}

impl GateKind {
    /// Build the logic primitive for `op` with `inputs` input pins
    pub fn logic(op: LogicOp, inputs: usize) -> Self {
        match op {
            LogicOp::And => GateKind::And { inputs },
            LogicOp::Or => GateKind::Or { inputs },
            LogicOp::Xor => GateKind::Xor { inputs },
        }
    }

    /// Number of input ports
    pub fn input_count(&self) -> usize {
        match self {
            GateKind::Input | GateKind::Const { .. } => 0,
            GateKind::And { inputs } | GateKind::Or { inputs } | GateKind::Xor { inputs } => {
                *inputs
            }
            GateKind::Add { width } => 2 * width,
        }
    }

    /// Number of output ports
    pub fn output_count(&self) -> usize {
        match self {
            GateKind::Add { width } => width + 1,
            _ => 1,
        }
    }

    /// Short tag used in generated node names
    pub fn tag(&self) -> &'static str {
        match self {
            GateKind::Input => "IN",
            GateKind::Const { value: false } => "GND",
            GateKind::Const { value: true } => "VCC",
            GateKind::And { .. } => "AND",
            GateKind::Or { .. } => "OR",
            GateKind::Xor { .. } => "XOR",
            GateKind::Add { .. } => "ADD",
        }
    }

    /// Check if this is an adder
    pub fn is_adder(&self) -> bool {
        matches!(self, GateKind::Add { .. })
    }
}

/// A node instance in the netlist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier
    pub id: NodeId,
    /// Hierarchical name
    pub name: String,
    /// Node kind
    pub kind: GateKind,
    /// Net attached to each input port (None until wired)
    pub inputs: Vec<Option<NetId>>,
    /// Net driven by each output port (None until allocated)
    pub outputs: Vec<Option<NetId>>,
}

/// A net connecting one driver to any number of loads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Net {
    /// Unique identifier
    pub id: NetId,
    /// Net name
    pub name: String,
    /// Driving (node, output port)
    pub driver: Option<(NodeId, usize)>,
    /// Loads as (node, input port)
    pub fanout: Vec<(NodeId, usize)>,
}

/// Node counts per kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetlistStats {
    pub inputs: usize,
    pub constants: usize,
    pub and_gates: usize,
    pub or_gates: usize,
    pub xor_gates: usize,
    pub adders: usize,
    pub nets: usize,
}

impl NetlistStats {
    /// AND + OR + XOR primitives
    pub fn logic_gates(&self) -> usize {
        self.and_gates + self.or_gates + self.xor_gates
    }
}

// ============================================================================
// Netlist
// ============================================================================

/// Arena-owned gate netlist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Netlist {
    /// Design name
    pub name: String,
    nodes: Vec<Node>,
    nets: Vec<Net>,
    /// Net lookup by name
    net_names: IndexMap<String, NetId>,
    /// Constant-zero source, created with the netlist
    gnd: NetId,
    /// Registry of adder nodes for later packing / mapping passes
    adders: Vec<NodeId>,
}

impl Netlist {
    /// Create an empty netlist holding only its constant-zero driver
    pub fn new(name: impl Into<String>) -> Self {
        let mut netlist = Self {
            name: name.into(),
            nodes: Vec::new(),
            nets: Vec::new(),
            net_names: IndexMap::new(),
            gnd: NetId(0),
            adders: Vec::new(),
        };
        let gnd_node = netlist.alloc_node("gnd".to_string(), GateKind::Const { value: false });
        let gnd = netlist.alloc_net("gnd".to_string(), Some((gnd_node, 0)));
        netlist.nodes[gnd_node.0 as usize].outputs[0] = Some(gnd);
        netlist.gnd = gnd;
        netlist
    }

    /// Add a primary input and return its signal.
    ///
    /// A repeated name still creates a new input; [`Netlist::signal_by_name`]
    /// keeps resolving to the first one.
    pub fn add_input(&mut self, name: impl Into<String>) -> Signal {
        let name = name.into();
        let node = self.alloc_node(name.clone(), GateKind::Input);
        let net = self.alloc_net(name, Some((node, 0)));
        self.nodes[node.0 as usize].outputs[0] = Some(net);
        Signal(net)
    }

    /// Constant-zero signal
    pub fn zero(&self) -> Signal {
        Signal(self.gnd)
    }

    /// Instantiate an n-input logic gate and return its freshly allocated output.
    ///
    /// Each input becomes a new fanout pin on its net, so the same signal may
    /// be passed to any number of gates.
    pub fn add_logic(&mut self, op: LogicOp, owner: &str, inputs: &[Signal]) -> Signal {
        let kind = GateKind::logic(op, inputs.len());
        let id = self.next_node_id();
        let node = self.alloc_node(format!("{}^{}~{}", owner, kind.tag(), id.0), kind);
        for (port, signal) in inputs.iter().enumerate() {
            self.attach(node, port, *signal);
        }
        let out = self.make_output(node, 0);
        trace!("{} <- {:?}", self.nodes[node.0 as usize].name, inputs);
        out
    }

    /// Instantiate a `width`-bit carry-propagate adder with no ports wired
    pub fn add_adder(&mut self, width: usize, owner: &str) -> NodeId {
        let kind = GateKind::Add { width };
        let id = self.next_node_id();
        self.alloc_node(format!("{}^{}~{}", owner, kind.tag(), id.0), kind)
    }

    /// Wire `signal` into input `port` of `node`
    pub fn connect_input(&mut self, node: NodeId, port: usize, signal: Signal) -> Result<()> {
        let target = self.node(node).ok_or(NetlistError::UnknownNode(node.0))?;
        if port >= target.inputs.len() {
            return Err(NetlistError::PortOutOfRange {
                node: target.name.clone(),
                port,
                available: target.inputs.len(),
            });
        }
        if target.inputs[port].is_some() {
            return Err(NetlistError::PortAlreadyConnected {
                node: target.name.clone(),
                port,
            });
        }
        if self.net(signal.net()).is_none() {
            return Err(NetlistError::UnknownNet(signal.net().0));
        }
        self.attach(node, port, signal);
        Ok(())
    }

    /// Allocate the net driven by output `port` of `node` and return it as a signal
    pub fn add_output(&mut self, node: NodeId, port: usize) -> Result<Signal> {
        let target = self.node(node).ok_or(NetlistError::UnknownNode(node.0))?;
        match target.outputs.get(port) {
            None => Err(NetlistError::PortOutOfRange {
                node: target.name.clone(),
                port,
                available: target.outputs.len(),
            }),
            Some(Some(net)) => Ok(Signal(*net)),
            Some(None) => Ok(self.make_output(node, port)),
        }
    }

    /// Record an adder node in the global adder registry
    pub fn register_adder(&mut self, node: NodeId) -> Result<()> {
        let target = self.node(node).ok_or(NetlistError::UnknownNode(node.0))?;
        if !target.kind.is_adder() {
            return Err(NetlistError::NotAnAdder(target.name.clone()));
        }
        if !self.adders.contains(&node) {
            self.adders.push(node);
        }
        Ok(())
    }

    /// Registered adder nodes, in registration order
    pub fn adders(&self) -> &[NodeId] {
        &self.adders
    }

    /// Get a node by ID
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    /// Get a net by ID
    pub fn net(&self, id: NetId) -> Option<&Net> {
        self.nets.get(id.0 as usize)
    }

    /// All nodes in creation order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All nets in creation order
    pub fn nets(&self) -> &[Net] {
        &self.nets
    }

    /// Look up a signal by net name
    pub fn signal_by_name(&self, name: &str) -> Option<Signal> {
        self.net_names.get(name).copied().map(Signal)
    }

    /// Name of the net carrying `signal`
    pub fn signal_name(&self, signal: Signal) -> Option<&str> {
        self.net(signal.net()).map(|net| net.name.as_str())
    }

    /// Node driving `signal`
    pub fn driver_of(&self, signal: Signal) -> Option<NodeId> {
        self.net(signal.net())
            .and_then(|net| net.driver)
            .map(|(node, _)| node)
    }

    /// Number of nodes, including inputs and the constant driver
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of nets
    pub fn net_count(&self) -> usize {
        self.nets.len()
    }

    /// Handle the next allocated node will receive
    pub fn next_node_id(&self) -> NodeId {
        NodeId(self.nodes.len() as u32)
    }

    /// Count nodes per kind
    pub fn stats(&self) -> NetlistStats {
        let mut stats = NetlistStats {
            nets: self.nets.len(),
            ..Default::default()
        };
        for node in &self.nodes {
            match node.kind {
                GateKind::Input => stats.inputs += 1,
                GateKind::Const { .. } => stats.constants += 1,
                GateKind::And { .. } => stats.and_gates += 1,
                GateKind::Or { .. } => stats.or_gates += 1,
                GateKind::Xor { .. } => stats.xor_gates += 1,
                GateKind::Add { .. } => stats.adders += 1,
            }
        }
        stats
    }

    // ------------------------------------------------------------------------
    // Allocation helpers
    // ------------------------------------------------------------------------

    fn alloc_node(&mut self, name: String, kind: GateKind) -> NodeId {
        let id = self.next_node_id();
        self.nodes.push(Node {
            id,
            name,
            kind,
            inputs: vec![None; kind.input_count()],
            outputs: vec![None; kind.output_count()],
        });
        id
    }

    fn alloc_net(&mut self, name: String, driver: Option<(NodeId, usize)>) -> NetId {
        let id = NetId(self.nets.len() as u32);
        // first net registered under a name keeps it
        if self.net_names.contains_key(&name) {
            warn!("duplicate net name '{}', lookup keeps the first net", name);
        } else {
            self.net_names.insert(name.clone(), id);
        }
        self.nets.push(Net {
            id,
            name,
            driver,
            fanout: Vec::new(),
        });
        id
    }

    fn make_output(&mut self, node: NodeId, port: usize) -> Signal {
        let name = format!("{}~{}", self.nodes[node.0 as usize].name, port);
        let net = self.alloc_net(name, Some((node, port)));
        self.nodes[node.0 as usize].outputs[port] = Some(net);
        Signal(net)
    }

    fn attach(&mut self, node: NodeId, port: usize, signal: Signal) {
        debug_assert!((signal.net().0 as usize) < self.nets.len());
        if let Some(net) = self.nets.get_mut(signal.net().0 as usize) {
            net.fanout.push((node, port));
        }
        self.nodes[node.0 as usize].inputs[port] = Some(signal.net());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_netlist_has_gnd() {
        let netlist = Netlist::new("top");
        assert_eq!(netlist.node_count(), 1);
        assert_eq!(netlist.net_count(), 1);
        assert_eq!(netlist.signal_name(netlist.zero()), Some("gnd"));
        assert_eq!(netlist.stats().constants, 1);
    }

    #[test]
    fn test_logic_gate_naming_and_fanout() {
        let mut netlist = Netlist::new("top");
        let a = netlist.add_input("a");
        let b = netlist.add_input("b");

        let y0 = netlist.add_logic(LogicOp::And, "top.m", &[a, b]);
        let y1 = netlist.add_logic(LogicOp::Xor, "top.m", &[a, b]);

        assert_eq!(netlist.signal_name(y0), Some("top.m^AND~3~0"));
        assert_eq!(netlist.signal_name(y1), Some("top.m^XOR~4~0"));
        // a feeds both gates
        assert_eq!(netlist.net(a.net()).unwrap().fanout.len(), 2);
        assert_eq!(netlist.signal_by_name("top.m^XOR~4~0"), Some(y1));
    }

    #[test]
    fn test_adder_wiring() {
        let mut netlist = Netlist::new("top");
        let a = netlist.add_input("a");
        let add = netlist.add_adder(2, "top");

        netlist.connect_input(add, 0, a).unwrap();
        assert_eq!(
            netlist.connect_input(add, 0, a),
            Err(NetlistError::PortAlreadyConnected {
                node: "top^ADD~2".to_string(),
                port: 0
            })
        );
        assert!(matches!(
            netlist.connect_input(add, 4, a),
            Err(NetlistError::PortOutOfRange { available: 4, .. })
        ));

        let s0 = netlist.add_output(add, 0).unwrap();
        assert_eq!(netlist.add_output(add, 0).unwrap(), s0);
        assert!(netlist.add_output(add, 3).is_err());
        assert_eq!(netlist.driver_of(s0), Some(add));
    }

    #[test]
    fn test_adder_registry() {
        let mut netlist = Netlist::new("top");
        let a = netlist.add_input("a");
        let add = netlist.add_adder(1, "top");

        netlist.register_adder(add).unwrap();
        netlist.register_adder(add).unwrap();
        assert_eq!(netlist.adders(), &[add]);

        let input_node = netlist.driver_of(a).unwrap();
        assert!(matches!(
            netlist.register_adder(input_node),
            Err(NetlistError::NotAnAdder(_))
        ));
    }

    #[test]
    fn test_stats() {
        let mut netlist = Netlist::new("top");
        let a = netlist.add_input("a");
        let b = netlist.add_input("b");
        let c = netlist.add_input("c");
        netlist.add_logic(LogicOp::Xor, "t", &[a, b, c]);
        netlist.add_logic(LogicOp::Or, "t", &[a, b, c]);
        netlist.add_logic(LogicOp::And, "t", &[a, b]);
        netlist.add_adder(3, "t");

        let stats = netlist.stats();
        assert_eq!(stats.inputs, 3);
        assert_eq!(stats.logic_gates(), 3);
        assert_eq!(stats.adders, 1);
    }

    #[test]
    fn test_wide_logic_gate_keeps_every_input() {
        let mut netlist = Netlist::new("top");
        let inputs: Vec<_> = (0..300).map(|i| netlist.add_input(format!("i{}", i))).collect();

        let y = netlist.add_logic(LogicOp::Or, "t", &inputs);

        let node = netlist.node(netlist.driver_of(y).unwrap()).unwrap();
        assert_eq!(node.kind, GateKind::Or { inputs: 300 });
        assert_eq!(node.inputs.len(), 300);
        assert!(node.inputs.iter().all(Option::is_some));
    }

    #[test]
    fn test_duplicate_name_keeps_first_lookup() {
        let mut netlist = Netlist::new("top");
        let first = netlist.add_input("a");
        let second = netlist.add_input("a");

        assert_ne!(first, second);
        assert_eq!(netlist.signal_by_name("a"), Some(first));
        assert_eq!(netlist.signal_name(second), Some("a"));
    }
}
