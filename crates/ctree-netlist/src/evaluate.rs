//! Two-valued combinational simulation
//!
//! Evaluates every node once in topological order. Used to check that a
//! compressed netlist still computes the weighted sum of its inputs.

use crate::error::{NetlistError, Result};
use crate::netlist::{GateKind, NetId, Netlist, NodeId, Signal};
use std::collections::{HashMap, VecDeque};

/// Values of every driven net after evaluation
#[derive(Debug, Clone)]
pub struct Values {
    bits: Vec<Option<bool>>,
}

impl Values {
    /// Value carried by `signal`
    pub fn get(&self, signal: Signal) -> Option<bool> {
        self.bits.get(signal.net().0 as usize).copied().flatten()
    }

    /// Values of `signals` in order, or None if any has no value
    pub fn bits(&self, signals: &[Signal]) -> Option<Vec<bool>> {
        signals.iter().map(|s| self.get(*s)).collect()
    }

    /// Decode `signals` as an unsigned little-endian word (index 0 = 2^0).
    ///
    /// Returns None if any signal has no value or the word exceeds 128 bits.
    pub fn word(&self, signals: &[Signal]) -> Option<u128> {
        if signals.len() > 128 {
            return None;
        }
        let mut value = 0u128;
        for (i, signal) in signals.iter().enumerate() {
            if self.get(*signal)? {
                value |= 1u128 << i;
            }
        }
        Some(value)
    }
}

impl Netlist {
    /// Simulate the netlist with the given primary input values
    pub fn evaluate(&self, assignment: &HashMap<Signal, bool>) -> Result<Values> {
        let order = self.topological_order()?;
        let mut bits: Vec<Option<bool>> = vec![None; self.net_count()];

        for id in order {
            let Some(node) = self.node(id) else {
                return Err(NetlistError::UnknownNode(id.0));
            };

            let mut inputs = Vec::with_capacity(node.inputs.len());
            for (port, net) in node.inputs.iter().enumerate() {
                let net = net.ok_or_else(|| NetlistError::UnconnectedPort {
                    node: node.name.clone(),
                    port,
                })?;
                let value = bits[net.0 as usize].ok_or_else(|| self.undriven(net))?;
                inputs.push(value);
            }

            match node.kind {
                GateKind::Input => {
                    if let Some(net) = node.outputs[0] {
                        let value = assignment
                            .get(&Signal::from_net(net))
                            .copied()
                            .ok_or_else(|| NetlistError::UnassignedInput(node.name.clone()))?;
                        bits[net.0 as usize] = Some(value);
                    }
                }
                GateKind::Const { value } => {
                    if let Some(net) = node.outputs[0] {
                        bits[net.0 as usize] = Some(value);
                    }
                }
                GateKind::And { .. } => set(&mut bits, node.outputs[0], inputs.iter().all(|v| *v)),
                GateKind::Or { .. } => set(&mut bits, node.outputs[0], inputs.iter().any(|v| *v)),
                GateKind::Xor { .. } => {
                    set(&mut bits, node.outputs[0], inputs.iter().filter(|v| **v).count() % 2 == 1)
                }
                GateKind::Add { width } => {
                    let mut carry = false;
                    for i in 0..width {
                        let (a, b) = (inputs[i], inputs[width + i]);
                        set(&mut bits, node.outputs[i], a ^ b ^ carry);
                        carry = (a && b) || (carry && (a ^ b));
                    }
                    set(&mut bits, node.outputs[width], carry);
                }
            }
        }

        Ok(Values { bits })
    }

    /// Kahn ordering over node dependencies
    fn topological_order(&self) -> Result<Vec<NodeId>> {
        let mut pending: Vec<usize> = vec![0; self.node_count()];
        let mut loads: Vec<Vec<NodeId>> = vec![Vec::new(); self.node_count()];

        for node in self.nodes() {
            for net in node.inputs.iter().flatten() {
                let (driver, _) = self
                    .net(*net)
                    .and_then(|n| n.driver)
                    .ok_or_else(|| self.undriven(*net))?;
                pending[node.id.0 as usize] += 1;
                loads[driver.0 as usize].push(node.id);
            }
        }

        let mut ready: VecDeque<NodeId> = self
            .nodes()
            .iter()
            .filter(|n| pending[n.id.0 as usize] == 0)
            .map(|n| n.id)
            .collect();
        let mut order = Vec::with_capacity(self.node_count());

        while let Some(id) = ready.pop_front() {
            order.push(id);
            for load in &loads[id.0 as usize] {
                let count = &mut pending[load.0 as usize];
                *count -= 1;
                if *count == 0 {
                    ready.push_back(*load);
                }
            }
        }

        if order.len() != self.node_count() {
            let stuck = self
                .nodes()
                .iter()
                .find(|n| pending[n.id.0 as usize] > 0)
                .map(|n| n.name.clone())
                .unwrap_or_default();
            return Err(NetlistError::CombinationalLoop(stuck));
        }
        Ok(order)
    }

    fn undriven(&self, net: NetId) -> NetlistError {
        NetlistError::UndrivenNet(
            self.net(net)
                .map(|n| n.name.clone())
                .unwrap_or_else(|| net.0.to_string()),
        )
    }
}

fn set(bits: &mut [Option<bool>], net: Option<NetId>, value: bool) {
    if let Some(net) = net {
        bits[net.0 as usize] = Some(value);
    }
}

#[cfg(test)]
mod tests {
    use crate::netlist::{LogicOp, Netlist};
    use crate::NetlistError;
    use std::collections::HashMap;

    #[test]
    fn test_logic_truth_tables() {
        let mut netlist = Netlist::new("tt");
        let a = netlist.add_input("a");
        let b = netlist.add_input("b");
        let c = netlist.add_input("c");
        let and = netlist.add_logic(LogicOp::And, "tt", &[a, b]);
        let or = netlist.add_logic(LogicOp::Or, "tt", &[a, b, c]);
        let xor = netlist.add_logic(LogicOp::Xor, "tt", &[a, b, c]);

        for pattern in 0u8..8 {
            let (va, vb, vc) = (pattern & 1 != 0, pattern & 2 != 0, pattern & 4 != 0);
            let assignment = HashMap::from([(a, va), (b, vb), (c, vc)]);
            let values = netlist.evaluate(&assignment).unwrap();
            assert_eq!(values.get(and), Some(va && vb));
            assert_eq!(values.get(or), Some(va || vb || vc));
            assert_eq!(values.get(xor), Some(va ^ vb ^ vc));
        }
    }

    #[test]
    fn test_adder_evaluation() {
        let mut netlist = Netlist::new("add");
        let a: Vec<_> = (0..3).map(|i| netlist.add_input(format!("a{}", i))).collect();
        let b: Vec<_> = (0..3).map(|i| netlist.add_input(format!("b{}", i))).collect();
        let add = netlist.add_adder(3, "add");
        for i in 0..3 {
            netlist.connect_input(add, i, a[i]).unwrap();
            netlist.connect_input(add, 3 + i, b[i]).unwrap();
        }
        let sum: Vec<_> = (0..4).map(|i| netlist.add_output(add, i).unwrap()).collect();

        for (x, y) in [(0u8, 0u8), (3, 4), (7, 7), (5, 6)] {
            let mut assignment = HashMap::new();
            for i in 0..3 {
                assignment.insert(a[i], x >> i & 1 == 1);
                assignment.insert(b[i], y >> i & 1 == 1);
            }
            let values = netlist.evaluate(&assignment).unwrap();
            assert_eq!(values.word(&sum), Some((x + y) as u128));
        }
    }

    #[test]
    fn test_bits_wider_than_a_word() {
        let mut netlist = Netlist::new("w");
        let inputs: Vec<_> = (0..130).map(|i| netlist.add_input(format!("i{}", i))).collect();
        let assignment = inputs.iter().map(|s| (*s, true)).collect();

        let values = netlist.evaluate(&assignment).unwrap();

        assert_eq!(values.word(&inputs), None);
        assert_eq!(values.bits(&inputs), Some(vec![true; 130]));
        assert_eq!(values.bits(&[]), Some(vec![]));
    }

    #[test]
    fn test_gnd_evaluates_to_zero() {
        let netlist = Netlist::new("gnd");
        let values = netlist.evaluate(&HashMap::new()).unwrap();
        assert_eq!(values.get(netlist.zero()), Some(false));
    }

    #[test]
    fn test_unassigned_input() {
        let mut netlist = Netlist::new("u");
        netlist.add_input("a");
        assert_eq!(
            netlist.evaluate(&HashMap::new()).unwrap_err(),
            NetlistError::UnassignedInput("a".to_string())
        );
    }

    #[test]
    fn test_unconnected_adder_port() {
        let mut netlist = Netlist::new("u");
        let a = netlist.add_input("a");
        let add = netlist.add_adder(1, "u");
        netlist.connect_input(add, 0, a).unwrap();
        let err = netlist.evaluate(&HashMap::from([(a, true)])).unwrap_err();
        assert!(matches!(err, NetlistError::UnconnectedPort { port: 1, .. }));
    }
}
