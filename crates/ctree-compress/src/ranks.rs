//! Rank structure: bit-signals grouped by binary weight
//!
//! Rank `i` holds signals of weight 2^i. Reducers pop from the end of a rank,
//! so the selection order (last three, last two) is fixed and synthesis output
//! is reproducible.

use ctree_netlist::{Netlist, Signal};
use std::ops::{Index, IndexMut};

/// Signals sharing one weight, used as a stack
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rank {
    signals: Vec<Signal>,
}

impl Rank {
    /// Create an empty rank
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of signals
    pub fn height(&self) -> usize {
        self.signals.len()
    }

    /// Check if the rank holds no signals
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    /// Signals in insertion order
    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    /// Push a signal on top
    pub fn push(&mut self, signal: Signal) {
        self.signals.push(signal);
    }

    /// Pop the most recently pushed signal
    pub fn pop(&mut self) -> Option<Signal> {
        self.signals.pop()
    }

    /// Pop the top two signals as (last, second to last)
    pub fn pop_pair(&mut self) -> Option<(Signal, Signal)> {
        if self.height() < 2 {
            return None;
        }
        let a = self.signals.pop()?;
        let b = self.signals.pop()?;
        Some((a, b))
    }

    /// Pop the top three signals as (last, second to last, third to last)
    pub fn pop_triple(&mut self) -> Option<(Signal, Signal, Signal)> {
        if self.height() < 3 {
            return None;
        }
        let a = self.signals.pop()?;
        let b = self.signals.pop()?;
        let c = self.signals.pop()?;
        Some((a, b, c))
    }

    fn append(&mut self, other: &mut Rank) {
        self.signals.append(&mut other.signals);
    }
}

impl From<Vec<Signal>> for Rank {
    fn from(signals: Vec<Signal>) -> Self {
        Self { signals }
    }
}

/// Ordered, growable sequence of ranks (index i = weight 2^i)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankStructure {
    ranks: Vec<Rank>,
}

impl RankStructure {
    /// Create an empty rank structure
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from per-weight signal lists
    pub fn from_signals(ranks: Vec<Vec<Signal>>) -> Self {
        Self {
            ranks: ranks.into_iter().map(Rank::from).collect(),
        }
    }

    /// Seed a rank structure with fresh primary inputs, `heights[i]` of them at weight i.
    ///
    /// Inputs are named `<prefix><weight>_<k>`.
    pub fn from_heights(netlist: &mut Netlist, prefix: &str, heights: &[usize]) -> Self {
        let ranks = heights
            .iter()
            .enumerate()
            .map(|(weight, height)| {
                (0..*height)
                    .map(|k| netlist.add_input(format!("{}{}_{}", prefix, weight, k)))
                    .collect()
            })
            .collect();
        Self::from_signals(ranks)
    }

    /// Add `signal` at `weight`, growing the structure as needed
    pub fn push(&mut self, weight: usize, signal: Signal) {
        if self.ranks.len() <= weight {
            self.ranks.resize_with(weight + 1, Rank::new);
        }
        self.ranks[weight].push(signal);
    }

    /// Number of ranks
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    /// Check if there are no ranks at all
    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    /// Get a rank by weight index
    pub fn rank(&self, weight: usize) -> Option<&Rank> {
        self.ranks.get(weight)
    }

    /// Iterate ranks from lowest weight
    pub fn iter(&self) -> std::slice::Iter<'_, Rank> {
        self.ranks.iter()
    }

    /// Height of every rank
    pub fn heights(&self) -> Vec<usize> {
        self.ranks.iter().map(Rank::height).collect()
    }

    /// Height of the tallest rank (0 when empty)
    pub fn max_height(&self) -> usize {
        self.ranks.iter().map(Rank::height).max().unwrap_or(0)
    }

    /// Total number of signals across all ranks
    pub fn total_signals(&self) -> usize {
        self.ranks.iter().map(Rank::height).sum()
    }

    /// Weighted sum of the structure under a 0/1 assignment.
    ///
    /// Returns None when a signal has no value or a weight reaches 2^128.
    pub fn weighted_sum(&self, mut value_of: impl FnMut(Signal) -> Option<bool>) -> Option<u128> {
        let mut total = 0u128;
        for (weight, rank) in self.ranks.iter().enumerate() {
            for signal in rank.signals() {
                if value_of(*signal)? {
                    let bit = 1u128.checked_shl(weight as u32)?;
                    total = total.checked_add(bit)?;
                }
            }
        }
        Some(total)
    }

    /// Weighted sum as little-endian bits, with no width limit.
    ///
    /// Column counts are carried upward until nothing is left, so the result
    /// has no trailing zeros. Returns None when a signal has no value.
    pub fn weighted_bits(
        &self,
        mut value_of: impl FnMut(Signal) -> Option<bool>,
    ) -> Option<Vec<bool>> {
        let mut bits = Vec::with_capacity(self.ranks.len() + 1);
        let mut carry = 0usize;
        for rank in &self.ranks {
            let mut count = carry;
            for signal in rank.signals() {
                if value_of(*signal)? {
                    count += 1;
                }
            }
            bits.push(count % 2 == 1);
            carry = count / 2;
        }
        while carry > 0 {
            bits.push(carry % 2 == 1);
            carry /= 2;
        }
        while bits.last() == Some(&false) {
            bits.pop();
        }
        Some(bits)
    }

    /// Append one stage's freshly produced rows.
    ///
    /// Row i is appended to rank i; rows past the current end become new ranks
    /// only if they carry at least one signal.
    pub fn merge(&mut self, rows: Vec<Rank>) {
        for (weight, mut row) in rows.into_iter().enumerate() {
            if weight < self.ranks.len() {
                self.ranks[weight].append(&mut row);
            } else if !row.is_empty() {
                self.ranks.resize_with(weight, Rank::new);
                self.ranks.push(row);
            }
        }
    }

    /// Consume into the owned ranks
    pub fn into_ranks(self) -> Vec<Rank> {
        self.ranks
    }
}

impl Index<usize> for RankStructure {
    type Output = Rank;

    fn index(&self, weight: usize) -> &Rank {
        &self.ranks[weight]
    }
}

impl IndexMut<usize> for RankStructure {
    fn index_mut(&mut self, weight: usize) -> &mut Rank {
        &mut self.ranks[weight]
    }
}

/// Rows produced during one reduction stage, appended to the ranks afterwards
#[derive(Debug, Default)]
pub(crate) struct StageRows {
    rows: Vec<Rank>,
}

impl StageRows {
    /// Rows for a structure of `len` ranks plus one carry row
    pub(crate) fn new(len: usize) -> Self {
        Self {
            rows: vec![Rank::new(); len + 1],
        }
    }

    pub(crate) fn push(&mut self, weight: usize, signal: Signal) {
        if self.rows.len() <= weight {
            self.rows.resize_with(weight + 1, Rank::new);
        }
        self.rows[weight].push(signal);
    }

    pub(crate) fn into_rows(self) -> Vec<Rank> {
        self.rows
    }
}
