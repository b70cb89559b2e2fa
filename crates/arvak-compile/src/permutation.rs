//! Permutation (C5) — the running logical-to-physical relocation SwapMapper
//! maintains as it inserts SWAPs.
//!
//! Distinct from [`crate::layout::Layout`]: `Layout` is the one-shot initial
//! assignment consumed by `LayoutApplier`; `Permutation` is mutated in place,
//! purely in the physical-index domain, for the duration of a single
//! `SwapMapper` pass. Kept as a plain array-based bijection (rather than
//! `Layout`'s `FxHashMap`-keyed structure) since every index here is already
//! a physical slot and a SWAP is a hot, O(1) pointer exchange.

use serde::{Deserialize, Serialize};

/// A bijection over physical-qubit indices `{0..n-1} -> {0..n-1}`.
///
/// `forward[i]` is the physical slot currently holding whatever started in
/// slot `i`; `inverse[p]` is the inverse lookup, kept in sync so a SWAP
/// between two physical slots is O(1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permutation {
    forward: Vec<u32>,
    inverse: Vec<u32>,
}

impl Permutation {
    /// The identity permutation on `{0..n-1}`.
    pub fn identity(n: u32) -> Self {
        let v: Vec<u32> = (0..n).collect();
        Self {
            forward: v.clone(),
            inverse: v,
        }
    }

    /// Number of qubits this permutation covers.
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// Whether this permutation covers zero qubits.
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Current physical slot holding whatever started in slot `i`.
    pub fn get(&self, i: u32) -> u32 {
        self.forward[i as usize]
    }

    /// The slot that originally held whatever currently sits in physical
    /// slot `p`.
    pub fn origin_of(&self, p: u32) -> u32 {
        self.inverse[p as usize]
    }

    /// Record a SWAP between physical slots `p` and `q`: whichever entries
    /// currently point at `p` and `q` are exchanged.
    pub fn swap(&mut self, p: u32, q: u32) {
        if p == q {
            return;
        }
        let (p, q) = (p as usize, q as usize);
        let li = self.inverse[p] as usize;
        let lj = self.inverse[q] as usize;
        self.forward[li] = q as u32;
        self.forward[lj] = p as u32;
        self.inverse[p] = lj as u32;
        self.inverse[q] = li as u32;
    }

    /// Whether this is in fact a bijection over `{0..n-1}` — every slot
    /// appears exactly once in `forward`.
    pub fn is_bijection(&self) -> bool {
        let mut seen = vec![false; self.forward.len()];
        for &p in &self.forward {
            let Some(slot) = seen.get_mut(p as usize) else {
                return false;
            };
            if *slot {
                return false;
            }
            *slot = true;
        }
        seen.into_iter().all(|s| s)
    }

    /// Iterate over `(initial_slot, current_physical_slot)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.forward
            .iter()
            .enumerate()
            .map(|(i, &p)| (i as u32, p))
    }

    /// Consume into the raw forward mapping.
    pub fn into_vec(self) -> Vec<u32> {
        self.forward
    }
}
