//! Device — the immutable physical-topology model (C1).
//!
//! Mirrors `CouplingMap`'s precompute-at-construction idiom (all-pairs
//! shortest paths via BFS from every node, eagerly, so routing's inner loop
//! never pays for a BFS), but generalizes it to a directed adjacency with
//! per-qubit and per-edge fidelities, since a coupling here may support a
//! two-qubit gate in only one direction.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::error::{CompileError, CompileResult};

/// Default fidelity assumed for couplings/qubits that don't specify one.
pub const FIDELITY_1: f64 = 0.99;

/// Immutable physical-topology model.
///
/// `adj[i][j]` means a two-qubit gate with control `i` and target `j` is
/// physically realisable; it is not necessarily symmetric. Shortest paths
/// are computed over the *symmetric closure* of `adj` (an edge exists
/// between `i` and `j` if either direction is realisable), since a SWAP
/// chain only needs physical adjacency, not gate direction — direction is
/// resolved separately via the Hadamard sandwich.
#[derive(Debug, Clone)]
pub struct Device {
    name: String,
    n: u32,
    adj: Vec<Vec<bool>>,
    sq_fid: Vec<f64>,
    tq_fid: Vec<Vec<f64>>,
    /// `dist[i][j]`: shortest-path distance over the symmetric closure, or
    /// `u32::MAX` if `i` and `j` are in different connected components.
    dist: Vec<Vec<u32>>,
    /// `pred[i][j]`: predecessor of `j` on the shortest path from `i`, used
    /// to reconstruct `shortest_path`. `u32::MAX` when undefined.
    pred: Vec<Vec<u32>>,
}

impl Device {
    /// Start building a device with `n` qubits, all fidelities defaulted to
    /// [`FIDELITY_1`] and no couplings. Call [`Device::build`] once all
    /// couplings have been added.
    pub fn new(name: impl Into<String>, n: u32) -> CompileResult<Self> {
        if n == 0 {
            return Err(CompileError::InvalidDevice(
                "device must have at least 1 qubit".to_string(),
            ));
        }
        let n_usize = n as usize;
        Ok(Self {
            name: name.into(),
            n,
            adj: vec![vec![false; n_usize]; n_usize],
            sq_fid: vec![FIDELITY_1; n_usize],
            tq_fid: vec![vec![FIDELITY_1; n_usize]; n_usize],
            dist: vec![],
            pred: vec![],
        })
    }

    /// Add a coupling between `src` and `tgt` with the given two-qubit
    /// fidelity. Unless `directed` is set, the reverse direction is added
    /// too with the same fidelity.
    ///
    /// Out-of-range qubits, self-loops, and out-of-range fidelities are
    /// reported via `tracing::warn!` and otherwise ignored, matching the
    /// "reported but ignored" construction-error policy.
    pub fn add_coupling(&mut self, src: u32, tgt: u32, fidelity: f64, directed: bool) {
        if src >= self.n || tgt >= self.n {
            tracing::warn!(src, tgt, n = self.n, "ignoring out-of-range coupling");
            return;
        }
        if src == tgt {
            tracing::warn!(qubit = src, "ignoring self-loop coupling");
            return;
        }
        if !(0.0..=1.0).contains(&fidelity) {
            tracing::warn!(fidelity, "ignoring out-of-range coupling fidelity");
            return;
        }
        let (s, t) = (src as usize, tgt as usize);
        self.adj[s][t] = true;
        self.tq_fid[s][t] = fidelity;
        if !directed {
            self.adj[t][s] = true;
            self.tq_fid[t][s] = fidelity;
        }
    }

    /// Set the single-qubit fidelity of `qubit`. Out-of-range qubits or
    /// fidelities are reported and ignored.
    pub fn set_fidelity(&mut self, qubit: u32, fidelity: f64) {
        if qubit >= self.n {
            tracing::warn!(qubit, n = self.n, "ignoring out-of-range fidelity qubit");
            return;
        }
        if !(0.0..=1.0).contains(&fidelity) {
            tracing::warn!(fidelity, "ignoring out-of-range single-qubit fidelity");
            return;
        }
        self.sq_fid[qubit as usize] = fidelity;
    }

    /// Finalize construction: precompute all-pairs shortest paths. Must be
    /// called before `shortest_path`/`distance` are meaningful.
    #[must_use]
    pub fn build(mut self) -> Self {
        self.precompute_distances();
        self
    }

    fn precompute_distances(&mut self) {
        let n = self.n as usize;
        self.dist = vec![vec![u32::MAX; n]; n];
        self.pred = vec![vec![u32::MAX; n]; n];

        let sym_neighbors = |i: usize| -> Vec<usize> {
            (0..n).filter(|&j| self.adj[i][j] || self.adj[j][i]).collect()
        };

        for src in 0..n {
            self.dist[src][src] = 0;
            let mut queue = VecDeque::new();
            queue.push_back(src);
            while let Some(cur) = queue.pop_front() {
                for nb in sym_neighbors(cur) {
                    if self.dist[src][nb] == u32::MAX {
                        self.dist[src][nb] = self.dist[src][cur] + 1;
                        self.pred[src][nb] = cur as u32;
                        queue.push_back(nb);
                    }
                }
            }
        }
    }

    /// Number of qubits.
    #[inline]
    pub fn qubits(&self) -> u32 {
        self.n
    }

    /// Device name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a two-qubit gate with control `i` and target `j` is
    /// physically realisable (directional).
    #[inline]
    pub fn coupled(&self, i: u32, j: u32) -> bool {
        if i >= self.n || j >= self.n {
            return false;
        }
        self.adj[i as usize][j as usize]
    }

    /// Single-qubit fidelity.
    pub fn fidelity1(&self, i: u32) -> Option<f64> {
        self.sq_fid.get(i as usize).copied()
    }

    /// Two-qubit fidelity between `i` and `j` (meaningful only where
    /// `coupled(i, j)` holds).
    pub fn fidelity2(&self, i: u32, j: u32) -> Option<f64> {
        self.tq_fid.get(i as usize)?.get(j as usize).copied()
    }

    /// Shortest-path distance over the symmetric closure of `adj`, or
    /// `None` if disconnected.
    pub fn distance(&self, i: u32, j: u32) -> Option<u32> {
        let (i, j) = (i as usize, j as usize);
        let d = *self.dist.get(i)?.get(j)?;
        (d != u32::MAX).then_some(d)
    }

    /// Shortest path from `src` to `dst`, excluding `src`, including `dst`.
    /// Empty when `src == dst` or no path exists. Fails with
    /// `OutOfRangeQubit` when either index exceeds the device width, per
    /// the domain-error policy in §4.1/§7 — an invalid index is a
    /// programming error, distinct from two valid, disconnected qubits.
    pub fn shortest_path(&self, src: u32, dst: u32) -> CompileResult<Vec<u32>> {
        if src >= self.n {
            return Err(CompileError::OutOfRangeQubit { qubit: src, n: self.n });
        }
        if dst >= self.n {
            return Err(CompileError::OutOfRangeQubit { qubit: dst, n: self.n });
        }
        if src == dst {
            return Ok(vec![]);
        }
        let (s, d) = (src as usize, dst as usize);
        if self.dist[s][d] == u32::MAX {
            return Ok(vec![]);
        }

        let mut full = vec![dst];
        let mut current = d;
        while current != s {
            let p = self.pred[s][current];
            if p == u32::MAX {
                return Ok(vec![]);
            }
            full.push(p);
            current = p as usize;
        }
        full.reverse();
        // `full` currently includes `src` as its first element; the
        // contract excludes it.
        Ok(full.into_iter().skip(1).collect())
    }

    /// Create a linear chain `0 - 1 - 2 - ... - (n-1)`.
    pub fn linear(n: u32) -> CompileResult<Self> {
        let mut d = Self::new("linear", n)?;
        for i in 0..n.saturating_sub(1) {
            d.add_coupling(i, i + 1, FIDELITY_1, false);
        }
        Ok(d.build())
    }

    /// Create a fully connected device.
    pub fn full(n: u32) -> CompileResult<Self> {
        let mut d = Self::new("full", n)?;
        for i in 0..n {
            for j in (i + 1)..n {
                d.add_coupling(i, j, FIDELITY_1, false);
            }
        }
        Ok(d.build())
    }

    /// Create a ring `0 - 1 - ... - (n-1) - 0`.
    pub fn ring(n: u32) -> CompileResult<Self> {
        let mut d = Self::new("ring", n)?;
        for i in 0..n {
            d.add_coupling(i, (i + 1) % n, FIDELITY_1, false);
        }
        Ok(d.build())
    }

    /// Serialize to the device JSON wire format.
    pub fn to_json(&self) -> CompileResult<String> {
        let mut couplings = Vec::new();
        for i in 0..self.n {
            for j in (i + 1)..self.n {
                let (s, t) = (i as usize, j as usize);
                match (self.adj[s][t], self.adj[t][s]) {
                    (true, true) => couplings.push(CouplingJson {
                        src: i,
                        tgt: j,
                        fidelity: Some(self.tq_fid[s][t]),
                        directed: false,
                    }),
                    (true, false) => couplings.push(CouplingJson {
                        src: i,
                        tgt: j,
                        fidelity: Some(self.tq_fid[s][t]),
                        directed: true,
                    }),
                    (false, true) => couplings.push(CouplingJson {
                        src: j,
                        tgt: i,
                        fidelity: Some(self.tq_fid[t][s]),
                        directed: true,
                    }),
                    (false, false) => {}
                }
            }
        }
        let dto = DeviceJson {
            name: self.name.clone(),
            n: self.n,
            couplings,
            sq_fidelity: Some(self.sq_fid.clone()),
        };
        serde_json::to_string_pretty(&dto)
            .map_err(|e| CompileError::InvalidDevice(format!("serialization failed: {e}")))
    }

    /// Deserialize from the device JSON wire format, validating and
    /// finalizing (`build()`) in one step.
    pub fn from_json(text: &str) -> CompileResult<Self> {
        let dto: DeviceJson = serde_json::from_str(text)
            .map_err(|e| CompileError::InvalidDevice(format!("malformed device JSON: {e}")))?;

        let mut device = Self::new(dto.name, dto.n)?;
        for c in dto.couplings {
            let fidelity = c.fidelity.unwrap_or(FIDELITY_1);
            device.add_coupling(c.src, c.tgt, fidelity, c.directed);
        }
        if let Some(sq) = dto.sq_fidelity {
            for (q, f) in sq.into_iter().enumerate() {
                device.set_fidelity(q as u32, f);
            }
        }
        Ok(device.build())
    }
}

/// On-wire representation of a single coupling edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CouplingJson {
    src: u32,
    tgt: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fidelity: Option<f64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    directed: bool,
}

/// On-wire representation of a [`Device`].
///
/// Kept distinct from the runtime `Device` so the precomputed `dist`/`pred`
/// tables are never serialized; `from_json` rebuilds them from the edge
/// list, mirroring `CouplingMap`'s existing `#[serde(skip)]` +
/// `rebuild_caches` split.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DeviceJson {
    name: String,
    n: u32,
    couplings: Vec<CouplingJson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sq_fidelity: Option<Vec<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_shortest_path() {
        let d = Device::linear(3).unwrap();
        assert!(d.coupled(0, 1));
        assert!(d.coupled(1, 0));
        assert!(!d.coupled(0, 2));
        assert_eq!(d.distance(0, 2), Some(2));
        assert_eq!(d.shortest_path(0, 2).unwrap(), vec![1, 2]);
        assert_eq!(d.shortest_path(0, 0).unwrap(), Vec::<u32>::new());
    }

    #[test]
    fn test_shortest_path_out_of_range_is_domain_error() {
        let d = Device::linear(3).unwrap();
        let err = d.shortest_path(0, 3).unwrap_err();
        assert!(matches!(err, CompileError::OutOfRangeQubit { qubit: 3, n: 3 }));
        let err = d.shortest_path(5, 0).unwrap_err();
        assert!(matches!(err, CompileError::OutOfRangeQubit { qubit: 5, n: 3 }));
    }

    #[test]
    fn test_directed_edge() {
        let mut d = Device::new("d", 2).unwrap();
        d.add_coupling(0, 1, 0.95, true);
        let d = d.build();
        assert!(d.coupled(0, 1));
        assert!(!d.coupled(1, 0));
        // distance is still 1 in the symmetric closure
        assert_eq!(d.distance(0, 1), Some(1));
        assert_eq!(d.distance(1, 0), Some(1));
    }

    #[test]
    fn test_disconnected() {
        let mut d = Device::new("d", 4).unwrap();
        d.add_coupling(0, 1, FIDELITY_1, false);
        d.add_coupling(2, 3, FIDELITY_1, false);
        let d = d.build();
        assert_eq!(d.distance(0, 2), None);
        assert_eq!(d.shortest_path(0, 2).unwrap(), Vec::<u32>::new());
    }

    #[test]
    fn test_symmetry() {
        let d = Device::ring(5).unwrap();
        for i in 0..5 {
            for j in 0..5 {
                assert_eq!(d.distance(i, j), d.distance(j, i));
            }
        }
    }

    #[test]
    fn test_invalid_device() {
        assert!(Device::new("empty", 0).is_err());
    }

    #[test]
    fn test_ignores_out_of_range_coupling() {
        let mut d = Device::new("d", 2).unwrap();
        d.add_coupling(0, 5, FIDELITY_1, false);
        let d = d.build();
        assert!(!d.coupled(0, 5));
    }

    #[test]
    fn test_json_round_trip() {
        let d = Device::linear(3).unwrap();
        let json = d.to_json().unwrap();
        let back = Device::from_json(&json).unwrap();
        assert_eq!(back.qubits(), 3);
        assert!(back.coupled(0, 1));
        assert!(back.coupled(1, 2));
        assert_eq!(back.shortest_path(0, 2).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_json_default_fidelity() {
        let json = r#"{"name":"d","n":2,"couplings":[{"src":0,"tgt":1}]}"#;
        let d = Device::from_json(json).unwrap();
        assert_eq!(d.fidelity2(0, 1), Some(FIDELITY_1));
    }
}
