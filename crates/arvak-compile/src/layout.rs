//! Layout strategies (C2): choose an initial logical→physical assignment.
//!
//! All three strategies assume logical qubits `0..k-1`, where `k` is the
//! declared size of the configured global register, and fail with
//! `InsufficientQubits` when `k` exceeds the device width.

use rustc_hash::FxHashMap;
use std::collections::HashSet;

use arvak_ir::{Program, QubitId};

use crate::device::Device;
use crate::error::{CompileError, CompileResult};
use crate::property::Layout;

/// Selects which layout algorithm to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutStrategy {
    /// Identity assignment: logical `i` -> physical `i`.
    Linear,
    /// First-encounter order over the program's statements.
    Eager,
    /// Greedy assignment informed by the two-qubit interaction graph.
    Bestfit,
}

impl LayoutStrategy {
    /// Parse a selector string (`"linear" | "eager" | "bestfit"`).
    pub fn parse(s: &str) -> CompileResult<Self> {
        match s {
            "linear" => Ok(LayoutStrategy::Linear),
            "eager" => Ok(LayoutStrategy::Eager),
            "bestfit" => Ok(LayoutStrategy::Bestfit),
            other => Err(CompileError::UnsupportedLayout(other.to_string())),
        }
    }

    /// Compute a layout for `program` against `device`, over the qubits
    /// declared in register `register`.
    pub fn compute(self, program: &Program, device: &Device, register: &str) -> CompileResult<Layout> {
        let k = program.qreg_size(register)?;
        let n = device.qubits();
        if k > n {
            return Err(CompileError::InsufficientQubits {
                required: k,
                available: n,
            });
        }
        match self {
            LayoutStrategy::Linear => Ok(linear(k)),
            LayoutStrategy::Eager => Ok(eager(program, k)),
            LayoutStrategy::Bestfit => Ok(bestfit(program, device, k)),
        }
    }
}

fn linear(k: u32) -> Layout {
    let mut layout = Layout::new();
    for i in 0..k {
        layout.add(QubitId(i), i);
    }
    layout
}

fn eager(program: &Program, k: u32) -> Layout {
    let mut layout = Layout::new();
    let mut next_physical = 0u32;
    for instr in program.instructions() {
        for &q in &instr.qubits {
            if layout.get_physical(q).is_none() {
                layout.add(q, next_physical);
                next_physical += 1;
            }
        }
    }
    for logical in 0..k {
        if layout.get_physical(QubitId(logical)).is_none() {
            layout.add(QubitId(logical), next_physical);
            next_physical += 1;
        }
    }
    layout
}

fn bestfit(program: &Program, device: &Device, k: u32) -> Layout {
    let n = device.qubits();

    // Interaction graph: symmetric pair -> two-qubit-gate count.
    let mut weights: FxHashMap<(u32, u32), u32> = FxHashMap::default();
    for instr in program.instructions() {
        if instr.is_two_qubit_gate() {
            let a = instr.qubits[0].0;
            let b = instr.qubits[1].0;
            let key = if a < b { (a, b) } else { (b, a) };
            *weights.entry(key).or_insert(0) += 1;
        }
    }
    let mut interaction_edges: Vec<((u32, u32), u32)> = weights.into_iter().collect();
    interaction_edges.sort_by(|x, y| y.1.cmp(&x.1).then(x.0.cmp(&y.0)));

    // Device edges sorted by descending fidelity, ties by lowest index pair.
    let mut device_edges: Vec<(u32, u32, f64)> = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            if device.coupled(i, j) || device.coupled(j, i) {
                let f = device
                    .fidelity2(i, j)
                    .unwrap_or(0.0)
                    .max(device.fidelity2(j, i).unwrap_or(0.0));
                device_edges.push((i, j, f));
            }
        }
    }
    device_edges.sort_by(|x, y| {
        y.2.partial_cmp(&x.2)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(x.0.cmp(&y.0))
            .then(x.1.cmp(&y.1))
    });

    let mut layout = Layout::new();
    let mut used: HashSet<u32> = HashSet::new();

    let best_unused_neighbor = |anchor: u32, used: &HashSet<u32>| -> Option<u32> {
        let mut candidates: Vec<(u32, f64)> = (0..n)
            .filter(|&p| p != anchor && !used.contains(&p))
            .filter(|&p| device.coupled(anchor, p) || device.coupled(p, anchor))
            .map(|p| {
                let f = device
                    .fidelity2(anchor, p)
                    .unwrap_or(0.0)
                    .max(device.fidelity2(p, anchor).unwrap_or(0.0));
                (p, f)
            })
            .collect();
        candidates.sort_by(|x, y| {
            y.1.partial_cmp(&x.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(x.0.cmp(&y.0))
        });
        candidates.first().map(|&(p, _)| p)
    };

    let lowest_unused = |used: &HashSet<u32>| -> Option<u32> { (0..n).find(|p| !used.contains(p)) };

    for ((a, b), _weight) in interaction_edges {
        let pa = layout.get_physical(QubitId(a));
        let pb = layout.get_physical(QubitId(b));
        match (pa, pb) {
            (Some(_), Some(_)) => {}
            (None, None) => {
                if let Some(&(p, q, _)) = device_edges
                    .iter()
                    .find(|(p, q, _)| !used.contains(p) && !used.contains(q))
                {
                    layout.add(QubitId(a), p);
                    layout.add(QubitId(b), q);
                    used.insert(p);
                    used.insert(q);
                }
            }
            (Some(p), None) => {
                let target = best_unused_neighbor(p, &used).or_else(|| lowest_unused(&used));
                if let Some(q) = target {
                    layout.add(QubitId(b), q);
                    used.insert(q);
                }
            }
            (None, Some(p)) => {
                let target = best_unused_neighbor(p, &used).or_else(|| lowest_unused(&used));
                if let Some(q) = target {
                    layout.add(QubitId(a), q);
                    used.insert(q);
                }
            }
        }
    }

    for logical in 0..k {
        if layout.get_physical(QubitId(logical)).is_none() {
            if let Some(p) = lowest_unused(&used) {
                layout.add(QubitId(logical), p);
                used.insert(p);
            }
        }
    }

    layout
}

#[cfg(test)]
mod tests {
    use super::*;
    use arvak_ir::StandardGate;

    #[test]
    fn test_parse() {
        assert_eq!(LayoutStrategy::parse("linear").unwrap(), LayoutStrategy::Linear);
        assert_eq!(LayoutStrategy::parse("eager").unwrap(), LayoutStrategy::Eager);
        assert_eq!(LayoutStrategy::parse("bestfit").unwrap(), LayoutStrategy::Bestfit);
        assert!(LayoutStrategy::parse("bogus").is_err());
    }

    #[test]
    fn test_linear_layout() {
        let device = Device::linear(3).unwrap();
        let program = Program::new("p").declare_qreg("q", 3);
        let layout = LayoutStrategy::Linear.compute(&program, &device, "q").unwrap();
        for i in 0..3 {
            assert_eq!(layout.get_physical(QubitId(i)), Some(i));
        }
    }

    #[test]
    fn test_eager_layout_reverse_order() {
        let device = Device::linear(3).unwrap();
        let program = Program::new("p")
            .declare_qreg("q", 3)
            .cx(QubitId(2), QubitId(0));
        let layout = LayoutStrategy::Eager.compute(&program, &device, "q").unwrap();
        // q2 is encountered first, so it gets physical 0.
        assert_eq!(layout.get_physical(QubitId(2)), Some(0));
        assert_eq!(layout.get_physical(QubitId(0)), Some(1));
        assert_eq!(layout.get_physical(QubitId(1)), Some(2));
    }

    #[test]
    fn test_insufficient_qubits() {
        let device = Device::linear(2).unwrap();
        let program = Program::new("p").declare_qreg("q", 3);
        let err = LayoutStrategy::Linear.compute(&program, &device, "q").unwrap_err();
        assert!(matches!(err, CompileError::InsufficientQubits { .. }));
    }

    #[test]
    fn test_bestfit_places_pairs_on_opposite_edges() {
        let device = Device::ring(4).unwrap();
        let program = Program::new("p")
            .declare_qreg("q", 4)
            .gate1(StandardGate::I, QubitId(0))
            .cx(QubitId(0), QubitId(1))
            .cx(QubitId(0), QubitId(1))
            .cx(QubitId(2), QubitId(3))
            .cx(QubitId(2), QubitId(3));
        let layout = LayoutStrategy::Bestfit.compute(&program, &device, "q").unwrap();

        let pa = layout.get_physical(QubitId(0)).unwrap();
        let pb = layout.get_physical(QubitId(1)).unwrap();
        let pc = layout.get_physical(QubitId(2)).unwrap();
        let pd = layout.get_physical(QubitId(3)).unwrap();
        assert!(device.coupled(pa, pb) || device.coupled(pb, pa));
        assert!(device.coupled(pc, pd) || device.coupled(pd, pc));
    }
}
