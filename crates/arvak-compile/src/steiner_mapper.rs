//! SteinerMapper (C6) — alternate mapper tuned for CNOT-dense regions.
//!
//! Batches maximal runs of unconditional `CX` gates, folds their combined
//! effect into a parity matrix, and resynthesizes it as a device-local
//! CNOT sequence via Steiner-tree-restricted Gaussian elimination, then
//! re-emits through the same `emit_cnot` helper `swap_mapper` uses.
//! Everything outside such a run — lone two-qubit gates, single-qubit
//! gates, measurements, resets, barriers — falls back to `swap_mapper`'s
//! per-gate SWAP-chain routing.
//!
//! This is a heuristic synthesis, not a CNOT-count-optimal one: the
//! Steiner tree is restricted to the qubits the run actually touches
//! (no routing through unrelated ancillas), and ties in tree construction
//! are broken arbitrarily by BFS order.

use std::collections::{HashMap, HashSet, VecDeque};

use arvak_ir::{Instruction, InstructionKind, Program, Statement, StandardGate};

use crate::device::Device;
use crate::error::{CompileError, CompileResult};
use crate::permutation::Permutation;
use crate::swap_mapper;

/// Minimum run length before Steiner resynthesis is worth its overhead;
/// shorter runs fall back to `swap_mapper`'s per-gate routing.
const MIN_RUN_LEN: usize = 3;

/// Route `program` onto `device` using the Steiner-batching strategy,
/// rewriting it in place and returning the final permutation.
///
/// Same precondition as `swap_mapper::map`: `LayoutApplier` has already
/// run, so qubit references are physical indices.
pub fn map(program: &mut Program, device: &Device) -> CompileResult<Permutation> {
    let n = device.qubits();
    let mut pi = Permutation::identity(n);
    let stmts = std::mem::take(&mut program.statements);
    let mut out = Vec::with_capacity(stmts.len());

    let mut i = 0;
    while i < stmts.len() {
        match &stmts[i] {
            Statement::Qreg(_) | Statement::Creg(_) => {
                out.push(stmts[i].clone());
                i += 1;
            }
            Statement::Instr(instr) if is_plain_cx(instr) => {
                let mut j = i + 1;
                while j < stmts.len() && stmts[j].as_instr().map(is_plain_cx).unwrap_or(false) {
                    j += 1;
                }
                let run: Vec<Instruction> = stmts[i..j]
                    .iter()
                    .map(|s| s.as_instr().unwrap().clone())
                    .collect();
                if run.len() >= MIN_RUN_LEN {
                    synthesize_run(&mut out, device, &pi, &run)?;
                } else {
                    for instr in run {
                        swap_mapper::route_one(&mut out, device, &mut pi, instr)?;
                    }
                }
                i = j;
            }
            Statement::Instr(_) => {
                let instr = stmts[i].as_instr().unwrap().clone();
                if instr.is_two_qubit_gate() {
                    swap_mapper::route_one(&mut out, device, &mut pi, instr)?;
                } else {
                    out.push(Statement::Instr(swap_mapper::rewrite_refs(instr, &pi)));
                }
                i += 1;
            }
        }
    }

    program.statements = out;
    Ok(pi)
}

fn is_plain_cx(instr: &Instruction) -> bool {
    matches!(instr.kind, InstructionKind::Gate(StandardGate::CX)) && instr.condition.is_none()
}

/// Resynthesize a run of plain CX gates as a device-local CNOT sequence.
///
/// Builds the parity matrix the run implements (row `t` is XORed with
/// row `c` for each `CX(c, t)`, in program order), reduces it column by
/// column back to the identity using Steiner-tree-restricted row
/// additions, then emits the recorded eliminations in reverse — reducing
/// a matrix to the identity and reversing the steps realizes the same
/// linear map the original run did, just using only device-local pairs.
fn synthesize_run(
    out: &mut Vec<Statement>,
    device: &Device,
    pi: &Permutation,
    run: &[Instruction],
) -> CompileResult<()> {
    let n = device.qubits() as usize;
    let mut m: Vec<Vec<bool>> = (0..n).map(|r| (0..n).map(|c| c == r).collect()).collect();

    let mut support: HashSet<u32> = HashSet::new();
    let span = run.last().and_then(|i| i.span);

    for instr in run {
        let c = pi.get(instr.qubits[0].0);
        let t = pi.get(instr.qubits[1].0);
        support.insert(c);
        support.insert(t);
        row_xor_into(&mut m, c, t);
    }

    let mut active: Vec<u32> = support.iter().copied().collect();
    active.sort_unstable();

    let mut elimination: Vec<(u32, u32)> = Vec::new();
    for &col in &active {
        reduce_column(device, &mut m, col, &support, &mut elimination)?;
    }

    for (control, target) in elimination.into_iter().rev() {
        // `is_plain_cx` only admits unconditioned CX into a batched run,
        // so the resynthesized CNOTs are never guarded.
        swap_mapper::emit_cnot(out, device, control, target, span, None)?;
    }
    Ok(())
}

fn row_xor_into(m: &mut [Vec<bool>], control: u32, target: u32) {
    let (c, t) = (control as usize, target as usize);
    let src = m[c].clone();
    for (k, bit) in src.into_iter().enumerate() {
        m[t][k] ^= bit;
    }
}

/// Reduce column `col` of `m` to a unit vector (a single `1` at row
/// `col`) using row additions restricted to a Steiner tree spanning the
/// rows currently holding a `1` in that column, rooted at `col`. Leaves
/// fold their contribution into their parent and are then dropped from
/// the tree, one at a time, until only the root remains.
fn reduce_column(
    device: &Device,
    m: &mut [Vec<bool>],
    col: u32,
    support: &HashSet<u32>,
    elimination: &mut Vec<(u32, u32)>,
) -> CompileResult<()> {
    let terminals: HashSet<u32> = support
        .iter()
        .copied()
        .filter(|&i| m[i as usize][col as usize])
        .collect();
    if terminals.is_empty() || (terminals.len() == 1 && terminals.contains(&col)) {
        return Ok(());
    }

    let mut wanted = terminals;
    wanted.insert(col);
    let mut parent_of = steiner_tree(device, support, &wanted, col).ok_or_else(|| {
        let other = *wanted.iter().find(|&&q| q != col).unwrap_or(&col);
        CompileError::DisconnectedQubits(col, other)
    })?;

    loop {
        let mut children_count: HashMap<u32, u32> = HashMap::new();
        for &p in parent_of.values() {
            *children_count.entry(p).or_insert(0) += 1;
        }
        let leaf = parent_of
            .keys()
            .copied()
            .find(|node| children_count.get(node).copied().unwrap_or(0) == 0);
        let Some(leaf) = leaf else { break };
        let parent = parent_of[&leaf];

        if m[leaf as usize][col as usize] {
            row_xor_into(m, leaf, parent);
            elimination.push((leaf, parent));
        }
        parent_of.remove(&leaf);
    }

    Ok(())
}

/// BFS Steiner tree over `support`'s induced subgraph of the device's
/// symmetric closure, rooted at `root`, pruned down to the minimal
/// subtree connecting every qubit in `wanted`. Returns a map from each
/// non-root tree node to its parent. `None` if `wanted` isn't connected
/// within `support`.
fn steiner_tree(
    device: &Device,
    support: &HashSet<u32>,
    wanted: &HashSet<u32>,
    root: u32,
) -> Option<HashMap<u32, u32>> {
    let mut parent: HashMap<u32, u32> = HashMap::new();
    let mut visited: HashSet<u32> = HashSet::new();
    visited.insert(root);
    let mut queue = VecDeque::new();
    queue.push_back(root);

    while let Some(cur) = queue.pop_front() {
        for &nb in support {
            if visited.contains(&nb) {
                continue;
            }
            if device.coupled(cur, nb) || device.coupled(nb, cur) {
                visited.insert(nb);
                parent.insert(nb, cur);
                queue.push_back(nb);
            }
        }
    }

    if !wanted.iter().all(|q| visited.contains(q)) {
        return None;
    }

    let mut keep: HashSet<u32> = HashSet::new();
    keep.insert(root);
    for &w in wanted {
        let mut cur = w;
        while !keep.contains(&cur) {
            keep.insert(cur);
            match parent.get(&cur) {
                Some(&p) => cur = p,
                None => break,
            }
        }
    }
    parent.retain(|node, _| keep.contains(node));
    Some(parent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arvak_ir::QubitId;

    #[test]
    fn test_chain_run_round_trips_identity() {
        // CX(0,1); CX(1,2); CX(0,1) on a linear device recovers a
        // circuit with the same net effect, routed entirely on-edge.
        let device = Device::linear(3).unwrap();
        let mut program = Program::new("p")
            .declare_qreg("q", 3)
            .cx(QubitId(0), QubitId(1))
            .cx(QubitId(1), QubitId(2))
            .cx(QubitId(0), QubitId(1));

        let pi = map(&mut program, &device).unwrap();
        assert!(pi.is_bijection());
        assert!(swap_mapper::all_gates_local(&program, &device));
        for instr in program.instructions() {
            assert!(matches!(instr.kind, InstructionKind::Gate(StandardGate::CX)));
        }
    }

    #[test]
    fn test_short_run_falls_back_to_swap_mapper() {
        let device = Device::linear(3).unwrap();
        let mut program = Program::new("p")
            .declare_qreg("q", 3)
            .cx(QubitId(0), QubitId(1));

        map(&mut program, &device).unwrap();
        let instrs: Vec<_> = program.instructions().collect();
        assert_eq!(instrs.len(), 1);
    }

    #[test]
    fn test_run_on_star_topology_uses_steiner_tree() {
        // Star device: 0 is the hub, 1/2/3 are spokes. A run touching
        // all three spokes must route through the hub.
        let mut d = Device::new("star", 4).unwrap();
        d.add_coupling(0, 1, crate::device::FIDELITY_1, false);
        d.add_coupling(0, 2, crate::device::FIDELITY_1, false);
        d.add_coupling(0, 3, crate::device::FIDELITY_1, false);
        let device = d.build();

        let mut program = Program::new("p")
            .declare_qreg("q", 4)
            .cx(QubitId(1), QubitId(0))
            .cx(QubitId(0), QubitId(2))
            .cx(QubitId(2), QubitId(3));

        map(&mut program, &device).unwrap();
        assert!(swap_mapper::all_gates_local(&program, &device));
    }
}
