//! SwapMapper (C4) — the heart of the system.
//!
//! Walks the program in order; for each two-qubit gate, consults the
//! [`Device`] for a shortest path, emits a sequence of physical CNOTs
//! implementing the required SWAPs plus the final gate, and updates a
//! mutable [`Permutation`] reflecting the new logical placement.
//!
//! Rebuilds a new `Vec<Statement>` rather than splicing into the existing
//! one, mirroring `BasicRouting`'s rebuild-a-new-DAG idiom in the teacher
//! crate, adapted to a linear statement list.

use arvak_ir::{
    ClassicalCondition, Instruction, InstructionKind, Program, QubitId, SourceSpan, Statement,
    StandardGate,
};

use crate::device::Device;
use crate::error::{CompileError, CompileResult};
use crate::permutation::Permutation;

/// Route `program` onto `device`, rewriting it in place and returning the
/// final permutation.
///
/// Precondition: `LayoutApplier` has already run, so every qubit reference
/// in `program` is a physical index, and the program's global register is
/// exactly `device.qubits()` wide.
pub fn map(program: &mut Program, device: &Device) -> CompileResult<Permutation> {
    let n = device.qubits();
    let mut pi = Permutation::identity(n);
    let mut out = Vec::with_capacity(program.statements.len());

    for stmt in program.statements.drain(..) {
        match stmt {
            Statement::Qreg(_) | Statement::Creg(_) => out.push(stmt),
            Statement::Instr(instr) => {
                if instr.is_two_qubit_gate() {
                    route_one(&mut out, device, &mut pi, instr)?;
                } else {
                    out.push(Statement::Instr(rewrite_refs(instr, &pi)));
                }
            }
        }
    }

    program.statements = out;
    Ok(pi)
}

/// Rewrite every qubit reference in `instr` through the current
/// permutation. Used for single-qubit gates, measurements, resets, and
/// barriers, which never trigger SWAP insertion.
///
/// Exposed to `steiner_mapper`, which falls back to per-gate rewriting
/// outside the CX runs it batches.
pub(crate) fn rewrite_refs(mut instr: Instruction, pi: &Permutation) -> Instruction {
    for q in &mut instr.qubits {
        *q = QubitId(pi.get(q.0));
    }
    instr
}

/// Route a single two-qubit gate: find its shortest path on `device` and
/// emit the SWAP chain plus final gate. Exposed to `steiner_mapper` as the
/// fallback for gates outside a batched CX run.
pub(crate) fn route_one(
    out: &mut Vec<Statement>,
    device: &Device,
    pi: &mut Permutation,
    instr: Instruction,
) -> CompileResult<()> {
    let control = pi.get(instr.qubits[0].0);
    let target = pi.get(instr.qubits[1].0);
    let span = instr.span;
    let condition = instr.condition;

    let path = device.shortest_path(control, target)?;
    if path.is_empty() {
        return Err(CompileError::DisconnectedQubits(control, target));
    }

    let mut cursor = control;
    for j in path {
        if j == target {
            // Only the final step carries the original gate's classical
            // condition: the SWAP chain that gets us here is routing
            // machinery, but this step is the gate itself (possibly
            // expanded into a Hadamard sandwich), so every instruction it
            // emits must be guarded the same way the source gate was.
            emit_cnot(out, device, cursor, j, span, condition)?;
            break;
        } else {
            emit_swap(out, device, pi, cursor, j, span)?;
            cursor = j;
        }
    }
    Ok(())
}

/// Emit a SWAP between adjacent physical slots `a` and `b` as three CNOTs,
/// then update the permutation.
///
/// Labels are oriented so the first (and third) CNOT goes along the
/// directly supported direction when one exists, minimising the number of
/// Hadamard sandwiches `emit_cnot` needs to synthesize.
fn emit_swap(
    out: &mut Vec<Statement>,
    device: &Device,
    pi: &mut Permutation,
    a: u32,
    b: u32,
    span: Option<SourceSpan>,
) -> CompileResult<()> {
    let (x, y) = if device.coupled(a, b) { (a, b) } else { (b, a) };
    emit_cnot(out, device, x, y, span, None)?;
    emit_cnot(out, device, y, x, span, None)?;
    emit_cnot(out, device, x, y, span, None)?;
    pi.swap(a, b);
    tracing::debug!(a, b, "inserted swap");
    Ok(())
}

/// Emit a physical CNOT with the given control/target, used both to finish
/// a local two-qubit gate and to emit each of a SWAP's three constituent
/// CNOTs. If the direction is not directly supported but the reverse is,
/// applies the Hadamard-sandwich identity:
/// `CNOT c t = H c ; H t ; CNOT t c ; H c ; H t`.
///
/// `condition` is attached to every instruction this call emits. SWAP's
/// three internal calls pass `None`; only the call representing the
/// original gate's final step carries its source condition, so the whole
/// (possibly Hadamard-sandwiched) expansion of that gate stays guarded.
pub(crate) fn emit_cnot(
    out: &mut Vec<Statement>,
    device: &Device,
    control: u32,
    target: u32,
    span: Option<SourceSpan>,
    condition: Option<ClassicalCondition>,
) -> CompileResult<()> {
    if device.coupled(control, target) {
        push(
            out,
            Instruction::two_qubit_gate(StandardGate::CX, QubitId(control), QubitId(target)),
            span,
            condition,
        );
    } else if device.coupled(target, control) {
        tracing::debug!(control, target, "hadamard-sandwich reversing cnot direction");
        let h = || StandardGate::hadamard_as_u();
        push(out, Instruction::single_qubit_gate(h(), QubitId(control)), span, condition.clone());
        push(out, Instruction::single_qubit_gate(h(), QubitId(target)), span, condition.clone());
        push(
            out,
            Instruction::two_qubit_gate(StandardGate::CX, QubitId(target), QubitId(control)),
            span,
            condition.clone(),
        );
        push(out, Instruction::single_qubit_gate(h(), QubitId(control)), span, condition.clone());
        push(out, Instruction::single_qubit_gate(h(), QubitId(target)), span, condition);
    } else {
        return Err(CompileError::DisconnectedQubits(control, target));
    }
    Ok(())
}

fn push(
    out: &mut Vec<Statement>,
    mut instr: Instruction,
    span: Option<SourceSpan>,
    condition: Option<ClassicalCondition>,
) {
    instr.span = span;
    instr.condition = condition;
    out.push(Statement::Instr(instr));
}

/// Check that every two-qubit gate statement in `program` acts on a pair
/// coupled in `device`'s symmetric closure — invariant 1 from the routing
/// contract, exposed for tests.
pub fn all_gates_local(program: &Program, device: &Device) -> bool {
    program.instructions().all(|instr| {
        if !instr.is_two_qubit_gate() {
            return true;
        }
        let a = instr.qubits[0].0;
        let b = instr.qubits[1].0;
        matches!(&instr.kind, InstructionKind::Gate(StandardGate::CX))
            && (device.coupled(a, b) || device.coupled(b, a))
    })
}
