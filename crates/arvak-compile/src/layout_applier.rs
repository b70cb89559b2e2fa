//! LayoutApplier (C3) — one-shot destructive rewrite from logical to
//! physical qubit references.
//!
//! Consumes a [`Layout`] exactly once: every qubit reference in the
//! program is rewritten in place from a logical index to its assigned
//! physical index, and the configured register is widened to the
//! device's full width so every instruction afterward already speaks in
//! physical coordinates — `SwapMapper`/`SteinerMapper` never see a
//! logical qubit.

use arvak_ir::{Program, QubitId};

use crate::error::{CompileError, CompileResult};
use crate::property::Layout;

/// Rewrite `program`'s qubit references through `layout` and resize its
/// `register` declaration to `device_width`.
///
/// Every qubit reference is assumed to belong to `register` already
/// (ancilla qubits from other registers are not modelled); a reference
/// with no entry in `layout` is an internal error, reported as
/// `InvalidDevice` since it can only mean the layout was computed
/// against a different program.
pub fn apply(program: &mut Program, layout: &Layout, register: &str, device_width: u32) -> CompileResult<()> {
    for instr in program.instructions_mut() {
        for q in &mut instr.qubits {
            let physical = layout.get_physical(*q).ok_or_else(|| {
                CompileError::InvalidDevice(format!(
                    "qubit {q} has no assignment in the computed layout"
                ))
            })?;
            *q = QubitId(physical);
        }
    }
    program.set_qreg_size(register, device_width)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arvak_ir::ClbitId;

    #[test]
    fn test_apply_rewrites_and_resizes() {
        let mut program = Program::new("p")
            .declare_qreg("q", 2)
            .cx(QubitId(0), QubitId(1))
            .measure(QubitId(1), ClbitId(0));

        let mut layout = Layout::new();
        layout.add(QubitId(0), 3);
        layout.add(QubitId(1), 1);

        apply(&mut program, &layout, "q", 5).unwrap();

        assert_eq!(program.qreg_size("q").unwrap(), 5);
        let instrs: Vec<_> = program.instructions().collect();
        assert_eq!(instrs[0].qubits, vec![QubitId(3), QubitId(1)]);
        assert_eq!(instrs[1].qubits, vec![QubitId(1)]);
    }

    #[test]
    fn test_apply_missing_mapping_errors() {
        let mut program = Program::new("p").declare_qreg("q", 2).cx(QubitId(0), QubitId(1));
        let layout = Layout::new();
        let err = apply(&mut program, &layout, "q", 4).unwrap_err();
        assert!(matches!(err, CompileError::InvalidDevice(_)));
    }
}
