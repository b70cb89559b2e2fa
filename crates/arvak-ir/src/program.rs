//! Linear program representation.
//!
//! Hardware mapping never reorders statements, so unlike the dataflow DAG
//! used elsewhere in the stack for reorderable optimisation passes, a
//! [`Program`] is a plain ordered list: declarations followed by
//! instructions, rewritten and spliced in place.

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::StandardGate;
use crate::instruction::{Instruction, SourceSpan};
use crate::qubit::{ClbitId, QubitId};

/// Quantum register declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QregDecl {
    /// Register name.
    pub name: String,
    /// Number of qubits in the register.
    pub size: u32,
}

/// Classical register declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CregDecl {
    /// Register name.
    pub name: String,
    /// Number of classical bits in the register.
    pub size: u32,
}

/// A single top-level statement in a program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    /// Quantum register declaration.
    Qreg(QregDecl),
    /// Classical register declaration.
    Creg(CregDecl),
    /// An instruction (gate, measurement, reset, or barrier).
    Instr(Instruction),
}

impl Statement {
    /// Borrow the instruction, if this statement is one.
    pub fn as_instr(&self) -> Option<&Instruction> {
        match self {
            Statement::Instr(i) => Some(i),
            _ => None,
        }
    }

    /// Mutably borrow the instruction, if this statement is one.
    pub fn as_instr_mut(&mut self) -> Option<&mut Instruction> {
        match self {
            Statement::Instr(i) => Some(i),
            _ => None,
        }
    }
}

/// A named sequence of statements: the mapper's unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// Program name.
    pub name: String,
    /// Ordered statements.
    pub statements: Vec<Statement>,
}

impl Program {
    /// Create a new, empty program.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            statements: Vec::new(),
        }
    }

    /// Declare a quantum register.
    #[must_use]
    pub fn declare_qreg(mut self, name: impl Into<String>, size: u32) -> Self {
        self.statements.push(Statement::Qreg(QregDecl {
            name: name.into(),
            size,
        }));
        self
    }

    /// Declare a classical register.
    #[must_use]
    pub fn declare_creg(mut self, name: impl Into<String>, size: u32) -> Self {
        self.statements.push(Statement::Creg(CregDecl {
            name: name.into(),
            size,
        }));
        self
    }

    /// Append an instruction.
    pub fn push(&mut self, instr: Instruction) {
        self.statements.push(Statement::Instr(instr));
    }

    /// Append a single-qubit gate.
    #[must_use]
    pub fn gate1(mut self, gate: StandardGate, qubit: QubitId) -> Self {
        self.push(Instruction::single_qubit_gate(gate, qubit));
        self
    }

    /// Append a Hadamard.
    #[must_use]
    pub fn h(self, qubit: QubitId) -> Self {
        self.gate1(StandardGate::H, qubit)
    }

    /// Append a CNOT.
    #[must_use]
    pub fn cx(mut self, control: QubitId, target: QubitId) -> Self {
        self.push(Instruction::two_qubit_gate(StandardGate::CX, control, target));
        self
    }

    /// Append a measurement.
    #[must_use]
    pub fn measure(mut self, qubit: QubitId, clbit: ClbitId) -> Self {
        self.push(Instruction::measure(qubit, clbit));
        self
    }

    /// Append a barrier over the given qubits.
    #[must_use]
    pub fn barrier(mut self, qubits: impl IntoIterator<Item = QubitId>) -> Self {
        self.push(Instruction::barrier(qubits));
        self
    }

    /// Find the size of a declared quantum register.
    pub fn qreg_size(&self, name: &str) -> IrResult<u32> {
        self.statements
            .iter()
            .find_map(|s| match s {
                Statement::Qreg(q) if q.name == name => Some(q.size),
                _ => None,
            })
            .ok_or_else(|| IrError::UnknownRegister(name.to_string()))
    }

    /// Update the declared size of a quantum register, in place.
    ///
    /// Used by the layout applier after it has widened the logical
    /// register to cover every physical qubit the device exposes.
    pub fn set_qreg_size(&mut self, name: &str, size: u32) -> IrResult<()> {
        for s in &mut self.statements {
            if let Statement::Qreg(q) = s {
                if q.name == name {
                    q.size = size;
                    return Ok(());
                }
            }
        }
        Err(IrError::UnknownRegister(name.to_string()))
    }

    /// Iterate over instruction statements only.
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.statements.iter().filter_map(Statement::as_instr)
    }

    /// Iterate over instruction statements mutably.
    pub fn instructions_mut(&mut self) -> impl Iterator<Item = &mut Instruction> {
        self.statements.iter_mut().filter_map(Statement::as_instr_mut)
    }

    /// Highest qubit index referenced anywhere in the program, plus one.
    /// `None` if no instruction references any qubit.
    pub fn qubits_used(&self) -> Option<u32> {
        self.instructions()
            .flat_map(|i| i.qubits.iter())
            .map(|q| q.0)
            .max()
            .map(|m| m + 1)
    }

    /// Copy a [`SourceSpan`] from one instruction forward onto a newly
    /// synthesized one, per the mapper's "inherit the span of the gate
    /// being replaced" convention.
    pub fn inherit_span(source: &Instruction, mut target: Instruction) -> Instruction {
        target.span = source.span;
        target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_bell_state() {
        let program = Program::new("bell")
            .declare_qreg("q", 2)
            .declare_creg("c", 2)
            .h(QubitId(0))
            .cx(QubitId(0), QubitId(1))
            .measure(QubitId(0), ClbitId(0))
            .measure(QubitId(1), ClbitId(1));

        assert_eq!(program.qreg_size("q").unwrap(), 2);
        assert_eq!(program.instructions().count(), 4);
        assert_eq!(program.qubits_used(), Some(2));
    }

    #[test]
    fn test_unknown_register() {
        let program = Program::new("p").declare_qreg("q", 2);
        assert!(matches!(
            program.qreg_size("missing"),
            Err(IrError::UnknownRegister(_))
        ));
    }

    #[test]
    fn test_set_qreg_size() {
        let mut program = Program::new("p").declare_qreg("q", 2);
        program.set_qreg_size("q", 5).unwrap();
        assert_eq!(program.qreg_size("q").unwrap(), 5);
    }

    #[test]
    fn test_inherit_span() {
        let original = Instruction::single_qubit_gate(StandardGate::H, QubitId(0))
            .with_span(SourceSpan::new(3, 1));
        let swap = Instruction::two_qubit_gate(StandardGate::Swap, QubitId(0), QubitId(1));
        let carried = Program::inherit_span(&original, swap);
        assert_eq!(carried.span, Some(SourceSpan::new(3, 1)));
    }
}
