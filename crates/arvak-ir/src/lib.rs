//! Arvak circuit intermediate representation (QASM 2.0 mapping subset)
//!
//! This crate provides the data structures the hardware-mapping subsystem
//! rewrites: qubits, standard gates, parameter expressions, instructions,
//! and the linear [`Program`] that holds them.
//!
//! Unlike the full `arvak` stack's DAG-based IR (used elsewhere for
//! reorderable optimisation passes), mapping never reorders statements, so
//! this crate represents a program as a plain ordered list rather than a
//! graph.
//!
//! # Example: building a Bell-state program
//!
//! ```rust
//! use arvak_ir::{Program, QubitId, ClbitId};
//!
//! let program = Program::new("bell_state")
//!     .declare_qreg("q", 2)
//!     .declare_creg("c", 2)
//!     .h(QubitId(0))
//!     .cx(QubitId(0), QubitId(1))
//!     .measure(QubitId(0), ClbitId(0))
//!     .measure(QubitId(1), ClbitId(1));
//!
//! assert_eq!(program.qreg_size("q").unwrap(), 2);
//! assert_eq!(program.instructions().count(), 4);
//! ```

pub mod error;
pub mod gate;
pub mod instruction;
pub mod parameter;
pub mod program;
pub mod qubit;

pub use error::{IrError, IrResult};
pub use gate::{ClassicalCondition, StandardGate};
pub use instruction::{Instruction, InstructionKind, SourceSpan};
pub use parameter::ParameterExpression;
pub use program::{CregDecl, Program, QregDecl, Statement};
pub use qubit::{Clbit, ClbitId, Qubit, QubitId};
