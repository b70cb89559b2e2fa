//! Arvak hardware-mapping subsystem.
//!
//! This crate maps a logical, all-to-all OpenQASM 2.0 circuit onto a
//! physical device whose qubit connectivity is an arbitrary (possibly
//! directed) graph: it chooses an initial logical-to-physical placement,
//! then walks the program inserting SWAP-equivalent gate sequences so
//! every two-qubit gate lands on a coupled pair. It does not parse QASM,
//! optimise gate count, or emit to a hardware-specific backend — those are
//! the job of collaborating crates; this one owns only the device model
//! and the mapping pass.
//!
//! # Architecture
//!
//! ```text
//! Program (logical, inlined)
//!        │
//!        ▼
//! ┌─────────────┐
//! │ PassManager │ ◄── PropertySet (device, layout, permutation)
//! └─────────────┘
//!        │
//!        ├── ComputeLayoutPass   (linear | eager | bestfit)   — C2
//!        ├── ApplyLayoutPass      (logical → physical rewrite) — C3
//!        └── RoutePass            (swap | steiner)             — C4/C6
//!        │
//!        ▼
//! Program (physical) + final Permutation
//! ```
//!
//! # Example: mapping a circuit onto a linear device
//!
//! ```rust
//! use arvak_compile::{map, Device, LayoutStrategy, MapOptions, MapperKind};
//! use arvak_ir::{Program, QubitId};
//!
//! let device = Device::linear(3).unwrap();
//! let mut program = Program::new("p")
//!     .declare_qreg("q", 3)
//!     .cx(QubitId(0), QubitId(2));
//!
//! let opts = MapOptions::new(LayoutStrategy::Linear, MapperKind::Swap);
//! let permutation = map(&mut program, &device, &opts).unwrap();
//!
//! assert!(permutation.is_bijection());
//! ```
//!
//! # Built-in passes
//!
//! - [`passes::ComputeLayoutPass`]: runs a [`LayoutStrategy`] against the
//!   device in `PropertySet` (C2).
//! - [`passes::ApplyLayoutPass`]: rewrites qubit references through the
//!   computed layout and widens the global register (C3).
//! - [`passes::RoutePass`]: inserts SWAP-equivalent sequences via
//!   [`swap_mapper`] or [`steiner_mapper`], leaving the final permutation
//!   in `PropertySet` (C4/C6).
//!
//! Most callers don't need the `PassManager` directly — [`map`] wires the
//! same three stages as a single function call.
//!
//! # Custom passes
//!
//! Implement the [`Pass`] trait to add a stage to the pipeline:
//!
//! ```rust
//! use arvak_compile::{CompileResult, Pass, PassKind, PropertySet};
//! use arvak_ir::Program;
//!
//! struct LogQubitCount;
//!
//! impl Pass for LogQubitCount {
//!     fn name(&self) -> &str { "log_qubit_count" }
//!     fn kind(&self) -> PassKind { PassKind::Analysis }
//!
//!     fn run(&self, program: &mut Program, _props: &mut PropertySet) -> CompileResult<()> {
//!         tracing::info!(qubits = ?program.qubits_used(), "qubit count");
//!         Ok(())
//!     }
//! }
//! ```

pub mod device;
pub mod error;
pub mod layout;
pub mod layout_applier;
pub mod manager;
pub mod mapper;
pub mod pass;
pub mod permutation;
pub mod property;
pub mod steiner_mapper;
pub mod swap_mapper;
pub mod unitary;

// Built-in passes
pub mod passes;

pub use device::{Device, FIDELITY_1};
pub use error::{CompileError, CompileResult};
pub use layout::LayoutStrategy;
pub use manager::{PassManager, PassManagerBuilder};
pub use mapper::{map, MapOptions, MapperKind};
pub use pass::{Pass, PassKind};
pub use permutation::Permutation;
pub use property::{Layout, PropertySet};
