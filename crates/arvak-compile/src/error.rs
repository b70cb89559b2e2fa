//! Error types for the compilation crate.

use thiserror::Error;

/// Errors that can occur during device construction, layout, or mapping.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// Device construction parameters were invalid.
    #[error("invalid device: {0}")]
    InvalidDevice(String),

    /// A qubit reference exceeds the device width.
    #[error("qubit {qubit} is out of range for a {n}-qubit device")]
    OutOfRangeQubit {
        /// The offending qubit index.
        qubit: u32,
        /// The device's qubit count.
        n: u32,
    },

    /// No path exists between two qubits that a two-qubit gate requires.
    #[error("no path between qubits {0} and {1}")]
    DisconnectedQubits(u32, u32),

    /// An unrecognised layout selector string.
    #[error("unsupported layout strategy: '{0}'")]
    UnsupportedLayout(String),

    /// An unrecognised mapper selector string.
    #[error("unsupported mapper kind: '{0}'")]
    UnsupportedMapper(String),

    /// The program references more logical qubits than the device has.
    #[error("program requires {required} qubits but device only has {available}")]
    InsufficientQubits {
        /// Qubits the program needs.
        required: u32,
        /// Qubits the device provides.
        available: u32,
    },

    /// A pass-specific failure with a human-readable reason.
    #[error("pass '{name}' failed: {reason}")]
    PassFailed {
        /// Name of the failing pass.
        name: String,
        /// Reason for the failure.
        reason: String,
    },

    /// An error originating in the program representation itself.
    #[error(transparent)]
    Ir(#[from] arvak_ir::IrError),
}

/// Result type for compilation operations.
pub type CompileResult<T> = Result<T, CompileError>;
