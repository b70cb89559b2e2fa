//! Small statevector simulator used to test semantic equivalence (§8,
//! invariant 2): `map(P, D)` composed with the inverse of the final
//! permutation must reproduce `P`'s unitary up to a global phase.
//!
//! This is test tooling, not a simulation backend the mapper depends on —
//! it only understands the gate set the mapper itself touches (`H`, `X`,
//! `U(θ,φ,λ)`, `CX`) plus enough of the rest of [`StandardGate`] to run the
//! small circuits the property tests generate. Amplitudes are
//! `num_complex::Complex64`, dense over `2^n` basis states; this does not
//! scale past the handful of qubits the invariant tests actually need.

use num_complex::Complex64;
use std::f64::consts::FRAC_1_SQRT_2;

use arvak_ir::{Instruction, InstructionKind, Program, StandardGate};

/// A dense statevector over `n` qubits, little-endian (qubit 0 is the
/// least significant bit of the basis-state index).
#[derive(Debug, Clone, PartialEq)]
pub struct StateVector {
    n: u32,
    amplitudes: Vec<Complex64>,
}

impl StateVector {
    /// The all-zero basis state `|0...0>`.
    pub fn zero_state(n: u32) -> Self {
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); 1 << n];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self { n, amplitudes }
    }

    /// The computational basis state with the given index.
    pub fn basis_state(n: u32, index: usize) -> Self {
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); 1 << n];
        amplitudes[index] = Complex64::new(1.0, 0.0);
        Self { n, amplitudes }
    }

    /// Apply a single-qubit 2x2 unitary to `qubit`.
    fn apply_1q(&mut self, qubit: u32, m: [[Complex64; 2]; 2]) {
        let bit = 1usize << qubit;
        for i in 0..self.amplitudes.len() {
            if i & bit == 0 {
                let j = i | bit;
                let a0 = self.amplitudes[i];
                let a1 = self.amplitudes[j];
                self.amplitudes[i] = m[0][0] * a0 + m[0][1] * a1;
                self.amplitudes[j] = m[1][0] * a0 + m[1][1] * a1;
            }
        }
    }

    /// Apply a controlled-X (CNOT) with the given control/target.
    fn apply_cx(&mut self, control: u32, target: u32) {
        let cbit = 1usize << control;
        let tbit = 1usize << target;
        for i in 0..self.amplitudes.len() {
            if i & cbit != 0 && i & tbit == 0 {
                let j = i | tbit;
                self.amplitudes.swap(i, j);
            }
        }
    }

    /// Apply a bare SWAP between two qubits (used when simulating a
    /// program that still contains the logical `Swap` gate prior to
    /// CNOT-decomposition, which this simulator also understands so it
    /// can check a pre-mapping program against its mapped counterpart).
    fn apply_swap(&mut self, a: u32, b: u32) {
        let abit = 1usize << a;
        let bbit = 1usize << b;
        for i in 0..self.amplitudes.len() {
            let ahas = i & abit != 0;
            let bhas = i & bbit != 0;
            if ahas && !bhas {
                let j = (i & !abit) | bbit;
                self.amplitudes.swap(i, j);
            }
        }
    }

    /// Run `program` starting from this state, ignoring measurements,
    /// resets, barriers, and classical conditions (the property tests
    /// this module supports only exercise unconditional unitary circuits).
    pub fn run(&mut self, program: &Program) {
        for instr in program.instructions() {
            self.apply_instruction(instr);
        }
    }

    fn apply_instruction(&mut self, instr: &Instruction) {
        let InstructionKind::Gate(gate) = &instr.kind else {
            return;
        };
        match gate {
            StandardGate::I => {}
            StandardGate::X => self.apply_1q(instr.qubits[0].0, pauli_x()),
            StandardGate::Y => self.apply_1q(instr.qubits[0].0, pauli_y()),
            StandardGate::Z => self.apply_1q(instr.qubits[0].0, pauli_z()),
            StandardGate::H => self.apply_1q(instr.qubits[0].0, hadamard()),
            StandardGate::U(theta, phi, lambda) => {
                let (t, p, l) = (
                    theta.as_f64().unwrap_or(0.0),
                    phi.as_f64().unwrap_or(0.0),
                    lambda.as_f64().unwrap_or(0.0),
                );
                self.apply_1q(instr.qubits[0].0, u_gate(t, p, l));
            }
            StandardGate::CX => self.apply_cx(instr.qubits[0].0, instr.qubits[1].0),
            StandardGate::Swap => self.apply_swap(instr.qubits[0].0, instr.qubits[1].0),
            other => {
                // Outside the gate set the mapper ever emits or routes
                // through unexamined; property tests restrict themselves
                // to the supported subset.
                panic!("unitary simulator does not support gate {}", other.name());
            }
        }
    }

    /// Relabel the qubit at physical slot `from` as if it were logical
    /// slot `to`, i.e. permute the statevector's qubit axes according to
    /// `perm[i] = physical slot of logical qubit i`. Used to undo the
    /// mapper's final permutation before comparing against the original
    /// unmapped program's statevector.
    #[must_use]
    pub fn permute_qubits(&self, perm: &[u32]) -> Self {
        let n = self.n;
        let mut out = vec![Complex64::new(0.0, 0.0); self.amplitudes.len()];
        for (logical_index, &amp) in self.amplitudes.iter().enumerate() {
            let mut physical_index = 0usize;
            for logical_qubit in 0..n {
                if logical_index & (1 << logical_qubit) != 0 {
                    physical_index |= 1 << perm[logical_qubit as usize];
                }
            }
            out[physical_index] = amp;
        }
        Self {
            n,
            amplitudes: out,
        }
    }

    /// Whether `self` and `other` are equal up to a global phase, within
    /// `tol`.
    pub fn equiv_up_to_phase(&self, other: &Self, tol: f64) -> bool {
        if self.n != other.n || self.amplitudes.len() != other.amplitudes.len() {
            return false;
        }
        let phase = self
            .amplitudes
            .iter()
            .zip(&other.amplitudes)
            .find(|(a, _)| a.norm() > tol)
            .map(|(a, b)| b / a);
        let Some(phase) = phase else {
            // Both all-zero (shouldn't happen for a valid state).
            return other.amplitudes.iter().all(|a| a.norm() <= tol);
        };
        self.amplitudes
            .iter()
            .zip(&other.amplitudes)
            .all(|(a, b)| (b - phase * a).norm() <= tol)
    }
}

fn pauli_x() -> [[Complex64; 2]; 2] {
    let z = Complex64::new(0.0, 0.0);
    let o = Complex64::new(1.0, 0.0);
    [[z, o], [o, z]]
}

fn pauli_y() -> [[Complex64; 2]; 2] {
    let z = Complex64::new(0.0, 0.0);
    let i = Complex64::new(0.0, 1.0);
    [[z, -i], [i, z]]
}

fn pauli_z() -> [[Complex64; 2]; 2] {
    let o = Complex64::new(1.0, 0.0);
    let z = Complex64::new(0.0, 0.0);
    [[o, z], [z, -o]]
}

fn hadamard() -> [[Complex64; 2]; 2] {
    let s = Complex64::new(FRAC_1_SQRT_2, 0.0);
    [[s, s], [s, -s]]
}

/// The universal single-qubit gate `U(θ, φ, λ)`, in the OpenQASM 2.0 /
/// `qelib1.inc` convention.
fn u_gate(theta: f64, phi: f64, lambda: f64) -> [[Complex64; 2]; 2] {
    let (ct, st) = ((theta / 2.0).cos(), (theta / 2.0).sin());
    let e_il = Complex64::from_polar(1.0, lambda);
    let e_ip = Complex64::from_polar(1.0, phi);
    let e_ipl = Complex64::from_polar(1.0, phi + lambda);
    [
        [Complex64::new(ct, 0.0), -e_il * st],
        [e_ip * st, e_ipl * ct],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use arvak_ir::QubitId;

    #[test]
    fn test_h_creates_superposition() {
        let mut sv = StateVector::zero_state(1);
        sv.apply_1q(0, hadamard());
        let expected = Complex64::new(FRAC_1_SQRT_2, 0.0);
        assert!((sv.amplitudes[0] - expected).norm() < 1e-9);
        assert!((sv.amplitudes[1] - expected).norm() < 1e-9);
    }

    #[test]
    fn test_bell_state() {
        let program = Program::new("bell")
            .declare_qreg("q", 2)
            .h(QubitId(0))
            .cx(QubitId(0), QubitId(1));
        let mut sv = StateVector::zero_state(2);
        sv.run(&program);
        let s = FRAC_1_SQRT_2;
        assert!((sv.amplitudes[0].re - s).abs() < 1e-9);
        assert!((sv.amplitudes[1]).norm() < 1e-9);
        assert!((sv.amplitudes[2]).norm() < 1e-9);
        assert!((sv.amplitudes[3].re - s).abs() < 1e-9);
    }

    #[test]
    fn test_u_gate_matches_hadamard() {
        let h_as_u = StandardGate::hadamard_as_u();
        let StandardGate::U(t, p, l) = h_as_u else {
            unreachable!()
        };
        let m = u_gate(t.as_f64().unwrap(), p.as_f64().unwrap(), l.as_f64().unwrap());
        let h = hadamard();
        for r in 0..2 {
            for c in 0..2 {
                assert!((m[r][c] - h[r][c]).norm() < 1e-9);
            }
        }
    }

    #[test]
    fn test_equiv_up_to_phase() {
        let mut a = StateVector::zero_state(1);
        a.apply_1q(0, hadamard());

        // A relative-phase difference (Z flips the |1> amplitude's sign
        // but not |0>'s) is not a global phase, so these must differ.
        let mut b = a.clone();
        b.apply_1q(0, pauli_z());
        assert!(!a.equiv_up_to_phase(&b, 1e-9));

        // An overall sign flip on every amplitude is a global phase.
        let phased = StateVector {
            n: a.n,
            amplitudes: a.amplitudes.iter().map(|c| -c).collect(),
        };
        assert!(a.equiv_up_to_phase(&phased, 1e-9));
    }

    #[test]
    fn test_permute_qubits_swaps_axes() {
        let mut sv = StateVector::zero_state(2);
        sv.apply_1q(0, pauli_x()); // |01> in our indexing: bit0=1
        let permuted = sv.permute_qubits(&[1, 0]); // logical 0 -> physical 1
        assert!((permuted.amplitudes[2].re - 1.0).abs() < 1e-9);
    }
}
