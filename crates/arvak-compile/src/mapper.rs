//! The top-level hardware-mapping entry point: wires layout selection,
//! `LayoutApplier`, and a routing mapper into a single call.

use arvak_ir::Program;

use crate::device::Device;
use crate::error::{CompileError, CompileResult};
use crate::layout::LayoutStrategy;
use crate::layout_applier;
use crate::permutation::Permutation;
use crate::steiner_mapper;
use crate::swap_mapper;

/// Which routing algorithm to run after layout and `LayoutApplier`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapperKind {
    /// Per-gate SWAP-chain insertion (C4).
    Swap,
    /// Batched Steiner-tree CNOT resynthesis (C6).
    Steiner,
}

impl MapperKind {
    /// Parse a selector string (`"swap" | "steiner"`).
    pub fn parse(s: &str) -> CompileResult<Self> {
        match s {
            "swap" => Ok(MapperKind::Swap),
            "steiner" => Ok(MapperKind::Steiner),
            other => Err(CompileError::UnsupportedMapper(other.to_string())),
        }
    }
}

/// Options controlling a single [`map`] call.
#[derive(Debug, Clone)]
pub struct MapOptions {
    /// Initial-placement strategy.
    pub layout: LayoutStrategy,
    /// Routing algorithm.
    pub mapper: MapperKind,
    /// Name of the global quantum register the program uses.
    pub register: String,
    /// When set, ignore `layout` and instead run every layout strategy,
    /// keeping whichever result inserted the fewest two-qubit gates
    /// (ties broken by total two-qubit fidelity). Named but left
    /// unspecified by the external Mapper API (§6); this is the
    /// orchestration this crate gives it.
    pub evaluate_all: bool,
}

impl MapOptions {
    /// Options selecting `layout`/`mapper` over the default `"q"` register.
    pub fn new(layout: LayoutStrategy, mapper: MapperKind) -> Self {
        Self {
            layout,
            mapper,
            register: "q".to_string(),
            evaluate_all: false,
        }
    }

    /// Override the configured global register name.
    #[must_use]
    pub fn with_register(mut self, register: impl Into<String>) -> Self {
        self.register = register.into();
        self
    }

    /// Enable `evaluate_all` (C10): try every layout strategy and keep
    /// the best result instead of only `self.layout`.
    #[must_use]
    pub fn with_evaluate_all(mut self, evaluate_all: bool) -> Self {
        self.evaluate_all = evaluate_all;
        self
    }
}

impl Default for MapOptions {
    fn default() -> Self {
        Self::new(LayoutStrategy::Bestfit, MapperKind::Swap)
    }
}

/// Map `program` onto `device`: compute an initial layout, apply it
/// destructively, then route every two-qubit gate onto `device`'s
/// topology. Returns the final permutation relative to the layout's
/// initial physical placement.
///
/// When `opts.evaluate_all` is set, delegates to [`map_evaluate_all`]
/// instead of running `opts.layout` alone.
#[tracing::instrument(skip(program, device), fields(register = %opts.register))]
pub fn map(program: &mut Program, device: &Device, opts: &MapOptions) -> CompileResult<Permutation> {
    if opts.evaluate_all {
        return map_evaluate_all(program, device, opts);
    }

    tracing::debug!("computing layout");
    let layout = opts.layout.compute(program, device, &opts.register)?;

    tracing::debug!("applying layout");
    layout_applier::apply(program, &layout, &opts.register, device.qubits())?;

    tracing::debug!(mapper = ?opts.mapper, "routing");
    match opts.mapper {
        MapperKind::Swap => swap_mapper::map(program, device),
        MapperKind::Steiner => steiner_mapper::map(program, device),
    }
}

/// Run the full layout+apply+route pipeline once for each of `Linear`,
/// `Eager`, and `Bestfit`, on independent copies of `program`, and keep
/// whichever produced the fewest two-qubit gates in the routed output
/// (SWAP insertion is the only thing that can add any). Ties are broken
/// by the sum of two-qubit fidelities over the routed gates, preferring
/// the higher-fidelity placement. The winning copy replaces `program` in
/// place.
fn map_evaluate_all(program: &mut Program, device: &Device, opts: &MapOptions) -> CompileResult<Permutation> {
    const STRATEGIES: [LayoutStrategy; 3] =
        [LayoutStrategy::Linear, LayoutStrategy::Eager, LayoutStrategy::Bestfit];

    let mut best: Option<(Program, Permutation, usize, f64)> = None;
    for &strategy in &STRATEGIES {
        let mut candidate = program.clone();
        let layout = strategy.compute(&candidate, device, &opts.register)?;
        layout_applier::apply(&mut candidate, &layout, &opts.register, device.qubits())?;
        let pi = match opts.mapper {
            MapperKind::Swap => swap_mapper::map(&mut candidate, device)?,
            MapperKind::Steiner => steiner_mapper::map(&mut candidate, device)?,
        };
        let (two_qubit_count, fidelity_sum) = two_qubit_stats(&candidate, device);
        tracing::debug!(?strategy, two_qubit_count, fidelity_sum, "evaluate_all candidate");

        let is_better = match &best {
            None => true,
            Some((_, _, best_count, best_fidelity)) => {
                two_qubit_count < *best_count
                    || (two_qubit_count == *best_count && fidelity_sum > *best_fidelity)
            }
        };
        if is_better {
            best = Some((candidate, pi, two_qubit_count, fidelity_sum));
        }
    }

    let (winner, pi, _, _) = best.expect("STRATEGIES is non-empty");
    *program = winner;
    Ok(pi)
}

/// Count the two-qubit gates in `program` and sum their device fidelity,
/// used to compare `evaluate_all` candidates.
fn two_qubit_stats(program: &Program, device: &Device) -> (usize, f64) {
    let mut count = 0usize;
    let mut fidelity_sum = 0.0;
    for instr in program.instructions() {
        if instr.is_two_qubit_gate() {
            count += 1;
            let a = instr.qubits[0].0;
            let b = instr.qubits[1].0;
            fidelity_sum += device
                .fidelity2(a, b)
                .unwrap_or(0.0)
                .max(device.fidelity2(b, a).unwrap_or(0.0));
        }
    }
    (count, fidelity_sum)
}
