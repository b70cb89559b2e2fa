//! Built-in compilation passes (C8): layout selection, layout application,
//! and routing, composed as an ordinary `PassManager` pipeline over a
//! shared `PropertySet`, rather than the bespoke one-shot `mapper::map`
//! function.
//!
//! Split into three passes — instead of one, as `mapper::map` runs it —
//! because the teacher stack's `PassManagerBuilder` composes a pipeline
//! out of single-responsibility passes (layout, then routing, then
//! translation) and callers may want to insert other passes between
//! layout and routing.

use arvak_ir::Program;

use crate::device::Device;
use crate::error::{CompileError, CompileResult};
use crate::layout::LayoutStrategy;
use crate::layout_applier;
use crate::mapper::MapperKind;
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;
use crate::steiner_mapper;
use crate::swap_mapper;

fn require_device(properties: &PropertySet) -> CompileResult<&Device> {
    properties
        .device
        .as_ref()
        .ok_or_else(|| CompileError::InvalidDevice("no device set in PropertySet".to_string()))
}

/// Computes an initial [`crate::property::Layout`] (C2) and stores it in
/// `properties.layout`. Reads `properties.device`; does not touch the
/// program.
#[derive(Debug, Clone)]
pub struct ComputeLayoutPass {
    strategy: LayoutStrategy,
    register: String,
}

impl ComputeLayoutPass {
    /// Compute a layout with `strategy` over `register`.
    pub fn new(strategy: LayoutStrategy, register: impl Into<String>) -> Self {
        Self {
            strategy,
            register: register.into(),
        }
    }
}

impl Pass for ComputeLayoutPass {
    fn name(&self) -> &str {
        "compute_layout"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, program: &mut Program, properties: &mut PropertySet) -> CompileResult<()> {
        let device = require_device(properties)?;
        let layout = self.strategy.compute(program, device, &self.register)?;
        properties.layout = Some(layout);
        Ok(())
    }
}

/// Rewrites `program`'s qubit references through `properties.layout` (C3).
/// Consumes the layout; a later `ComputeLayoutPass` is needed before this
/// can run again.
#[derive(Debug, Clone)]
pub struct ApplyLayoutPass {
    register: String,
}

impl ApplyLayoutPass {
    /// Apply whatever layout is currently in `PropertySet` to `register`.
    pub fn new(register: impl Into<String>) -> Self {
        Self {
            register: register.into(),
        }
    }
}

impl Pass for ApplyLayoutPass {
    fn name(&self) -> &str {
        "apply_layout"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, program: &mut Program, properties: &mut PropertySet) -> CompileResult<()> {
        let device = require_device(properties)?;
        let n = device.qubits();
        let layout = properties.layout.as_ref().ok_or_else(|| CompileError::PassFailed {
            name: self.name().to_string(),
            reason: "no layout computed; run ComputeLayoutPass first".to_string(),
        })?;
        layout_applier::apply(program, layout, &self.register, n)
    }

    fn should_run(&self, _program: &Program, properties: &PropertySet) -> bool {
        properties.layout.is_some()
    }
}

/// Routes every two-qubit gate onto `properties.device`'s topology (C4 or
/// C6), leaving the resulting permutation in `properties.permutation`.
/// Precondition: an `ApplyLayoutPass` has already run.
#[derive(Debug, Clone, Copy)]
pub struct RoutePass {
    kind: MapperKind,
}

impl RoutePass {
    /// Route using `kind` (`Swap` or `Steiner`).
    pub fn new(kind: MapperKind) -> Self {
        Self { kind }
    }
}

impl Pass for RoutePass {
    fn name(&self) -> &str {
        match self.kind {
            MapperKind::Swap => "swap_route",
            MapperKind::Steiner => "steiner_route",
        }
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, program: &mut Program, properties: &mut PropertySet) -> CompileResult<()> {
        let device = require_device(properties)?;
        let pi = match self.kind {
            MapperKind::Swap => swap_mapper::map(program, device)?,
            MapperKind::Steiner => steiner_mapper::map(program, device)?,
        };
        properties.permutation = Some(pi);
        Ok(())
    }
}
