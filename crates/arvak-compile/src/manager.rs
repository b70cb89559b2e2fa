//! Pass manager for orchestrating compilation (C8).

use tracing::{debug, info, instrument};

use arvak_ir::Program;

use crate::device::Device;
use crate::error::CompileResult;
use crate::layout::LayoutStrategy;
use crate::mapper::MapperKind;
use crate::pass::Pass;
use crate::passes::{ApplyLayoutPass, ComputeLayoutPass, RoutePass};
use crate::property::PropertySet;

/// Manages and executes a sequence of compilation passes.
pub struct PassManager {
    /// The passes to execute, in order.
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    /// Create a new empty pass manager.
    pub fn new() -> Self {
        Self { passes: vec![] }
    }

    /// Add a pass to the manager.
    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Run all passes on the given program.
    #[instrument(skip(self, program, properties))]
    pub fn run(&self, program: &mut Program, properties: &mut PropertySet) -> CompileResult<()> {
        info!(
            "running pass manager with {} passes on a program using {} qubits",
            self.passes.len(),
            program.qubits_used().unwrap_or(0)
        );

        for pass in &self.passes {
            if pass.should_run(program, properties) {
                debug!("running pass: {}", pass.name());
                pass.run(program, properties)?;
                debug!(
                    "pass {} completed, {} instructions",
                    pass.name(),
                    program.instructions().count()
                );
            } else {
                debug!("skipping pass: {}", pass.name());
            }
        }

        info!(
            "pass manager completed, {} instructions",
            program.instructions().count()
        );

        Ok(())
    }

    /// Get the number of passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Check if the manager has no passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder assembling the layout/apply/route pipeline (C8) described by
/// the Mapper API (§6), as an ordinary `PassManager` instead of the
/// one-shot `mapper::map` function.
pub struct PassManagerBuilder {
    layout_strategy: LayoutStrategy,
    mapper_kind: MapperKind,
    register: String,
    properties: PropertySet,
}

impl PassManagerBuilder {
    /// Create a new builder with default settings (`bestfit` layout,
    /// `swap` routing, register `"q"`).
    pub fn new() -> Self {
        Self {
            layout_strategy: LayoutStrategy::Bestfit,
            mapper_kind: MapperKind::Swap,
            register: "q".to_string(),
            properties: PropertySet::new(),
        }
    }

    /// Set the layout strategy (C2).
    #[must_use]
    pub fn with_layout_strategy(mut self, strategy: LayoutStrategy) -> Self {
        self.layout_strategy = strategy;
        self
    }

    /// Set the routing algorithm (C4/C6).
    #[must_use]
    pub fn with_mapper_kind(mut self, kind: MapperKind) -> Self {
        self.mapper_kind = kind;
        self
    }

    /// Set the name of the global quantum register the program uses.
    #[must_use]
    pub fn with_register(mut self, register: impl Into<String>) -> Self {
        self.register = register.into();
        self
    }

    /// Set the target device.
    #[must_use]
    pub fn with_device(mut self, device: Device) -> Self {
        self.properties.device = Some(device);
        self
    }

    /// Build the pass manager and return it with the properties.
    pub fn build(self) -> (PassManager, PropertySet) {
        let mut pm = PassManager::new();
        pm.add_pass(ComputeLayoutPass::new(self.layout_strategy, &self.register));
        pm.add_pass(ApplyLayoutPass::new(&self.register));
        pm.add_pass(RoutePass::new(self.mapper_kind));
        (pm, self.properties)
    }
}

impl Default for PassManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arvak_ir::QubitId;
    use crate::swap_mapper;

    #[test]
    fn test_empty_pass_manager() {
        let pm = PassManager::new();
        assert!(pm.is_empty());
        assert_eq!(pm.len(), 0);
    }

    #[test]
    fn test_pass_manager_builder_runs_full_pipeline() {
        let device = Device::linear(3).unwrap();
        let (pm, mut props) = PassManagerBuilder::new()
            .with_device(device)
            .with_layout_strategy(LayoutStrategy::Linear)
            .with_mapper_kind(MapperKind::Swap)
            .build();

        assert_eq!(pm.len(), 3);

        let mut program = Program::new("p")
            .declare_qreg("q", 3)
            .cx(QubitId(0), QubitId(2));

        pm.run(&mut program, &mut props).unwrap();

        let pi = props.permutation.unwrap();
        assert!(pi.is_bijection());
        assert!(swap_mapper::all_gates_local(&program, props.device.as_ref().unwrap()));
        assert_eq!(program.qreg_size("q").unwrap(), 3);
    }

    #[test]
    fn test_pass_manager_fails_without_device() {
        let (pm, mut props) = PassManagerBuilder::new().build();
        let mut program = Program::new("p").declare_qreg("q", 2).cx(QubitId(0), QubitId(1));
        assert!(pm.run(&mut program, &mut props).is_err());
    }
}
