//! `Layout` and `PropertySet`: the types passes share with each other.
//!
//! # Overview
//!
//! - **Layout pass** determines which logical qubits map to which physical
//!   qubits (C2).
//! - **LayoutApplier** consumes the layout to rewrite qubit references in
//!   place (C3).
//! - **SwapMapper** consults the `Device` to insert SWAPs and owns its own
//!   [`crate::permutation::Permutation`], separate from `Layout` (C4/C5).
//!
//! The `PropertySet` acts as the shared context passed through the
//! `PassManager` pipeline.
//!
//! # Examples
//!
//! ```
//! use arvak_compile::{PropertySet, Device, Layout};
//!
//! let mut props = PropertySet::new();
//! props.device = Some(Device::linear(5).unwrap());
//! props.layout = Some(Layout::trivial(5));
//!
//! assert!(props.device.as_ref().unwrap().coupled(0, 1));
//! ```

use rustc_hash::FxHashMap;
use std::any::{Any, TypeId};

use arvak_ir::QubitId;

use crate::device::Device;
use crate::permutation::Permutation;

/// An injective mapping logical qubit → physical qubit, produced by a
/// layout strategy and consumed once by `LayoutApplier`.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    /// Map from logical qubit to physical qubit index.
    logical_to_physical: FxHashMap<QubitId, u32>,
    /// Map from physical qubit index to logical qubit.
    physical_to_logical: FxHashMap<u32, QubitId>,
}

impl Layout {
    /// Create a new empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a trivial layout (logical qubit i -> physical qubit i).
    pub fn trivial(num_qubits: u32) -> Self {
        let mut layout = Self::new();
        for i in 0..num_qubits {
            layout.add(QubitId(i), i);
        }
        layout
    }

    /// Add a mapping from logical to physical qubit.
    ///
    /// If either side is already mapped to something else, the stale
    /// mapping is removed first to keep both maps consistent.
    pub fn add(&mut self, logical: QubitId, physical: u32) {
        if let Some(&old_logical) = self.physical_to_logical.get(&physical) {
            if old_logical != logical {
                self.logical_to_physical.remove(&old_logical);
            }
        }
        if let Some(&old_physical) = self.logical_to_physical.get(&logical) {
            if old_physical != physical {
                self.physical_to_logical.remove(&old_physical);
            }
        }
        self.logical_to_physical.insert(logical, physical);
        self.physical_to_logical.insert(physical, logical);
    }

    /// Get the physical qubit for a logical qubit.
    pub fn get_physical(&self, logical: QubitId) -> Option<u32> {
        self.logical_to_physical.get(&logical).copied()
    }

    /// Get the logical qubit for a physical qubit.
    pub fn get_logical(&self, physical: u32) -> Option<QubitId> {
        self.physical_to_logical.get(&physical).copied()
    }

    /// Number of mapped logical qubits.
    pub fn len(&self) -> usize {
        self.logical_to_physical.len()
    }

    /// Whether the layout has no mappings.
    pub fn is_empty(&self) -> bool {
        self.logical_to_physical.is_empty()
    }

    /// Iterate over (logical, physical) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (QubitId, u32)> + '_ {
        self.logical_to_physical.iter().map(|(&l, &p)| (l, p))
    }
}

/// Properties shared between compilation passes.
#[derive(Debug, Default)]
pub struct PropertySet {
    /// Target device: topology, fidelities, shortest-path oracle.
    pub device: Option<Device>,

    /// Logical-to-physical layout. Set by a layout pass, consumed by
    /// `LayoutApplier`.
    pub layout: Option<Layout>,

    /// The running permutation, owned by `SwapMapper`/`SteinerMapper` for
    /// the duration of the mapping pass and left here afterward as a
    /// witness for the caller.
    pub permutation: Option<Permutation>,

    /// Custom properties storage (type-erased).
    custom: FxHashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl PropertySet {
    /// Create a new empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the device.
    #[must_use]
    pub fn with_device(mut self, device: Device) -> Self {
        self.device = Some(device);
        self
    }

    /// Set the layout.
    #[must_use]
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Insert a custom property.
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) {
        self.custom.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Get a custom property.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.custom
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Get a mutable custom property.
    pub fn get_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.custom
            .get_mut(&TypeId::of::<T>())
            .and_then(|v| v.downcast_mut())
    }

    /// Remove a custom property.
    pub fn remove<T: Any>(&mut self) -> Option<T> {
        self.custom
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|v| *v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_trivial() {
        let layout = Layout::trivial(5);
        assert_eq!(layout.get_physical(QubitId(0)), Some(0));
        assert_eq!(layout.get_physical(QubitId(4)), Some(4));
        assert_eq!(layout.get_logical(2), Some(QubitId(2)));
    }

    #[test]
    fn test_layout_add_overwrites_stale_mapping() {
        let mut layout = Layout::trivial(3);
        layout.add(QubitId(0), 2);
        assert_eq!(layout.get_physical(QubitId(0)), Some(2));
        assert_eq!(layout.get_logical(0), None);
    }

    #[test]
    #[allow(clippy::items_after_statements)]
    fn test_property_set_custom() {
        let mut props = PropertySet::new();

        #[derive(Debug, PartialEq)]
        struct CustomData(i32);

        props.insert(CustomData(42));
        assert_eq!(props.get::<CustomData>(), Some(&CustomData(42)));

        let removed = props.remove::<CustomData>();
        assert_eq!(removed, Some(CustomData(42)));
        assert_eq!(props.get::<CustomData>(), None);
    }
}
