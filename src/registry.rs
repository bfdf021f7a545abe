//! # Test registry
//!
//! Insertion-ordered, deduplicated list of test descriptors. Execution order is
//! registration order. A descriptor whose factory is already present is dropped
//! silently, which makes registration idempotent.
//!
//! ## Registry Invariant
//! No two entries share a factory. The registry only grows; there is no removal.

use crate::descriptor::UnitTestDescriptor;

#[derive(Debug, Default, Clone)]
pub struct TestRegistry {
    tests: Vec<&'static UnitTestDescriptor>,
}

impl TestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `descriptor` unless a test with the same factory is registered.
    /// Returns whether it was added.
    pub fn add(&mut self, descriptor: &'static UnitTestDescriptor) -> bool {
        if self.contains(descriptor) {
            tracing::trace!(
                target: "assay::registry",
                test = descriptor.name(),
                "duplicate registration ignored"
            );
            return false;
        }
        self.tests.push(descriptor);
        true
    }

    pub fn add_all<I>(&mut self, descriptors: I)
    where
        I: IntoIterator<Item = &'static UnitTestDescriptor>,
    {
        for descriptor in descriptors {
            self.add(descriptor);
        }
    }

    pub fn contains(&self, descriptor: &UnitTestDescriptor) -> bool {
        self.tests.iter().any(|known| known.same_factory(descriptor))
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static UnitTestDescriptor> + '_ {
        self.tests.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}
