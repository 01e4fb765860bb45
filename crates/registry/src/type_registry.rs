//! Set of known saga types, for enumeration by monitoring and admin tooling.

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};

use sagaflow_events::{Saga, SagaType};

use crate::error::{RegistryError, RegistryResult};

/// Read access to the saga types a component knows about.
pub trait SagaRegistry: Send + Sync {
    /// Snapshot of all registered saga types.
    ///
    /// The returned set is a copy; mutating it never affects the registry.
    fn all_sagas(&self) -> HashSet<SagaType>;
}

impl<R> SagaRegistry for Arc<R>
where
    R: SagaRegistry + ?Sized,
{
    fn all_sagas(&self) -> HashSet<SagaType> {
        (**self).all_sagas()
    }
}

/// Concurrent set of saga types.
///
/// Any number of readers proceed in parallel; `register` takes the write lock.
#[derive(Debug, Default)]
pub struct SagaTypeRegistry {
    sagas: RwLock<HashSet<SagaType>>,
}

impl SagaTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a saga type; registering a known type again is a no-op.
    ///
    /// Returns whether the type was newly added.
    pub fn register(&self, saga_type: SagaType) -> RegistryResult<bool> {
        let mut sagas = self
            .sagas
            .write()
            .map_err(|_| RegistryError::LockPoisoned)?;
        Ok(sagas.insert(saga_type))
    }

    /// Add several saga types under one lock acquisition, so readers see
    /// either none or all of them.
    ///
    /// Returns how many were newly added.
    pub fn register_all(
        &self,
        saga_types: impl IntoIterator<Item = SagaType>,
    ) -> RegistryResult<usize> {
        let mut sagas = self
            .sagas
            .write()
            .map_err(|_| RegistryError::LockPoisoned)?;
        Ok(saga_types
            .into_iter()
            .filter(|saga_type| sagas.insert(*saga_type))
            .count())
    }

    pub fn register_saga<S: Saga>(&self) -> RegistryResult<bool> {
        self.register(SagaType::of::<S>())
    }

    pub fn contains(&self, saga_type: &SagaType) -> bool {
        self.read().contains(saga_type)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // Writers only ever insert, so a poisoned set is still consistent.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashSet<SagaType>> {
        self.sagas.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SagaRegistry for SagaTypeRegistry {
    fn all_sagas(&self) -> HashSet<SagaType> {
        self.read().clone()
    }
}
