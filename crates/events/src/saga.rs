//! Saga / process manager contract (identity only, no business rules).
//!
//! - A saga instance is identified by a `SagaId`
//! - A saga's concrete Rust type is its `SagaType`, the key under which its
//!   configuration is registered
//! - Event handling, persistence and dispatch are owned by the host

use core::any::TypeId;
use core::cmp::Ordering;
use core::hash::{Hash, Hasher};

use serde::{Serialize, Serializer};

use sagaflow_core::SagaId;

use crate::Event;

/// Saga contract as far as registration and persistence are concerned.
pub trait Saga: Send + Sync + 'static {
    /// Base event type this saga reacts to.
    type Event: Event;

    /// Identity of this saga instance.
    fn saga_id(&self) -> SagaId;

    /// Human readable saga name (used for logs, listings and stream prefixes).
    fn saga_name() -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Type token identifying a concrete saga kind.
///
/// Equality and hashing use the Rust `TypeId`; the name is carried along for
/// display and tooling output only.
#[derive(Clone, Copy)]
pub struct SagaType {
    id: TypeId,
    name: &'static str,
}

impl SagaType {
    pub fn of<S: Saga>() -> Self {
        Self {
            id: TypeId::of::<S>(),
            name: S::saga_name(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// Whether this token denotes the saga type `S`.
    pub fn is<S: Saga>(&self) -> bool {
        self.id == TypeId::of::<S>()
    }
}

impl PartialEq for SagaType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SagaType {}

impl Hash for SagaType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

// Sorted by name for stable listings; the id breaks ties so the ordering
// stays consistent with `Eq`.
impl Ord for SagaType {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(other.name)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for SagaType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl core::fmt::Debug for SagaType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("SagaType").field(&self.name).finish()
    }
}

impl core::fmt::Display for SagaType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name)
    }
}

impl Serialize for SagaType {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        serializer.serialize_str(self.name)
    }
}
