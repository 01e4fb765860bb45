//! Configuration providers and the type-erased boundary they cross.
//!
//! Discovery can only hand out providers as `dyn ErasedConfigProvider`, which
//! reports a `SagaType` token and an `ErasedSagaConfig`. The concrete type is
//! re-asserted when a typed caller resolves the configuration; a provider that
//! declared one saga type but supplied another saga's configuration is caught
//! there as `RegistryError::TypeMismatch`.

use core::any::{Any, type_name};
use std::sync::Arc;

use sagaflow_events::{Saga, SagaType};

use crate::config::SagaConfig;
use crate::error::{RegistryError, RegistryResult};

/// Supplies the configuration for one saga type.
///
/// Returning `None` is a startup error: a provider must always produce a
/// usable configuration.
pub trait ConfigProvider: Send + Sync + 'static {
    type Saga: Saga;

    fn saga_config(&self) -> Option<SagaConfig<Self::Saga>>;

    /// Name used in logs and registration listings.
    fn provider_name(&self) -> &'static str {
        type_name::<Self>()
    }
}

/// Object-safe view of a provider as seen by discovery.
///
/// Every `ConfigProvider` is an `ErasedConfigProvider`; implement this trait
/// directly only for providers assembled at runtime.
pub trait ErasedConfigProvider: Send + Sync {
    fn saga_type(&self) -> SagaType;

    fn erased_config(&self) -> Option<ErasedSagaConfig>;

    fn name(&self) -> &'static str;
}

impl<P: ConfigProvider> ErasedConfigProvider for P {
    fn saga_type(&self) -> SagaType {
        SagaType::of::<P::Saga>()
    }

    fn erased_config(&self) -> Option<ErasedSagaConfig> {
        ConfigProvider::saga_config(self).map(ErasedSagaConfig::new)
    }

    fn name(&self) -> &'static str {
        ConfigProvider::provider_name(self)
    }
}

/// A `SagaConfig<S>` with `S` erased.
#[derive(Clone)]
pub struct ErasedSagaConfig {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl ErasedSagaConfig {
    pub fn new<S: Saga>(config: SagaConfig<S>) -> Self {
        Self {
            value: Arc::new(config),
            type_name: type_name::<SagaConfig<S>>(),
        }
    }

    /// Rust type name of the wrapped configuration.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<S: Saga>(&self) -> bool {
        self.value.is::<SagaConfig<S>>()
    }

    /// Narrow back to the configuration of saga type `S`.
    pub fn downcast<S: Saga>(&self) -> RegistryResult<Arc<SagaConfig<S>>> {
        Arc::clone(&self.value)
            .downcast::<SagaConfig<S>>()
            .map_err(|_| RegistryError::TypeMismatch {
                saga_type: SagaType::of::<S>().to_string(),
                expected: type_name::<SagaConfig<S>>(),
                found: self.type_name,
            })
    }
}

impl core::fmt::Debug for ErasedSagaConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ErasedSagaConfig")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use sagaflow_core::{EventId, SagaId};
    use sagaflow_events::{Event, UuidCommitIdStrategy};

    use super::*;

    #[derive(Debug)]
    struct Tick;

    impl Event for Tick {
        fn event_id(&self) -> EventId {
            EventId::new()
        }

        fn event_type(&self) -> &'static str {
            "clock.tick"
        }

        fn occurred_at(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    struct Reminder;
    struct Escalation;

    impl Saga for Reminder {
        type Event = Tick;

        fn saga_id(&self) -> SagaId {
            SagaId::new()
        }
    }

    impl Saga for Escalation {
        type Event = Tick;

        fn saga_id(&self) -> SagaId {
            SagaId::new()
        }
    }

    struct ReminderProvider;

    impl ConfigProvider for ReminderProvider {
        type Saga = Reminder;

        fn saga_config(&self) -> Option<SagaConfig<Reminder>> {
            Some(SagaConfig::builder(UuidCommitIdStrategy).handles("clock.tick").build())
        }
    }

    #[test]
    fn typed_provider_reports_its_saga_type_when_erased() {
        let provider: Box<dyn ErasedConfigProvider> = Box::new(ReminderProvider);
        assert_eq!(provider.saga_type(), SagaType::of::<Reminder>());
        assert!(provider.name().ends_with("ReminderProvider"));

        let config = provider.erased_config().unwrap();
        assert!(config.is::<Reminder>());
        assert!(config.downcast::<Reminder>().unwrap().handles("clock.tick"));
    }

    #[test]
    fn downcast_to_another_saga_is_a_type_mismatch() {
        let config = ErasedSagaConfig::new(
            SagaConfig::<Escalation>::builder(UuidCommitIdStrategy).build(),
        );

        let err = config.downcast::<Reminder>().unwrap_err();
        match err {
            RegistryError::TypeMismatch { expected, found, .. } => {
                assert!(expected.contains("Reminder"));
                assert!(found.contains("Escalation"));
            }
            other => panic!("expected TypeMismatch, got {other:?}"),
        }
    }
}
