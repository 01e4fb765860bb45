//! Per-saga-type configuration.

use std::collections::BTreeSet;
use std::sync::Arc;

use sagaflow_core::SagaId;
use sagaflow_events::{CommitId, CommitIdGenerationStrategy, GenerationFailure, Saga};

/// Everything the host needs to run sagas of type `S`: how to generate commit
/// ids, which events to dispatch to them, and where to persist their state.
pub struct SagaConfig<S: Saga> {
    commit_ids: Arc<dyn CommitIdGenerationStrategy<S>>,
    handled_events: BTreeSet<&'static str>,
    stream_prefix: String,
}

impl<S: Saga> SagaConfig<S> {
    pub fn builder(strategy: impl CommitIdGenerationStrategy<S> + 'static) -> SagaConfigBuilder<S> {
        SagaConfigBuilder {
            commit_ids: Arc::new(strategy),
            handled_events: BTreeSet::new(),
            stream_prefix: None,
        }
    }

    pub fn commit_id_strategy(&self) -> &dyn CommitIdGenerationStrategy<S> {
        &*self.commit_ids
    }

    /// Commit id for persisting `saga` after it handled `event`.
    pub fn generate_commit_id(
        &self,
        saga: &S,
        event: &S::Event,
    ) -> Result<CommitId, GenerationFailure> {
        self.commit_ids.generate(saga, event)
    }

    /// Whether events of `event_type` are dispatched to this saga.
    pub fn handles(&self, event_type: &str) -> bool {
        self.handled_events.contains(event_type)
    }

    pub fn handled_events(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handled_events.iter().copied()
    }

    pub fn stream_prefix(&self) -> &str {
        &self.stream_prefix
    }

    /// Persistence stream name for one saga instance.
    pub fn stream_name(&self, saga_id: SagaId) -> String {
        format!("{}-{}", self.stream_prefix, saga_id)
    }
}

impl<S: Saga> Clone for SagaConfig<S> {
    fn clone(&self) -> Self {
        Self {
            commit_ids: Arc::clone(&self.commit_ids),
            handled_events: self.handled_events.clone(),
            stream_prefix: self.stream_prefix.clone(),
        }
    }
}

impl<S: Saga> core::fmt::Debug for SagaConfig<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SagaConfig")
            .field("saga", &S::saga_name())
            .field("handled_events", &self.handled_events)
            .field("stream_prefix", &self.stream_prefix)
            .finish_non_exhaustive()
    }
}

pub struct SagaConfigBuilder<S: Saga> {
    commit_ids: Arc<dyn CommitIdGenerationStrategy<S>>,
    handled_events: BTreeSet<&'static str>,
    stream_prefix: Option<String>,
}

impl<S: Saga> SagaConfigBuilder<S> {
    /// Dispatch events of `event_type` to this saga.
    pub fn handles(mut self, event_type: &'static str) -> Self {
        self.handled_events.insert(event_type);
        self
    }

    pub fn handles_all(mut self, event_types: impl IntoIterator<Item = &'static str>) -> Self {
        self.handled_events.extend(event_types);
        self
    }

    /// Defaults to the saga's name.
    pub fn stream_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.stream_prefix = Some(prefix.into());
        self
    }

    pub fn build(self) -> SagaConfig<S> {
        SagaConfig {
            commit_ids: self.commit_ids,
            handled_events: self.handled_events,
            stream_prefix: self
                .stream_prefix
                .unwrap_or_else(|| S::saga_name().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use sagaflow_core::EventId;
    use sagaflow_events::{AtomicSequence, Event, SequencedCommitIdStrategy};

    use super::*;

    #[derive(Debug)]
    struct Shipped {
        id: EventId,
    }

    impl Event for Shipped {
        fn event_id(&self) -> EventId {
            self.id
        }

        fn event_type(&self) -> &'static str {
            "shipping.parcel.shipped"
        }

        fn occurred_at(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    struct Delivery {
        id: SagaId,
    }

    impl Saga for Delivery {
        type Event = Shipped;

        fn saga_id(&self) -> SagaId {
            self.id
        }

        fn saga_name() -> &'static str {
            "delivery"
        }
    }

    fn config() -> SagaConfig<Delivery> {
        SagaConfig::builder(SequencedCommitIdStrategy::new(AtomicSequence::new()))
            .handles("shipping.parcel.shipped")
            .handles_all(["shipping.parcel.lost", "shipping.parcel.shipped"])
            .build()
    }

    #[test]
    fn builder_collects_handled_events_as_a_set() {
        let config = config();
        assert!(config.handles("shipping.parcel.shipped"));
        assert!(config.handles("shipping.parcel.lost"));
        assert!(!config.handles("billing.invoice.paid"));
        assert_eq!(
            config.handled_events().collect::<Vec<_>>(),
            vec!["shipping.parcel.lost", "shipping.parcel.shipped"]
        );
    }

    #[test]
    fn stream_prefix_defaults_to_saga_name() {
        let id = SagaId::new();
        assert_eq!(config().stream_name(id), format!("delivery-{id}"));

        let custom = SagaConfig::<Delivery>::builder(SequencedCommitIdStrategy::<AtomicSequence>::default())
            .stream_prefix("saga.delivery")
            .build();
        assert_eq!(custom.stream_prefix(), "saga.delivery");
    }

    #[test]
    fn clones_share_the_commit_id_strategy() {
        let config = config();
        let copy = config.clone();
        let saga = Delivery { id: SagaId::new() };
        let event = Shipped { id: EventId::new() };

        let a = config.generate_commit_id(&saga, &event).unwrap();
        let b = copy.generate_commit_id(&saga, &event).unwrap();
        assert_ne!(a, b);
        assert!(a.as_str().contains(":1:"));
        assert!(b.as_str().contains(":2:"));
    }
}
