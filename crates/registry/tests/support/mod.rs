//! Shared saga fixtures for the registry integration tests.

#![allow(dead_code)]

use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use sagaflow_core::{EventId, SagaId};
use sagaflow_events::{Event, Saga, UuidCommitIdStrategy};
use sagaflow_registry::{ConfigProvider, SagaConfig};

#[derive(Debug)]
pub struct DomainEvent {
    pub id: EventId,
    pub kind: &'static str,
}

impl DomainEvent {
    pub fn new(kind: &'static str) -> Self {
        Self {
            id: EventId::new(),
            kind,
        }
    }
}

impl Event for DomainEvent {
    fn event_id(&self) -> EventId {
        self.id
    }

    fn event_type(&self) -> &'static str {
        self.kind
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Saga kinds distinguished only by their const parameter.
pub struct Numbered<const N: usize> {
    pub id: SagaId,
}

impl<const N: usize> Saga for Numbered<N> {
    type Event = DomainEvent;

    fn saga_id(&self) -> SagaId {
        self.id
    }
}

pub type TypeA = Numbered<0>;
pub type TypeB = Numbered<1>;
pub type TypeC = Numbered<2>;

/// Provider tagging its config through the stream prefix, so tests can tell
/// which provider's config won.
pub struct TaggedProvider<S> {
    pub tag: &'static str,
    _saga: PhantomData<fn() -> S>,
}

impl<S> TaggedProvider<S> {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            _saga: PhantomData,
        }
    }
}

impl<S: Saga> ConfigProvider for TaggedProvider<S> {
    type Saga = S;

    fn saga_config(&self) -> Option<SagaConfig<S>> {
        Some(
            SagaConfig::builder(UuidCommitIdStrategy)
                .handles("test.event")
                .stream_prefix(self.tag)
                .build(),
        )
    }

    fn provider_name(&self) -> &'static str {
        self.tag
    }
}

/// Provider that declares its saga type but hands out no config.
pub struct EmptyProvider<S>(PhantomData<fn() -> S>);

impl<S> EmptyProvider<S> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<S: Saga> ConfigProvider for EmptyProvider<S> {
    type Saga = S;

    fn saga_config(&self) -> Option<SagaConfig<S>> {
        None
    }
}

pub fn init_tracing() {
    sagaflow_observability::tracing::init_with_default("sagaflow_registry=debug");
}
