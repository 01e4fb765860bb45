//! Commit ids stay pairwise distinct across distinct (saga, event) applications.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use proptest::prelude::*;
use uuid::Uuid;

use sagaflow_core::{EventId, SagaId};
use sagaflow_events::{
    AtomicSequence, CommitIdGenerationStrategy, Event, Saga, SequencedCommitIdStrategy,
    UuidCommitIdStrategy,
};

#[derive(Debug)]
struct Received {
    id: EventId,
}

impl Event for Received {
    fn event_id(&self) -> EventId {
        self.id
    }

    fn event_type(&self) -> &'static str {
        "payments.payment.received"
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

struct Settlement {
    id: SagaId,
}

impl Saga for Settlement {
    type Event = Received;

    fn saga_id(&self) -> SagaId {
        self.id
    }
}

fn uuid_from(bits: u128) -> Uuid {
    Uuid::from_u128(bits)
}

/// (saga bits, event bits) pairs; duplicates are allowed on purpose so the
/// same logical application can be submitted more than once.
fn applications() -> impl Strategy<Value = Vec<(u128, u128)>> {
    prop::collection::vec((0u128..8, 0u128..64), 2..64)
}

proptest! {
    #[test]
    fn sequenced_ids_are_pairwise_distinct(apps in applications()) {
        let strategy = SequencedCommitIdStrategy::new(AtomicSequence::new());
        let mut seen = HashSet::new();

        for (saga_bits, event_bits) in &apps {
            let saga = Settlement { id: SagaId::from_uuid(uuid_from(*saga_bits)) };
            let event = Received { id: EventId::from_uuid(uuid_from(*event_bits)) };
            let id = strategy.generate(&saga, &event).unwrap();
            prop_assert!(seen.insert(id), "duplicate commit id");
        }
        prop_assert_eq!(seen.len(), apps.len());
    }

    #[test]
    fn uuid_ids_are_pairwise_distinct(apps in applications()) {
        let strategy = UuidCommitIdStrategy::new();
        let mut seen = HashSet::new();

        for (saga_bits, event_bits) in &apps {
            let saga = Settlement { id: SagaId::from_uuid(uuid_from(*saga_bits)) };
            let event = Received { id: EventId::from_uuid(uuid_from(*event_bits)) };
            let id = strategy.generate(&saga, &event).unwrap();
            prop_assert!(seen.insert(id), "duplicate commit id");
        }
    }
}

#[test]
fn concurrent_generation_never_collides() {
    let strategy = Arc::new(SequencedCommitIdStrategy::new(AtomicSequence::new()));
    let saga = Arc::new(Settlement { id: SagaId::new() });

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let strategy = strategy.clone();
            let saga = saga.clone();
            std::thread::spawn(move || {
                (0..500)
                    .map(|_| {
                        let event = Received { id: EventId::new() };
                        strategy.generate(&*saga, &event).unwrap()
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut all = HashSet::new();
    for handle in handles {
        for id in handle.join().unwrap() {
            assert!(all.insert(id));
        }
    }
    assert_eq!(all.len(), 8 * 500);
}
