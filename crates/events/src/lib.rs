//! Saga and event contracts plus commit-id generation.
//!
//! Saga business logic lives outside this workspace; this crate only defines
//! what the registry needs to know about a saga (its identity and type token)
//! and how each saga state transition gets a unique commit id.

pub mod commit;
pub mod event;
pub mod saga;

pub use commit::{
    AtomicSequence, CommitId, CommitIdGenerationStrategy, GenerationFailure,
    SequenceSource, SequencedCommitIdStrategy, UuidCommitIdStrategy,
};
pub use event::Event;
pub use saga::{Saga, SagaType};
