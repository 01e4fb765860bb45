//! Commit-id generation for saga state transitions.
//!
//! Every time a saga handles an event, the host persists the saga's new state
//! under a commit id. The persistence layer treats the id as an optimistic
//! concurrency token and rejects a write whose commit id already exists, so
//! two distinct (saga instance, event) applications must never share one.
//!
//! ## Retrying
//!
//! A `GenerationFailure` is final for the call that produced it. Callers must
//! not reuse any id from a failed attempt; the strategies in this module
//! consume fresh entropy (or a fresh sequence number) on every call, so a
//! retry with the same inputs yields a different id.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{Event, Saga};

/// Unique token identifying one saga state transition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitId(String);

impl CommitId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl core::fmt::Display for CommitId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CommitId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for CommitId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A strategy could not produce a commit id.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationFailure {
    /// The sequence source has no values left.
    #[error("sequence source '{source_name}' is exhausted")]
    SequenceExhausted { source_name: String },

    /// An external id source could not be reached.
    #[error("commit id source unavailable: {0}")]
    Unavailable(String),
}

impl GenerationFailure {
    /// Whether a later call (with fresh inputs) has a chance to succeed.
    ///
    /// An exhausted sequence stays exhausted; an unavailable source may come back.
    pub fn may_succeed_on_retry(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Produces the commit id used to persist a saga after it handled an event.
///
/// Implementations must return pairwise distinct ids for distinct
/// (saga instance, event) applications.
pub trait CommitIdGenerationStrategy<S: Saga>: Send + Sync {
    fn generate(&self, saga: &S, event: &S::Event) -> Result<CommitId, GenerationFailure>;
}

impl<S, F> CommitIdGenerationStrategy<S> for F
where
    S: Saga,
    F: Fn(&S, &S::Event) -> Result<CommitId, GenerationFailure> + Send + Sync,
{
    fn generate(&self, saga: &S, event: &S::Event) -> Result<CommitId, GenerationFailure> {
        self(saga, event)
    }
}

/// Fresh UUIDv7 per call, independent of the inputs.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidCommitIdStrategy;

impl UuidCommitIdStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl<S: Saga> CommitIdGenerationStrategy<S> for UuidCommitIdStrategy {
    fn generate(&self, _saga: &S, _event: &S::Event) -> Result<CommitId, GenerationFailure> {
        Ok(CommitId::new(Uuid::now_v7().to_string()))
    }
}

/// Source of monotonically increasing sequence numbers.
///
/// Returns `None` once no further values can be issued.
pub trait SequenceSource: Send + Sync {
    fn next_value(&self) -> Option<u64>;

    /// Name used in failures and logs.
    fn name(&self) -> &str {
        "sequence"
    }
}

impl<Q: SequenceSource + ?Sized> SequenceSource for Arc<Q> {
    fn next_value(&self) -> Option<u64> {
        (**self).next_value()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// In-process sequence backed by an atomic counter.
#[derive(Debug)]
pub struct AtomicSequence {
    name: String,
    start: u64,
    capacity: u64,
    issued: AtomicU64,
}

impl AtomicSequence {
    /// Sequence starting at 1 with no practical limit.
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(start: u64) -> Self {
        Self {
            name: "atomic".to_string(),
            start,
            capacity: u64::MAX,
            issued: AtomicU64::new(0),
        }
    }

    /// Limit the number of values this sequence will ever issue.
    pub fn with_capacity(mut self, capacity: u64) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Number of values issued so far.
    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::Acquire)
    }
}

impl Default for AtomicSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl SequenceSource for AtomicSequence {
    fn next_value(&self) -> Option<u64> {
        let capacity = self.capacity;
        let prev = self
            .issued
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < capacity).then_some(n + 1)
            })
            .ok()?;
        self.start.checked_add(prev)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Combines saga identity, a sequence number and event identity.
///
/// Ids look like `{saga_id}:{sequence}:{event_id}`. Each call consumes a new
/// sequence number, so repeating a call never repeats an id.
#[derive(Debug, Default)]
pub struct SequencedCommitIdStrategy<Q = AtomicSequence> {
    source: Q,
}

impl<Q: SequenceSource> SequencedCommitIdStrategy<Q> {
    pub fn new(source: Q) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &Q {
        &self.source
    }
}

impl<S, Q> CommitIdGenerationStrategy<S> for SequencedCommitIdStrategy<Q>
where
    S: Saga,
    Q: SequenceSource,
{
    fn generate(&self, saga: &S, event: &S::Event) -> Result<CommitId, GenerationFailure> {
        let Some(sequence) = self.source.next_value() else {
            tracing::warn!(
                source = self.source.name(),
                saga = S::saga_name(),
                "commit id sequence exhausted"
            );
            return Err(GenerationFailure::SequenceExhausted {
                source_name: self.source.name().to_string(),
            });
        };

        Ok(CommitId::new(format!(
            "{}:{}:{}",
            saga.saga_id(),
            sequence,
            event.event_id()
        )))
    }
}
