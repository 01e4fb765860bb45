use chrono::{DateTime, Utc};

use sagaflow_core::EventId;

/// A domain event as seen by a saga.
///
/// Events are:
/// - **immutable** (treat them as facts)
/// - **identified** (the id feeds commit-id generation)
/// - designed to be **append-only**
pub trait Event: core::fmt::Debug + Send + Sync + 'static {
    /// Unique identity of this event.
    fn event_id(&self) -> EventId;

    /// Stable event name/type identifier (e.g. "orders.order.placed").
    fn event_type(&self) -> &'static str;

    /// When the event occurred (business time).
    fn occurred_at(&self) -> DateTime<Utc>;
}
