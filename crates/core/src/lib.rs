//! `sagaflow-core`: identifiers and the domain error model shared by the
//! saga registry crates.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{EventId, SagaId};
