//! Registry error model.

use thiserror::Error;

use sagaflow_events::SagaType;

/// Result type used by the registry and resolver.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Failures raised while registering or resolving saga configurations.
///
/// A lookup for a saga type nobody registered is **not** an error; it
/// resolves to `Ok(None)`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A provider could not be registered (fatal at startup).
    #[error("invalid saga configuration from provider '{provider}' for saga '{saga_type}': {reason}")]
    Configuration {
        provider: String,
        saga_type: String,
        reason: String,
    },

    /// A stored configuration does not belong to the requested saga type.
    #[error("configuration registered for saga '{saga_type}' is a '{found}', expected '{expected}'")]
    TypeMismatch {
        saga_type: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Discovery found nothing and the settings demand at least one provider.
    #[error("no saga config providers found")]
    NoProviders,

    /// `startup` already completed successfully.
    #[error("config resolver startup already performed")]
    AlreadyStarted,

    /// A writer panicked while holding a registry lock.
    #[error("registry lock poisoned")]
    LockPoisoned,
}

impl RegistryError {
    pub fn configuration(
        provider: impl Into<String>,
        saga_type: &SagaType,
        reason: impl Into<String>,
    ) -> Self {
        Self::Configuration {
            provider: provider.into(),
            saga_type: saga_type.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether this error must abort process startup.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::AlreadyStarted)
    }
}
