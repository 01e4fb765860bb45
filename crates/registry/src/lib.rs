//! Saga configuration registry.
//!
//! Providers are discovered once at process startup, indexed by saga type,
//! and then resolved concurrently by event-processing workers:
//!
//! ```text
//! ProviderDiscovery ──► ConfigResolver::startup ──► { SagaType → SagaConfig }
//!                                                        │
//!                           workers ◄── configure::<S>() ┘
//!                           tooling ◄── all_sagas()
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod provider;
pub mod resolver;
pub mod settings;
pub mod type_registry;

pub use config::{SagaConfig, SagaConfigBuilder};
pub use discovery::{InventoryDiscovery, ProviderDiscovery, ProviderRegistration, StaticDiscovery};
pub use error::{RegistryError, RegistryResult};
pub use provider::{ConfigProvider, ErasedConfigProvider, ErasedSagaConfig};
pub use resolver::{ConfigResolver, Registration, ResolverSnapshot, ResolverState};
pub use settings::{DuplicatePolicy, ResolverSettings};
pub use type_registry::{SagaRegistry, SagaTypeRegistry};

#[doc(hidden)]
pub use inventory;
