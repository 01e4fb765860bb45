//! Saga configuration resolver.
//!
//! ## Lifecycle
//!
//! The resolver starts **Uninitialized**. `startup()` runs the discovery pass
//! once and moves it to **Ready**; there is no way back. Lookups are legal in
//! both states; before startup they simply miss.
//!
//! ## Startup protocol
//!
//! 1. Enumerate all providers. An empty enumeration is logged as a warning
//!    (or rejected when `ResolverSettings::fail_on_empty` is set).
//! 2. Extract `(SagaType, config)` from every provider in enumeration order.
//!    A provider without a config fails the whole pass before anything has
//!    been inserted, leaving the resolver Uninitialized and empty-handed.
//! 3. Under a single write-lock acquisition, check the batch against the
//!    `DuplicatePolicy`, insert every pair and flip the state to Ready. A saga
//!    type seen before is overwritten (last write wins) or rejects the whole
//!    batch. Late registrations cannot interleave with the batch.
//!
//! Concurrent `startup` calls are serialized. A caller that arrives while a
//! pass is running waits for it: after a successful pass it gets
//! `AlreadyStarted`, after a failed one it runs its own pass.
//!
//! ## Concurrency
//!
//! Readers share an `RwLock` over the config map; a registration holds the
//! write lock while it updates both the map and the saga-type set, so no
//! reader can observe a type in `all_sagas()` whose config is not yet
//! resolvable, or the other way round. Late registrations through
//! `register_provider` follow the same path.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use sagaflow_events::{Saga, SagaType};

use crate::config::SagaConfig;
use crate::discovery::ProviderDiscovery;
use crate::error::{RegistryError, RegistryResult};
use crate::provider::{ErasedConfigProvider, ErasedSagaConfig};
use crate::settings::{DuplicatePolicy, ResolverSettings};
use crate::type_registry::{SagaRegistry, SagaTypeRegistry};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverState {
    #[default]
    Uninitialized,
    Ready,
}

/// Who registered a saga type, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub saga_type: SagaType,
    pub provider: &'static str,
    pub registered_at: DateTime<Utc>,
}

/// Point-in-time view for admin tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolverSnapshot {
    pub state: ResolverState,
    pub registrations: Vec<Registration>,
}

#[derive(Debug)]
struct Entry {
    config: ErasedSagaConfig,
    registration: Registration,
}

#[derive(Debug, Default)]
struct Inner {
    state: ResolverState,
    configs: HashMap<SagaType, Entry>,
}

/// Extracted from a provider, not yet visible to readers.
struct Staged {
    saga_type: SagaType,
    provider: &'static str,
    config: ErasedSagaConfig,
}

/// Resolves `SagaConfig`s by saga type.
///
/// Construct once during process initialization, call `startup`, then share
/// (typically behind an `Arc`) with the workers that dispatch events.
#[derive(Debug, Default)]
pub struct ConfigResolver {
    settings: ResolverSettings,
    inner: RwLock<Inner>,
    sagas: SagaTypeRegistry,
    startup_gate: Mutex<()>,
}

impl ConfigResolver {
    pub fn new(settings: ResolverSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Run the discovery pass and move to `Ready`.
    ///
    /// Returns the number of providers registered. Only one successful pass
    /// is allowed per resolver; a failed pass may be retried.
    pub fn startup(&self, discovery: &dyn ProviderDiscovery) -> RegistryResult<usize> {
        // A pass that panicked published nothing, so the gate stays usable.
        let _gate = self
            .startup_gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if self.is_ready() {
            return Err(RegistryError::AlreadyStarted);
        }

        let result = self.discover_and_register(discovery);
        if let Err(err) = &result {
            error!(error = %err, "saga config resolver startup failed");
        }
        result
    }

    fn discover_and_register(&self, discovery: &dyn ProviderDiscovery) -> RegistryResult<usize> {
        info!("scanning saga config providers");
        let providers = discovery.discover();

        if providers.is_empty() {
            if self.settings.fail_on_empty {
                return Err(RegistryError::NoProviders);
            }
            warn!("no saga config providers found");
        }

        let staged = providers
            .iter()
            .map(|provider| Self::extract(provider.as_ref()))
            .collect::<RegistryResult<Vec<_>>>()?;

        let mut inner = self.inner.write().map_err(|_| RegistryError::LockPoisoned)?;
        if self.settings.duplicate_policy == DuplicatePolicy::Reject {
            Self::check_unique(&inner, &staged)?;
        }

        self.sagas
            .register_all(staged.iter().map(|entry| entry.saga_type))?;
        let count = staged.len();
        for entry in staged {
            Self::store(&mut inner, entry);
        }
        inner.state = ResolverState::Ready;
        info!(
            providers = count,
            saga_types = inner.configs.len(),
            "saga config resolver ready"
        );
        Ok(count)
    }

    /// Register one provider outside the startup pass.
    ///
    /// Allowed before and after `startup`; follows the same validation and
    /// duplicate policy.
    pub fn register_provider(&self, provider: &dyn ErasedConfigProvider) -> RegistryResult<()> {
        let staged = Self::extract(provider)?;
        self.insert(staged)
    }

    /// Register a configuration directly, without a provider.
    pub fn register<S: Saga>(&self, config: SagaConfig<S>) -> RegistryResult<()> {
        self.insert(Staged {
            saga_type: SagaType::of::<S>(),
            provider: "direct",
            config: ErasedSagaConfig::new(config),
        })
    }

    /// Configuration for saga type `S`.
    ///
    /// `Ok(None)` when no provider registered `S`. A stored configuration that
    /// is not a `SagaConfig<S>` is a registration defect and yields
    /// `RegistryError::TypeMismatch`.
    pub fn configure<S: Saga>(&self) -> RegistryResult<Option<Arc<SagaConfig<S>>>> {
        let Some(erased) = self.configure_erased(&SagaType::of::<S>()) else {
            return Ok(None);
        };

        match erased.downcast::<S>() {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                error!(error = %err, "saga config type mismatch");
                Err(err)
            }
        }
    }

    /// Untyped lookup for callers that only hold a `SagaType` token.
    pub fn configure_erased(&self, saga_type: &SagaType) -> Option<ErasedSagaConfig> {
        self.read()
            .configs
            .get(saga_type)
            .map(|entry| entry.config.clone())
    }

    pub fn state(&self) -> ResolverState {
        self.read().state
    }

    pub fn is_ready(&self) -> bool {
        self.state() == ResolverState::Ready
    }

    pub fn len(&self) -> usize {
        self.read().configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().configs.is_empty()
    }

    /// Current registrations, sorted by saga type.
    pub fn registrations(&self) -> Vec<Registration> {
        Self::sorted_registrations(&self.read())
    }

    pub fn snapshot(&self) -> ResolverSnapshot {
        let inner = self.read();
        ResolverSnapshot {
            state: inner.state,
            registrations: Self::sorted_registrations(&inner),
        }
    }

    fn sorted_registrations(inner: &Inner) -> Vec<Registration> {
        let mut registrations: Vec<_> = inner
            .configs
            .values()
            .map(|entry| entry.registration.clone())
            .collect();
        registrations.sort_by(|a, b| a.saga_type.cmp(&b.saga_type));
        registrations
    }

    fn extract(provider: &dyn ErasedConfigProvider) -> RegistryResult<Staged> {
        let saga_type = provider.saga_type();
        let name = provider.name();
        info!(provider = name, saga_type = %saga_type, "discovered saga config provider");

        let config = provider.erased_config().ok_or_else(|| {
            RegistryError::configuration(name, &saga_type, "provider returned no saga config")
        })?;

        Ok(Staged {
            saga_type,
            provider: name,
            config,
        })
    }

    fn check_unique(inner: &Inner, staged: &[Staged]) -> RegistryResult<()> {
        let mut seen: HashMap<SagaType, &'static str> = HashMap::new();

        for entry in staged {
            let earlier = seen
                .insert(entry.saga_type, entry.provider)
                .or_else(|| {
                    inner
                        .configs
                        .get(&entry.saga_type)
                        .map(|existing| existing.registration.provider)
                });
            if let Some(earlier) = earlier {
                return Err(Self::duplicate(entry, earlier));
            }
        }
        Ok(())
    }

    fn duplicate(entry: &Staged, earlier: &'static str) -> RegistryError {
        RegistryError::configuration(
            entry.provider,
            &entry.saga_type,
            format!("saga type already registered by provider '{earlier}'"),
        )
    }

    fn insert(&self, staged: Staged) -> RegistryResult<()> {
        let mut inner = self.inner.write().map_err(|_| RegistryError::LockPoisoned)?;

        if self.settings.duplicate_policy == DuplicatePolicy::Reject {
            if let Some(existing) = inner.configs.get(&staged.saga_type) {
                return Err(Self::duplicate(&staged, existing.registration.provider));
            }
        }

        // Both updates happen under the config write lock; readers of either
        // side see the pair appear together.
        self.sagas.register(staged.saga_type)?;
        Self::store(&mut inner, staged);
        Ok(())
    }

    /// Caller holds the write lock and has already applied the duplicate policy.
    fn store(inner: &mut Inner, staged: Staged) {
        let entry = Entry {
            config: staged.config,
            registration: Registration {
                saga_type: staged.saga_type,
                provider: staged.provider,
                registered_at: Utc::now(),
            },
        };

        match inner.configs.insert(staged.saga_type, entry) {
            Some(replaced) => warn!(
                saga_type = %staged.saga_type,
                replaced = replaced.registration.provider,
                provider = staged.provider,
                "saga config overwritten by later provider"
            ),
            None => {
                debug!(saga_type = %staged.saga_type, provider = staged.provider, "saga config registered")
            }
        }
    }

    // Writers only insert whole entries, so a poisoned lock still guards a
    // consistent map.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SagaRegistry for ConfigResolver {
    fn all_sagas(&self) -> HashSet<SagaType> {
        self.sagas.all_sagas()
    }
}
