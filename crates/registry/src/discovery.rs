//! Provider discovery.
//!
//! Discovery is a single synchronous call that returns every provider
//! currently available. Enumeration order is defined by the discovery
//! mechanism and is not guaranteed to be stable between mechanisms.

use std::sync::Arc;

use crate::provider::ErasedConfigProvider;

/// Enumerates all available configuration providers.
pub trait ProviderDiscovery {
    fn discover(&self) -> Vec<Arc<dyn ErasedConfigProvider>>;
}

impl<F> ProviderDiscovery for F
where
    F: Fn() -> Vec<Arc<dyn ErasedConfigProvider>>,
{
    fn discover(&self) -> Vec<Arc<dyn ErasedConfigProvider>> {
        self()
    }
}

/// Explicitly wired providers, enumerated in insertion order.
#[derive(Default, Clone)]
pub struct StaticDiscovery {
    providers: Vec<Arc<dyn ErasedConfigProvider>>,
}

impl StaticDiscovery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, provider: impl ErasedConfigProvider + 'static) -> Self {
        self.push(Arc::new(provider));
        self
    }

    pub fn push(&mut self, provider: Arc<dyn ErasedConfigProvider>) {
        self.providers.push(provider);
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl ProviderDiscovery for StaticDiscovery {
    fn discover(&self) -> Vec<Arc<dyn ErasedConfigProvider>> {
        self.providers.clone()
    }
}

impl core::fmt::Debug for StaticDiscovery {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list()
            .entries(self.providers.iter().map(|p| p.name()))
            .finish()
    }
}

/// Link-time registration of a provider factory.
///
/// Submitted with [`submit_config_provider!`](crate::submit_config_provider)
/// and collected by [`InventoryDiscovery`].
pub struct ProviderRegistration {
    factory: fn() -> Arc<dyn ErasedConfigProvider>,
}

impl ProviderRegistration {
    pub const fn new(factory: fn() -> Arc<dyn ErasedConfigProvider>) -> Self {
        Self { factory }
    }

    pub fn instantiate(&self) -> Arc<dyn ErasedConfigProvider> {
        (self.factory)()
    }
}

inventory::collect!(ProviderRegistration);

/// Registers a provider for [`InventoryDiscovery`].
///
/// ```ignore
/// sagaflow_registry::submit_config_provider!(OrderSagaConfigProvider);
/// ```
#[macro_export]
macro_rules! submit_config_provider {
    ($provider:expr) => {
        $crate::inventory::submit! {
            $crate::discovery::ProviderRegistration::new(
                || -> ::std::sync::Arc<dyn $crate::provider::ErasedConfigProvider> {
                    ::std::sync::Arc::new($provider)
                }
            )
        }
    };
}

/// Every provider submitted with `submit_config_provider!` anywhere in the
/// final binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct InventoryDiscovery;

impl ProviderDiscovery for InventoryDiscovery {
    fn discover(&self) -> Vec<Arc<dyn ErasedConfigProvider>> {
        inventory::iter::<ProviderRegistration>
            .into_iter()
            .map(ProviderRegistration::instantiate)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use sagaflow_events::SagaType;

    use super::*;
    use crate::provider::ErasedSagaConfig;

    struct Named(&'static str);

    impl ErasedConfigProvider for Named {
        fn saga_type(&self) -> SagaType {
            unreachable!("not consulted by discovery")
        }

        fn erased_config(&self) -> Option<ErasedSagaConfig> {
            None
        }

        fn name(&self) -> &'static str {
            self.0
        }
    }

    #[test]
    fn static_discovery_keeps_insertion_order() {
        let discovery = StaticDiscovery::new()
            .with(Named("first"))
            .with(Named("second"))
            .with(Named("third"));

        let names: Vec<_> = discovery.discover().iter().map(|p| p.name()).collect();
        assert_eq!(names, ["first", "second", "third"]);
        assert_eq!(discovery.len(), 3);
    }

    #[test]
    fn static_discovery_can_enumerate_repeatedly() {
        let discovery = StaticDiscovery::new().with(Named("only"));
        assert_eq!(discovery.discover().len(), 1);
        assert_eq!(discovery.discover().len(), 1);
    }

    #[test]
    fn closures_discover() {
        let discovery = || {
            let provider: Arc<dyn ErasedConfigProvider> = Arc::new(Named("lazy"));
            vec![provider]
        };
        let found = ProviderDiscovery::discover(&discovery);
        assert_eq!(found[0].name(), "lazy");
    }

    #[test]
    fn empty_discovery_is_empty() {
        assert!(StaticDiscovery::new().discover().is_empty());
        assert!(StaticDiscovery::default().is_empty());
    }
}
