use std::collections::HashMap;
use std::sync::Arc;

use courier_core::ProviderId;

use crate::provider::DynProvider;

/// Name-indexed collection of carrier adapters.
///
/// Built once at startup and then read concurrently; registration after the
/// orchestrator is built is not supported.
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderId, Arc<dyn DynProvider>>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under its own name, replacing any previous
    /// registration with the same name.
    pub fn register(&mut self, provider: Arc<dyn DynProvider>) {
        let id = ProviderId::new(provider.name());
        self.providers.insert(id, provider);
    }

    /// Look up a provider by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn DynProvider>> {
        self.providers.get(name).cloned()
    }

    /// Whether a provider with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// All registered provider ids, sorted.
    pub fn ids(&self) -> Vec<ProviderId> {
        let mut ids: Vec<ProviderId> = self.providers.keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    /// Number of registered providers.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether no providers are registered.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.ids())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::LogProvider;

    #[test]
    fn register_and_lookup() {
        let mut registry = ProviderRegistry::new();
        assert!(registry.is_empty());

        registry.register(Arc::new(LogProvider::new("b")));
        registry.register(Arc::new(LogProvider::new("a")));

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("a"));
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.get("b").unwrap().name(), "b");
    }

    #[test]
    fn ids_are_sorted() {
        let mut registry = ProviderRegistry::new();
        for name in ["ses", "mailgun", "postmark"] {
            registry.register(Arc::new(LogProvider::new(name)));
        }
        let ids: Vec<String> = registry.ids().into_iter().map(ProviderId::into_inner).collect();
        assert_eq!(ids, vec!["mailgun", "postmark", "ses"]);
    }

    #[test]
    fn re_registering_replaces() {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(LogProvider::new("dup")));
        registry.register(Arc::new(LogProvider::new("dup")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn debug_lists_ids() {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(LogProvider::new("log")));
        assert!(format!("{registry:?}").contains("log"));
    }
}
