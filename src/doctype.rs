//! Doctype providers and the registry that resolves declarations against them
//!
//! A provider is looked up by its stylesheet token, which is compared for
//! equality only and never fetched.

use std::{fmt, sync::Arc};

use tracing::{debug, warn};

use crate::structure::{DoctypeDeclaration, Structure};

/// Name and stylesheet of the provider seeded into every registry
pub const DEFAULT_PROVIDER: &str = "default";

pub trait DoctypeProvider: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn is_usable(&self) -> bool {
        true
    }

    /// Identity token matched against `DoctypeDeclaration::stylesheet`
    fn stylesheet(&self) -> Option<&str>;

    fn is_structure_valid(&self, structure: &Structure) -> bool;
}

/// Accepts every structure declared with `<!DOCTYPE skd default>`
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultProvider;

impl DoctypeProvider for DefaultProvider {
    fn name(&self) -> &str {
        DEFAULT_PROVIDER
    }

    fn stylesheet(&self) -> Option<&str> {
        Some(DEFAULT_PROVIDER)
    }

    fn is_structure_valid(&self, _structure: &Structure) -> bool {
        true
    }
}

#[derive(Debug, Clone)]
pub struct DoctypeRegistry {
    providers: Vec<Arc<dyn DoctypeProvider>>,
}

impl Default for DoctypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DoctypeRegistry {
    /// Registry seeded with the [`DefaultProvider`]
    pub fn new() -> Self {
        Self {
            providers: vec![Arc::new(DefaultProvider)],
        }
    }

    pub fn empty() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Adds a provider; unnamed, unusable or stylesheet-less providers are refused
    pub fn register(&mut self, provider: Arc<dyn DoctypeProvider>) -> bool {
        if provider.name().is_empty() {
            warn!("Refusing doctype provider without a name");
            return false;
        }
        if !provider.is_usable() {
            warn!("Refusing unusable doctype provider {}", provider.name());
            return false;
        }
        if provider.stylesheet().map_or(true, str::is_empty) {
            warn!("Refusing doctype provider {} without stylesheet", provider.name());
            return false;
        }
        debug!("Registered doctype provider {}", provider.name());
        self.providers.push(provider);
        true
    }

    /// First usable provider whose stylesheet equals the declared one
    pub fn resolve(&self, declaration: &DoctypeDeclaration) -> Option<Arc<dyn DoctypeProvider>> {
        self.providers
            .iter()
            .find(|provider| {
                provider.stylesheet() == Some(declaration.stylesheet()) && provider.is_usable()
            })
            .cloned()
    }

    pub fn providers(&self) -> &[Arc<dyn DoctypeProvider>] {
        &self.providers
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Debug)]
    struct Toggle {
        name: &'static str,
        stylesheet: Option<&'static str>,
        usable: AtomicBool,
    }

    impl Toggle {
        fn new(name: &'static str, stylesheet: Option<&'static str>) -> Self {
            Self {
                name,
                stylesheet,
                usable: AtomicBool::new(true),
            }
        }
    }

    impl DoctypeProvider for Toggle {
        fn name(&self) -> &str {
            self.name
        }

        fn is_usable(&self) -> bool {
            self.usable.load(Ordering::SeqCst)
        }

        fn stylesheet(&self) -> Option<&str> {
            self.stylesheet
        }

        fn is_structure_valid(&self, _structure: &Structure) -> bool {
            false
        }
    }

    #[test]
    fn test_default_provider_is_seeded() {
        let registry = DoctypeRegistry::new();
        let provider = registry.resolve(&DoctypeDeclaration::new("default"));
        assert_eq!(provider.map(|p| p.name().to_string()), Some("default".to_string()));
        assert!(DoctypeRegistry::empty().is_empty());
    }

    #[test]
    fn test_register_rejects_incomplete_providers() {
        let mut registry = DoctypeRegistry::empty();
        assert!(!registry.register(Arc::new(Toggle::new("", Some("x")))));
        assert!(!registry.register(Arc::new(Toggle::new("nosheet", None))));
        assert!(!registry.register(Arc::new(Toggle::new("blank", Some("")))));

        let unusable = Toggle::new("off", Some("x"));
        unusable.usable.store(false, Ordering::SeqCst);
        assert!(!registry.register(Arc::new(unusable)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_resolve_skips_providers_that_became_unusable() {
        let mut registry = DoctypeRegistry::empty();
        let first = Arc::new(Toggle::new("first", Some("sheet")));
        assert!(registry.register(first.clone()));
        assert!(registry.register(Arc::new(Toggle::new("second", Some("sheet")))));

        let declaration = DoctypeDeclaration::new("sheet");
        assert_eq!(registry.resolve(&declaration).map(|p| p.name().to_string()), Some("first".to_string()));

        first.usable.store(false, Ordering::SeqCst);
        assert_eq!(registry.resolve(&declaration).map(|p| p.name().to_string()), Some("second".to_string()));
    }
}
