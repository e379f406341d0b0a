//! Hot-swappable services
//!
//! A service is the bundle of factories and callbacks the parser delegates to
//! while building a document. Exactly one service is active per
//! [`ServiceKey`]; [`ServiceRegistry::provide`] swaps it and rolls back to the
//! previous one when the newcomer declares itself unusable.

mod default;

pub use default::DefaultService;

use std::{collections::HashMap, fmt, sync::Arc};

use tracing::{debug, error, info, warn};

use crate::{
    context::SkdContext,
    error::{Result, ServiceError, SkdError},
    holder::DatabaseHolder,
    parser::{config::ParserConfig, SkdParser},
    structure::{
        Database, DoctypeDeclaration, Property, Structure, Tag, VersionDeclaration,
    },
};

/// Capability a service is registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceKey(&'static str);

impl ServiceKey {
    /// The SKD parsing capability
    pub const SKD: Self = Self("skd");

    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

pub trait SkdService: Send + Sync {
    /// Stable identifier of the implementation, passed to the successor on a swap
    fn kind(&self) -> &'static str;

    fn initialize(&self) {}

    fn finalize(&self) {}

    /// Carries state over from the service being replaced (or the one that failed)
    fn grab_info(&self, _previous: Option<&dyn SkdService>, _previous_kind: Option<&'static str>) {}

    fn is_usable(&self) -> bool {
        true
    }

    fn parser_config(&self) -> ParserConfig {
        ParserConfig::default()
    }

    fn parser(&self, context: Arc<SkdContext>, holder: Box<dyn DatabaseHolder>) -> SkdParser {
        SkdParser::with_config(context, holder, self.parser_config())
    }

    fn tag(&self, name: &str) -> Result<Tag> {
        Tag::new(name)
    }

    fn tag_callback(&self, tag: Tag) -> Result<Tag> {
        Ok(tag)
    }

    fn property(&self, name: &str, value: Option<String>) -> Result<Property> {
        Property::new(name, value)
    }

    fn property_callback(&self, property: Property) -> Result<Property> {
        Ok(property)
    }

    fn structure(&self) -> Structure {
        Structure::new()
    }

    fn doctype(&self, stylesheet: &str) -> DoctypeDeclaration {
        DoctypeDeclaration::new(stylesheet)
    }

    fn version(&self, version: &str) -> VersionDeclaration {
        VersionDeclaration::new(version)
    }

    fn database(
        &self,
        structure: Structure,
        doctype: DoctypeDeclaration,
        version: VersionDeclaration,
    ) -> Database {
        Database::new(structure, doctype, version)
    }

    fn database_callback(&self, database: Database) -> Result<Database> {
        Ok(database)
    }
}

/// Outcome of [`ServiceRegistry::provide`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provision {
    /// The service was already active
    Unchanged,
    /// The service is now active
    Installed,
    /// The service was unusable; the previous one is active again
    RolledBack,
}

#[derive(Default)]
pub struct ServiceRegistry {
    services: HashMap<ServiceKey, Arc<dyn SkdService>>,
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.services.iter().map(|(key, service)| (key, service.kind())))
            .finish()
    }
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: ServiceKey) -> Result<Arc<dyn SkdService>> {
        self.services
            .get(&key)
            .cloned()
            .ok_or_else(|| SkdError::service(ServiceError::MissingService(key.to_string())))
    }

    pub fn active(&self, key: ServiceKey) -> Option<&Arc<dyn SkdService>> {
        self.services.get(&key)
    }

    pub fn is_active(&self, key: ServiceKey, service: &Arc<dyn SkdService>) -> bool {
        self.services
            .get(&key)
            .is_some_and(|current| same_instance(current, service))
    }

    /// Makes `service` the active implementation for `key`
    pub fn provide(&mut self, key: ServiceKey, service: Arc<dyn SkdService>) -> Result<Provision> {
        if self.is_active(key, &service) {
            debug!("Service {} already active for {}", service.kind(), key);
            return Ok(Provision::Unchanged);
        }

        let previous = self.services.get(&key).cloned();
        if let Some(previous) = &previous {
            debug!("Finalizing service {}", previous.kind());
            previous.finalize();
        }

        service.initialize();
        service.grab_info(previous.as_deref(), previous.as_ref().map(|p| p.kind()));

        if service.is_usable() {
            info!("Service {} is now active for {}", service.kind(), key);
            self.services.insert(key, service);
            return Ok(Provision::Installed);
        }

        let Some(previous) = previous else {
            error!("Service {} is not usable and nothing can replace it", service.kind());
            return Err(SkdError::service(ServiceError::NoUsableService(
                service.kind().to_string(),
            )));
        };

        warn!(
            "Service {} is not usable, rolling back to {}",
            service.kind(),
            previous.kind()
        );
        service.finalize();
        previous.initialize();
        previous.grab_info(Some(service.as_ref()), Some(service.kind()));

        if !previous.is_usable() {
            error!(
                "Rollback target {} is not usable either, no service left for {}",
                previous.kind(),
                key
            );
            self.services.remove(&key);
            return Err(SkdError::service(ServiceError::RollbackUnusable(
                service.kind().to_string(),
            )));
        }

        Ok(Provision::RolledBack)
    }
}

fn same_instance(left: &Arc<dyn SkdService>, right: &Arc<dyn SkdService>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(left), Arc::as_ptr(right))
}
