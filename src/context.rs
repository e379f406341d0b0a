//! Registries shared by the parsers of one configuration
//!
//! Each registry sits behind its own `parking_lot::RwLock`, so a context can be
//! shared between threads as `Arc<SkdContext>`. Locks are only held for the
//! duration of a single lookup or mutation, except that refinement transforms
//! and doctype providers run under a read lock and must not mutate the
//! context themselves.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::info;

use crate::{
    doctype::DoctypeRegistry,
    error::{Result, ServiceError, SkdError},
    extension,
    holder::DatabaseHolder,
    parser::SkdParser,
    refine::Refiner,
    service::{DefaultService, Provision, ServiceKey, ServiceRegistry, SkdService},
    structure::{Database, Property, Tag},
};

#[derive(Debug)]
pub struct SkdContext {
    services: RwLock<ServiceRegistry>,
    doctypes: RwLock<DoctypeRegistry>,
    refiner: RwLock<Refiner>,
}

impl SkdContext {
    /// Default provider, [`DefaultService`] and the built-in refinement rules
    pub fn new() -> Result<Self> {
        let context = Self::empty()?;
        context.load_extension(extension::REFINEMENTS, extension::BUILTIN_VERSION)?;
        Ok(context)
    }

    /// Default provider and [`DefaultService`], without refinement rules
    pub fn empty() -> Result<Self> {
        let context = Self {
            services: RwLock::new(ServiceRegistry::new()),
            doctypes: RwLock::new(DoctypeRegistry::new()),
            refiner: RwLock::new(Refiner::new()),
        };
        context.provide(Arc::new(DefaultService::new()))?;
        Ok(context)
    }

    pub fn services(&self) -> RwLockReadGuard<'_, ServiceRegistry> {
        self.services.read()
    }

    pub fn services_mut(&self) -> RwLockWriteGuard<'_, ServiceRegistry> {
        self.services.write()
    }

    pub fn doctypes(&self) -> RwLockReadGuard<'_, DoctypeRegistry> {
        self.doctypes.read()
    }

    pub fn doctypes_mut(&self) -> RwLockWriteGuard<'_, DoctypeRegistry> {
        self.doctypes.write()
    }

    pub fn refiner(&self) -> RwLockReadGuard<'_, Refiner> {
        self.refiner.read()
    }

    pub fn refiner_mut(&self) -> RwLockWriteGuard<'_, Refiner> {
        self.refiner.write()
    }

    /// Active SKD service
    pub fn service(&self) -> Result<Arc<dyn SkdService>> {
        self.services.read().get(ServiceKey::SKD)
    }

    /// Swaps the active SKD service
    pub fn provide(&self, service: Arc<dyn SkdService>) -> Result<Provision> {
        self.services.write().provide(ServiceKey::SKD, service)
    }

    pub fn load_extension(&self, id: &str, version: &str) -> Result<()> {
        let entry = extension::lookup(id, version).ok_or_else(|| {
            SkdError::service(ServiceError::UnknownExtension(format!("{}@{}", id, version)))
        })?;
        info!("Loading extension {} ({} {})", entry.name, entry.id, entry.version);
        (entry.build)().install(self)
    }

    /// Parser for `holder`, built by the active service
    pub fn parser(self: &Arc<Self>, holder: Box<dyn DatabaseHolder>) -> Result<SkdParser> {
        Ok(self.service()?.parser(Arc::clone(self), holder))
    }

    pub fn refine_tag(&self, tag: Tag) -> Result<Tag> {
        self.refiner.read().refine_tag(tag)
    }

    pub fn refine_property(&self, property: Property) -> Result<Property> {
        self.refiner.read().refine_property(property)
    }

    pub fn refine_database(&self, database: Database) -> Result<Database> {
        self.refiner.read().refine_database(database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::SkdErrorKind, refine::rules};

    #[test]
    fn test_new_installs_builtin_rules() -> Result<()> {
        let context = SkdContext::new()?;
        let ids: Vec<String> = context.refiner().tags.ids().map(str::to_string).collect();
        assert_eq!(ids, vec![rules::LIST, rules::PAIR, rules::SCALAR]);
        assert_eq!(context.service()?.kind(), "default");
        Ok(())
    }

    #[test]
    fn test_empty_has_no_rules() -> Result<()> {
        let context = SkdContext::empty()?;
        assert!(context.refiner().tags.is_empty());
        assert!(context.refiner().databases.is_empty());
        assert_eq!(context.doctypes().len(), 1);
        Ok(())
    }

    #[test]
    fn test_unknown_extension() -> Result<()> {
        let context = SkdContext::empty()?;
        let err = context.load_extension("missing", "0.1").unwrap_err();
        assert!(matches!(
            err.kind(),
            SkdErrorKind::Service(ServiceError::UnknownExtension(_))
        ));
        Ok(())
    }
}
