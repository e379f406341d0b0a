use std::{fmt, sync::Arc};

use crate::doctype::{DoctypeProvider, DoctypeRegistry};

/// Version written by this crate when none is specified
pub const CURRENT_VERSION: &str = "0.2";

/// `<!DOCTYPE skd {stylesheet}>`
///
/// The stylesheet is an opaque identity token; whether it is valid is decided
/// by the [`DoctypeRegistry`] it is checked against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DoctypeDeclaration {
    stylesheet: String,
}

impl DoctypeDeclaration {
    pub fn new(stylesheet: impl Into<String>) -> Self {
        Self {
            stylesheet: stylesheet.into(),
        }
    }

    pub fn stylesheet(&self) -> &str {
        &self.stylesheet
    }

    pub fn provider(&self, registry: &DoctypeRegistry) -> Option<Arc<dyn DoctypeProvider>> {
        registry.resolve(self)
    }

    pub fn is_valid(&self, registry: &DoctypeRegistry) -> bool {
        self.provider(registry).is_some()
    }
}

impl fmt::Display for DoctypeDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<!DOCTYPE skd {}>", self.stylesheet)
    }
}

/// `<!SKD version="{version}">`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionDeclaration {
    version: String,
}

impl VersionDeclaration {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }

    pub fn current() -> Self {
        Self::new(CURRENT_VERSION)
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

impl Default for VersionDeclaration {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for VersionDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<!SKD version=\"{}\">", self.version)
    }
}
