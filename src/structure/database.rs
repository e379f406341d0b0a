use std::fmt;

use tracing::debug;

use crate::{
    doctype::DoctypeRegistry,
    error::{Result, SemanticError, SkdError},
    structure::{DoctypeDeclaration, NodeVariant, Structure, Tag, VersionDeclaration},
};

/// A parsed document: one structure plus its declarations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Database {
    structure: Structure,
    doctype: DoctypeDeclaration,
    version: VersionDeclaration,
    singleton: bool,
}

impl Database {
    pub fn new(
        structure: Structure,
        doctype: DoctypeDeclaration,
        version: VersionDeclaration,
    ) -> Self {
        Self {
            structure,
            doctype,
            version,
            singleton: false,
        }
    }

    pub fn doctype(&self) -> &DoctypeDeclaration {
        &self.doctype
    }

    pub fn version(&self) -> &VersionDeclaration {
        &self.version
    }

    pub fn set_version(&mut self, version: VersionDeclaration) {
        self.version = version;
    }

    pub fn variant(&self) -> NodeVariant {
        if self.singleton {
            NodeVariant::Singleton
        } else {
            NodeVariant::Generic
        }
    }

    /// Number of top-level tags, placeholders excluded
    pub fn top_level_len(&self) -> usize {
        self.structure.non_placeholder_len()
    }

    /// Replaces the doctype if the registry validates it and the structure accepts it
    ///
    /// Returns `false` and keeps the previous doctype otherwise.
    pub fn set_doctype(&mut self, doctype: DoctypeDeclaration, registry: &DoctypeRegistry) -> bool {
        if !doctype.is_valid(registry) {
            debug!("Doctype {} did not validate", doctype.stylesheet());
            return false;
        }
        if !self.structure.can_apply(&doctype, registry) {
            debug!("Structure cannot apply doctype {}", doctype.stylesheet());
            return false;
        }
        if let Err(e) = self.structure.apply(&doctype, registry) {
            debug!("Applying doctype {} failed: {}", doctype.stylesheet(), e);
            return false;
        }
        self.doctype = doctype;
        true
    }

    /// The structure of a generic database; singletons only expose their main tag
    pub fn structure(&self) -> Result<&Structure> {
        if self.singleton {
            return Err(singleton_structure());
        }
        Ok(&self.structure)
    }

    pub fn structure_mut(&mut self) -> Result<&mut Structure> {
        if self.singleton {
            return Err(singleton_structure());
        }
        Ok(&mut self.structure)
    }

    pub fn main_tag(&self) -> Result<&Tag> {
        if !self.singleton {
            return Err(not_singleton());
        }
        self.structure.tag_at(0).ok_or_else(not_singleton)
    }

    pub fn main_tag_mut(&mut self) -> Result<&mut Tag> {
        if !self.singleton {
            return Err(not_singleton());
        }
        self.structure.tag_at_mut(0).ok_or_else(not_singleton)
    }

    /// Narrows a database with exactly one top-level tag into a singleton
    pub fn into_singleton(mut self) -> Result<Self> {
        if self.top_level_len() != 1 {
            return Err(SkdError::semantic(SemanticError::Unsupported(format!(
                "singleton database with {} top-level tags",
                self.top_level_len()
            ))));
        }
        self.singleton = true;
        Ok(self)
    }

    pub fn into_generic(mut self) -> Self {
        self.singleton = false;
        self
    }
}

fn singleton_structure() -> SkdError {
    SkdError::semantic(SemanticError::Unsupported(
        "structure of a singleton database; use main_tag".to_string(),
    ))
}

fn not_singleton() -> SkdError {
    SkdError::semantic(SemanticError::Unsupported(
        "main_tag of a non-singleton database".to_string(),
    ))
}

impl fmt::Display for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}\n\n{}", self.doctype, self.version, self.structure)
    }
}
