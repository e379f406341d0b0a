//! Post-parse refinement of freshly built nodes
//!
//! Every node kind has a registry of `(predicate, transform)` rules keyed by a
//! variant id. When a node is complete the registry looks for the *last* rule,
//! in registration order, whose predicate accepts it and replaces the node with
//! the result of that rule's transform. Nodes no rule accepts pass through
//! unchanged.

pub mod rules;

use std::fmt;

use indexmap::IndexMap;
use tracing::trace;

use crate::{
    error::Result,
    structure::{Database, Property, Tag},
};

pub type Predicate<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;
pub type Transform<T> = Box<dyn Fn(T) -> Result<T> + Send + Sync>;

pub struct Refinement<T> {
    predicate: Predicate<T>,
    transform: Transform<T>,
}

impl<T> Refinement<T> {
    pub fn accepts(&self, node: &T) -> bool {
        (self.predicate)(node)
    }

    pub fn apply(&self, node: T) -> Result<T> {
        (self.transform)(node)
    }
}

pub struct RefinementRegistry<T> {
    rules: IndexMap<String, Refinement<T>>,
}

impl<T> Default for RefinementRegistry<T> {
    fn default() -> Self {
        Self {
            rules: IndexMap::new(),
        }
    }
}

impl<T> RefinementRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a rule under `id`
    ///
    /// Re-registering an id replaces its rule in place and returns `false`.
    pub fn register<P, F>(&mut self, id: impl Into<String>, predicate: P, transform: F) -> bool
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
        F: Fn(T) -> Result<T> + Send + Sync + 'static,
    {
        let refinement = Refinement {
            predicate: Box::new(predicate),
            transform: Box::new(transform),
        };
        self.rules.insert(id.into(), refinement).is_none()
    }

    pub fn unregister(&mut self, id: &str) -> bool {
        self.rules.shift_remove(id).is_some()
    }

    /// Id of the rule that would refine `node`
    pub fn matching(&self, node: &T) -> Option<&str> {
        self.rules
            .iter()
            .rev()
            .find(|(_, rule)| rule.accepts(node))
            .map(|(id, _)| id.as_str())
    }

    pub fn accepts(&self, node: &T) -> bool {
        self.matching(node).is_some()
    }

    pub fn refine(&self, node: T) -> Result<T> {
        let rule = self.rules.iter().rev().find(|(_, rule)| rule.accepts(&node));
        match rule {
            Some((id, rule)) => {
                trace!("Refining node as {}", id);
                rule.apply(node)
            }
            None => Ok(node),
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<T> fmt::Debug for RefinementRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.rules.keys()).finish()
    }
}

/// Refinement registries for every node kind
#[derive(Debug, Default)]
pub struct Refiner {
    pub tags: RefinementRegistry<Tag>,
    pub properties: RefinementRegistry<Property>,
    pub databases: RefinementRegistry<Database>,
}

impl Refiner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refiner carrying the built-in list, pair, scalar, marker and singleton rules
    pub fn with_builtin_rules() -> Self {
        let mut refiner = Self::new();
        rules::install(&mut refiner);
        refiner
    }

    pub fn refine_tag(&self, tag: Tag) -> Result<Tag> {
        self.tags.refine(tag)
    }

    pub fn refine_property(&self, property: Property) -> Result<Property> {
        self.properties.refine(property)
    }

    pub fn refine_database(&self, database: Database) -> Result<Database> {
        self.databases.refine(database)
    }
}
