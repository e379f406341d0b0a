//! Compile-time table of installable extensions
//!
//! Extensions are looked up by `(id, version)` and, once built, install
//! themselves into an [`SkdContext`].

use std::sync::Arc;

use crate::{
    context::SkdContext,
    error::Result,
    refine::rules,
    service::DefaultService,
};

pub const REFINEMENTS: &str = "refinements";
pub const LAYOUT: &str = "layout";
pub const BUILTIN_VERSION: &str = "0.1";

pub trait Extension {
    fn install(&self, context: &SkdContext) -> Result<()>;
}

#[derive(Debug, Clone, Copy)]
pub struct ExtensionEntry {
    pub id: &'static str,
    pub name: &'static str,
    pub version: &'static str,
    pub build: fn() -> Box<dyn Extension>,
}

static EXTENSIONS: &[ExtensionEntry] = &[
    ExtensionEntry {
        id: REFINEMENTS,
        name: "Built-in refinement rules",
        version: BUILTIN_VERSION,
        build: build_refinements,
    },
    ExtensionEntry {
        id: LAYOUT,
        name: "Blank line preserving layout",
        version: BUILTIN_VERSION,
        build: build_layout,
    },
];

pub fn entries() -> &'static [ExtensionEntry] {
    EXTENSIONS
}

pub fn lookup(id: &str, version: &str) -> Option<&'static ExtensionEntry> {
    EXTENSIONS
        .iter()
        .find(|entry| entry.id == id && entry.version == version)
}

fn build_refinements() -> Box<dyn Extension> {
    Box::new(Refinements)
}

fn build_layout() -> Box<dyn Extension> {
    Box::new(Layout)
}

/// List, pair, scalar, marker and singleton rules
struct Refinements;

impl Extension for Refinements {
    fn install(&self, context: &SkdContext) -> Result<()> {
        rules::install(&mut context.refiner_mut());
        Ok(())
    }
}

/// Replaces the active service with one that keeps top-level blank lines
struct Layout;

impl Extension for Layout {
    fn install(&self, context: &SkdContext) -> Result<()> {
        let config = context.service()?.parser_config().preserving_blank_lines();
        context.provide(Arc::new(DefaultService::with_config(config)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::config::BlankLines;

    #[test]
    fn test_lookup() {
        assert!(lookup(REFINEMENTS, BUILTIN_VERSION).is_some());
        assert!(lookup(LAYOUT, BUILTIN_VERSION).is_some());
        assert!(lookup(LAYOUT, "9.9").is_none());
        assert_eq!(entries().len(), 2);
    }

    #[test]
    fn test_layout_switches_blank_lines() -> Result<()> {
        let context = SkdContext::empty()?;
        context.load_extension(LAYOUT, BUILTIN_VERSION)?;
        assert_eq!(
            context.service()?.parser_config().blank_lines,
            BlankLines::Preserve
        );
        Ok(())
    }
}
