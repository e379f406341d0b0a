use std::fmt;

use crate::{
    doctype::DoctypeRegistry,
    error::{Result, SemanticError, SkdError},
    structure::{DoctypeDeclaration, Tag},
};

/// Top-level tags of a document
///
/// `None` entries are blank-line placeholders kept when blank lines are
/// preserved. A placeholder in first position stands for the blank line that
/// always follows the declarations and is not rendered again.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Structure {
    main_tags: Vec<Option<Tag>>,
}

impl Structure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tags(tags: impl IntoIterator<Item = Tag>) -> Self {
        Self {
            main_tags: tags.into_iter().map(Some).collect(),
        }
    }

    pub fn main_tags(&self) -> &[Option<Tag>] {
        &self.main_tags
    }

    pub fn main_tags_mut(&mut self) -> &mut Vec<Option<Tag>> {
        &mut self.main_tags
    }

    pub fn push(&mut self, tag: Tag) {
        self.main_tags.push(Some(tag));
    }

    pub fn push_placeholder(&mut self) {
        self.main_tags.push(None);
    }

    /// Top-level tags, skipping placeholders
    pub fn tags(&self) -> impl Iterator<Item = &Tag> {
        self.main_tags.iter().flatten()
    }

    pub fn tags_mut(&mut self) -> impl Iterator<Item = &mut Tag> {
        self.main_tags.iter_mut().flatten()
    }

    /// The `index`-th non-placeholder tag
    pub fn tag_at(&self, index: usize) -> Option<&Tag> {
        self.tags().nth(index)
    }

    pub fn tag_at_mut(&mut self, index: usize) -> Option<&mut Tag> {
        self.tags_mut().nth(index)
    }

    pub fn non_placeholder_len(&self) -> usize {
        self.tags().count()
    }

    pub fn is_empty(&self) -> bool {
        self.main_tags.is_empty()
    }

    /// Whether the provider selected by `doctype` accepts this structure
    pub fn can_apply(&self, doctype: &DoctypeDeclaration, registry: &DoctypeRegistry) -> bool {
        doctype
            .provider(registry)
            .is_some_and(|provider| provider.is_structure_valid(self))
    }

    /// Like [`Structure::can_apply`], but reports why the doctype does not fit
    pub fn apply(&self, doctype: &DoctypeDeclaration, registry: &DoctypeRegistry) -> Result<()> {
        let provider = doctype.provider(registry).ok_or_else(|| {
            SkdError::semantic(SemanticError::StructureRejected(
                doctype.stylesheet().to_string(),
            ))
            .with_context("no usable provider")
        })?;
        if !provider.is_structure_valid(self) {
            return Err(SkdError::semantic(SemanticError::StructureRejected(
                provider.name().to_string(),
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, entry) in self.main_tags.iter().enumerate() {
            match entry {
                Some(tag) => writeln!(f, "{}", tag)?,
                None if index == 0 => {}
                None => writeln!(f)?,
            }
        }
        Ok(())
    }
}
