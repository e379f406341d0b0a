use std::fmt::{self, Write};

use crate::{
    error::{Result, SemanticError, SkdError},
    structure::{NodeVariant, Property},
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum Shape {
    #[default]
    Generic,
    List {
        item: String,
    },
    Pair,
    Scalar,
}

/// A named node of the document tree
///
/// Invariants kept by every mutator:
/// - a void tag never has content or children
/// - content and children are frozen once the tag is closed
/// - children and properties keep insertion order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    name: String,
    content: Option<String>,
    void: bool,
    closed: bool,
    children: Vec<Tag>,
    properties: Vec<Property>,
    shape: Shape,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(SkdError::semantic(SemanticError::EmptyName(
                "tag".to_string(),
            )));
        }
        Ok(Self {
            name,
            content: None,
            void: false,
            closed: false,
            children: Vec::new(),
            properties: Vec::new(),
            shape: Shape::Generic,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn is_void(&self) -> bool {
        self.void
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn children(&self) -> &[Tag] {
        &self.children
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn variant(&self) -> NodeVariant {
        match self.shape {
            Shape::Generic => NodeVariant::Generic,
            Shape::List { .. } => NodeVariant::List,
            Shape::Pair => NodeVariant::Pair,
            Shape::Scalar => NodeVariant::Scalar,
        }
    }

    pub fn child(&self, index: usize) -> Option<&Tag> {
        self.children.get(index)
    }

    pub fn child_mut(&mut self, index: usize) -> Option<&mut Tag> {
        self.children.get_mut(index)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Tag> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// First property with the given name
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|property| property.name() == name)
    }

    pub fn has_property(&self, property: &Property) -> bool {
        self.properties.contains(property)
    }

    /// Adds a property, returning `Ok(false)` when an identical one is already present
    pub fn add_property(&mut self, property: Property) -> Result<bool> {
        self.ensure_open_property_list("add_property")?;
        if self.has_property(&property) {
            return Ok(false);
        }
        self.properties.push(property);
        Ok(true)
    }

    pub fn remove_property(&mut self, property: &Property) -> Result<bool> {
        self.ensure_open_property_list("remove_property")?;
        match self.properties.iter().position(|p| p == property) {
            Some(index) => {
                self.properties.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Appends a line to the content, newline-joined with what is already there
    pub fn append_content(&mut self, line: &str) -> Result<()> {
        self.ensure_mutable_body()?;
        if let Shape::List { .. } = self.shape {
            return Err(self.unsupported("content on a list tag"));
        }
        match self.content.as_mut() {
            Some(content) => {
                content.push('\n');
                content.push_str(line);
            }
            None => self.content = Some(line.to_string()),
        }
        Ok(())
    }

    pub fn remove_content(&mut self) -> Result<Option<String>> {
        if self.closed {
            return Err(SkdError::semantic(SemanticError::TagClosed(
                self.name.clone(),
            )));
        }
        Ok(self.content.take())
    }

    pub fn add_child(&mut self, child: Tag) -> Result<()> {
        self.ensure_mutable_body()?;
        if let Shape::List { item } = &self.shape {
            if child.name != *item {
                return Err(SkdError::semantic(SemanticError::ListChildMismatch {
                    expected: item.clone(),
                    found: child.name,
                }));
            }
        }
        self.children.push(child);
        Ok(())
    }

    pub fn remove_child(&mut self, index: usize) -> Result<Option<Tag>> {
        if self.closed {
            return Err(SkdError::semantic(SemanticError::TagClosed(
                self.name.clone(),
            )));
        }
        if index >= self.children.len() {
            return Ok(None);
        }
        Ok(Some(self.children.remove(index)))
    }

    pub fn set_void(&mut self, void: bool) -> Result<()> {
        if self.closed {
            return Err(SkdError::semantic(SemanticError::TagClosed(
                self.name.clone(),
            )));
        }
        if void && (self.content.is_some() || !self.children.is_empty()) {
            return Err(SkdError::semantic(SemanticError::NotEmpty(
                self.name.clone(),
            )));
        }
        self.void = void;
        Ok(())
    }

    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Item name shared by the children of a list tag
    pub fn item_name(&self) -> Option<&str> {
        match &self.shape {
            Shape::List { item } => Some(item),
            _ => None,
        }
    }

    /// Value of a scalar tag
    pub fn value(&self) -> Option<&str> {
        match self.shape {
            Shape::Scalar => self.properties.first().and_then(Property::value),
            _ => None,
        }
    }

    pub fn set_value(&mut self, value: impl Into<String>) -> Result<()> {
        if self.shape != Shape::Scalar {
            return Err(self.unsupported("set_value on a non-scalar tag"));
        }
        self.shaped_property(0)?.set_value(value)
    }

    pub fn left(&self) -> Option<&str> {
        self.pair_side(0)
    }

    pub fn right(&self) -> Option<&str> {
        self.pair_side(1)
    }

    pub fn as_pair(&self) -> Option<(&str, &str)> {
        Some((self.left()?, self.right()?))
    }

    pub fn set_left(&mut self, value: impl Into<String>) -> Result<()> {
        self.set_pair_side(0, value.into())
    }

    pub fn set_right(&mut self, value: impl Into<String>) -> Result<()> {
        self.set_pair_side(1, value.into())
    }

    /// Narrows a tag whose children all share one name into a list
    pub fn into_list(mut self) -> Result<Self> {
        if self.void || self.content.is_some() {
            return Err(self.unsupported("list from a void tag or a tag with content"));
        }
        let item = match self.children.first() {
            Some(first) => first.name.clone(),
            None => return Err(self.unsupported("list without children")),
        };
        if self.children.iter().any(|child| child.name != item) {
            return Err(self.unsupported("list with heterogeneous children"));
        }
        self.shape = Shape::List { item };
        Ok(self)
    }

    /// Narrows a void tag with exactly `left` and `right` properties into a pair
    pub fn into_pair(mut self) -> Result<Self> {
        let fits = self.void
            && matches!(
                self.properties.as_slice(),
                [left, right] if left.name() == "left"
                    && right.name() == "right"
                    && left.has_value()
                    && right.has_value()
            );
        if !fits {
            return Err(self.unsupported("pair without exactly 'left' and 'right' values"));
        }
        self.shape = Shape::Pair;
        Ok(self)
    }

    /// Narrows a void tag with exactly one `value` property into a scalar
    pub fn into_scalar(mut self) -> Result<Self> {
        let fits = self.void
            && matches!(self.properties.as_slice(), [value] if value.name() == "value");
        if !fits {
            return Err(self.unsupported("scalar without exactly one 'value' property"));
        }
        self.shape = Shape::Scalar;
        Ok(self)
    }

    pub fn into_generic(mut self) -> Self {
        self.shape = Shape::Generic;
        self
    }

    fn pair_side(&self, index: usize) -> Option<&str> {
        match self.shape {
            Shape::Pair => self.properties.get(index).and_then(Property::value),
            _ => None,
        }
    }

    fn set_pair_side(&mut self, index: usize, value: String) -> Result<()> {
        if self.shape != Shape::Pair {
            return Err(self.unsupported("pair accessor on a non-pair tag"));
        }
        self.shaped_property(index)?.set_value(value)
    }

    fn shaped_property(&mut self, index: usize) -> Result<&mut Property> {
        let name = self.name.clone();
        self.properties.get_mut(index).ok_or_else(|| {
            SkdError::semantic(SemanticError::Unsupported(format!(
                "missing property on tag '{}'",
                name
            )))
        })
    }

    fn ensure_mutable_body(&self) -> Result<()> {
        if self.void {
            return Err(SkdError::semantic(SemanticError::VoidTag(
                self.name.clone(),
            )));
        }
        if self.closed {
            return Err(SkdError::semantic(SemanticError::TagClosed(
                self.name.clone(),
            )));
        }
        Ok(())
    }

    fn ensure_open_property_list(&self, operation: &str) -> Result<()> {
        match self.shape {
            Shape::Pair | Shape::Scalar => Err(self.unsupported(&format!(
                "{} on a {} tag",
                operation,
                self.variant()
            ))),
            _ => Ok(()),
        }
    }

    fn unsupported(&self, what: &str) -> SkdError {
        SkdError::semantic(SemanticError::Unsupported(format!(
            "{} ('{}')",
            what, self.name
        )))
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        write!(f, "<{}", self.name)?;
        for property in &self.properties {
            write!(f, " {}", property)?;
        }

        if self.void {
            return f.write_str(" />");
        }
        f.write_char('>')?;

        for child in &self.children {
            newline(f, depth + 1)?;
            child.write_indented(f, depth + 1)?;
        }
        if let Some(content) = &self.content {
            for line in content.split('\n') {
                newline(f, depth + 1)?;
                f.write_str(line)?;
            }
        }

        newline(f, depth)?;
        write!(f, "</{}>", self.name)
    }
}

fn newline(f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    f.write_char('\n')?;
    for _ in 0..depth {
        f.write_char('\t')?;
    }
    Ok(())
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SkdErrorKind;

    fn void_tag(name: &str, properties: &[(&str, &str)]) -> Result<Tag> {
        let mut tag = Tag::new(name)?;
        for (key, value) in properties {
            tag.add_property(Property::with_value(*key, *value)?)?;
        }
        tag.set_void(true)?;
        tag.close();
        Ok(tag)
    }

    #[test]
    fn test_void_tag_refuses_body() -> Result<()> {
        let mut tag = Tag::new("item")?;
        tag.set_void(true)?;
        assert!(tag.append_content("text").is_err());
        assert!(tag.add_child(Tag::new("x")?).is_err());
        assert!(tag.content().is_none());
        assert!(tag.children().is_empty());
        Ok(())
    }

    #[test]
    fn test_tag_with_children_cannot_become_void() -> Result<()> {
        let mut tag = Tag::new("root")?;
        tag.add_child(Tag::new("child")?)?;
        let err = tag.set_void(true).unwrap_err();
        assert!(matches!(
            err.kind(),
            SkdErrorKind::Semantic(SemanticError::NotEmpty(_))
        ));
        Ok(())
    }

    #[test]
    fn test_closed_tag_is_frozen() -> Result<()> {
        let mut tag = Tag::new("root")?;
        tag.append_content("first")?;
        tag.close();
        assert!(tag.append_content("second").is_err());
        assert!(tag.add_child(Tag::new("child")?).is_err());
        assert!(tag.remove_content().is_err());
        assert_eq!(tag.content(), Some("first"));
        Ok(())
    }

    #[test]
    fn test_duplicate_property_detection() -> Result<()> {
        let mut tag = Tag::new("root")?;
        assert!(tag.add_property(Property::with_value("a", "1")?)?);
        assert!(!tag.add_property(Property::with_value("a", "1")?)?);
        assert!(tag.add_property(Property::with_value("a", "2")?)?);
        assert_eq!(tag.properties().len(), 2);
        Ok(())
    }

    #[test]
    fn test_content_is_newline_joined() -> Result<()> {
        let mut tag = Tag::new("text")?;
        tag.append_content("one")?;
        tag.append_content("two")?;
        assert_eq!(tag.content(), Some("one\ntwo"));
        Ok(())
    }

    #[test]
    fn test_list_shape() -> Result<()> {
        let mut tag = Tag::new("items")?;
        tag.add_child(Tag::new("item")?)?;
        tag.add_child(Tag::new("item")?)?;
        let mut list = tag.into_list()?;
        assert_eq!(list.variant(), NodeVariant::List);
        assert_eq!(list.item_name(), Some("item"));
        let err = list.add_child(Tag::new("other")?).unwrap_err();
        assert!(matches!(
            err.kind(),
            SkdErrorKind::Semantic(SemanticError::ListChildMismatch { .. })
        ));
        assert!(list.append_content("nope").is_err());
        list.add_child(Tag::new("item")?)?;
        assert_eq!(list.children().len(), 3);
        Ok(())
    }

    #[test]
    fn test_heterogeneous_children_are_not_a_list() -> Result<()> {
        let mut tag = Tag::new("items")?;
        tag.add_child(Tag::new("item")?)?;
        tag.add_child(Tag::new("other")?)?;
        assert!(tag.into_list().is_err());
        Ok(())
    }

    #[test]
    fn test_pair_accessors() -> Result<()> {
        let mut pair = void_tag("entry", &[("left", "k"), ("right", "v")])?.into_pair()?;
        assert_eq!(pair.as_pair(), Some(("k", "v")));
        pair.set_right("w")?;
        assert_eq!(pair.right(), Some("w"));
        assert!(pair.add_property(Property::with_value("x", "y")?).is_err());
        assert!(pair
            .remove_property(&Property::with_value("left", "k")?)
            .is_err());
        Ok(())
    }

    #[test]
    fn test_pair_requires_left_then_right() -> Result<()> {
        assert!(void_tag("entry", &[("right", "v"), ("left", "k")])?
            .into_pair()
            .is_err());
        Ok(())
    }

    #[test]
    fn test_scalar_accessors() -> Result<()> {
        let mut scalar = void_tag("item", &[("value", "1")])?.into_scalar()?;
        assert_eq!(scalar.value(), Some("1"));
        scalar.set_value("2")?;
        assert_eq!(scalar.value(), Some("2"));
        assert!(Tag::new("plain")?.set_value("x").is_err());
        Ok(())
    }

    #[test]
    fn test_display_void_and_nested() -> Result<()> {
        let mut root = Tag::new("root")?;
        root.add_property(Property::with_value("id", "r")?)?;
        let mut inner = Tag::new("inner")?;
        inner.append_content("line one")?;
        inner.append_content("line two")?;
        inner.close();
        root.add_child(inner)?;
        root.add_child(void_tag("item", &[("value", "1")])?)?;
        root.close();

        let expected = "<root id=\"r\">\n\t<inner>\n\t\tline one\n\t\tline two\n\t</inner>\n\t<item value=\"1\" />\n</root>";
        assert_eq!(root.to_string(), expected);
        assert_eq!(void_tag("empty", &[])?.to_string(), "<empty />");
        assert_eq!(Tag::new("open")?.to_string(), "<open>\n</open>");
        Ok(())
    }
}
