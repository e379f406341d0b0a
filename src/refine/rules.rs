use crate::{
    refine::Refiner,
    structure::{Database, NodeVariant, Property, Tag},
};

pub const LIST: &str = "list";
pub const PAIR: &str = "pair";
pub const SCALAR: &str = "scalar";
pub const MARKER: &str = "marker";
pub const SINGLETON: &str = "singleton";

pub fn install(refiner: &mut Refiner) {
    refiner.tags.register(LIST, is_list, Tag::into_list);
    refiner.tags.register(PAIR, is_pair, Tag::into_pair);
    refiner.tags.register(SCALAR, is_scalar, Tag::into_scalar);
    refiner.properties.register(MARKER, is_marker, Property::into_marker);
    refiner
        .databases
        .register(SINGLETON, is_singleton, Database::into_singleton);
}

/// Closed container whose children all share one name
///
/// A lone child only makes a list when the tag's own name pluralizes it.
pub fn is_list(tag: &Tag) -> bool {
    if !tag.is_closed() || tag.is_void() || tag.content().is_some() {
        return false;
    }
    if tag.variant() != NodeVariant::Generic {
        return false;
    }
    match tag.children() {
        [] => false,
        [only] => is_plural_of(tag.name(), only.name()),
        [first, rest @ ..] => rest.iter().all(|child| child.name() == first.name()),
    }
}

pub fn is_pair(tag: &Tag) -> bool {
    tag.is_closed()
        && tag.is_void()
        && tag.variant() == NodeVariant::Generic
        && matches!(
            tag.properties(),
            [left, right] if left.name() == "left"
                && right.name() == "right"
                && left.has_value()
                && right.has_value()
        )
}

pub fn is_scalar(tag: &Tag) -> bool {
    tag.is_closed()
        && tag.is_void()
        && tag.variant() == NodeVariant::Generic
        && matches!(tag.properties(), [value] if value.name() == "value")
}

pub fn is_marker(property: &Property) -> bool {
    !property.has_value() && !property.is_marker()
}

pub fn is_singleton(database: &Database) -> bool {
    database.variant() == NodeVariant::Generic && database.top_level_len() == 1
}

/// `items`/`item`, `boxes`/`box`, `entries`/`entry`
pub fn is_plural_of(plural: &str, singular: &str) -> bool {
    if let Some(stem) = plural.strip_suffix('s') {
        if stem == singular {
            return true;
        }
        if stem.strip_suffix('e') == Some(singular) {
            return true;
        }
    }
    match (plural.strip_suffix("ies"), singular.strip_suffix('y')) {
        (Some(plural_stem), Some(singular_stem)) => plural_stem == singular_stem,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::Result,
        structure::{DoctypeDeclaration, Structure, VersionDeclaration},
    };

    fn closed_void(name: &str, properties: &[(&str, Option<&str>)]) -> Result<Tag> {
        let mut tag = Tag::new(name)?;
        for (key, value) in properties {
            tag.add_property(Property::new(*key, value.map(str::to_string))?)?;
        }
        tag.set_void(true)?;
        tag.close();
        Ok(tag)
    }

    fn container(name: &str, children: &[&str]) -> Result<Tag> {
        let mut tag = Tag::new(name)?;
        for child in children {
            tag.add_child(closed_void(child, &[])?)?;
        }
        tag.close();
        Ok(tag)
    }

    #[test]
    fn test_pluralization() {
        assert!(is_plural_of("items", "item"));
        assert!(is_plural_of("boxes", "box"));
        assert!(is_plural_of("entries", "entry"));
        assert!(!is_plural_of("item", "item"));
        assert!(!is_plural_of("things", "item"));
    }

    #[test]
    fn test_builtin_tag_rules() -> Result<()> {
        let refiner = Refiner::with_builtin_rules();

        let list = refiner.refine_tag(container("items", &["item", "item"])?)?;
        assert_eq!(list.variant(), NodeVariant::List);

        let mixed = refiner.refine_tag(container("items", &["item", "other"])?)?;
        assert_eq!(mixed.variant(), NodeVariant::Generic);

        let repeated = refiner.refine_tag(container("root", &["item", "item"])?)?;
        assert_eq!(repeated.variant(), NodeVariant::List);
        assert_eq!(repeated.item_name(), Some("item"));

        let lone = refiner.refine_tag(container("root", &["item"])?)?;
        assert_eq!(lone.variant(), NodeVariant::Generic);
        let lone_plural = refiner.refine_tag(container("items", &["item"])?)?;
        assert_eq!(lone_plural.variant(), NodeVariant::List);

        let pair = refiner.refine_tag(closed_void(
            "entry",
            &[("left", Some("a")), ("right", Some("b"))],
        )?)?;
        assert_eq!(pair.as_pair(), Some(("a", "b")));

        let scalar = refiner.refine_tag(closed_void("item", &[("value", Some("1"))])?)?;
        assert_eq!(scalar.value(), Some("1"));
        Ok(())
    }

    #[test]
    fn test_open_tags_are_not_refined() -> Result<()> {
        let refiner = Refiner::with_builtin_rules();
        let mut open = Tag::new("items")?;
        open.add_child(closed_void("item", &[])?)?;
        assert_eq!(refiner.refine_tag(open)?.variant(), NodeVariant::Generic);
        Ok(())
    }

    #[test]
    fn test_marker_rule() -> Result<()> {
        let refiner = Refiner::with_builtin_rules();
        let marker = refiner.refine_property(Property::new("flag", None)?)?;
        assert!(marker.is_marker());
        let valued = refiner.refine_property(Property::with_value("flag", "")?)?;
        assert!(!valued.is_marker());
        Ok(())
    }

    #[test]
    fn test_singleton_rule() -> Result<()> {
        let refiner = Refiner::with_builtin_rules();
        let mut structure = Structure::new();
        structure.push_placeholder();
        structure.push(container("root", &[])?);
        let database = Database::new(
            structure,
            DoctypeDeclaration::new("default"),
            VersionDeclaration::current(),
        );
        let refined = refiner.refine_database(database)?;
        assert_eq!(refined.variant(), NodeVariant::Singleton);
        Ok(())
    }
}
