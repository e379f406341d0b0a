#![allow(clippy::panic_in_result_fn)]
#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]

use std::{collections::BTreeMap, sync::Arc};

use proptest::collection::{btree_map, vec};
use proptest::prelude::*;
use skd::parser::properties::parse_properties;
use skd::test_utils::*;

#[derive(Debug, Clone)]
struct Node {
    name: String,
    properties: BTreeMap<String, String>,
    body: Body,
}

#[derive(Debug, Clone)]
enum Body {
    Void,
    Open {
        children: Vec<Node>,
        content: Vec<String>,
    },
}

impl Node {
    fn build(&self) -> Result<Tag> {
        let mut tag = Tag::new(self.name.as_str())?;
        for (name, value) in &self.properties {
            tag.add_property(Property::with_value(name.as_str(), value.as_str())?)?;
        }
        match &self.body {
            Body::Void => tag.set_void(true)?,
            Body::Open { children, content } => {
                for child in children {
                    tag.add_child(child.build()?)?;
                }
                for line in content {
                    tag.append_content(line)?;
                }
            }
        }
        tag.close();
        Ok(tag)
    }
}

// Tag names never start with `S` so they cannot be read as `<SKD ...>`
fn name_strategy() -> impl Strategy<Value = String> {
    "t[a-z0-9_]{0,6}"
}

fn properties_strategy() -> impl Strategy<Value = BTreeMap<String, String>> {
    btree_map("[a-z][a-z0-9]{0,6}", "[a-zA-Z0-9 ._-]{0,12}", 0..4)
}

fn content_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z]([a-zA-Z0-9 ,.]{0,20}[a-zA-Z0-9.])?"
}

fn node_strategy() -> impl Strategy<Value = Node> {
    let leaf = prop_oneof![
        (name_strategy(), properties_strategy()).prop_map(|(name, properties)| Node {
            name,
            properties,
            body: Body::Void,
        }),
        (name_strategy(), properties_strategy(), vec(content_strategy(), 0..3)).prop_map(
            |(name, properties, content)| Node {
                name,
                properties,
                body: Body::Open {
                    children: Vec::new(),
                    content,
                },
            }
        ),
    ];

    leaf.prop_recursive(4, 32, 4, |inner| {
        (
            name_strategy(),
            properties_strategy(),
            vec(inner, 0..4),
            vec(content_strategy(), 0..2),
        )
            .prop_map(|(name, properties, children, content)| Node {
                name,
                properties,
                body: Body::Open { children, content },
            })
    })
}

fn database_strategy() -> impl Strategy<Value = Database> {
    vec(node_strategy(), 1..4).prop_map(|nodes| {
        let tags: Vec<Tag> = nodes.iter().map(|node| node.build().unwrap()).collect();
        Database::new(
            Structure::with_tags(tags),
            DoctypeDeclaration::new("default"),
            VersionDeclaration::current(),
        )
    })
}

fn parse_plain(input: &str) -> Result<Database> {
    parse_skd_with(&Arc::new(SkdContext::empty()?), input)
}

proptest! {
    #[test]
    fn test_written_documents_parse_back(db in database_strategy()) {
        let rendered = format_skd(&db);
        let parsed = parse_plain(&rendered).unwrap();
        prop_assert!(
            compare_databases(&db, &parsed),
            "Round trip changed the document:\n{}\n{}",
            rendered,
            parsed
        );
    }

    #[test]
    fn test_writing_is_stable(db in database_strategy()) {
        let rendered = format_skd(&db);
        let parsed = parse_plain(&rendered).unwrap();
        prop_assert_eq!(format_skd(&parsed), rendered);
    }

    #[test]
    fn test_refinement_preserves_structure(db in database_strategy()) {
        let rendered = format_skd(&db);
        let refined = parse_str(&rendered).unwrap();
        prop_assert!(compare_databases(&db, &refined));
    }

    #[test]
    fn test_indentation_grows_one_level_at_a_time(db in database_strategy()) {
        let rendered = format_skd(&db);
        let mut previous = 0;
        for line in rendered.lines() {
            let depth = line.chars().take_while(|c| *c == '\t').count();
            prop_assert!(depth <= previous + 1, "Jump in indentation at {:?}", line);
            previous = depth;
        }
    }

    #[test]
    fn test_void_tags_stay_empty(node in node_strategy(), text in content_strategy()) {
        let mut tag = node.build().unwrap();
        if tag.is_void() {
            prop_assert!(tag.children().is_empty());
            prop_assert!(tag.content().is_none());
        }

        let mut open = Tag::new(node.name.as_str()).unwrap();
        open.set_void(true).unwrap();
        prop_assert!(open.add_child(Tag::new("child").unwrap()).is_err());
        prop_assert!(open.append_content(&text).is_err());

        // closed tags refuse further changes
        prop_assert!(tag.append_content(&text).is_err());
    }

    #[test]
    fn test_duplicate_properties_are_rejected(
        name in name_strategy(),
        properties in properties_strategy()
    ) {
        let mut tag = Tag::new(name.as_str()).unwrap();
        for (key, value) in &properties {
            prop_assert!(tag.add_property(Property::with_value(key.as_str(), value.as_str()).unwrap()).unwrap());
        }
        for (key, value) in &properties {
            prop_assert!(!tag.add_property(Property::with_value(key.as_str(), value.as_str()).unwrap()).unwrap());
        }
        prop_assert_eq!(tag.properties().len(), properties.len());
    }

    #[test]
    fn test_property_lists_tokenize_back(properties in properties_strategy()) {
        let markup: Vec<String> = properties
            .iter()
            .map(|(key, value)| format!("{}=\"{}\"", key, value))
            .collect();
        let parsed = parse_properties(&markup.join(" ")).unwrap();
        let expected: Vec<(String, String)> = properties.into_iter().collect();
        prop_assert_eq!(parsed, expected);
    }
}
