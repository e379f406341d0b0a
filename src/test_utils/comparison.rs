use crate::structure::{Database, Tag};

/// Structural equality: names, properties, content, void flags and nesting
///
/// Refinement variants and the closed flag are ignored.
pub fn compare_tags(left: &Tag, right: &Tag) -> bool {
    left.name() == right.name()
        && left.is_void() == right.is_void()
        && left.content() == right.content()
        && left.properties() == right.properties()
        && left.children().len() == right.children().len()
        && left
            .children()
            .iter()
            .zip(right.children())
            .all(|(l, r)| compare_tags(l, r))
}

pub fn compare_databases(left: &Database, right: &Database) -> bool {
    if left.doctype() != right.doctype() || left.version() != right.version() {
        return false;
    }
    let (Ok(left), Ok(right)) = (
        left.clone().into_generic().structure().map(Clone::clone),
        right.clone().into_generic().structure().map(Clone::clone),
    ) else {
        return false;
    };
    left.non_placeholder_len() == right.non_placeholder_len()
        && left
            .tags()
            .zip(right.tags())
            .all(|(l, r)| compare_tags(l, r))
}

/// Asserts that two databases are structurally equal
///
/// # Panics
///
/// Panics if the databases differ
pub fn assert_databases_equal(left: &Database, right: &Database, message: &str) {
    assert!(
        compare_databases(left, right),
        "{}\nLeft: {}\nRight: {}",
        message,
        left,
        right
    );
}
