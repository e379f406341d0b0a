use std::fs;

use crate::error::{IOError, Result, SkdError};

/// The document from the format's reference scenario
pub const SCENARIO: &str = "<!DOCTYPE skd default>\n<!SKD version=\"0.2\">\n<root>\n\t<item value=\"1\" />\n</root>\n";

pub const INVALID_SKD_SAMPLES: [(&str, &str); 8] = [
    (
        "<!DOCTYPE skd default>\n<!SKD version=\"0.2\">\n</root>\n",
        "Closing tag without opening",
    ),
    (
        "<!DOCTYPE skd default>\n<!SKD version=\"0.2\">\n\t<orphan />\n",
        "Indented tag without parent",
    ),
    (
        "<!DOCTYPE skd default>\n<!SKD version=\"0.2\">\n<a x=\"1\" y>\n</a>\n",
        "Odd property tokens",
    ),
    (
        "<!DOCTYPE skd default>\n<!ELEMENT a>\n<!SKD version=\"0.2\">\n",
        "Unrecognized declaration",
    ),
    (
        "<!DOCTYPE skd default>\n<!DOCTYPE skd default>\n<!SKD version=\"0.2\">\n",
        "Duplicate doctype",
    ),
    (
        "<!SKD version=\"0.2\">\n<a>\n</a>\n",
        "Missing doctype",
    ),
    (
        "<!DOCTYPE skd default>\n<!SKD version=\"0.2\">\ntext\n",
        "Content outside of any tag",
    ),
    (
        "<!DOCTYPE skd default>\n<!SKD version=\"0.2\">\n<a>\n</ a>\n",
        "Spaces in closing tag",
    ),
];

pub struct TestData {
    pub small_skd: String,
    pub medium_skd: String,
}

impl TestData {
    pub fn load() -> Result<Self> {
        Ok(Self {
            small_skd: read_test_file("tests/input/small.skd")?,
            medium_skd: read_test_file("tests/input/file.skd")?,
        })
    }

    /// A generated document with `sections` lists of `items` scalars each
    pub fn generated(sections: usize, items: usize) -> String {
        let mut out = String::from("<!DOCTYPE skd default>\n<!SKD version=\"0.2\">\n\n");
        for section in 0..sections {
            out.push_str(&format!("<entries id=\"{}\">\n", section));
            for item in 0..items {
                out.push_str(&format!("\t<entry value=\"{}-{}\" />\n", section, item));
            }
            out.push_str("</entries>\n");
        }
        out
    }
}

pub fn read_test_file(path: &str) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        SkdError::io(IOError::ReadError(format!(
            "Failed to read {}: {}",
            path, e
        )))
    })
}
