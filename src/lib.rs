//! skd: a parser for the SKD markup database format
//!
//! This crate provides functionality to:
//! - Parse tab-indented SKD documents into a tag tree
//! - Validate doctypes against registered providers
//! - Swap the factories used while parsing through hot-swappable services
//! - Refine generic nodes into list, pair, scalar, marker and singleton variants
//! - Write documents back in their canonical form
//!
//! # Examples
//! ```
//! use skd::{parse_str, Result, Tag};
//!
//! fn example() -> Result<()> {
//!     let db = parse_str("<!DOCTYPE skd default>\n<!SKD version=\"0.2\">\n<root>\n\t<item value=\"1\" />\n</root>\n")?;
//!     assert_eq!(db.main_tag()?.child(0).and_then(Tag::value), Some("1"));
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

use std::sync::Arc;

use tracing::{debug, info, instrument};

pub mod context;
pub mod doctype;
pub mod error;
pub mod extension;
pub mod holder;
pub mod parser;
pub mod refine;
pub mod service;
pub mod structure;
pub mod test_utils;
pub mod utils;

// Re-exports
pub use context::SkdContext;
pub use error::{Result, SkdError, SkdErrorKind};
pub use holder::{DatabaseFile, DatabaseHolder, MemoryHolder};
pub use parser::{BlankLines, ParserConfig, SkdParser};
pub use structure::{
    Database, DoctypeDeclaration, NodeVariant, Property, Structure, Tag, VersionDeclaration,
};

/// Parses an `.skd` file with a default context
#[instrument]
pub fn parse_file(path: &str) -> Result<Database> {
    debug!("Starting to parse file: {}", path);

    let context = Arc::new(SkdContext::new()?);
    let config = context.service()?.parser_config();
    let file = DatabaseFile::new(path).accepting(config.accepted_extension);
    let database = context.parser(Box::new(file))?.read()?;

    info!("Parsed {} top-level tags", database.top_level_len());
    Ok(database)
}

/// Parses an in-memory document with a default context
pub fn parse_str(input: &str) -> Result<Database> {
    utils::parse_skd(input)
}
