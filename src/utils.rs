use std::{fs, sync::Arc};

use crate::{
    context::SkdContext,
    error::{IOError, Result, SkdError},
    holder::MemoryHolder,
    parser::SkdParser,
    structure::Database,
};

pub fn read_file(path: &str) -> Result<String> {
    fs::read_to_string(path).map_err(|_| {
        SkdError::io(IOError::ReadError(format!("Cannot read file: {}", path)))
    })
}

pub fn write_file(path: &str, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|_| {
        SkdError::io(IOError::WriteError(format!(
            "Cannot write to file: {}",
            path
        )))
    })
}

/// Parses an in-memory document with a fresh default context
pub fn parse_skd(content: &str) -> Result<Database> {
    parse_skd_with(&Arc::new(SkdContext::new()?), content)
}

pub fn parse_skd_with(context: &Arc<SkdContext>, content: &str) -> Result<Database> {
    let mut parser = SkdParser::new(
        Arc::clone(context),
        Box::new(MemoryHolder::new("memory", content)),
    )?;
    parser.read()
}

pub fn format_skd(database: &Database) -> String {
    database.to_string()
}
