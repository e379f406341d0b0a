use std::{env, fs, path::PathBuf, sync::Arc};

use crate::{context::SkdContext, error::Result, holder::MemoryHolder, parser::SkdParser};

pub fn tmp_file_path(name: &str) -> PathBuf {
    let mut dir = env::temp_dir();
    dir.push("skd_tests");
    let _ = fs::create_dir_all(&dir);
    dir.push(name);
    dir
}

/// Parser over an in-memory document named `memory`
pub fn memory_parser(context: &Arc<SkdContext>, input: &str) -> Result<SkdParser> {
    context.parser(Box::new(MemoryHolder::new("memory", input)))
}
