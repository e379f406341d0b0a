pub mod config;
pub mod line;
pub mod properties;
pub mod skd;

pub use config::{BlankLines, ParserConfig};
pub use skd::SkdParser;
