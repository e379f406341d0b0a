mod comparison;
mod data;
mod helpers;

pub use comparison::{assert_databases_equal, compare_databases, compare_tags};
pub use data::{read_test_file, TestData, INVALID_SKD_SAMPLES, SCENARIO};
pub use helpers::{memory_parser, tmp_file_path};

// Re-export common test types/traits
pub use crate::{
    context::SkdContext,
    doctype::{DefaultProvider, DoctypeProvider, DoctypeRegistry},
    error::{
        IOError, Result, SecurityError, SemanticError, ServiceError, SkdError, SkdErrorKind,
        StateError, SyntaxError,
    },
    extension,
    holder::{DatabaseFile, DatabaseHolder, MemoryHolder},
    parse_file, parse_str,
    parser::{
        config::{
            BlankLines, ParserConfig, DEFAULT_MAX_DEPTH, DEFAULT_MAX_PROPERTIES, DEFAULT_MAX_SIZE,
            DEFAULT_MAX_STRING_LENGTH,
        },
        SkdParser,
    },
    refine::{rules, RefinementRegistry, Refiner},
    service::{DefaultService, Provision, ServiceKey, ServiceRegistry, SkdService},
    structure::{
        Database, DoctypeDeclaration, NodeVariant, Property, Structure, Tag, VersionDeclaration,
    },
    utils::{format_skd, parse_skd, parse_skd_with, read_file, write_file},
};
