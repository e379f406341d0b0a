//! Error handling types for the SKD parser and its registries
//!
//! Every fallible operation returns a [`SkdError`]: a category ([`SkdErrorKind`]),
//! an optional location in the document, an optional free-form context and an
//! optional source error. Structural problems found while scanning a document
//! are reported as [`SyntaxError`]s and `SkdParser::read` wraps them into
//! [`SyntaxError::InvalidDatabaseSyntax`], keeping the original as `source()`.

use std::{error::Error, fmt};

use thiserror::Error;

/// Main error type for SKD operations
#[derive(Debug)]
pub struct SkdError {
    /// The specific kind of error
    kind: SkdErrorKind,
    /// Location where the error occurred
    location: Option<Location>,
    /// Source error that caused this error
    source: Option<Box<dyn Error + Send + Sync>>,
    /// Additional context for the error
    context: Option<String>,
}

/// Represents a location in the input document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based, the first character after the indentation)
    pub column: usize,
}

/// Top-level error categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkdErrorKind {
    IO(IOError),
    Security(SecurityError),
    Semantic(SemanticError),
    Service(ServiceError),
    State(StateError),
    Syntax(SyntaxError),
}

/// Structural errors raised while scanning a document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    /// Wrapper produced by `read()` around any fault raised during the scan
    #[error("Unable to parse database: syntax error")]
    InvalidDatabaseSyntax,
    /// Declaration name other than DOCTYPE or SKD
    #[error("Unrecognized declaration '{0}'")]
    UnrecognizedDeclaration(String),
    /// Declaration whose tokens do not follow the expected layout
    #[error("Invalid {0} declaration")]
    InvalidDeclaration(String),
    /// Same declaration found twice in one document
    #[error("Duplicate {0} declaration")]
    DuplicateDeclaration(String),
    /// Legacy `<SKD ...>` declaration that is not supported anymore
    #[error("Unsupported legacy declaration '{0}'")]
    UnsupportedLegacyDeclaration(String),
    /// DOCTYPE stylesheet no registered provider handles, under `strict_doctypes`
    #[error("No doctype provider for stylesheet '{0}'")]
    UnresolvedDoctype(String),
    /// Missing DOCTYPE or version declaration at end of input
    #[error("Missing {0} declaration")]
    MissingDeclaration(String),
    /// Line that looks like a tag but cannot be split into name and properties
    #[error("Malformed tag '{0}'")]
    MalformedTag(String),
    /// Property list with an odd number of tokens
    #[error("Invalid property specification '{0}'")]
    InvalidProperties(String),
    /// Property with an empty key
    #[error("Empty property key")]
    EmptyPropertyKey,
    /// Closing tag that contains spaces
    #[error("Spaces not allowed in closing tag '{0}'")]
    SpacesInClosingTag(String),
    /// Closing tag without an open tag of the same name at its level
    #[error("Tag '{0}' closed without being opened")]
    ClosedWithoutOpening(String),
    /// Tag or content indented below a level with no open tag
    #[error("No parent tag found: invalid indentation")]
    NoParent,
    /// Tag attached to a parent that was already closed
    #[error("Parent tag already closed")]
    ParentClosed,
    /// Tag still open when a sibling, its parent's closing tag or the end of input is reached
    #[error("Tag '{0}' was never closed")]
    UnclosedTag(String),
    /// Content line at the top level
    #[error("Content found outside of any tag")]
    ContentWithoutParent,
}

/// Node-level rule violations raised by the tree model
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticError {
    /// Content or children requested on a void tag
    #[error("Tag '{0}' is void")]
    VoidTag(String),
    /// Content or children mutated after the tag was closed
    #[error("Tag '{0}' is already closed")]
    TagClosed(String),
    /// Tag that already has content or children cannot become void
    #[error("Tag '{0}' already has content or children")]
    NotEmpty(String),
    /// List tags only accept children with their item name
    #[error("List child must be named '{expected}', found '{found}'")]
    ListChildMismatch { expected: String, found: String },
    /// Operation not available on a refined variant
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
    /// Tag or property created with an empty name
    #[error("Empty {0} name")]
    EmptyName(String),
    /// Doctype provider rejected the structure
    #[error("Structure rejected by doctype '{0}'")]
    StructureRejected(String),
}

/// Service registry failures; none of these can be recovered from
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// First service registered for a capability is not usable
    #[error("Unable to set default service '{0}': service is not usable")]
    NoUsableService(String),
    /// Rollback restored a previous service that is not usable either
    #[error("Unable to set service '{0}' without freezing: rollback target is not usable")]
    RollbackUnusable(String),
    /// No service registered for a capability
    #[error("No service registered for capability '{0}'")]
    MissingService(String),
    /// Extension id/version pair absent from the extension table
    #[error("Unknown extension '{0}'")]
    UnknownExtension(String),
}

/// Programmer errors in the parser lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// `init` called twice
    #[error("Parser already initialized")]
    AlreadyInitialized,
    /// Source refused by the default acceptance check
    #[error("Invalid database holder: '{0}' cannot be accepted by default")]
    SourceRejected(String),
    /// Destination declared writable but produced no writer
    #[error("Database holder '{0}' is writable but provides no writer")]
    NotWritable(String),
}

/// Parser limit errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecurityError {
    /// Exceeded maximum indentation depth
    #[error("Maximum indentation depth exceeded")]
    MaxDepthExceeded,
    /// Exceeded maximum input size
    #[error("Maximum input size exceeded")]
    MaxSizeExceeded,
    /// Exceeded maximum content or value length
    #[error("Maximum string length exceeded")]
    MaxStringLengthExceeded,
    /// Exceeded maximum properties on a single tag
    #[error("Maximum number of properties exceeded")]
    MaxPropertiesExceeded,
}

/// IO operation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IOError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(String),
    /// Error reading from a source
    #[error("Read error: {0}")]
    ReadError(String),
    /// Error writing to a destination
    #[error("Write error: {0}")]
    WriteError(String),
}

impl SkdError {
    pub fn new(kind: SkdErrorKind) -> Self {
        Self {
            kind,
            location: None,
            source: None,
            context: None,
        }
    }

    pub fn syntax(err: SyntaxError) -> Self {
        Self::new(SkdErrorKind::Syntax(err))
    }

    pub fn semantic(err: SemanticError) -> Self {
        Self::new(SkdErrorKind::Semantic(err))
    }

    pub fn service(err: ServiceError) -> Self {
        Self::new(SkdErrorKind::Service(err))
    }

    pub fn state(err: StateError) -> Self {
        Self::new(SkdErrorKind::State(err))
    }

    pub fn security(err: SecurityError) -> Self {
        Self::new(SkdErrorKind::Security(err))
    }

    pub fn io(err: IOError) -> Self {
        Self::new(SkdErrorKind::IO(err))
    }

    pub fn with_location(mut self, line: usize, column: usize) -> Self {
        self.location = Some(Location { line, column });
        self
    }

    /// Attaches a location unless one is already present
    pub fn locate(self, line: usize, column: usize) -> Self {
        if self.location.is_some() {
            self
        } else {
            self.with_location(line, column)
        }
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn kind(&self) -> &SkdErrorKind {
        &self.kind
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Whether this error is a structural (syntax) failure
    pub fn is_syntax(&self) -> bool {
        matches!(self.kind, SkdErrorKind::Syntax(_))
    }

    /// Walks the `source()` chain down to the innermost `SkdError`
    pub fn root_cause(&self) -> &Self {
        let mut current = self;
        while let Some(inner) = current
            .source
            .as_deref()
            .and_then(|source| source.downcast_ref::<Self>())
        {
            current = inner;
        }
        current
    }
}

impl fmt::Display for SkdErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IO(err) => write!(f, "{}", err),
            Self::Security(err) => write!(f, "{}", err),
            Self::Semantic(err) => write!(f, "{}", err),
            Self::Service(err) => write!(f, "{}", err),
            Self::State(err) => write!(f, "{}", err),
            Self::Syntax(err) => write!(f, "{}", err),
        }
    }
}

impl fmt::Display for SkdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(loc) = &self.location {
            write!(f, "at line {}, column {}: {}", loc.line, loc.column, self.kind)?;
        } else {
            write!(f, "Error: {}", self.kind)?;
        }

        if let Some(ctx) = &self.context {
            write!(f, "\nContext: {}", ctx)?;
        }

        if let Some(source) = &self.source {
            write!(f, "\nCaused by: {}", source)?;
        }

        Ok(())
    }
}

impl Error for SkdError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn Error + 'static))
    }
}

pub type Result<T> = std::result::Result<T, SkdError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_with_location() {
        let err = SkdError::syntax(SyntaxError::NoParent).with_location(3, 2);
        let display = err.to_string();
        assert!(display.starts_with("at line 3, column 2"));
        assert!(display.contains("No parent tag found"));
    }

    #[test]
    fn test_error_display_with_context_and_source() {
        let inner = SkdError::syntax(SyntaxError::ClosedWithoutOpening("root".into()));
        let err = SkdError::syntax(SyntaxError::InvalidDatabaseSyntax)
            .with_context("reading memory")
            .with_source(inner);
        let display = err.to_string();
        assert!(display.contains("Unable to parse database"));
        assert!(display.contains("Context: reading memory"));
        assert!(display.contains("Caused by:"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_root_cause_unwraps_nested_errors() {
        let inner = SkdError::syntax(SyntaxError::EmptyPropertyKey);
        let err = SkdError::syntax(SyntaxError::InvalidDatabaseSyntax).with_source(inner);
        assert_eq!(
            err.root_cause().kind(),
            &SkdErrorKind::Syntax(SyntaxError::EmptyPropertyKey)
        );
    }
}
