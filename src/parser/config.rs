use crate::error::{Result, SecurityError, SkdError};

pub const DEFAULT_MAX_DEPTH: usize = 32;
pub const DEFAULT_MAX_SIZE: usize = 1024 * 1024; // 1MB
pub const DEFAULT_MAX_STRING_LENGTH: usize = 100 * 1024; // 100KB
pub const DEFAULT_MAX_PROPERTIES: usize = 1000;
pub const DEFAULT_ACCEPTED_EXTENSION: &str = "skd";

/// What the parser does with blank lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlankLines {
    /// Ignore them
    #[default]
    Skip,
    /// Record top-level blank lines as structure placeholders so they are written back
    Preserve,
}

/// Configuration for parser limits and behavior switches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Maximum tab indentation depth
    pub max_depth: usize,
    /// Maximum input size in bytes
    pub max_size: usize,
    /// Maximum content or property value length
    pub max_string_length: usize,
    /// Maximum number of properties on one tag
    pub max_properties: usize,
    pub blank_lines: BlankLines,
    /// Accept `<SKD ...>` declarations with a deprecation warning
    pub legacy_declarations: bool,
    /// Fail on a DOCTYPE no registered provider resolves instead of warning
    pub strict_doctypes: bool,
    /// Extension a file needs to be accepted without forcing
    pub accepted_extension: String,
}

/// Tracks input size and indentation depth while scanning one document
#[derive(Debug)]
pub struct ParsingContext {
    current_depth: usize,
    current_size: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_size: DEFAULT_MAX_SIZE,
            max_string_length: DEFAULT_MAX_STRING_LENGTH,
            max_properties: DEFAULT_MAX_PROPERTIES,
            blank_lines: BlankLines::Skip,
            legacy_declarations: true,
            strict_doctypes: false,
            accepted_extension: DEFAULT_ACCEPTED_EXTENSION.to_string(),
        }
    }
}

impl ParserConfig {
    pub fn preserving_blank_lines(mut self) -> Self {
        self.blank_lines = BlankLines::Preserve;
        self
    }

    pub fn validate_size(&self, size: usize) -> Result<()> {
        if size > self.max_size {
            return Err(SkdError::security(SecurityError::MaxSizeExceeded));
        }
        Ok(())
    }

    pub fn validate_string(&self, s: &str) -> Result<()> {
        self.validate_string_length(s.len())
    }

    pub fn validate_string_length(&self, length: usize) -> Result<()> {
        if length > self.max_string_length {
            return Err(SkdError::security(SecurityError::MaxStringLengthExceeded));
        }
        Ok(())
    }

    pub fn validate_properties(&self, count: usize) -> Result<()> {
        if count > self.max_properties {
            return Err(SkdError::security(SecurityError::MaxPropertiesExceeded));
        }
        Ok(())
    }
}

impl Default for ParsingContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ParsingContext {
    pub fn new() -> Self {
        Self {
            current_depth: 0,
            current_size: 0,
        }
    }

    pub fn enter_level(&mut self, depth: usize, config: &ParserConfig) -> Result<()> {
        if depth > config.max_depth {
            return Err(SkdError::security(SecurityError::MaxDepthExceeded));
        }
        self.current_depth = depth;
        Ok(())
    }

    pub fn add_size(&mut self, size: usize, config: &ParserConfig) -> Result<()> {
        self.current_size = self.current_size.saturating_add(size);
        config.validate_size(self.current_size)
    }

    pub fn depth(&self) -> usize {
        self.current_depth
    }

    pub fn size(&self) -> usize {
        self.current_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SkdErrorKind;

    #[test]
    fn test_defaults() {
        let config = ParserConfig::default();
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.blank_lines, BlankLines::Skip);
        assert!(config.legacy_declarations);
        assert!(!config.strict_doctypes);
        assert_eq!(config.accepted_extension, "skd");
    }

    #[test]
    fn test_context_limits() {
        let config = ParserConfig {
            max_depth: 2,
            max_size: 10,
            ..ParserConfig::default()
        };
        let mut context = ParsingContext::new();
        assert!(context.enter_level(2, &config).is_ok());
        assert_eq!(context.depth(), 2);
        let err = context.enter_level(3, &config).unwrap_err();
        assert!(matches!(
            err.kind(),
            SkdErrorKind::Security(SecurityError::MaxDepthExceeded)
        ));

        assert!(context.add_size(6, &config).is_ok());
        assert!(context.add_size(6, &config).is_err());
    }
}
