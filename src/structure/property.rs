use std::fmt;

use crate::{
    error::{Result, SemanticError, SkdError},
    structure::NodeVariant,
};

/// A name with an optional value attached to a tag
///
/// Equality only looks at name and value: a marker and a generic property
/// without value compare equal.
#[derive(Debug, Clone, Eq)]
pub struct Property {
    name: String,
    value: Option<String>,
    marker: bool,
}

impl Property {
    pub fn new(name: impl Into<String>, value: Option<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(SkdError::semantic(SemanticError::EmptyName(
                "property".to_string(),
            )));
        }
        Ok(Self {
            name,
            value,
            marker: false,
        })
    }

    /// Shorthand for a property that carries a value
    pub fn with_value(name: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        Self::new(name, Some(value.into()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    pub fn is_marker(&self) -> bool {
        self.marker
    }

    pub fn variant(&self) -> NodeVariant {
        if self.marker {
            NodeVariant::Marker
        } else {
            NodeVariant::Generic
        }
    }

    pub fn set_value(&mut self, value: impl Into<String>) -> Result<()> {
        self.ensure_not_marker("set_value")?;
        self.value = Some(value.into());
        Ok(())
    }

    pub fn remove_value(&mut self) -> Result<Option<String>> {
        self.ensure_not_marker("remove_value")?;
        Ok(self.value.take())
    }

    /// Narrows a value-less property into a marker
    pub fn into_marker(mut self) -> Result<Self> {
        if self.value.is_some() {
            return Err(SkdError::semantic(SemanticError::Unsupported(format!(
                "property '{}' has a value and cannot become a marker",
                self.name
            ))));
        }
        self.marker = true;
        Ok(self)
    }

    pub fn into_generic(mut self) -> Self {
        self.marker = false;
        self
    }

    fn ensure_not_marker(&self, operation: &str) -> Result<()> {
        if self.marker {
            return Err(SkdError::semantic(SemanticError::Unsupported(format!(
                "{} on marker property '{}'",
                operation, self.name
            ))));
        }
        Ok(())
    }
}

impl PartialEq for Property {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.value == other.value
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=\"{}\"", self.name, self.value.as_deref().unwrap_or(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SkdErrorKind;

    #[test]
    fn test_empty_name_rejected() {
        let err = Property::new("", None).unwrap_err();
        assert!(matches!(
            err.kind(),
            SkdErrorKind::Semantic(SemanticError::EmptyName(_))
        ));
    }

    #[test]
    fn test_equality_ignores_variant() -> Result<()> {
        let marker = Property::new("flag", None)?.into_marker()?;
        let plain = Property::new("flag", None)?;
        assert_eq!(marker, plain);
        assert_ne!(
            Property::with_value("a", "1")?,
            Property::with_value("a", "2")?
        );
        Ok(())
    }

    #[test]
    fn test_marker_refuses_value_changes() -> Result<()> {
        let mut marker = Property::new("flag", None)?.into_marker()?;
        assert!(marker.set_value("x").is_err());
        assert!(marker.remove_value().is_err());
        assert_eq!(marker.variant(), NodeVariant::Marker);
        Ok(())
    }

    #[test]
    fn test_display() -> Result<()> {
        assert_eq!(Property::with_value("a", "b c")?.to_string(), "a=\"b c\"");
        assert_eq!(Property::new("a", None)?.to_string(), "a=\"\"");
        Ok(())
    }

    #[test]
    fn test_set_and_remove_value() -> Result<()> {
        let mut property = Property::with_value("a", "1")?;
        property.set_value("2")?;
        assert_eq!(property.value(), Some("2"));
        assert_eq!(property.remove_value()?, Some("2".to_string()));
        assert!(!property.has_value());
        Ok(())
    }
}
