use std::fmt;

/// Shape of a node after refinement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeVariant {
    /// Plain node as produced by the parser
    #[default]
    Generic,
    /// Tag whose children all share one item name
    List,
    /// Void tag carrying exactly a `left` and a `right` property
    Pair,
    /// Void tag carrying exactly one `value` property
    Scalar,
    /// Property without a value
    Marker,
    /// Database with exactly one top-level tag
    Singleton,
}

impl NodeVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::List => "list",
            Self::Pair => "pair",
            Self::Scalar => "scalar",
            Self::Marker => "marker",
            Self::Singleton => "singleton",
        }
    }
}

impl fmt::Display for NodeVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
