//! Dotted dependency paths.
//!
//! A [`PropertyPath`] is the declaration-side form of a nested dependency:
//! an ordered, non-empty list of property names relative to a root type.
//! Paths are intentionally serializable (through their dotted string form)
//! so declarations can be carried in configuration payloads.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ChainResult, ConfigurationError};

/// An ordered, non-empty sequence of property names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PropertyPath {
    segments: Vec<String>,
}

impl PropertyPath {
    /// Parse a dot-separated path such as `"address.city.name"`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::EmptyPath`] if the string is empty or
    /// any segment between dots is empty.
    pub fn parse(path: &str) -> ChainResult<Self> {
        let segments: Vec<String> = path.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(ConfigurationError::EmptyPath {
                path: path.to_string(),
            });
        }
        Ok(Self { segments })
    }

    /// All segments, outermost first.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The first (root-relative) segment.
    #[must_use]
    pub fn first(&self) -> &str {
        &self.segments[0]
    }

    /// The final segment: the leaf property the chain ultimately watches.
    #[must_use]
    pub fn leaf(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    /// Number of segments, which is also the number of nodes a bound chain
    /// will hold.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments.len()
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl TryFrom<String> for PropertyPath {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PropertyPath> for String {
    fn from(path: PropertyPath) -> Self {
        path.to_string()
    }
}
