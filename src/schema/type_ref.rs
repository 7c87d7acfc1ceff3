//! Versioned type references.
//!
//! Components and traits are identified by a `"<version>/<name>"` string such
//! as `core/v1/text`. The version segment may itself contain slashes
//! (`core/v1`), so parsing splits on the *last* `/`. [`TypeRef`] is the parsed
//! form used as the registry key; it serializes back to the string form.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Error returned when a type string is not of the form `<version>/<name>`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid type reference `{0}`: expected `<version>/<name>`")]
pub struct InvalidTypeRef(pub String);

/// A parsed `(version, name)` pair identifying a component or trait kind.
///
/// Equality and hashing are exact string comparisons on both segments; there
/// is no fuzzy or semver-range matching, which lets multiple major versions of
/// the same name coexist in one registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeRef {
    /// Version segment, e.g. `core/v1`. May contain slashes.
    pub version: String,
    /// Name segment, e.g. `text`. Never contains a slash.
    pub name: String,
}

impl TypeRef {
    /// Create a type reference from its two segments.
    pub fn new(version: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.version, self.name)
    }
}

impl FromStr for TypeRef {
    type Err = InvalidTypeRef;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (version, name) = s
            .rsplit_once('/')
            .ok_or_else(|| InvalidTypeRef(s.to_owned()))?;
        if version.is_empty() || name.is_empty() {
            return Err(InvalidTypeRef(s.to_owned()));
        }
        Ok(Self::new(version, name))
    }
}

// Serialize as the `"version/name"` string so specs round-trip unchanged.
impl Serialize for TypeRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TypeRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
