// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! Fully-Qualified Function Name parsing.
//!
//! Canonical form: `<identifier>#<namespace>::<name>@<version>`, e.g.
//! `com.acme#default::echo@v1`. Parsing and formatting round-trip losslessly.

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// A parsed Fully-Qualified Function Name.
///
/// Serializes to and from its canonical string form, not as a struct, so it
/// round-trips on the wire exactly as `Display`/`parse` render it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fqfn {
    pub identifier: String,
    pub namespace: String,
    pub name: String,
    pub version: String,
}

impl Serialize for Fqfn {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Fqfn {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Fqfn::parse(&s).map_err(D::Error::custom)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FqfnParseError {
    #[error("missing '#' separator between identifier and namespace in {0:?}")]
    MissingIdentifierSeparator(String),
    #[error("missing '::' separator between namespace and name in {0:?}")]
    MissingNamespaceSeparator(String),
    #[error("missing '@' separator between name and version in {0:?}")]
    MissingVersionSeparator(String),
}

impl Fqfn {
    pub fn new(
        identifier: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            namespace: namespace.into(),
            name: name.into(),
            version: version.into(),
        }
    }

    pub fn parse(s: &str) -> Result<Self, FqfnParseError> {
        let (identifier, rest) = s
            .split_once('#')
            .ok_or_else(|| FqfnParseError::MissingIdentifierSeparator(s.to_string()))?;

        let (namespace, rest) = rest
            .split_once("::")
            .ok_or_else(|| FqfnParseError::MissingNamespaceSeparator(s.to_string()))?;

        let (name, version) = rest
            .split_once('@')
            .ok_or_else(|| FqfnParseError::MissingVersionSeparator(s.to_string()))?;

        Ok(Self::new(identifier, namespace, name, version))
    }
}

impl fmt::Display for Fqfn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}::{}@{}", self.identifier, self.namespace, self.name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_form() {
        let fqfn = Fqfn::parse("com.acme#default::echo@v1").unwrap();
        assert_eq!(fqfn.identifier, "com.acme");
        assert_eq!(fqfn.namespace, "default");
        assert_eq!(fqfn.name, "echo");
        assert_eq!(fqfn.version, "v1");
    }

    #[test]
    fn round_trips_through_display() {
        let fqfn = Fqfn::new("com.acme", "default", "echo", "v1");
        let s = fqfn.to_string();
        assert_eq!(Fqfn::parse(&s).unwrap(), fqfn);
    }

    #[test]
    fn rejects_missing_identifier_separator() {
        let err = Fqfn::parse("com.acme-default::echo@v1").unwrap_err();
        assert_eq!(err, FqfnParseError::MissingIdentifierSeparator("com.acme-default::echo@v1".to_string()));
    }

    #[test]
    fn rejects_missing_namespace_separator() {
        let err = Fqfn::parse("com.acme#default:echo@v1").unwrap_err();
        assert_eq!(
            err,
            FqfnParseError::MissingNamespaceSeparator("com.acme#default:echo@v1".to_string())
        );
    }

    #[test]
    fn serializes_as_its_canonical_string_form() {
        let fqfn = Fqfn::new("com.acme", "default", "echo", "v1");
        let json = serde_json::to_string(&fqfn).unwrap();
        assert_eq!(json, "\"com.acme#default::echo@v1\"");
        assert_eq!(serde_json::from_str::<Fqfn>(&json).unwrap(), fqfn);
    }

    #[test]
    fn rejects_missing_version_separator() {
        let err = Fqfn::parse("com.acme#default::echo-v1").unwrap_err();
        assert_eq!(
            err,
            FqfnParseError::MissingVersionSeparator("com.acme#default::echo-v1".to_string())
        );
    }

    proptest::proptest! {
        #[test]
        fn round_trip_is_lossless(
            identifier in "[a-z]{1,8}(\\.[a-z]{1,8}){0,2}",
            namespace in "[a-z]{1,12}",
            name in "[a-z]{1,12}",
            version in "v[0-9]{1,3}",
        ) {
            let fqfn = Fqfn::new(identifier, namespace, name, version);
            let parsed = Fqfn::parse(&fqfn.to_string()).unwrap();
            proptest::prop_assert_eq!(parsed, fqfn);
        }
    }
}
