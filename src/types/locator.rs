//! File locators: a scheme plus an absolute path, rendered as `scheme://path`.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::errors::BookmarkError;

/// Canonical reference to a file a bookmark points at.
///
/// Two locators are equal iff their canonical strings are equal; paths are
/// never normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    scheme: String,
    path: String,
}

impl Locator {
    /// Parses a canonical `scheme://path` string. The path must be absolute.
    pub fn parse(s: &str) -> Result<Self, BookmarkError> {
        let (scheme, path) = s
            .split_once("://")
            .ok_or_else(|| BookmarkError::MalformedRecord(format!("locator without scheme: {}", s)))?;

        if !Self::is_valid_scheme(scheme) {
            return Err(BookmarkError::MalformedRecord(format!(
                "invalid locator scheme: {}",
                scheme
            )));
        }
        if !path.starts_with('/') {
            return Err(BookmarkError::MalformedRecord(format!(
                "locator path is not absolute: {}",
                s
            )));
        }

        Ok(Self {
            scheme: scheme.to_string(),
            path: path.to_string(),
        })
    }

    /// Builds a `file` locator from an absolute filesystem path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, BookmarkError> {
        let path = path.as_ref();
        if !path.is_absolute() {
            return Err(BookmarkError::MalformedRecord(format!(
                "path is not absolute: {}",
                path.display()
            )));
        }

        // Windows paths become /C:/dir/file so the canonical form stays `file:///...`.
        let mut raw = path.to_string_lossy().replace('\\', "/");
        if !raw.starts_with('/') {
            raw.insert(0, '/');
        }

        Ok(Self {
            scheme: "file".to_string(),
            path: raw,
        })
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the last non-empty path segment (the file's base name).
    pub fn base_name(&self) -> &str {
        self.path
            .rsplit('/')
            .find(|segment| !segment.is_empty())
            .unwrap_or(&self.path)
    }

    fn is_valid_scheme(scheme: &str) -> bool {
        let mut chars = scheme.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.path)
    }
}

impl FromStr for Locator {
    type Err = BookmarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Locator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Locator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Locator::parse(&raw).map_err(serde::de::Error::custom)
    }
}
