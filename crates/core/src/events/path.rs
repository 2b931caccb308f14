use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::PathError;

/// Address of a nested event field.
///
/// Accepts dotted (`flow-lifecycle.start-time`) and bracketed
/// (`[flow-lifecycle][start-time]`) notation. Always holds at least one
/// non-empty segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(PathError::Empty);
        }

        let segments = if raw.starts_with('[') {
            Self::parse_bracketed(raw)?
        } else {
            raw.split('.').map(str::to_owned).collect::<Vec<_>>()
        };

        if segments.iter().any(|s| s.trim().is_empty()) {
            return Err(PathError::EmptySegment {
                path: raw.to_string(),
            });
        }

        Ok(Self { segments })
    }

    fn parse_bracketed(raw: &str) -> Result<Vec<String>, PathError> {
        let unbalanced = || PathError::Unbalanced {
            path: raw.to_string(),
        };

        let mut segments = Vec::new();
        let mut rest = raw;
        while !rest.is_empty() {
            let inner = rest.strip_prefix('[').ok_or_else(unbalanced)?;
            let close = inner.find(']').ok_or_else(unbalanced)?;
            let segment = &inner[..close];
            if segment.contains('[') {
                return Err(unbalanced());
            }
            segments.push(segment.to_string());
            rest = &inner[close + 1..];
        }
        Ok(segments)
    }

    /// Builds a path from a dotted literal known to be well formed.
    pub(crate) fn literal(path: &'static str) -> Self {
        Self {
            segments: path.split('.').map(str::to_owned).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub(crate) fn parents(&self) -> &[String] {
        &self.segments[..self.segments.len() - 1]
    }

    pub(crate) fn leaf(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    /// Dotted rendering of the first `depth` segments.
    pub(crate) fn prefix(&self, depth: usize) -> String {
        self.segments[..depth].join(".")
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for FieldPath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.to_string()
    }
}
