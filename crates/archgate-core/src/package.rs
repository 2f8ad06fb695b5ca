//! Package identifiers for matching dot-separated package paths.
//!
//! Syntax:
//! - `com.example` matches exactly the package `com.example`
//! - `com.example..` matches `com.example` and every subpackage
//! - `..service..` matches any package containing a `service` segment
//! - `com.*.api` matches one segment by wildcard (`*` never crosses a `.`)

use std::fmt;

use crate::error::ConfigError;

#[derive(Debug, Clone)]
enum Segment {
    /// `..`: zero or more package segments.
    AnyPackages,
    Exact(String),
    Wildcard(glob::Pattern),
}

/// A validated package identifier.
///
/// Parsed once at construction; matching never fails.
#[derive(Debug, Clone)]
pub struct PackageIdentifier {
    raw: String,
    segments: Vec<Segment>,
}

impl PackageIdentifier {
    /// Parses a package identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyPattern`] for an empty identifier and
    /// [`ConfigError::InvalidPattern`] for `...`, empty segments, or broken wildcards.
    pub fn new(identifier: &str) -> Result<Self, ConfigError> {
        let trimmed = identifier.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::EmptyPattern);
        }
        if trimmed.contains("...") {
            return Err(invalid(trimmed, "`...` is ambiguous, use `..`"));
        }

        let mut segments = Vec::new();
        let parts: Vec<&str> = trimmed.split("..").collect();
        let last = parts.len() - 1;
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                segments.push(Segment::AnyPackages);
            }
            if part.is_empty() && (i == 0 || i == last) {
                continue;
            }
            for segment in part.split('.') {
                segments.push(parse_segment(trimmed, segment)?);
            }
        }

        Ok(Self {
            raw: trimmed.to_string(),
            segments,
        })
    }

    /// Tests whether a package path (e.g. `com.example.core`) matches.
    ///
    /// The default package is the empty string.
    #[must_use]
    pub fn matches(&self, package: &str) -> bool {
        let parts: Vec<&str> = if package.is_empty() {
            Vec::new()
        } else {
            package.split('.').collect()
        };
        match_parts(&parts, &self.segments)
    }

    /// Returns the identifier as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for PackageIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

fn invalid(pattern: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: reason.into(),
    }
}

fn parse_segment(pattern: &str, segment: &str) -> Result<Segment, ConfigError> {
    if segment.is_empty() {
        return Err(invalid(pattern, "empty package segment"));
    }
    if segment.contains(['*', '?', '[']) {
        let compiled = glob::Pattern::new(segment).map_err(|e| invalid(pattern, e.to_string()))?;
        return Ok(Segment::Wildcard(compiled));
    }
    Ok(Segment::Exact(segment.to_string()))
}

fn match_parts(path: &[&str], pattern: &[Segment]) -> bool {
    let Some((first, rest)) = pattern.split_first() else {
        return path.is_empty();
    };

    match first {
        Segment::AnyPackages => (0..=path.len()).any(|i| match_parts(&path[i..], rest)),
        Segment::Exact(literal) => {
            path.first().is_some_and(|p| p == literal) && match_parts(&path[1..], rest)
        }
        Segment::Wildcard(glob) => {
            path.first().is_some_and(|p| glob.matches(p)) && match_parts(&path[1..], rest)
        }
    }
}
