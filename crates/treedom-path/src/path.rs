//! Dotted path syntax.
//!
//! A path is a non-empty sequence of segments separated by `.`. A segment
//! is either a literal key or the `*` wildcard; at most one wildcard is
//! allowed per path.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// One step of a dotted path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// A literal key: an object member name, or a numeric index into an
    /// array.
    Key(String),
    /// The `*` wildcard, standing in for every key at its position.
    Wildcard,
}

impl Segment {
    /// The literal key, or `None` for the wildcard.
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Segment::Key(key) => Some(key),
            Segment::Wildcard => None,
        }
    }

    /// Whether this segment is the `*` wildcard.
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Segment::Wildcard)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => f.write_str(key),
            Segment::Wildcard => f.write_str("*"),
        }
    }
}

/// Errors produced when parsing or applying dotted paths.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// The input string was empty.
    #[error("empty path")]
    Empty,
    /// Two consecutive dots, or a leading or trailing dot.
    #[error("empty segment in path '{0}'")]
    EmptySegment(String),
    /// More than one `*` segment in one path.
    #[error("more than one wildcard in path '{0}'")]
    MultipleWildcards(String),
    /// A write or removal addressed a location whose parent chain does
    /// not resolve to a container.
    #[error("path '{0}' does not reach a writable location")]
    Dangling(String),
    /// A write or removal addressed a path that still contains a
    /// wildcard.
    #[error("path '{0}' contains a wildcard")]
    Wildcard(String),
}

/// A parsed dotted path, e.g. `preferences.*.value`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    /// Parse a dotted path string.
    ///
    /// # Example
    ///
    /// ```
    /// use treedom_path::{Path, PathError, Segment};
    ///
    /// let path = Path::parse("preferences.*.value").unwrap();
    /// assert_eq!(path.segments().len(), 3);
    /// assert!(path.segments()[1].is_wildcard());
    ///
    /// assert_eq!(Path::parse(""), Err(PathError::Empty));
    /// assert!(Path::parse("a..b").is_err());
    /// assert!(Path::parse("a.*.b.*").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Path, PathError> {
        if input.is_empty() {
            return Err(PathError::Empty);
        }
        let mut segments = Vec::new();
        let mut wildcards = 0usize;
        for part in input.split('.') {
            match part {
                "" => return Err(PathError::EmptySegment(input.to_string())),
                "*" => {
                    wildcards += 1;
                    if wildcards > 1 {
                        return Err(PathError::MultipleWildcards(input.to_string()));
                    }
                    segments.push(Segment::Wildcard);
                }
                key => segments.push(Segment::Key(key.to_string())),
            }
        }
        Ok(Path { segments })
    }

    /// Build a path from already-split segments.
    pub fn from_segments(segments: Vec<Segment>) -> Path {
        Path { segments }
    }

    /// The segments, in order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the path has no segments. `Path::parse` never produces an
    /// empty path; this exists for paths built from segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether any segment is the `*` wildcard.
    pub fn has_wildcard(&self) -> bool {
        self.segments.iter().any(Segment::is_wildcard)
    }

    /// The final segment, if any.
    pub fn leaf(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// The path without its final segment.
    pub fn parent(&self) -> Option<Path> {
        match self.segments.split_last() {
            Some((_, rest)) => Some(Path {
                segments: rest.to_vec(),
            }),
            None => None,
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}
