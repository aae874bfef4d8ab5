//! Dotted paths used on both sides of a mapping rule
//!
//! A path is a `.`-separated string. The segment `#` iterates the elements of
//! the preceding array, `@this` names the current scope, and a trailing
//! `@<type>` suffix declares the expected type of the addressed value.
//!
//! Copyright (c) 2025 Pathmap Team
//! Licensed under the Apache-2.0 license

pub mod modifiers;

use crate::projection::Modifier;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level namespace reserved for function parameters
pub const FUNC_NAMESPACE: &str = "func.";

/// Segment that iterates the elements of an array
pub const ARRAY_MARKER: &str = "#";

/// Modifier naming the current scope
pub const THIS: &str = "@this";

/// A dotted path addressing a JSON field
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(String);

/// Direction of a function parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Argument passed into the function
    Input,
    /// Value produced by the function
    Output,
}

impl Direction {
    /// Marker as it appears inside a path, including the leading dot
    pub fn marker(self) -> &'static str {
        match self {
            Direction::Input => ".input",
            Direction::Output => ".output",
        }
    }

    /// Bare token without the dot
    pub fn token(self) -> &'static str {
        &self.marker()[1..]
    }

    /// Find the direction marker of a path.
    ///
    /// The marker must end at a segment boundary (`.`, `@` or end of path).
    /// `input` is looked up before `output`. Returns the direction together
    /// with the byte offset of the marker's leading dot.
    pub fn locate(path: &str) -> Option<(Direction, usize)> {
        [Direction::Input, Direction::Output]
            .into_iter()
            .find_map(|direction| find_marker(path, direction.marker()).map(|at| (direction, at)))
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

fn find_marker(path: &str, marker: &str) -> Option<usize> {
    path.match_indices(marker).map(|(at, _)| at).find(|&at| {
        matches!(path[at + marker.len()..].chars().next(), None | Some('.') | Some('@'))
    })
}

/// Byte offset of the `@` that separates a trailing type from the path.
///
/// Scans from the right and accepts the first `@` that is not preceded by a
/// `.`; an `@` directly after a dot is a chained modifier such as `.@tonum`.
/// A suffix containing a dot is a path rather than a type name. A leading `@`
/// declares the type of an empty path (`@int`) unless it names a modifier
/// (`@this`).
pub fn type_at_index(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let at = text
        .rmatch_indices('@')
        .map(|(at, _)| at)
        .find(|&at| at == 0 || bytes[at - 1] != b'.')?;
    let suffix = &text[at + 1..];
    if suffix.contains('.') || (at == 0 && Modifier::from_name(suffix, None).is_some()) {
        return None;
    }
    Some(at)
}

/// Split `text` into its path and its trailing type (empty when absent)
pub fn split_type(text: &str) -> (&str, &str) {
    match type_at_index(text) {
        Some(at) => (&text[..at], &text[at + 1..]),
        None => (text, ""),
    }
}

/// Join path fragments with `.`, skipping empty fragments and trimming the
/// dots around each one.
pub fn join_path<I, S>(parts: I) -> Path
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = parts
        .into_iter()
        .filter_map(|part| {
            let part = part.as_ref();
            (!part.is_empty()).then(|| part.trim_matches('.').to_string())
        })
        .collect::<Vec<_>>()
        .join(".");
    Path(joined)
}

impl Path {
    /// Create a path from anything string-like
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// ASCII case-insensitive equality
    pub fn eq_ignore_case(&self, other: &Path) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }

    /// Whether the path starts with `namespace` (plain string prefix)
    pub fn has_namespace(&self, namespace: &str) -> bool {
        self.0.starts_with(namespace)
    }

    /// Remove `namespace` and then one leading dot
    pub fn trim_namespace(&self, namespace: &str) -> Path {
        let rest = self.0.strip_prefix(namespace).unwrap_or(&self.0);
        Path(rest.strip_prefix('.').unwrap_or(rest).to_string())
    }

    /// Direction marker contained in the path, if any
    pub fn direction(&self) -> Option<Direction> {
        Direction::locate(&self.0).map(|(direction, _)| direction)
    }

    pub fn is_in(&self) -> bool {
        self.direction() == Some(Direction::Input)
    }

    pub fn is_out(&self) -> bool {
        self.direction() == Some(Direction::Output)
    }

    /// Split around the direction marker into `(namespace, local name)`.
    ///
    /// A path without a marker has an empty namespace and is its own local name.
    pub fn split_by_io(&self) -> (String, String) {
        match Direction::locate(&self.0) {
            Some((direction, at)) => {
                let namespace = self.0[..at].trim_matches('.');
                let local = self.0[at + direction.marker().len()..].trim_matches('.');
                (namespace.to_string(), local.to_string())
            }
            None => (String::new(), self.0.clone()),
        }
    }

    /// Local name with the input/output namespace removed
    pub fn trim_io_namespace(&self) -> String {
        self.split_by_io().1
    }

    /// Iterate over the `.`-separated segments
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Path {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Path {
    fn from(path: &str) -> Self {
        Self(path.to_string())
    }
}

impl From<String> for Path {
    fn from(path: String) -> Self {
        Self(path)
    }
}

impl PartialEq<str> for Path {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Path {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
