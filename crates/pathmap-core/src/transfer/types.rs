//! Core types of the relation model
//!
//! A [`Transfer`] maps one source [`TransferUnit`] to one destination unit.
//! [`TransferTypes`] is the lookup table that turns a declared destination
//! type into the coercion suffix applied when the value is read.
//!
//! Copyright (c) 2025 Pathmap Team
//! Licensed under the Apache-2.0 license

use crate::path::{split_type, Path};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One side of a mapping rule: a path and its optional declared type
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransferUnit {
    pub path: Path,
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl TransferUnit {
    pub fn new(path: impl Into<Path>, kind: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: kind.into(),
        }
    }

    /// Parse `path[@type]`
    pub fn parse(text: &str) -> Self {
        let (path, kind) = split_type(text);
        Self::new(path, kind)
    }

    fn same_unit(&self, other: &TransferUnit) -> bool {
        self.path.eq_ignore_case(&other.path) && self.kind.eq_ignore_ascii_case(&other.kind)
    }
}

impl fmt::Display for TransferUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path.as_str())?;
        if !self.kind.is_empty() {
            write!(f, "@{}", self.kind)?;
        }
        Ok(())
    }
}

/// A single mapping rule
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transfer {
    pub src: TransferUnit,
    pub dst: TransferUnit,
}

impl Transfer {
    pub fn new(src: TransferUnit, dst: TransferUnit) -> Self {
        Self { src, dst }
    }

    /// Whether the source path carries the input marker
    pub fn is_in(&self) -> bool {
        self.src.path.is_in()
    }

    /// Whether the source path carries the output marker
    pub fn is_out(&self) -> bool {
        self.src.path.is_out()
    }

    /// The same rule read in the other direction
    pub fn reversed(&self) -> Self {
        Self {
            src: self.dst.clone(),
            dst: self.src.clone(),
        }
    }

    /// Case-insensitive identity used for upserts
    pub(crate) fn same_rule(&self, other: &Transfer) -> bool {
        self.src.same_unit(&other.src) && self.dst.same_unit(&other.dst)
    }
}

impl fmt::Display for Transfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.src, self.dst)
    }
}

/// Coercion attached to a declared type name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferType {
    #[serde(rename = "type")]
    pub kind: String,
    /// Suffix appended to the source path, e.g. `.@tonum`
    #[serde(rename = "convertFn")]
    pub convert_fn: String,
}

impl TransferType {
    pub fn new(kind: impl Into<String>, convert_fn: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            convert_fn: convert_fn.into(),
        }
    }
}

/// Type-name → coercion lookup table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransferTypes(Vec<TransferType>);

impl TransferTypes {
    pub fn new(types: Vec<TransferType>) -> Self {
        Self(types)
    }

    /// Case-insensitive lookup by type name
    pub fn get_by_type(&self, kind: &str) -> Option<&TransferType> {
        self.0.iter().find(|t| t.kind.eq_ignore_ascii_case(kind))
    }

    pub fn iter(&self) -> impl Iterator<Item = &TransferType> {
        self.0.iter()
    }
}

impl Default for TransferTypes {
    fn default() -> Self {
        Self(vec![
            TransferType::new("int", ".@tonum"),
            TransferType::new("integer", ".@tonum"),
            TransferType::new("number", ".@tonum"),
            TransferType::new("float", ".@tonum"),
            TransferType::new("bool", ".@tobool"),
            TransferType::new("boolean", ".@tobool"),
            TransferType::new("string", ".@tostring"),
        ])
    }
}
