//! Relation model: ordered sets of source → destination mapping rules
//!
//! A [`Transfers`] value is an ordered list of [`Transfer`] rules with upsert
//! semantics. Rule order is significant: it decides the field order of the
//! compiled projection. All operations except [`Transfers::add_replace`]
//! produce new values.
//!
//! # Module Organization
//!
//! - [`types`] - rule, unit and coercion-table types
//! - [`parser`] - mapping DSL and JSON interchange form
//!
//! Copyright (c) 2025 Pathmap Team
//! Licensed under the Apache-2.0 license

pub mod parser;
pub mod types;



pub use parser::parse;
pub use types::{Transfer, TransferType, TransferTypes, TransferUnit};

use crate::path::Path;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered rule set with case-insensitive upsert identity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transfers(Vec<Transfer>);

/// A pure path rewrite applied by [`Transfers::modify_src_path`] and
/// [`Transfers::modify_dst_path`]
pub type PathModifyFn<'a> = &'a dyn Fn(&Path) -> Path;

impl Transfers {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transfer> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Transfer] {
        &self.0
    }

    /// Insert a rule, replacing in place a rule with the same canonical form
    pub fn add_replace(&mut self, transfer: Transfer) {
        match self.0.iter_mut().find(|existing| existing.same_rule(&transfer)) {
            Some(existing) => *existing = transfer,
            None => self.0.push(transfer),
        }
    }

    /// [`add_replace`](Self::add_replace) every rule of `transfers`, in order
    pub fn extend_replace(&mut self, transfers: impl IntoIterator<Item = Transfer>) {
        for transfer in transfers {
            self.add_replace(transfer);
        }
    }

    /// Partition by the direction marker of the source path
    pub fn split_in_out(&self) -> (Transfers, Transfers) {
        let mut input = Transfers::new();
        let mut output = Transfers::new();
        for transfer in &self.0 {
            if transfer.is_in() {
                input.add_replace(transfer.clone());
            } else if transfer.is_out() {
                output.add_replace(transfer.clone());
            }
        }
        (input, output)
    }

    /// Distinct destination paths in rule order
    pub fn get_all_dst(&self) -> Vec<Path> {
        let mut dsts: Vec<Path> = Vec::new();
        for transfer in &self.0 {
            if !dsts.contains(&transfer.dst.path) {
                dsts.push(transfer.dst.path.clone());
            }
        }
        dsts
    }

    /// Swap source and destination of every rule
    pub fn reverse(&self) -> Transfers {
        Transfers(self.0.iter().map(Transfer::reversed).collect())
    }

    /// For each queried path, the first rule whose source matches it
    /// case-insensitively
    pub fn filter_by_src<P: AsRef<str>>(&self, src_paths: &[P]) -> Transfers {
        self.filter_by(src_paths, |transfer| &transfer.src.path)
    }

    /// For each queried path, the first rule whose destination matches it
    /// case-insensitively
    pub fn filter_by_dst<P: AsRef<str>>(&self, dst_paths: &[P]) -> Transfers {
        self.filter_by(dst_paths, |transfer| &transfer.dst.path)
    }

    fn filter_by<P: AsRef<str>>(&self, paths: &[P], side: impl Fn(&Transfer) -> &Path) -> Transfers {
        let mut subset = Transfers::new();
        for path in paths {
            let wanted = Path::from(path.as_ref());
            if let Some(transfer) = self.0.iter().find(|t| side(t).eq_ignore_case(&wanted)) {
                subset.add_replace(transfer.clone());
            }
        }
        subset
    }

    /// Distinct source-path prefixes in front of the first `delim`
    /// (`.input` / `.output`), in discovery order
    pub fn get_src_namespace(&self, delim: &str) -> Vec<String> {
        let mut namespaces: Vec<String> = Vec::new();
        for transfer in &self.0 {
            let src = transfer.src.path.as_str();
            if let Some(index) = src.find(delim) {
                let namespace = &src[..index];
                if !namespaces.iter().any(|existing| existing == namespace) {
                    namespaces.push(namespace.to_string());
                }
            }
        }
        namespaces
    }

    /// Rules whose source path lives under `namespace.`
    pub fn get_by_namespace(&self, namespace: &str) -> Transfers {
        let namespace = format!("{}.", namespace.trim_end_matches('.'));
        let mut subset = Transfers::new();
        for transfer in &self.0 {
            if transfer.src.path.has_namespace(&namespace) {
                subset.add_replace(transfer.clone());
            }
        }
        subset
    }

    /// Rewrite every source path; the result is deduplicated
    pub fn modify_src_path(&self, modifiers: &[PathModifyFn<'_>]) -> Transfers {
        let mut modified = Transfers::new();
        for transfer in &self.0 {
            let mut transfer = transfer.clone();
            for modify in modifiers {
                transfer.src.path = modify(&transfer.src.path);
            }
            modified.add_replace(transfer);
        }
        modified
    }

    /// Rewrite every destination path; the result is deduplicated
    pub fn modify_dst_path(&self, modifiers: &[PathModifyFn<'_>]) -> Transfers {
        let mut modified = Transfers::new();
        for transfer in &self.0 {
            let mut transfer = transfer.clone();
            for modify in modifiers {
                transfer.dst.path = modify(&transfer.dst.path);
            }
            modified.add_replace(transfer);
        }
        modified
    }

    /// Sort by source path
    pub fn sort(&mut self) {
        self.0.sort_by(|a, b| a.src.path.cmp(&b.src.path));
    }

    /// Canonical JSON array form
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse the canonical JSON array form; blank input is an empty set
    pub fn from_json(json: &str) -> Result<Transfers> {
        if json.trim().is_empty() {
            return Ok(Transfers::new());
        }
        Ok(serde_json::from_str(json)?)
    }
}

impl fmt::Display for Transfers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for transfer in &self.0 {
            writeln!(f, "{}", transfer)?;
        }
        Ok(())
    }
}

/// Keep every rule as given, without upserting
impl From<Vec<Transfer>> for Transfers {
    fn from(rules: Vec<Transfer>) -> Self {
        Self(rules)
    }
}

impl FromIterator<Transfer> for Transfers {
    fn from_iter<I: IntoIterator<Item = Transfer>>(iter: I) -> Self {
        let mut transfers = Transfers::new();
        transfers.extend_replace(iter);
        transfers
    }
}

impl IntoIterator for Transfers {
    type Item = Transfer;
    type IntoIter = std::vec::IntoIter<Transfer>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Transfers {
    type Item = &'a Transfer;
    type IntoIter = std::slice::Iter<'a, Transfer>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
