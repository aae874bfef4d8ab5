//! Rule set → projection expression compiler
//!
//! Compilation runs in three steps:
//!
//! 1. Every source path gets the coercion suffix of its destination type
//!    (`user.id` with destination type `int` becomes `user.id.@tonum`); an
//!    empty source path stands for the current value, `@this`.
//! 2. Destination paths are merged into an ordered tree.
//! 3. The tree is written out as nested object literals. Levels under a `#`
//!    key are written as parallel arrays and zipped back into arrays of
//!    objects with `@groupPlus:<n>`, where `n` counts the enclosing arrays.
//!
//! Copyright (c) 2025 Pathmap Team
//! Licensed under the Apache-2.0 license

use super::tree::{Node, Slot};
use crate::config::EngineConfig;
use crate::path::{ARRAY_MARKER, THIS};
use crate::transfer::{Transfer, TransferTypes, Transfers};

/// Compiles rule sets into projection expressions
#[derive(Debug, Clone, Default)]
pub struct ProjectionCompiler {
    types: TransferTypes,
}

impl ProjectionCompiler {
    /// Compiler using the default coercion table
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_types(types: TransferTypes) -> Self {
        Self { types }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::with_types(config.coercions.clone())
    }

    pub fn types(&self) -> &TransferTypes {
        &self.types
    }

    /// Compile `transfers` into one projection expression.
    ///
    /// An empty rule set compiles to the empty string and a single rule with
    /// an empty destination compiles to its bare coerced source.
    pub fn compile(&self, transfers: &Transfers) -> String {
        let rules: Vec<(String, &str)> = transfers
            .iter()
            .map(|transfer| (self.coerced_source(transfer), transfer.dst.path.as_str()))
            .collect();

        match rules.as_slice() {
            [] => return String::new(),
            [(source, dst)] if dst.is_empty() => return source.clone(),
            _ => {}
        }

        let mut root = Node::new();
        for (source, dst) in &rules {
            let dst = normalize_destination(dst);
            let keys: Vec<&str> = dst.split('.').collect();
            root.insert(&keys, source);
        }

        let (expression, _) = write_node(&root, false, 0);
        log::trace!("compiled projection: {}", expression);
        expression
    }

    fn coerced_source(&self, transfer: &Transfer) -> String {
        let mut source = if transfer.src.path.is_empty() {
            THIS.to_string()
        } else {
            transfer.src.path.to_string()
        };
        if let Some(coercion) = self.types.get_by_type(&transfer.dst.kind) {
            source.push_str(&coercion.convert_fn);
        }
        source
    }
}

impl Transfers {
    /// Compile with the default coercion table
    pub fn to_projection(&self) -> String {
        ProjectionCompiler::new().compile(self)
    }
}

/// Drop `@this.` references and anchor non-array paths at the root key `""`
fn normalize_destination(dst: &str) -> String {
    let dst = dst.replace("@this.", "");
    let dst = dst.strip_prefix('.').unwrap_or(&dst);
    if dst.starts_with(ARRAY_MARKER) {
        dst.to_string()
    } else {
        format!(".{}", dst)
    }
}

/// Write one tree level; the flag reports whether the level is array-shaped
fn write_node(node: &Node, parent_is_array: bool, mut depth: usize) -> (String, bool) {
    let mut parts = Vec::new();
    let mut is_array = false;

    for (key, slot) in node.iter() {
        match slot {
            Slot::Unset => {}
            Slot::Leaf(source) => match key {
                ARRAY_MARKER => {
                    is_array = true;
                    parts.push(source.clone());
                }
                "" => parts.push(source.clone()),
                _ => parts.push(format!("{}:{}", key, source)),
            },
            Slot::Subtree(child) => {
                let child_is_array_key = key == ARRAY_MARKER;
                if child_is_array_key {
                    depth += 1;
                }

                let (mut inner, inner_is_array) = write_node(child, child_is_array_key, depth);
                if !inner_is_array {
                    inner = format!("{{{}}}", inner);
                    if parent_is_array {
                        inner = format!("{}|@groupPlus:{}", inner, depth.saturating_sub(1));
                    }
                }

                match key {
                    ARRAY_MARKER => {
                        is_array = true;
                        parts.push(format!("{}|@groupPlus:{}", inner, depth.saturating_sub(1)));
                    }
                    "" => parts.push(inner),
                    _ => parts.push(format!("{}:{}", key, inner)),
                }
            }
        }
    }

    (parts.join(","), is_array)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::{parse, TransferType};

    #[test]
    fn test_empty_rule_set() {
        assert_eq!(Transfers::new().to_projection(), "");
    }

    #[test]
    fn test_single_rule_without_destination() {
        assert_eq!(parse(":@int").to_projection(), "@this.@tonum");
        assert_eq!(parse("data.ids.#:@string").to_projection(), "data.ids.#.@tostring");
        assert_eq!(parse("data.count:@int").to_projection(), "data.count.@tonum");
        assert_eq!(parse("data.raw:").to_projection(), "data.raw");
    }

    #[test]
    fn test_normalize_destination() {
        assert_eq!(normalize_destination("user.name"), ".user.name");
        assert_eq!(normalize_destination("@this.user"), ".user");
        assert_eq!(normalize_destination(".user"), ".user");
        assert_eq!(normalize_destination("#.name"), "#.name");
        assert_eq!(normalize_destination(""), ".");
    }

    #[test]
    fn test_custom_coercion_table() {
        let compiler = ProjectionCompiler::with_types(TransferTypes::new(vec![TransferType::new(
            "money",
            ".@tostring",
        )]));
        let transfers = parse("price:amount@money\nid:id@int");
        assert_eq!(compiler.compile(&transfers), "{amount:price.@tostring,id:id}");
    }

    #[test]
    fn test_subtree_wins_over_later_leaf() {
        let transfers = parse("a.id:items.id\na:items");
        assert_eq!(transfers.to_projection(), "{items:{id:a.id}}");
    }
}
