//! Line-based mapping DSL
//!
//! Each non-blank line is one rule:
//!
//! ```text
//! api.getUser.input.id@int:db.user.Fuser_id@int
//! api.getUser.input.name:db.user.Fname
//! user.email
//! ```
//!
//! The line is split at the first `:`; both sides may end with an `@type`
//! suffix. A line without `:` maps a path onto itself.
//!
//! Copyright (c) 2025 Pathmap Team
//! Licensed under the Apache-2.0 license

use super::{Transfer, TransferUnit, Transfers};

/// Parse mapping DSL text into a rule set.
///
/// Parsing never fails: blank lines are skipped and every other line yields
/// one rule, in order. Repeated lines are kept.
pub fn parse(text: &str) -> Transfers {
    let rules: Vec<Transfer> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(parse_line)
        .collect();
    Transfers::from(rules)
}

fn parse_line(line: &str) -> Transfer {
    let (src, dst) = line.split_once(':').unwrap_or((line, line));
    Transfer::new(TransferUnit::parse(src), TransferUnit::parse(dst))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_typed_rule() {
        let transfers = parse("api.getUser.input.id@int:db.user.Fuser_id@string");
        assert_eq!(transfers.len(), 1);
        let rule = &transfers.as_slice()[0];
        assert_eq!(rule.src.path, "api.getUser.input.id");
        assert_eq!(rule.src.kind, "int");
        assert_eq!(rule.dst.path, "db.user.Fuser_id");
        assert_eq!(rule.dst.kind, "string");
    }

    #[test]
    fn test_parse_identity_rule() {
        let transfers = parse("  user.age@int  ");
        let rule = &transfers.as_slice()[0];
        assert_eq!(rule.src, rule.dst);
        assert_eq!(rule.src.path, "user.age");
        assert_eq!(rule.src.kind, "int");
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        let transfers = parse("\n  a:b\n\n\t\nc:d\n");
        assert_eq!(transfers.len(), 2);
        assert_eq!(transfers.to_string(), "a:b\nc:d\n");
    }

    #[test]
    fn test_parse_keeps_modifier_suffixes() {
        let transfers = parse("data.id.@tostring:user.id");
        let rule = &transfers.as_slice()[0];
        assert_eq!(rule.src.path, "data.id.@tostring");
        assert!(rule.src.kind.is_empty());
    }

    #[test]
    fn test_parse_empty_destination() {
        let transfers = parse("data.ids.#@int:");
        let rule = &transfers.as_slice()[0];
        assert_eq!(rule.src.path, "data.ids.#");
        assert!(rule.dst.path.is_empty());
    }

    #[test]
    fn test_parse_keeps_every_line() {
        let transfers = parse("a:b\nA:B\nc:d\nc:d");
        assert_eq!(transfers.len(), 4);
        assert_eq!(transfers.as_slice()[0].dst.path, "b");
        assert_eq!(transfers.as_slice()[1].dst.path, "B");
        assert_eq!(transfers.to_string(), "a:b\nA:B\nc:d\nc:d\n");
        assert_eq!(transfers.to_projection(), "{b:a,B:A,d:c}");
    }

    #[test]
    fn test_parse_typed_empty_path() {
        let transfers = parse("data.count:@int");
        let rule = &transfers.as_slice()[0];
        assert_eq!(rule.src.path, "data.count");
        assert!(rule.dst.path.is_empty());
        assert_eq!(rule.dst.kind, "int");
        assert_eq!(transfers.to_projection(), "data.count.@tonum");

        let this = parse(":@int");
        let rule = &this.as_slice()[0];
        assert!(rule.src.path.is_empty());
        assert_eq!(rule.dst.kind, "int");
        assert_eq!(this.to_projection(), "@this.@tonum");
        assert_eq!(this.to_string(), ":@int\n");
    }

    #[test]
    fn test_parse_keeps_this_destination() {
        let transfers = parse("user:@this");
        let rule = &transfers.as_slice()[0];
        assert_eq!(rule.dst.path, "@this");
        assert!(rule.dst.kind.is_empty());
    }
}
