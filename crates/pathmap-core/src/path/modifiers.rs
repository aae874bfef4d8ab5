//! Path rewriting functions for `Transfers::modify_src_path` and
//! `Transfers::modify_dst_path`
//!
//! Case conversions leave the `#` segment untouched.

use super::{Path, ARRAY_MARKER};
use regex::Regex;
use std::sync::OnceLock;

static LOWER_UPPER: OnceLock<Regex> = OnceLock::new();
static ACRONYM: OnceLock<Regex> = OnceLock::new();
static SEPARATORS: OnceLock<Regex> = OnceLock::new();

fn lower_upper() -> &'static Regex {
    LOWER_UPPER.get_or_init(|| Regex::new(r"([a-z0-9])([A-Z])").expect("valid regex"))
}

fn acronym() -> &'static Regex {
    ACRONYM.get_or_init(|| Regex::new(r"([A-Z]+)([A-Z][a-z])").expect("valid regex"))
}

fn separators() -> &'static Regex {
    SEPARATORS.get_or_init(|| Regex::new(r"[_\-\s]+").expect("valid regex"))
}

fn map_segments(path: &Path, f: impl Fn(&str) -> String) -> Path {
    let segments: Vec<String> = path
        .segments()
        .map(|segment| if segment == ARRAY_MARKER { segment.to_string() } else { f(segment) })
        .collect();
    Path::new(segments.join("."))
}

fn camel_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for (i, word) in separators().split(segment).filter(|w| !w.is_empty()).enumerate() {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            if i == 0 {
                out.extend(first.to_lowercase());
            } else {
                out.extend(first.to_uppercase());
            }
            out.push_str(chars.as_str());
        }
    }
    out
}

fn snake_segment(segment: &str) -> String {
    let spaced = acronym().replace_all(segment, "${1}_${2}");
    let spaced = lower_upper().replace_all(&spaced, "${1}_${2}");
    separators().replace_all(&spaced, "_").to_lowercase()
}

/// `user_id.created_at` → `userId.createdAt`
pub fn small_camel_case(path: &Path) -> Path {
    map_segments(path, camel_segment)
}

/// `userId.CreatedAt` → `user_id.created_at`
pub fn snake_case(path: &Path) -> Path {
    map_segments(path, snake_segment)
}

pub fn lower(path: &Path) -> Path {
    Path::new(path.as_str().to_lowercase())
}

/// Append a `.@tostring` coercion
pub fn to_string_suffix(path: &Path) -> Path {
    Path::new(format!("{}.@tostring", path))
}

/// Build a modifier that removes `prefix` (and one following dot)
pub fn trim_prefix(prefix: impl Into<String>) -> impl Fn(&Path) -> Path {
    let prefix = prefix.into();
    move |path: &Path| path.trim_namespace(&prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_modifiers() {
        let path = Path::from("user_info.#.created_at");
        assert_eq!(small_camel_case(&path), "userInfo.#.createdAt");

        let path = Path::from("UserInfo.#.createdAt.HTTPServer");
        assert_eq!(snake_case(&path), "user_info.#.created_at.http_server");

        assert_eq!(lower(&Path::from("A.B")), "a.b");
        assert_eq!(to_string_suffix(&Path::from("a.b")), "a.b.@tostring");
    }

    #[test]
    fn test_trim_prefix_modifier() {
        let trim = trim_prefix("func.SetLimit.output");
        assert_eq!(trim(&Path::from("func.SetLimit.output.offset")), "offset");
    }
}
