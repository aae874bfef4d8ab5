//! Syntax tree for projection expressions
//!
//! An expression is a pipeline of stages separated by `|`. Each stage is a
//! dotted path, an object literal or an array literal and receives the value
//! produced by the previous stage.
//!
//! Copyright (c) 2025 Pathmap Team
//! Licensed under the Apache-2.0 license

use std::fmt;

/// A parsed projection expression
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub stages: Vec<Stage>,
}

/// One `|`-separated component of a pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// Dotted path such as `data.items.#.id.@tonum`
    Path(Vec<Segment>),
    /// `{key:expr,...}`
    Object(Vec<Member>),
    /// `[expr,...]`
    Array(Vec<Expression>),
}

/// Keyed member of an object literal
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub key: String,
    pub value: Expression,
}

/// One segment of a dotted path
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Object key; a numeric key also indexes arrays
    Key(String),
    /// `#`: element count when last, otherwise maps the rest over elements
    Each,
    Modifier(Modifier),
}

/// Built-in `@` modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    This,
    ToNum,
    ToBool,
    ToString,
    Flatten,
    Group,
    /// Zip `n` nested array levels before the final group
    GroupPlus(usize),
}

impl Modifier {
    /// Resolve a modifier name and its optional `:argument`
    pub fn from_name(name: &str, argument: Option<usize>) -> Option<Self> {
        let modifier = match (name, argument) {
            ("this", None) => Modifier::This,
            ("tonum", None) => Modifier::ToNum,
            ("tobool", None) => Modifier::ToBool,
            ("tostring", None) => Modifier::ToString,
            ("flatten", None) => Modifier::Flatten,
            ("group", None) => Modifier::Group,
            ("groupPlus", Some(levels)) => Modifier::GroupPlus(levels),
            ("groupPlus", None) => Modifier::GroupPlus(0),
            _ => return None,
        };
        Some(modifier)
    }
}

impl Expression {
    pub fn new(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    /// Nesting depth of literals inside this expression
    pub fn depth(&self) -> usize {
        self.stages.iter().map(Stage::depth).max().unwrap_or(0)
    }
}

impl Stage {
    fn depth(&self) -> usize {
        match self {
            Stage::Path(_) => 0,
            Stage::Object(members) => {
                1 + members.iter().map(|m| m.value.depth()).max().unwrap_or(0)
            }
            Stage::Array(items) => 1 + items.iter().map(Expression::depth).max().unwrap_or(0),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, stage) in self.stages.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            write!(f, "{}", stage)?;
        }
        Ok(())
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Path(segments) => {
                for (i, segment) in segments.iter().enumerate() {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    write!(f, "{}", segment)?;
                }
                Ok(())
            }
            Stage::Object(members) => {
                f.write_str("{")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}:{}", member.key, member.value)?;
                }
                f.write_str("}")
            }
            Stage::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => f.write_str(key),
            Segment::Each => f.write_str("#"),
            Segment::Modifier(modifier) => write!(f, "{}", modifier),
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modifier::This => f.write_str("@this"),
            Modifier::ToNum => f.write_str("@tonum"),
            Modifier::ToBool => f.write_str("@tobool"),
            Modifier::ToString => f.write_str("@tostring"),
            Modifier::Flatten => f.write_str("@flatten"),
            Modifier::Group => f.write_str("@group"),
            Modifier::GroupPlus(levels) => write!(f, "@groupPlus:{}", levels),
        }
    }
}
