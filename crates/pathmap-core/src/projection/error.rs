//! Error types for projection expressions
//!
//! Copyright (c) 2025 Pathmap Team
//! Licensed under the Apache-2.0 license

use thiserror::Error;

/// Errors raised while parsing or evaluating a projection expression
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    /// Malformed expression text
    #[error("Parse error at position {position}: {message}")]
    Parse {
        message: String,
        position: usize,
        input: String,
    },

    /// A token other than the expected one was found
    #[error("Syntax error at position {position}: {message} (expected {}, found {found})", .expected.join(" or "))]
    Syntax {
        message: String,
        position: usize,
        input: String,
        expected: Vec<String>,
        found: String,
    },

    /// `@name` that the evaluator does not implement
    #[error("Unknown modifier @{name} at position {position}")]
    UnknownModifier { name: String, position: usize },

    /// Runtime evaluation failure
    #[error("Execution error: {message}")]
    Execution { message: String, expression: String },
}

impl ProjectionError {
    pub fn parse(message: impl Into<String>, position: usize, input: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            position,
            input: input.into(),
        }
    }

    pub fn syntax(
        message: impl Into<String>,
        position: usize,
        input: impl Into<String>,
        expected: Vec<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::Syntax {
            message: message.into(),
            position,
            input: input.into(),
            expected,
            found: found.into(),
        }
    }

    pub fn unknown_modifier(name: impl Into<String>, position: usize) -> Self {
        Self::UnknownModifier {
            name: name.into(),
            position,
        }
    }

    pub fn execution(message: impl Into<String>, expression: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
            expression: expression.into(),
        }
    }

    /// Error message with a caret under the failing position, when known
    pub fn detailed_message(&self) -> String {
        match self {
            Self::Parse { position, input, .. } | Self::Syntax { position, input, .. } => {
                let mut result = self.to_string();
                if !input.is_empty() {
                    result.push_str(&format!("\nInput: {}", input));
                    if *position <= input.len() {
                        result.push_str(&format!("\n       {}^", " ".repeat(*position)));
                    }
                }
                result
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detailed_message_points_at_position() {
        let err = ProjectionError::parse("Unclosed object literal", 4, "{a:b");
        let message = err.detailed_message();
        assert!(message.starts_with("Parse error at position 4: Unclosed object literal"));
        let caret = format!("\n{}^", " ".repeat(7 + 4));
        assert!(message.ends_with(&caret));
    }

    #[test]
    fn test_syntax_error_lists_expected_tokens() {
        let err = ProjectionError::syntax(
            "Unexpected character",
            2,
            "a:b",
            vec!["'|'".to_string(), "end of input".to_string()],
            ":",
        );
        assert_eq!(
            err.to_string(),
            "Syntax error at position 2: Unexpected character (expected '|' or end of input, found :)"
        );
    }
}
