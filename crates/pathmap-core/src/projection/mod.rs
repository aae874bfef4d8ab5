//! Projection expressions: compilation and evaluation
//!
//! A projection is a single expression that reshapes one JSON document into
//! another. [`ProjectionCompiler`] produces it from a rule set and
//! [`Evaluator`] runs it.
//!
//! ```text
//! {name:@this.#.name.@tostring,userId:@this.#.userId.@tonum}|@groupPlus:0
//! ```
//!
//! # Module Organization
//!
//! - [`compiler`] - rule set → expression
//! - [`tree`] - ordered destination tree used by the compiler
//! - [`ast`] / [`parser`] - expression syntax
//! - [`evaluator`] - [`ProjectionEngine`] boundary and built-in engine
//! - [`error`] - parse and execution errors
//!
//! Copyright (c) 2025 Pathmap Team
//! Licensed under the Apache-2.0 license

pub mod ast;
pub mod compiler;
pub mod error;
pub mod evaluator;
pub mod parser;
pub mod tree;

#[cfg(test)]
mod tests;

pub use ast::{Expression, Modifier, Segment, Stage};
pub use compiler::ProjectionCompiler;
pub use error::ProjectionError;
pub use evaluator::{Evaluator, ProjectionEngine};
pub use parser::Parser;

use crate::Result;
use serde_json::Value;

/// A parsed projection expression, reusable across documents
#[derive(Debug, Clone)]
pub struct Projection {
    expression: Expression,
}

impl Projection {
    pub fn parse(expression: &str) -> Result<Self> {
        let expression = Parser::new(expression)?.parse()?;
        Ok(Self { expression })
    }

    /// Evaluate with the default [`Evaluator`]
    pub fn apply(&self, document: &Value) -> Result<Option<Value>> {
        Evaluator::new().evaluate(&self.expression, document)
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }
}

impl std::fmt::Display for Projection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.expression)
    }
}

/// Evaluate `expression` against `document` with the default evaluator
pub fn get(document: &Value, expression: &str) -> Result<Option<Value>> {
    Evaluator::new().get(document, expression)
}

/// Whether `path` resolves in `document`
pub fn exists(document: &Value, path: &str) -> Result<bool> {
    Evaluator::new().exists(document, path)
}
