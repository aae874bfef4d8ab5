//! Pathmap Core - Path-mapping compiler and function-transfer engine
//!
//! This crate turns declarative field-mapping rules into a single projection
//! expression that reshapes one JSON document into another, and runs
//! caller-supplied transfer functions whose arguments and results are
//! described by the same rules.
//!
//! # Main Components
//!
//! - **Rules**: [`Transfer`] / [`Transfers`] and the line-oriented [`parse`]
//! - **Projection**: [`ProjectionCompiler`] builds expressions and
//!   [`Evaluator`] runs them behind the [`ProjectionEngine`] trait
//! - **Functions**: [`FuncParameter`] and [`CallFunc`] describe transfer
//!   functions; [`Invoker`] selects and calls them
//! - **Error Handling**: [`Error`] built with `thiserror`, callback failures
//!   carried as `anyhow::Error`
//! - **Configuration**: [`EngineConfig`] loaded from JSON or YAML
//!
//! # Example
//!
//! ```
//! use pathmap_core::{parse, Result};
//! use serde_json::json;
//!
//! fn example() -> Result<()> {
//!     let rules = parse("@this.#.name:#.name@string\n@this.#.userId:#.userId@int");
//!     let projection = rules.to_projection();
//!     let users = json!([{"name": "Ann", "userId": "1"}]);
//!     let shaped = pathmap_core::projection::get(&users, &projection)?;
//!     assert_eq!(shaped, Some(json!([{"name": "Ann", "userId": 1}])));
//!     Ok(())
//! }
//! # example().unwrap();
//! ```
//!
//! Copyright (c) 2025 Pathmap Team
//! Licensed under the Apache-2.0 license

pub mod config;
pub mod error;
pub mod function;
pub mod merge;
pub mod path;
pub mod projection;
pub mod transfer;

// Re-export main types for convenience
pub use config::EngineConfig;
pub use error::{Error, Result};
pub use path::{Direction, Path};
pub use transfer::{parse, Transfer, TransferType, TransferTypes, TransferUnit, Transfers};

pub use projection::{Evaluator, Projection, ProjectionCompiler, ProjectionEngine, ProjectionError};

pub use function::{
    call_transfer_func, call_transfer_func_for, filter_func_transfers, select_function, CallFunc, CallFuncs,
    FuncParameter, FuncParameters, Invoker,
};

pub use merge::{merge_patch, merge_patch_bytes};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
