//! Function parameters embedded in mapping rules
//!
//! A rule side in the `func.` namespace names one argument of a callable
//! transform:
//!
//! ```text
//! func.[<package>.]<funcName>.(input|output).<argPath>[@type]
//! ```
//!
//! Parameters are collected into [`FuncParameters`] and grouped into one
//! [`CallFunc`] per function. The [`protocol`] module selects and invokes
//! those functions against live data.
//!
//! Copyright (c) 2025 Pathmap Team
//! Licensed under the Apache-2.0 license

pub mod protocol;


pub use protocol::{
    call_transfer_func, call_transfer_func_for, filter_func_transfers, select_function, Invoker,
};

use crate::path::{join_path, split_type, Direction, Path, ARRAY_MARKER, FUNC_NAMESPACE};
use crate::transfer::{TransferUnit, Transfers};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Type forced on an argument whose path continues past its first segment
pub const OBJECT_TYPE: &str = "object";

/// Type forced on an argument whose name ends with `#`
pub const ARRAY_TYPE: &str = "array";

/// One argument of a transfer function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuncParameter {
    pub direction: Direction,
    pub package: String,
    #[serde(rename = "funcName")]
    pub func_name: String,
    pub name: String,
    /// Canonical `func.<funcName>.<direction>.<name>`
    pub path: Path,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FuncParameter {
    /// Interpret a function path, including an optional trailing `@type`
    pub fn explain(func_path: &str) -> Result<Self> {
        let (path, kind) = split_type(func_path);
        Self::from_path(&Path::from(path), kind)
    }

    /// Interpret `path` with `kind` as the explicitly declared type
    pub fn from_path(path: &Path, kind: &str) -> Result<Self> {
        if !path.has_namespace(FUNC_NAMESPACE) {
            return Err(Error::NotFunctionPath {
                path: path.to_string(),
                prefix: FUNC_NAMESPACE.to_string(),
            });
        }

        let Some((direction, at)) = Direction::locate(path.as_str()) else {
            return Err(Error::DirectionMissing {
                path: path.to_string(),
                expected: format!("{}[package.]funcName.(input|output).argName", FUNC_NAMESPACE),
            });
        };

        let text = path.as_str();
        let identity = text.get(FUNC_NAMESPACE.len()..at).unwrap_or("").trim_matches('.');
        let argument = text[at + direction.marker().len()..].trim_matches('.');

        let (package, func_name) = match identity.rsplit_once('.') {
            Some((package, func_name)) => (package, func_name),
            None => ("", identity),
        };

        let mut name = argument;
        let mut kind = kind.to_string();
        if let Some((first, _)) = name.split_once('.') {
            name = first;
            kind = OBJECT_TYPE.to_string();
        }
        if let Some(stripped) = name.strip_suffix(ARRAY_MARKER) {
            name = stripped;
            kind = ARRAY_TYPE.to_string();
        }

        Ok(Self {
            direction,
            package: package.to_string(),
            func_name: func_name.to_string(),
            name: name.to_string(),
            path: join_path(["func", func_name, direction.token(), name]),
            kind,
        })
    }

    pub fn is_in(&self) -> bool {
        self.direction == Direction::Input
    }

    pub fn is_out(&self) -> bool {
        self.direction == Direction::Output
    }

    /// `package.funcName`, or `funcName` when there is no package
    pub fn qualified_name(&self) -> String {
        qualified_name(&self.package, &self.func_name)
    }

    /// Type as written after `@` in the display form; empty for structural types
    fn displayed_kind(&self) -> &str {
        let structural = self.kind.eq_ignore_ascii_case(OBJECT_TYPE) || self.kind.eq_ignore_ascii_case(ARRAY_TYPE);
        if structural {
            ""
        } else {
            &self.kind
        }
    }

    fn same_parameter(&self, other: &FuncParameter) -> bool {
        self.path.eq_ignore_case(&other.path) && self.displayed_kind().eq_ignore_ascii_case(other.displayed_kind())
    }
}

impl fmt::Display for FuncParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path.as_str())?;
        let kind = self.displayed_kind();
        if !kind.is_empty() {
            write!(f, "@{}", kind)?;
        }
        Ok(())
    }
}

fn qualified_name(package: &str, func_name: &str) -> String {
    if package.is_empty() {
        func_name.to_string()
    } else {
        format!("{}.{}", package, func_name)
    }
}

impl TransferUnit {
    /// Interpret this unit as a function parameter, using its declared type
    pub fn func_parameter(&self) -> Result<FuncParameter> {
        FuncParameter::from_path(&self.path, &self.kind)
    }
}

/// Ordered parameter list, deduplicated on the canonical display form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FuncParameters(Vec<FuncParameter>);

impl FuncParameters {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FuncParameter> {
        self.0.iter()
    }

    /// Insert, replacing a parameter whose display form matches ignoring case
    pub fn add_replace(&mut self, parameter: FuncParameter) {
        match self.0.iter_mut().find(|p| p.same_parameter(&parameter)) {
            Some(existing) => *existing = parameter,
            None => self.0.push(parameter),
        }
    }

    /// Comma-joined parameter names
    pub fn names(&self) -> String {
        self.0.iter().map(|p| p.name.as_str()).collect::<Vec<_>>().join(",")
    }

    pub fn first(&self) -> Option<&FuncParameter> {
        self.0.first()
    }

    pub fn split_in_out(&self) -> (FuncParameters, FuncParameters) {
        let mut input = FuncParameters::new();
        let mut output = FuncParameters::new();
        for parameter in &self.0 {
            if parameter.is_in() {
                input.add_replace(parameter.clone());
            } else {
                output.add_replace(parameter.clone());
            }
        }
        (input, output)
    }

    /// Buckets keyed by [`FuncParameter::qualified_name`], in first-seen order
    pub fn group_by_func_name(&self) -> Vec<(String, FuncParameters)> {
        let mut groups: Vec<(String, FuncParameters)> = Vec::new();
        for parameter in &self.0 {
            let key = parameter.qualified_name();
            match groups.iter_mut().find(|(name, _)| *name == key) {
                Some((_, bucket)) => bucket.add_replace(parameter.clone()),
                None => {
                    let mut bucket = FuncParameters::new();
                    bucket.add_replace(parameter.clone());
                    groups.push((key, bucket));
                }
            }
        }
        groups
    }

    /// One descriptor per function
    pub fn call_funcs(&self) -> CallFuncs {
        self.group_by_func_name()
            .into_iter()
            .filter_map(|(_, parameters)| {
                let first = parameters.first()?;
                let (input, output) = parameters.split_in_out();
                Some(CallFunc {
                    package: first.package.clone(),
                    func_name: first.func_name.clone(),
                    input,
                    output,
                })
            })
            .collect()
    }
}

impl FromIterator<FuncParameter> for FuncParameters {
    fn from_iter<I: IntoIterator<Item = FuncParameter>>(iter: I) -> Self {
        let mut parameters = FuncParameters::new();
        for parameter in iter {
            parameters.add_replace(parameter);
        }
        parameters
    }
}

impl<'a> IntoIterator for &'a FuncParameters {
    type Item = &'a FuncParameter;
    type IntoIter = std::slice::Iter<'a, FuncParameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A callable function with its input and output parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallFunc {
    pub package: String,
    #[serde(rename = "funcName")]
    pub func_name: String,
    pub input: FuncParameters,
    pub output: FuncParameters,
}

impl CallFunc {
    /// `package.funcName`, or `funcName` when there is no package
    pub fn qualified_name(&self) -> String {
        qualified_name(&self.package, &self.func_name)
    }

    /// Rule namespace of this function, `func.<qualified name>`
    pub fn namespace(&self) -> String {
        format!("{}{}", FUNC_NAMESPACE, self.qualified_name())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallFuncs(Vec<CallFunc>);

impl CallFuncs {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CallFunc> {
        self.0.iter()
    }

    pub fn first(&self) -> Option<&CallFunc> {
        self.0.first()
    }

    /// Package of the first function
    pub fn first_package(&self) -> Option<&str> {
        self.0.first().map(|f| f.package.as_str())
    }
}

impl FromIterator<CallFunc> for CallFuncs {
    fn from_iter<I: IntoIterator<Item = CallFunc>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Transfers {
    /// Function parameters named on the source side of the rules.
    ///
    /// Rules outside the `func.` namespace, or without a direction, are
    /// skipped.
    pub fn func_parameters(&self) -> Result<FuncParameters> {
        let mut parameters = FuncParameters::new();
        for transfer in self {
            match transfer.src.func_parameter() {
                Ok(parameter) => parameters.add_replace(parameter),
                Err(err) if err.is_skippable() => {
                    log::debug!("skipping non-function rule {}: {}", transfer, err);
                }
                Err(err) => return Err(err),
            }
        }
        Ok(parameters)
    }

    /// Function descriptors in discovery order
    pub fn call_funcs(&self) -> Result<CallFuncs> {
        Ok(self.func_parameters()?.call_funcs())
    }
}
