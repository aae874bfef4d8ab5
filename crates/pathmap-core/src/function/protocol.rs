//! Selection and invocation of transfer functions
//!
//! A function is a candidate for a set of target destination paths when one
//! of its output rules writes one of those paths. A candidate is selected
//! once every destination path of its input rules exists in the data.
//!
//! Invoking a function narrows the input document to the function's local
//! argument shape, hands it to a caller-supplied callback, maps the callback
//! output back onto the global destination paths and merge-patches the
//! result into the input document.
//!
//! Copyright (c) 2025 Pathmap Team
//! Licensed under the Apache-2.0 license

use crate::config::EngineConfig;
use crate::merge::merge_patch;
use crate::path::{join_path, modifiers, Direction, Path, FUNC_NAMESPACE};
use crate::projection::{Evaluator, ProjectionCompiler, ProjectionEngine};
use crate::transfer::Transfers;
use crate::{Error, Result};
use log::{debug, trace};
use serde_json::{Map, Value};

/// Runs the function protocol with a compiler and a projection engine
#[derive(Debug, Clone)]
pub struct Invoker<E = Evaluator> {
    compiler: ProjectionCompiler,
    engine: E,
}

impl Default for Invoker<Evaluator> {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl Invoker<Evaluator> {
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_engine(config, Evaluator::from_config(config))
    }
}

impl<E: ProjectionEngine> Invoker<E> {
    /// Use `engine` instead of the built-in evaluator
    pub fn with_engine(config: &EngineConfig, engine: E) -> Self {
        Self {
            compiler: ProjectionCompiler::from_config(config),
            engine,
        }
    }

    /// Pick the function that produces `targets` from `data`.
    ///
    /// Returns the function name without the `func.` prefix, or `None` when
    /// no function writes any of the targets.
    pub fn select_function<P: AsRef<str>>(
        &self,
        transfers: &Transfers,
        data: &[u8],
        targets: &[P],
    ) -> Result<Option<String>> {
        let document: Value = serde_json::from_slice(data)?;
        self.select_in(transfers, &document, targets)
    }

    fn select_in<P: AsRef<str>>(
        &self,
        transfers: &Transfers,
        document: &Value,
        targets: &[P],
    ) -> Result<Option<String>> {
        let func_rules = transfers.get_by_namespace(FUNC_NAMESPACE);
        let candidates = discover_candidates(&func_rules, targets);
        if candidates.is_empty() {
            debug!("no transfer function writes the requested targets");
            return Ok(None);
        }
        debug!("candidate transfer functions: {}", candidates.join(","));

        for candidate in &candidates {
            let inputs = func_rules.get_by_namespace(join_path([candidate.as_str(), Direction::Input.token()]).as_str());
            if self.missing_input(&inputs, document)?.is_none() {
                let name = candidate.strip_prefix(FUNC_NAMESPACE).unwrap_or(candidate.as_str());
                debug!("selected transfer function {}", name);
                return Ok(Some(name.to_string()));
            }
        }

        Err(Error::FunctionNotFound {
            candidates,
            targets: targets.iter().map(|t| t.as_ref().to_string()).collect(),
            input: document.to_string(),
        })
    }

    /// Invoke the first function named by `transfers` on `input`
    pub fn call_transfer_func<F, CE>(&self, transfers: &Transfers, input: &[u8], callback: F) -> Result<Vec<u8>>
    where
        F: FnOnce(&str, &[u8]) -> std::result::Result<Vec<u8>, CE>,
        CE: Into<anyhow::Error>,
    {
        let func_rules = transfers.get_by_namespace(FUNC_NAMESPACE);
        let Some(call_func) = func_rules.call_funcs()?.first().cloned() else {
            debug!("no transfer function in rule set");
            return Ok(input.to_vec());
        };
        let document: Value = serde_json::from_slice(input)?;
        self.invoke(&func_rules, &call_func.namespace(), document, callback)
    }

    /// Select the function producing `targets`, then invoke it.
    ///
    /// The input is returned unchanged when no function writes the targets.
    pub fn call_transfer_func_for<P, F, CE>(
        &self,
        transfers: &Transfers,
        input: &[u8],
        targets: &[P],
        callback: F,
    ) -> Result<Vec<u8>>
    where
        P: AsRef<str>,
        F: FnOnce(&str, &[u8]) -> std::result::Result<Vec<u8>, CE>,
        CE: Into<anyhow::Error>,
    {
        let document: Value = serde_json::from_slice(input)?;
        match self.select_in(transfers, &document, targets)? {
            Some(name) => {
                let func_rules = transfers.get_by_namespace(FUNC_NAMESPACE);
                let namespace = format!("{}{}", FUNC_NAMESPACE, name);
                self.invoke(&func_rules, &namespace, document, callback)
            }
            None => Ok(input.to_vec()),
        }
    }

    fn invoke<F, CE>(&self, func_rules: &Transfers, namespace: &str, document: Value, callback: F) -> Result<Vec<u8>>
    where
        F: FnOnce(&str, &[u8]) -> std::result::Result<Vec<u8>, CE>,
        CE: Into<anyhow::Error>,
    {
        let name = namespace.strip_prefix(FUNC_NAMESPACE).unwrap_or(namespace);
        let (inputs, outputs) = func_rules.get_by_namespace(namespace).split_in_out();

        if let Some(path) = self.missing_input(&inputs, &document)? {
            return Err(Error::MissingArgument {
                function: name.to_string(),
                path: path.to_string(),
            });
        }

        let trim_input = modifiers::trim_prefix(format!("{}{}", namespace, Direction::Input.marker()));
        let extraction = self.compiler.compile(&inputs.reverse().modify_dst_path(&[&trim_input]));
        let trim_output = modifiers::trim_prefix(format!("{}{}", namespace, Direction::Output.marker()));
        let merge_back = self.compiler.compile(&outputs.modify_src_path(&[&trim_output]));
        trace!("{} extraction: {}", name, extraction);
        trace!("{} merge-back: {}", name, merge_back);

        let payload = self
            .engine
            .get(&document, &extraction)?
            .unwrap_or_else(|| Value::Object(Map::new()));
        let payload = serde_json::to_vec(&payload)?;

        debug!("invoking transfer function {}", name);
        let output = callback(name, &payload).map_err(|e| Error::Callback {
            function: name.to_string(),
            source: e.into(),
        })?;
        let output: Value = serde_json::from_slice(&output)?;

        let mut merged = document;
        if let Some(patch) = self.engine.get(&output, &merge_back)? {
            merge_patch(&mut merged, &patch);
        }
        Ok(serde_json::to_vec(&merged)?)
    }

    /// First input destination path absent from `document`
    fn missing_input<'t>(&self, inputs: &'t Transfers, document: &Value) -> Result<Option<&'t Path>> {
        for rule in inputs {
            if !self.engine.exists(document, rule.dst.path.as_str())? {
                return Ok(Some(&rule.dst.path));
            }
        }
        Ok(None)
    }
}

/// Namespaces of functions whose output rules write one of `targets`,
/// ordered by target and then by rule
fn discover_candidates<P: AsRef<str>>(func_rules: &Transfers, targets: &[P]) -> Vec<String> {
    let produced = func_rules.get_all_dst();
    let mut writers = Transfers::new();
    for target in targets {
        let target = Path::from(target.as_ref());
        if !produced.iter().any(|dst| dst.eq_ignore_case(&target)) {
            continue;
        }
        writers.extend_replace(
            func_rules
                .iter()
                .filter(|rule| rule.is_out() && rule.dst.path.eq_ignore_case(&target))
                .cloned(),
        );
    }
    writers.get_src_namespace(Direction::Output.marker())
}

/// Complete rule slices of the functions that write any destination of
/// `working`
pub fn filter_func_transfers(all: &Transfers, working: &Transfers) -> Transfers {
    let func_rules = all.get_by_namespace(FUNC_NAMESPACE);
    let candidates = discover_candidates(&func_rules, &working.get_all_dst());

    let mut slice = Transfers::new();
    for candidate in &candidates {
        slice.extend_replace(func_rules.get_by_namespace(candidate));
    }
    slice
}

/// [`Invoker::select_function`] with the default configuration
pub fn select_function<P: AsRef<str>>(transfers: &Transfers, data: &[u8], targets: &[P]) -> Result<Option<String>> {
    Invoker::default().select_function(transfers, data, targets)
}

/// [`Invoker::call_transfer_func`] with the default configuration
pub fn call_transfer_func<F, CE>(transfers: &Transfers, input: &[u8], callback: F) -> Result<Vec<u8>>
where
    F: FnOnce(&str, &[u8]) -> std::result::Result<Vec<u8>, CE>,
    CE: Into<anyhow::Error>,
{
    Invoker::default().call_transfer_func(transfers, input, callback)
}

/// [`Invoker::call_transfer_func_for`] with the default configuration
pub fn call_transfer_func_for<P, F, CE>(
    transfers: &Transfers,
    input: &[u8],
    targets: &[P],
    callback: F,
) -> Result<Vec<u8>>
where
    P: AsRef<str>,
    F: FnOnce(&str, &[u8]) -> std::result::Result<Vec<u8>, CE>,
    CE: Into<anyhow::Error>,
{
    Invoker::default().call_transfer_func_for(transfers, input, targets, callback)
}
