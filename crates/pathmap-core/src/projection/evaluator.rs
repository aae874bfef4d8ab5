//! Projection expression evaluator
//!
//! Evaluation never fails on data: a path that does not resolve yields no
//! value, and members or elements without a value are left out of the
//! enclosing literal. The only runtime error is an expression nested deeper
//! than the configured limit.
//!
//! Copyright (c) 2025 Pathmap Team
//! Licensed under the Apache-2.0 license

use super::ast::*;
use super::error::ProjectionError;
use super::parser::Parser;
use crate::config::{EngineConfig, DEFAULT_MAX_DEPTH};
use crate::Result;
use serde_json::{Map, Number, Value};

/// Query boundary used by the function protocol.
///
/// Implement it to run projections with another engine.
pub trait ProjectionEngine {
    /// Evaluate `expression` against `document`; `None` when nothing resolves
    fn get(&self, document: &Value, expression: &str) -> Result<Option<Value>>;

    /// Whether `path` resolves to a value in `document`
    fn exists(&self, document: &Value, path: &str) -> Result<bool> {
        Ok(self.get(document, path)?.is_some())
    }
}

/// Built-in evaluator for the compiled projection grammar
#[derive(Debug, Clone)]
pub struct Evaluator {
    max_depth: usize,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::with_max_depth(config.max_depth)
    }

    /// Evaluate a parsed expression
    pub fn evaluate(&self, expression: &Expression, document: &Value) -> Result<Option<Value>> {
        let depth = expression.depth();
        if depth > self.max_depth {
            return Err(ProjectionError::execution(
                format!(
                    "Expression nesting of {} exceeds the limit of {}",
                    depth, self.max_depth
                ),
                expression.to_string(),
            )
            .into());
        }
        Ok(eval_expression(expression, document))
    }
}

impl ProjectionEngine for Evaluator {
    fn get(&self, document: &Value, expression: &str) -> Result<Option<Value>> {
        if expression.trim().is_empty() {
            return Ok(None);
        }
        let parsed = Parser::new(expression)?.parse()?;
        self.evaluate(&parsed, document)
    }
}

fn eval_expression(expression: &Expression, value: &Value) -> Option<Value> {
    let (first, rest) = expression.stages.split_first()?;
    let mut current = eval_stage(first, value)?;
    for stage in rest {
        current = eval_stage(stage, &current)?;
    }
    Some(current)
}

fn eval_stage(stage: &Stage, value: &Value) -> Option<Value> {
    match stage {
        Stage::Path(segments) => eval_path(segments, value),
        Stage::Object(members) => {
            let object: Map<String, Value> = members
                .iter()
                .filter_map(|member| {
                    eval_expression(&member.value, value).map(|v| (member.key.clone(), v))
                })
                .collect();
            Some(Value::Object(object))
        }
        Stage::Array(items) => Some(Value::Array(
            items.iter().filter_map(|item| eval_expression(item, value)).collect(),
        )),
    }
}

fn eval_path(segments: &[Segment], value: &Value) -> Option<Value> {
    let Some((segment, rest)) = segments.split_first() else {
        return Some(value.clone());
    };

    match segment {
        Segment::Key(key) => child(value, key).and_then(|child| eval_path(rest, child)),
        Segment::Each => {
            let items = value.as_array()?;
            if rest.is_empty() {
                return Some(Value::from(items.len()));
            }
            Some(Value::Array(
                items.iter().filter_map(|item| eval_path(rest, item)).collect(),
            ))
        }
        Segment::Modifier(Modifier::This) => eval_path(rest, value),
        Segment::Modifier(modifier) => {
            let modified = apply_modifier(*modifier, value)?;
            eval_path(rest, &modified)
        }
    }
}

fn child<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn apply_modifier(modifier: Modifier, value: &Value) -> Option<Value> {
    match modifier {
        Modifier::This => Some(value.clone()),
        Modifier::ToNum => Some(to_num(value)),
        Modifier::ToBool => Some(to_bool(value)),
        Modifier::ToString => Some(to_string(value)),
        Modifier::Flatten => Some(flatten(value)),
        Modifier::Group => group(value),
        Modifier::GroupPlus(levels) => group_plus(levels, value),
    }
}

fn to_num(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(to_num).collect()),
        Value::Number(_) => value.clone(),
        Value::String(text) => parse_number(text),
        Value::Bool(flag) => Value::from(u8::from(*flag)),
        _ => Value::from(0),
    }
}

fn parse_number(text: &str) -> Value {
    let text = text.trim();
    if let Ok(n) = text.parse::<i64>() {
        return Value::from(n);
    }
    if let Ok(n) = text.parse::<u64>() {
        return Value::from(n);
    }
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::from(0))
}

fn to_bool(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(to_bool).collect()),
        Value::Bool(_) => value.clone(),
        Value::String(text) => Value::Bool(matches!(
            text.trim(),
            "1" | "t" | "T" | "true" | "TRUE" | "True"
        )),
        Value::Number(n) => Value::Bool(n.as_f64().is_some_and(|f| f != 0.0)),
        _ => Value::Bool(false),
    }
}

fn to_string(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(to_string).collect()),
        Value::String(_) => value.clone(),
        Value::Null => Value::String(String::new()),
        Value::Number(n) => Value::String(n.to_string()),
        Value::Bool(flag) => Value::String(flag.to_string()),
        Value::Object(_) => Value::String(value.to_string()),
    }
}

fn flatten(value: &Value) -> Value {
    match value {
        Value::Array(items) => {
            let mut flat = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::Array(inner) => flat.extend(inner.iter().cloned()),
                    other => flat.push(other.clone()),
                }
            }
            Value::Array(flat)
        }
        other => other.clone(),
    }
}

/// Zip an object of parallel arrays into an array of objects.
///
/// Members that are not arrays take no part in the zip; an array input is
/// taken as already grouped.
fn group(value: &Value) -> Option<Value> {
    match value {
        Value::Object(map) => Some(Value::Array(
            zip_rows(map).into_iter().map(Value::Object).collect(),
        )),
        Value::Array(_) => Some(value.clone()),
        _ => None,
    }
}

/// Zip the outer axis `levels` times, then [`group`] each innermost row
fn group_plus(levels: usize, value: &Value) -> Option<Value> {
    if levels == 0 {
        return group(value);
    }
    match value {
        Value::Object(map) => Some(Value::Array(
            zip_rows(map)
                .into_iter()
                .filter_map(|row| group_plus(levels - 1, &Value::Object(row)))
                .collect(),
        )),
        Value::Array(_) => Some(value.clone()),
        _ => None,
    }
}

fn zip_rows(map: &Map<String, Value>) -> Vec<Map<String, Value>> {
    let len = map
        .values()
        .filter_map(Value::as_array)
        .map(Vec::len)
        .max()
        .unwrap_or(0);

    (0..len)
        .map(|i| {
            map.iter()
                .filter_map(|(key, column)| {
                    column
                        .as_array()
                        .and_then(|items| items.get(i))
                        .map(|cell| (key.clone(), cell.clone()))
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn get(document: &Value, expression: &str) -> Option<Value> {
        Evaluator::new().get(document, expression).unwrap()
    }

    #[test]
    fn test_plain_paths() {
        let doc = json!({"data": {"pagination": {"index": "2", "size": 20}}, "tags": ["a", "b"]});
        assert_eq!(get(&doc, "data.pagination.size"), Some(json!(20)));
        assert_eq!(get(&doc, "tags.1"), Some(json!("b")));
        assert_eq!(get(&doc, "tags.#"), Some(json!(2)));
        assert_eq!(get(&doc, "data.missing"), None);
        assert_eq!(get(&doc, "@this.data.pagination.index.@tonum"), Some(json!(2)));
        assert_eq!(get(&doc, ""), None);
    }

    #[test]
    fn test_each_drops_missing() {
        let doc = json!([{"id": 1}, {"name": "x"}, {"id": 3}]);
        assert_eq!(get(&doc, "#.id"), Some(json!([1, 3])));
        assert_eq!(get(&json!({"a": 1}), "a.#.id"), None);
    }

    #[test]
    fn test_coercions() {
        assert_eq!(get(&json!("1"), "@this.@tonum"), Some(json!(1)));
        assert_eq!(get(&json!("2.5"), "@this.@tonum"), Some(json!(2.5)));
        assert_eq!(get(&json!("abc"), "@this.@tonum"), Some(json!(0)));
        assert_eq!(get(&json!(true), "@this.@tonum"), Some(json!(1)));
        assert_eq!(get(&json!("true"), "@this.@tobool"), Some(json!(true)));
        assert_eq!(get(&json!("no"), "@this.@tobool"), Some(json!(false)));
        assert_eq!(get(&json!(0), "@this.@tobool"), Some(json!(false)));
        assert_eq!(get(&json!(12), "@this.@tostring"), Some(json!("12")));
        assert_eq!(get(&json!(null), "@this.@tostring"), Some(json!("")));
        assert_eq!(get(&json!({"a": 1}), "@this.@tostring"), Some(json!(r#"{"a":1}"#)));
        assert_eq!(get(&json!([1, 2, 3]), "@this.#.@tostring"), Some(json!(["1", "2", "3"])));
        assert_eq!(get(&json!(["1", "x"]), "@this.@tonum"), Some(json!([1, 0])));
    }

    #[test]
    fn test_object_literal_omits_missing_members() {
        let doc = json!({"user": {"name": "Ann"}});
        assert_eq!(
            get(&doc, "{name:user.name,age:user.age.@tonum,user.name}"),
            Some(json!({"name": "Ann"}))
        );
    }

    #[test]
    fn test_group() {
        let doc = json!([{"name": "a", "userId": "1"}, {"name": "b", "userId": "2"}]);
        assert_eq!(
            get(&doc, "{name:@this.#.name.@tostring,userId:@this.#.userId.@tonum}|@groupPlus:0"),
            Some(json!([{"name": "a", "userId": 1}, {"name": "b", "userId": 2}]))
        );
        assert_eq!(
            get(&doc, "[{name:@this.#.name}|@group]"),
            Some(json!([[{"name": "a"}, {"name": "b"}]]))
        );
    }

    #[test]
    fn test_group_plus_nested() {
        let doc = json!({
            "dataSchemas": [
                {"scene": "list", "request": [{"name": "index"}, {"name": "size"}], "action": {"url": "/list"}},
                {"scene": "add", "request": [{"name": "title"}], "action": {"url": "/add"}}
            ]
        });
        let expression = "{dataSchemas:{scene:dataSchemas.#.scene,\
            request:{name:dataSchemas.#.request.#.name}|@groupPlus:1,\
            action:{url:dataSchemas.#.action.url}|@groupPlus:0}|@groupPlus:0}";
        assert_eq!(
            get(&doc, expression),
            Some(json!({
                "dataSchemas": [
                    {"scene": "list", "request": [{"name": "index"}, {"name": "size"}], "action": {"url": "/list"}},
                    {"scene": "add", "request": [{"name": "title"}], "action": {"url": "/add"}}
                ]
            }))
        );
    }

    #[test]
    fn test_flatten() {
        let doc = json!({"services": [{"servers": [{"name": "dev"}, {"name": "prod"}]}, {"servers": [{"name": "qa"}]}]});
        assert_eq!(
            get(&doc, "services.#.servers.#.name|@flatten"),
            Some(json!(["dev", "prod", "qa"]))
        );
    }

    #[test]
    fn test_depth_limit() {
        let evaluator = Evaluator::with_max_depth(1);
        let result = evaluator.get(&json!({}), "{a:{b:c}}");
        assert!(matches!(
            result,
            Err(crate::Error::Projection {
                source: ProjectionError::Execution { .. }
            })
        ));
        assert!(evaluator.get(&json!({"c": 1}), "{a:c}").is_ok());
    }

    #[test]
    fn test_exists() {
        let evaluator = Evaluator::new();
        let doc = json!({"data": {"items": []}});
        assert!(evaluator.exists(&doc, "data.items").unwrap());
        assert!(!evaluator.exists(&doc, "data.total").unwrap());
    }
}
