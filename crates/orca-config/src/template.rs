//! Template string resolution
//!
//! Strings may embed `${key.path}` expressions that are looked up in a
//! [`TemplateContext`]. A string made of exactly one expression resolves to
//! the referenced value with its type intact; otherwise the referenced values
//! are stringified into the surrounding text. `$${` produces a literal `${`.
//!
//! The process environment is never read during resolution. Callers capture
//! a [`LocalContext`] snapshot once and pass it in.

use crate::{Error, Result};
use orca_fs::NormalizedPath;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

/// Snapshot of the local machine exposed under `local.*`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalContext {
    pub env: BTreeMap<String, String>,
    pub platform: String,
    pub username: Option<String>,
}

impl LocalContext {
    pub fn new(env: BTreeMap<String, String>, platform: impl Into<String>) -> Self {
        Self {
            env,
            platform: platform.into(),
            username: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Capture the current process environment, platform and user.
    pub fn capture() -> Self {
        let env: BTreeMap<String, String> = std::env::vars().collect();
        let username = env
            .get("USER")
            .or_else(|| env.get("USERNAME"))
            .cloned();
        Self {
            env,
            platform: std::env::consts::OS.to_string(),
            username,
        }
    }

    /// The `local` template namespace for a project rooted at `project_root`.
    pub fn to_value(&self, project_root: &NormalizedPath) -> Value {
        json!({
            "env": self.env,
            "platform": self.platform,
            "username": self.username,
            "projectPath": project_root.as_str(),
        })
    }
}

/// Values available to template expressions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateContext {
    root: Map<String, Value>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for project-level fields: `local.*` and `project.name`.
    pub fn for_project(project_name: &str, project_root: &NormalizedPath, local: &LocalContext) -> Self {
        Self::new()
            .with("local", local.to_value(project_root))
            .with("project", json!({ "name": project_name }))
    }

    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.root.insert(key.into(), value);
    }

    /// Look up a dotted key path.
    pub fn lookup(&self, expression: &str) -> Result<&Value> {
        let segments = parse_expression(expression)?;
        let mut current: Option<&Value> = None;

        for (index, segment) in segments.iter().enumerate() {
            let map = match current {
                None => Some(&self.root),
                Some(value) => value.as_object(),
            };
            let found = map.and_then(|m| m.get(*segment));
            match found {
                Some(value) => current = Some(value),
                None => {
                    let mut message = format!(
                        "Invalid template string ${{{expression}}}: could not find key {segment}"
                    );
                    if index > 0 {
                        message.push_str(&format!(" under {}", segments[..index].join(".")));
                    }
                    if let Some(m) = map {
                        let available: Vec<&str> = m.keys().map(String::as_str).collect();
                        if !available.is_empty() {
                            message.push_str(&format!(". Available keys: {}", available.join(", ")));
                        }
                    }
                    return Err(Error::configuration(message));
                }
            }
        }

        // parse_expression never yields an empty path
        current.ok_or_else(|| Error::configuration(format!("Empty template expression ${{{expression}}}")))
    }

    /// Resolve every template string inside `value`.
    pub fn resolve_value(&self, value: &Value) -> Result<Value> {
        match value {
            Value::String(s) => self.resolve_string(s),
            Value::Array(items) => items
                .iter()
                .map(|item| self.resolve_value(item))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Value::Object(map) => {
                let mut out = Map::new();
                for (key, v) in map {
                    out.insert(key.clone(), self.resolve_value(v)?);
                }
                Ok(Value::Object(out))
            }
            other => Ok(other.clone()),
        }
    }

    /// Resolve a single string.
    pub fn resolve_string(&self, input: &str) -> Result<Value> {
        let parts = tokenize(input)?;

        if let [Part::Expression(expression)] = parts.as_slice() {
            return self.lookup(expression).cloned();
        }

        let mut output = String::with_capacity(input.len());
        for part in parts {
            match part {
                Part::Literal(text) => output.push_str(&text),
                Part::Expression(expression) => {
                    output.push_str(&stringify(self.lookup(&expression)?));
                }
            }
        }
        Ok(Value::String(output))
    }
}

/// Names of providers referenced as `${providers.<name>...}` anywhere in
/// `value`, in first-seen order.
///
/// Malformed strings are skipped here; they fail later during resolution.
pub fn referenced_providers(value: &Value) -> Vec<String> {
    let mut names = Vec::new();
    collect_provider_refs(value, &mut names);
    names
}

fn collect_provider_refs(value: &Value, names: &mut Vec<String>) {
    match value {
        Value::String(s) => {
            let Ok(parts) = tokenize(s) else {
                return;
            };
            for part in parts {
                let Part::Expression(expression) = part else {
                    continue;
                };
                let Ok(segments) = parse_expression(&expression) else {
                    continue;
                };
                if let ["providers", name, ..] = segments.as_slice() {
                    if !names.iter().any(|n| n == name) {
                        names.push((*name).to_string());
                    }
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|item| collect_provider_refs(item, names)),
        Value::Object(map) => map.values().for_each(|v| collect_provider_refs(v, names)),
        _ => {}
    }
}

#[derive(Debug, PartialEq)]
enum Part {
    Literal(String),
    Expression(String),
}

fn tokenize(input: &str) -> Result<Vec<Part>> {
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        // `$${` escapes the expression
        if start > 0 && rest.as_bytes()[start - 1] == b'$' {
            literal.push_str(&rest[..start - 1]);
            literal.push_str("${");
            rest = &rest[start + 2..];
            continue;
        }

        literal.push_str(&rest[..start]);
        let Some(end) = rest[start..].find('}') else {
            return Err(Error::configuration(format!(
                "Unterminated template string in '{input}'"
            )));
        };

        if !literal.is_empty() {
            parts.push(Part::Literal(std::mem::take(&mut literal)));
        }
        parts.push(Part::Expression(rest[start + 2..start + end].trim().to_string()));
        rest = &rest[start + end + 1..];
    }

    literal.push_str(rest);
    if !literal.is_empty() || parts.is_empty() {
        parts.push(Part::Literal(literal));
    }
    Ok(parts)
}

fn parse_expression(expression: &str) -> Result<Vec<&str>> {
    let segments: Vec<&str> = expression.split('.').map(str::trim).collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(Error::configuration(format!(
            "Invalid template string ${{{expression}}}: empty key segment"
        )));
    }
    Ok(segments)
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
