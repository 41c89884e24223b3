//! Structural validation for configuration values
//!
//! A `ConfigSchema` describes the keys an object may carry, their types and
//! defaults. Validation returns a new value with defaults filled in; the
//! input is never modified. Failures are reported as configuration errors
//! naming the context and the key path, with array elements addressed by
//! index (`.environments[1].namespacing`).

use crate::project::DEFAULT_PROJECT_VARFILE;
use crate::{Error, Result};
use serde_json::{Map, Value, json};

/// Expected type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Any,
    String,
    Boolean,
    Number,
    Integer,
    Array,
    Object,
}

impl FieldType {
    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::Any => true,
            Self::String => value.is_string(),
            Self::Boolean => value.is_boolean(),
            Self::Number => value.is_number(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Self::Any => "any value",
            Self::String => "a string",
            Self::Boolean => "a boolean",
            Self::Number => "a number",
            Self::Integer => "an integer",
            Self::Array => "an array",
            Self::Object => "an object",
        }
    }
}

/// A single key in a [`ConfigSchema`].
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub kind: FieldType,
    pub required: bool,
    pub default: Option<Value>,
    /// Schema for the keys of an object-typed field.
    pub nested: Option<ConfigSchema>,
    /// Schema every element of an array-typed field must match.
    pub items: Option<ConfigSchema>,
    /// The only values the field may take.
    pub allowed: Option<Vec<Value>>,
}

impl Field {
    pub fn new(kind: FieldType) -> Self {
        Self {
            kind,
            required: false,
            default: None,
            nested: None,
            items: None,
            allowed: None,
        }
    }

    pub fn string() -> Self {
        Self::new(FieldType::String)
    }

    pub fn boolean() -> Self {
        Self::new(FieldType::Boolean)
    }

    pub fn array() -> Self {
        Self::new(FieldType::Array)
    }

    pub fn any() -> Self {
        Self::new(FieldType::Any)
    }

    pub fn object(schema: ConfigSchema) -> Self {
        Self {
            nested: Some(schema),
            ..Self::new(FieldType::Object)
        }
    }

    /// An array whose elements are objects matching `schema`.
    pub fn array_of(schema: ConfigSchema) -> Self {
        Self {
            items: Some(schema),
            ..Self::new(FieldType::Array)
        }
    }

    /// A string restricted to `values`.
    pub fn one_of(values: &[&str]) -> Self {
        Self {
            allowed: Some(values.iter().map(|v| json!(v)).collect()),
            ..Self::string()
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }
}

/// An ordered set of fields describing an object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigSchema {
    fields: Vec<(String, Field)>,
    allow_unknown: bool,
}

impl ConfigSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schema carrying the keys every provider config has.
    pub fn provider() -> Self {
        Self::new()
            .field("name", Field::string().required())
            .field("environments", Field::array())
    }

    /// Schema of a project document.
    ///
    /// Unknown top-level keys are kept so documents can carry extra metadata.
    pub fn project() -> Self {
        Self::new()
            .field("name", Field::string().required())
            .field("defaultEnvironment", Field::string())
            .field(
                "environments",
                Field::array_of(Self::environment()).default_value(json!([])),
            )
            .field(
                "providers",
                Field::array_of(Self::provider().allow_unknown(true)).default_value(json!([])),
            )
            .field("variables", Field::new(FieldType::Object).default_value(json!({})))
            .field(
                "varfile",
                Field::string().default_value(json!(DEFAULT_PROJECT_VARFILE)),
            )
            .field(
                "sources",
                Field::array_of(
                    Self::new()
                        .field("name", Field::string().required())
                        .field("repositoryUrl", Field::string().required()),
                )
                .default_value(json!([])),
            )
            .field(
                "outputs",
                Field::array_of(
                    Self::new()
                        .field("name", Field::string().required())
                        .field("value", Field::any().required()),
                )
                .default_value(json!([])),
            )
            .allow_unknown(true)
    }

    /// Schema of one entry in a project's `environments` list.
    pub fn environment() -> Self {
        Self::new()
            .field("name", Field::string().required())
            .field(
                "namespacing",
                Field::one_of(&["optional", "required", "disabled"])
                    .default_value(json!("optional")),
            )
            .field("production", Field::boolean().default_value(json!(false)))
            .field("variables", Field::new(FieldType::Object).default_value(json!({})))
            .field("varfile", Field::string())
            .field("providers", Field::array_of(Self::provider().allow_unknown(true)))
    }

    /// Add or replace a field.
    pub fn field(mut self, name: impl Into<String>, field: Field) -> Self {
        let name = name.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = field,
            None => self.fields.push((name, field)),
        }
        self
    }

    pub fn allow_unknown(mut self, allow: bool) -> Self {
        self.allow_unknown = allow;
        self
    }

    /// Extend this schema with the fields of `other`; fields already present win.
    pub fn extend(mut self, other: &ConfigSchema) -> Self {
        for (name, field) in &other.fields {
            if self.get(name).is_none() {
                self.fields.push((name.clone(), field.clone()));
            }
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, field)| field)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Validate `value` and return it with defaults applied.
    ///
    /// `allow_unknown` relaxes this schema's own setting; base schemas are
    /// validated this way because they only describe a subset of keys.
    pub fn validate(&self, value: &Value, context: &str, allow_unknown: bool) -> Result<Value> {
        self.validate_at(value, context, "", allow_unknown)
    }

    fn validate_at(
        &self,
        value: &Value,
        context: &str,
        prefix: &str,
        allow_unknown: bool,
    ) -> Result<Value> {
        let Some(input) = value.as_object() else {
            return Err(validation_error(context, prefix, "must be an object"));
        };

        let mut output = Map::new();

        for (name, field) in &self.fields {
            let path = join_path(prefix, name);
            match input.get(name) {
                Some(v) if !v.is_null() => {
                    if !field.kind.accepts(v) {
                        return Err(validation_error(
                            context,
                            &path,
                            &format!("must be {}", field.kind.describe()),
                        ));
                    }
                    if let Some(allowed) = field.allowed.as_ref().filter(|a| !a.contains(v)) {
                        let choices: Vec<String> = allowed
                            .iter()
                            .map(|a| a.as_str().map_or_else(|| a.to_string(), str::to_string))
                            .collect();
                        return Err(validation_error(
                            context,
                            &path,
                            &format!("must be one of: {}", choices.join(", ")),
                        ));
                    }
                    let checked = match (&field.nested, &field.items, v) {
                        (Some(nested), _, _) => {
                            nested.validate_at(v, context, &path, allow_unknown)?
                        }
                        (None, Some(items), Value::Array(elements)) => Value::Array(
                            elements
                                .iter()
                                .enumerate()
                                .map(|(index, element)| {
                                    items.validate_at(
                                        element,
                                        context,
                                        &format!("{path}[{index}]"),
                                        allow_unknown,
                                    )
                                })
                                .collect::<Result<Vec<_>>>()?,
                        ),
                        _ => v.clone(),
                    };
                    output.insert(name.clone(), checked);
                }
                _ => {
                    if let Some(default) = &field.default {
                        output.insert(name.clone(), default.clone());
                    } else if field.required {
                        return Err(validation_error(context, &path, "is required"));
                    } else if let Some(v) = input.get(name) {
                        output.insert(name.clone(), v.clone());
                    }
                }
            }
        }

        for (name, v) in input {
            if self.get(name).is_some() {
                continue;
            }
            if !(self.allow_unknown || allow_unknown) {
                return Err(validation_error(
                    context,
                    &join_path(prefix, name),
                    "is not allowed",
                ));
            }
            output.insert(name.clone(), v.clone());
        }

        Ok(Value::Object(output))
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn validation_error(context: &str, path: &str, message: &str) -> Error {
    if path.is_empty() {
        Error::configuration(format!("Error validating {context}: value {message}"))
    } else {
        Error::configuration(format!("Error validating {context}: key .{path} {message}"))
    }
}
