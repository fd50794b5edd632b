//! Schema-driven argument coercion
//!
//! Models routinely send `"42"` for an integer or `"yes"` for a boolean.
//! Before a call is forwarded, every argument whose property declares a
//! JSON Schema type is shaped toward that type. Coercion is best effort:
//! a value that cannot be converted is passed through unchanged and a
//! [`CoercionWarning`] is recorded. Arguments the schema does not declare
//! are forwarded untouched and nothing is ever invented for a missing one.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// JSON Schema `type` of one parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredType {
    Integer,
    Number,
    Boolean,
    String,
    Array,
    Object,
    /// Anything else (`null`, custom keywords); passed through
    Other(String),
}

impl DeclaredType {
    pub fn parse(name: &str) -> Self {
        match name {
            "integer" => DeclaredType::Integer,
            "number" => DeclaredType::Number,
            "boolean" => DeclaredType::Boolean,
            "string" => DeclaredType::String,
            "array" => DeclaredType::Array,
            "object" => DeclaredType::Object,
            other => DeclaredType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DeclaredType::Integer => "integer",
            DeclaredType::Number => "number",
            DeclaredType::Boolean => "boolean",
            DeclaredType::String => "string",
            DeclaredType::Array => "array",
            DeclaredType::Object => "object",
            DeclaredType::Other(name) => name,
        }
    }
}

/// Declared parameter types of one tool, parsed once at registration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSchema {
    properties: BTreeMap<String, Option<DeclaredType>>,
}

impl ParameterSchema {
    /// Parse a tool's `inputSchema`
    ///
    /// A missing schema or one without `properties` declares nothing.
    /// A `type` list such as `["integer", "null"]` uses its first non-null
    /// entry.
    pub fn parse(schema: &Value) -> Result<Self, String> {
        let object = match schema {
            Value::Null => return Ok(Self::default()),
            Value::Object(object) => object,
            other => return Err(format!("input schema must be an object, got {}", type_name(other))),
        };

        let properties = match object.get("properties") {
            None | Some(Value::Null) => return Ok(Self::default()),
            Some(Value::Object(properties)) => properties,
            Some(other) => return Err(format!("'properties' must be an object, got {}", type_name(other))),
        };

        let mut parsed = BTreeMap::new();
        for (name, property) in properties {
            let declared = match property {
                Value::Object(property) => match property.get("type") {
                    None | Some(Value::Null) => None,
                    Some(Value::String(ty)) => Some(DeclaredType::parse(ty)),
                    Some(Value::Array(types)) => types
                        .iter()
                        .filter_map(Value::as_str)
                        .find(|ty| *ty != "null")
                        .map(DeclaredType::parse),
                    Some(other) => {
                        return Err(format!(
                            "property '{}' has a {} 'type'",
                            name,
                            type_name(other)
                        ))
                    }
                },
                // `true`/`false` are valid (untyped) JSON Schemas
                Value::Bool(_) => None,
                other => return Err(format!("property '{}' schema must be an object, got {}", name, type_name(other))),
            };
            parsed.insert(name.clone(), declared);
        }

        Ok(Self { properties: parsed })
    }

    /// Declared type of `name`, if the schema declares one
    pub fn declared_type(&self, name: &str) -> Option<&DeclaredType> {
        self.properties.get(name).and_then(|t| t.as_ref())
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// What to do when an argument cannot be converted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoercionMode {
    /// Forward the original value and record a warning
    #[default]
    Lenient,
    /// Reject the call before it reaches the session
    Strict,
}

/// An argument that could not be converted to its declared type
#[derive(Debug, Clone, PartialEq)]
pub struct CoercionWarning {
    pub parameter: String,
    pub expected: String,
    pub value: Value,
    pub message: String,
}

impl fmt::Display for CoercionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Failed to coerce parameter {} to {} (value {}): {}",
            self.parameter, self.expected, self.value, self.message
        )
    }
}

/// Per-call coercion result
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Coercion {
    /// Arguments to forward
    pub arguments: Map<String, Value>,
    /// Arguments left unchanged because conversion failed
    pub warnings: Vec<CoercionWarning>,
    /// Names of arguments whose value was converted
    pub changed: Vec<String>,
}

/// Coerce every declared argument toward its schema type
pub fn coerce_arguments(arguments: Map<String, Value>, schema: &ParameterSchema) -> Coercion {
    let mut result = Coercion::default();

    for (name, value) in arguments {
        let declared = match schema.declared_type(&name) {
            Some(declared) if !value.is_null() => declared,
            _ => {
                result.arguments.insert(name, value);
                continue;
            }
        };

        match coerce_value(&value, declared) {
            Ok(Some(converted)) => {
                result.changed.push(name.clone());
                result.arguments.insert(name, converted);
            }
            Ok(None) => {
                result.arguments.insert(name, value);
            }
            Err(message) => {
                result.warnings.push(CoercionWarning {
                    parameter: name.clone(),
                    expected: declared.as_str().to_string(),
                    value: value.clone(),
                    message,
                });
                result.arguments.insert(name, value);
            }
        }
    }

    result
}

/// `Ok(None)` when the value already has the right shape
fn coerce_value(value: &Value, declared: &DeclaredType) -> Result<Option<Value>, String> {
    match declared {
        DeclaredType::Integer => match value {
            Value::String(s) => parse_integer(s).map(Some),
            _ => Ok(None),
        },
        DeclaredType::Number => match value {
            Value::String(s) => parse_number(s).map(Some),
            _ => Ok(None),
        },
        DeclaredType::Boolean => Ok(match value {
            Value::Bool(_) => None,
            Value::String(s) => Some(Value::Bool(matches!(
                s.to_lowercase().as_str(),
                "true" | "1" | "yes"
            ))),
            other => Some(Value::Bool(truthy(other))),
        }),
        DeclaredType::String => Ok(match value {
            Value::String(_) => None,
            other => Some(Value::String(other.to_string())),
        }),
        DeclaredType::Array => Ok(match value {
            Value::Array(_) => None,
            Value::String(s) => match serde_json::from_str::<Value>(s.trim()) {
                Ok(parsed @ Value::Array(_)) => Some(parsed),
                _ => Some(Value::Array(vec![value.clone()])),
            },
            other => Some(Value::Array(vec![other.clone()])),
        }),
        DeclaredType::Object => match value {
            Value::Object(_) => Ok(None),
            Value::String(s) => match serde_json::from_str::<Value>(s.trim()) {
                Ok(parsed @ Value::Object(_)) => Ok(Some(parsed)),
                _ => Err("string is not a JSON object".to_string()),
            },
            Value::Array(items) => pairs_to_object(items).map(Some),
            other => Err(format!("cannot convert {} to object", type_name(other))),
        },
        DeclaredType::Other(_) => Ok(None),
    }
}

fn parse_integer(raw: &str) -> Result<Value, String> {
    let trimmed = raw.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return Ok(Value::from(n));
    }
    trimmed
        .parse::<u64>()
        .map(Value::from)
        .map_err(|_| format!("invalid literal for integer: {:?}", raw))
}

fn parse_number(raw: &str) -> Result<Value, String> {
    let parsed = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("could not convert string to number: {:?}", raw))?;
    Number::from_f64(parsed)
        .map(Value::Number)
        .ok_or_else(|| format!("{:?} is not a finite number", raw))
}

fn pairs_to_object(items: &[Value]) -> Result<Value, String> {
    let mut object = Map::new();
    for (index, item) in items.iter().enumerate() {
        match item {
            Value::Array(pair) if pair.len() == 2 => match &pair[0] {
                Value::String(key) => {
                    object.insert(key.clone(), pair[1].clone());
                }
                other => return Err(format!("element {} has a {} key", index, type_name(other))),
            },
            _ => return Err(format!("element {} is not a [key, value] pair", index)),
        }
    }
    Ok(Value::Object(object))
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
