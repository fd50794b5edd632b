//! Tool descriptor and agent-facing tool types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::annotation::AnnotationValue;

/// Annotation key to value mapping of one descriptor
pub type Annotations = BTreeMap<String, AnnotationValue>;

static ABSENT: AnnotationValue = AnnotationValue::Absent;

/// Remote metadata for one callable tool, as discovered from the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Tool name, unique within a catalogue
    pub name: String,
    /// Human readable description
    #[serde(default)]
    pub description: String,
    /// JSON Schema describing the tool parameters
    #[serde(rename = "inputSchema", default)]
    pub input_schema: Value,
    /// Free-form annotations (`toolsets`, `readOnlyHint`, `title`, ...)
    #[serde(default)]
    pub annotations: Annotations,
}

impl ToolDescriptor {
    /// Create a descriptor with an empty object schema and no annotations
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: Value::Object(Map::new()),
            annotations: Annotations::new(),
        }
    }

    /// Set the input schema
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.input_schema = schema;
        self
    }

    /// Add or replace one annotation
    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<AnnotationValue>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    /// Annotation value for `key`, `Absent` when the tool does not carry it
    pub fn annotation(&self, key: &str) -> &AnnotationValue {
        self.annotations.get(key).unwrap_or(&ABSENT)
    }

    /// The `toolsets` annotation as plain strings
    pub fn toolsets(&self) -> Vec<String> {
        match self.annotation("toolsets") {
            AnnotationValue::String(s) => vec![s.clone()],
            AnnotationValue::List(items) => items
                .iter()
                .filter_map(|s| match s {
                    super::Scalar::String(s) => Some(s.clone()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Tool definition handed to an agent runtime
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    /// Tool name (function name)
    pub name: String,
    /// Description of what the tool does
    pub description: String,
    /// JSON Schema for the input parameters
    #[serde(rename = "inputSchema", skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Value>,
}

impl Tool {
    /// Create a new tool definition
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: None,
        }
    }

    /// Set the input schema
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.input_schema = Some(schema);
        self
    }
}

impl From<&ToolDescriptor> for Tool {
    fn from(descriptor: &ToolDescriptor) -> Self {
        Tool {
            name: descriptor.name.clone(),
            description: descriptor.description.clone(),
            input_schema: Some(descriptor.input_schema.clone()),
        }
    }
}

/// Tool call requested by the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call
    pub id: String,
    /// Name of the tool being called
    pub name: String,
    /// Input arguments for the tool
    pub input: Value,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            input,
        }
    }

    /// Get an input argument by key
    pub fn get_arg(&self, key: &str) -> Option<&Value> {
        self.input.get(key)
    }

    /// The arguments as a mapping; `null` input counts as no arguments
    pub fn arguments(&self) -> Option<Map<String, Value>> {
        match &self.input {
            Value::Object(map) => Some(map.clone()),
            Value::Null => Some(Map::new()),
            _ => None,
        }
    }
}
