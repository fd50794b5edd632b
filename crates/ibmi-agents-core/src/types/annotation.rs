//! Annotation values attached to remote tool descriptors
//!
//! MCP servers tag tools with free-form annotations (`toolsets`,
//! `readOnlyHint`, `title`, ...). They are normalized into a closed value
//! type so that rule evaluation can match on every shape exhaustively.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A single scalar annotation or rule value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Number(f64),
    String(String),
}

impl Scalar {
    /// Convert a JSON value, returning `None` for null, arrays and objects
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Scalar::Bool(*b)),
            Value::Number(n) => n.as_f64().map(Scalar::Number),
            Value::String(s) => Some(Scalar::String(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::String(s) => write!(f, "{:?}", s),
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Number(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Number(value as f64)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Number(f64::from(value))
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::String(value)
    }
}

/// The value of one annotation key on one tool
///
/// A key the tool does not carry is `Absent`; it is still run through rule
/// evaluation. Deserializing goes through [`AnnotationValue::from_json`].
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum AnnotationValue {
    #[default]
    Absent,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<Scalar>),
}

impl AnnotationValue {
    /// Convert a JSON annotation value
    ///
    /// Objects become their compact JSON text, as do arrays or objects
    /// nested in a list. Nulls inside a list are dropped.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => AnnotationValue::Absent,
            Value::Object(_) => AnnotationValue::String(value.to_string()),
            Value::Bool(b) => AnnotationValue::Bool(*b),
            Value::Number(n) => n
                .as_f64()
                .map(AnnotationValue::Number)
                .unwrap_or(AnnotationValue::Absent),
            Value::String(s) => AnnotationValue::String(s.clone()),
            Value::Array(items) => AnnotationValue::List(
                items
                    .iter()
                    .filter(|item| !item.is_null())
                    .map(|item| Scalar::from_json(item).unwrap_or_else(|| Scalar::String(item.to_string())))
                    .collect(),
            ),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, AnnotationValue::Absent)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AnnotationValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Scalar]> {
        match self {
            AnnotationValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Strict equality against a scalar; no cross-type comparisons
    pub fn eq_scalar(&self, scalar: &Scalar) -> bool {
        match (self, scalar) {
            (AnnotationValue::Bool(a), Scalar::Bool(b)) => a == b,
            (AnnotationValue::Number(a), Scalar::Number(b)) => a == b,
            (AnnotationValue::String(a), Scalar::String(b)) => a == b,
            _ => false,
        }
    }
}

impl<'de> Deserialize<'de> for AnnotationValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(|value| AnnotationValue::from_json(&value))
    }
}

impl fmt::Display for AnnotationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotationValue::Absent => write!(f, "<absent>"),
            AnnotationValue::Bool(b) => write!(f, "{}", b),
            AnnotationValue::Number(n) => write!(f, "{}", n),
            AnnotationValue::String(s) => write!(f, "{:?}", s),
            AnnotationValue::List(items) => {
                let parts: Vec<String> = items.iter().map(|s| s.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

impl From<Scalar> for AnnotationValue {
    fn from(value: Scalar) -> Self {
        match value {
            Scalar::Bool(b) => AnnotationValue::Bool(b),
            Scalar::Number(n) => AnnotationValue::Number(n),
            Scalar::String(s) => AnnotationValue::String(s),
        }
    }
}

impl From<bool> for AnnotationValue {
    fn from(value: bool) -> Self {
        AnnotationValue::Bool(value)
    }
}

impl From<f64> for AnnotationValue {
    fn from(value: f64) -> Self {
        AnnotationValue::Number(value)
    }
}

impl From<&str> for AnnotationValue {
    fn from(value: &str) -> Self {
        AnnotationValue::String(value.to_string())
    }
}

impl From<String> for AnnotationValue {
    fn from(value: String) -> Self {
        AnnotationValue::String(value)
    }
}

impl<T: Into<Scalar>> From<Vec<T>> for AnnotationValue {
    fn from(items: Vec<T>) -> Self {
        AnnotationValue::List(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_shapes() {
        assert_eq!(AnnotationValue::from_json(&json!(null)), AnnotationValue::Absent);
        assert_eq!(AnnotationValue::from_json(&json!(true)), AnnotationValue::Bool(true));
        assert_eq!(AnnotationValue::from_json(&json!(3)), AnnotationValue::Number(3.0));
        assert_eq!(
            AnnotationValue::from_json(&json!("System Status")),
            AnnotationValue::String("System Status".to_string())
        );
        assert_eq!(
            AnnotationValue::from_json(&json!(["performance", 1, null, {"x": 1}, ["y"]])),
            AnnotationValue::List(vec![
                Scalar::from("performance"),
                Scalar::Number(1.0),
                Scalar::from(r#"{"x":1}"#),
                Scalar::from(r#"["y"]"#),
            ])
        );
        assert_eq!(
            AnnotationValue::from_json(&json!({"nested": true})),
            AnnotationValue::String(r#"{"nested":true}"#.to_string())
        );
    }

    #[test]
    fn test_deserialize_matches_from_json() {
        let raw = json!({
            "toolsets": ["performance", {"tier": 1}],
            "owner": {"team": "ops"},
            "readOnlyHint": true,
            "retired": null
        });
        let parsed: std::collections::BTreeMap<String, AnnotationValue> = serde_json::from_value(raw.clone()).unwrap();

        for (key, value) in raw.as_object().unwrap() {
            assert_eq!(parsed[key], AnnotationValue::from_json(value), "key {}", key);
        }
        assert_eq!(parsed["owner"].as_str(), Some(r#"{"team":"ops"}"#));
        assert!(parsed["retired"].is_absent());
    }

    #[test]
    fn test_eq_scalar_is_type_strict() {
        assert!(AnnotationValue::Bool(true).eq_scalar(&Scalar::Bool(true)));
        assert!(AnnotationValue::Number(1.0).eq_scalar(&Scalar::from(1)));
        assert!(!AnnotationValue::Bool(true).eq_scalar(&Scalar::Number(1.0)));
        assert!(!AnnotationValue::Absent.eq_scalar(&Scalar::Bool(false)));
        assert!(!AnnotationValue::from(vec!["a"]).eq_scalar(&Scalar::from("a")));
    }

    #[test]
    fn test_display() {
        assert_eq!(AnnotationValue::Absent.to_string(), "<absent>");
        assert_eq!(AnnotationValue::from(vec!["a", "b"]).to_string(), "[\"a\", \"b\"]");
    }

    #[test]
    fn test_scalar_deserializes_untagged() {
        let values: Vec<Scalar> = serde_json::from_value(json!([true, 2.5, "x"])).unwrap();
        assert_eq!(
            values,
            vec![Scalar::Bool(true), Scalar::Number(2.5), Scalar::from("x")]
        );
    }
}
