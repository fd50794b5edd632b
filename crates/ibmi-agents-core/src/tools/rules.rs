//! Filter rules evaluated against a single annotation value

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::types::{AnnotationValue, Scalar, ToolDescriptor};

/// Predicate over one annotation value
pub type AnnotationPredicate = Arc<dyn Fn(&AnnotationValue) -> bool + Send + Sync>;

/// Predicate over a whole descriptor, evaluated before annotation rules
pub type DescriptorPredicate = Arc<dyn Fn(&ToolDescriptor) -> bool + Send + Sync>;

/// How one annotation key is matched
#[derive(Clone)]
pub enum FilterRule {
    /// Exact equality with the annotation value
    Equals(Scalar),
    /// Membership for scalar annotations, intersection for list annotations
    AnyOf(Vec<Scalar>),
    /// Arbitrary test; a panic counts as "no match"
    Predicate {
        label: String,
        test: AnnotationPredicate,
    },
}

impl FilterRule {
    pub fn equals(value: impl Into<Scalar>) -> Self {
        FilterRule::Equals(value.into())
    }

    pub fn any_of<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Scalar>,
    {
        FilterRule::AnyOf(values.into_iter().map(Into::into).collect())
    }

    pub fn predicate<F>(label: impl Into<String>, test: F) -> Self
    where
        F: Fn(&AnnotationValue) -> bool + Send + Sync + 'static,
    {
        FilterRule::Predicate {
            label: label.into(),
            test: Arc::new(test),
        }
    }

    /// String annotation containing `needle`, ignoring case
    pub fn contains_text(needle: impl Into<String>) -> Self {
        let needle = needle.into().to_lowercase();
        let label = format!("contains {:?}", needle);
        Self::predicate(label, move |value| {
            value
                .as_str()
                .map(|s| s.to_lowercase().contains(&needle))
                .unwrap_or(false)
        })
    }

    /// Annotation present (`true`) or absent (`false`)
    pub fn present(expected: bool) -> Self {
        let label = if expected { "present" } else { "absent" };
        Self::predicate(label, move |value| value.is_absent() != expected)
    }

    /// Evaluate the rule; `None` when a predicate panicked
    pub fn evaluate(&self, value: &AnnotationValue) -> Option<bool> {
        match self {
            FilterRule::Equals(expected) => Some(value.eq_scalar(expected)),
            FilterRule::AnyOf(options) => Some(match value {
                AnnotationValue::List(items) => items.iter().any(|item| options.contains(item)),
                other => options.iter().any(|option| other.eq_scalar(option)),
            }),
            FilterRule::Predicate { test, .. } => guarded(|| test(value)),
        }
    }

    /// Whether the value passes; evaluation failures count as no match
    pub fn matches(&self, value: &AnnotationValue) -> bool {
        self.evaluate(value).unwrap_or(false)
    }
}

impl fmt::Display for FilterRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterRule::Equals(value) => write!(f, "== {}", value),
            FilterRule::AnyOf(options) => {
                let parts: Vec<String> = options.iter().map(|o| o.to_string()).collect();
                write!(f, "any of [{}]", parts.join(", "))
            }
            FilterRule::Predicate { label, .. } => write!(f, "<{}>", label),
        }
    }
}

impl fmt::Debug for FilterRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterRule::Equals(value) => f.debug_tuple("Equals").field(value).finish(),
            FilterRule::AnyOf(options) => f.debug_tuple("AnyOf").field(options).finish(),
            FilterRule::Predicate { label, .. } => f.debug_struct("Predicate").field("label", label).finish(),
        }
    }
}

/// Run user code, turning a panic into `None`
pub(crate) fn guarded<F: FnOnce() -> bool>(f: F) -> Option<bool> {
    catch_unwind(AssertUnwindSafe(f)).ok()
}
