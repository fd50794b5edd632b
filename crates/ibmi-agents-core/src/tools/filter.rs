//! Annotation-based catalogue filtering
//!
//! A [`FilterSpec`] maps annotation keys to [`FilterRule`]s; a tool is kept
//! only if every rule passes (AND). An optional whole-descriptor predicate
//! runs first and can reject a tool before any annotation is looked at.
//! Filtering preserves discovery order and never fails: predicate panics
//! are rejections.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::error::{ToolError, ToolResult};
use super::rules::{guarded, DescriptorPredicate, FilterRule};
use crate::logging::{Logger, NoOpLogger};
use crate::types::{AnnotationValue, Scalar, ToolDescriptor};

/// Declarative set of annotation rules
#[derive(Clone, Default)]
pub struct FilterSpec {
    rules: Vec<(String, FilterRule)>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// `{"toolsets": [..]}`
    pub fn toolsets<I, T>(toolsets: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Scalar>,
    {
        Self::new().with_rule("toolsets", FilterRule::any_of(toolsets))
    }

    /// Add a rule, replacing any existing rule for the same key
    pub fn with_rule(mut self, key: impl Into<String>, rule: FilterRule) -> Self {
        self.insert(key, rule);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, rule: FilterRule) {
        let key = key.into();
        match self.rules.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = rule,
            None => self.rules.push((key, rule)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&FilterRule> {
        self.rules.iter().find(|(k, _)| k == key).map(|(_, r)| r)
    }

    pub fn rules(&self) -> impl Iterator<Item = (&str, &FilterRule)> {
        self.rules.iter().map(|(k, r)| (k.as_str(), r))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|(k, _)| k.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.rules.iter().map(|(k, r)| format!("{}: {}", k, r)).collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

impl fmt::Debug for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.rules.iter().map(|(k, r)| (k, r))).finish()
    }
}

/// Legacy toolset selector: one tag or a list of tags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Toolsets {
    One(String),
    Many(Vec<String>),
}

impl Toolsets {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Toolsets::One(tag) => vec![tag],
            Toolsets::Many(tags) => tags,
        }
    }
}

impl From<&str> for Toolsets {
    fn from(tag: &str) -> Self {
        Toolsets::One(tag.to_string())
    }
}

impl From<Vec<String>> for Toolsets {
    fn from(tags: Vec<String>) -> Self {
        Toolsets::Many(tags)
    }
}

/// Every accepted way of describing a filter, before normalization
#[derive(Clone, Default)]
pub struct ToolFilterOptions {
    /// Structured annotation rules
    pub annotation_filters: Option<FilterSpec>,
    /// Legacy toolset tags; same as `{"toolsets": [..]}`
    pub toolsets: Option<Toolsets>,
    /// Legacy whole-descriptor predicate
    pub custom_filter: Option<DescriptorPredicate>,
}

impl ToolFilterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_annotation_filters(mut self, spec: FilterSpec) -> Self {
        self.annotation_filters = Some(spec);
        self
    }

    pub fn with_toolsets(mut self, toolsets: impl Into<Toolsets>) -> Self {
        self.toolsets = Some(toolsets.into());
        self
    }

    pub fn with_custom_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&ToolDescriptor) -> bool + Send + Sync + 'static,
    {
        self.custom_filter = Some(Arc::new(filter));
        self
    }

    /// Collapse legacy shapes into one spec
    pub fn normalize(self) -> ToolResult<(FilterSpec, Option<DescriptorPredicate>)> {
        let spec = match (self.annotation_filters, self.toolsets) {
            (Some(_), Some(_)) => {
                return Err(ToolError::Configuration(
                    "cannot specify both 'toolsets' and 'annotation_filters'; use annotation_filters with a 'toolsets' key instead"
                        .to_string(),
                ))
            }
            (Some(spec), None) => spec,
            (None, Some(toolsets)) => FilterSpec::toolsets(toolsets.into_vec()),
            (None, None) => FilterSpec::new(),
        };
        Ok((spec, self.custom_filter))
    }
}

impl fmt::Debug for ToolFilterOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolFilterOptions")
            .field("annotation_filters", &self.annotation_filters)
            .field("toolsets", &self.toolsets)
            .field("custom_filter", &self.custom_filter.is_some())
            .finish()
    }
}

/// Why a descriptor was rejected
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    /// The custom predicate returned false
    CustomFilter,
    /// The custom predicate panicked
    CustomFilterFailed,
    /// An annotation rule did not match
    Annotation {
        key: String,
        observed: AnnotationValue,
        rule: String,
    },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::CustomFilter => write!(f, "excluded by custom_filter"),
            Rejection::CustomFilterFailed => write!(f, "custom_filter failed"),
            Rejection::Annotation { key, observed, rule } => {
                write!(f, "{}={} doesn't match filter {}", key, observed, rule)
            }
        }
    }
}

/// Outcome of evaluating one descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct InclusionDecision {
    pub included: bool,
    pub rejection: Option<Rejection>,
}

impl InclusionDecision {
    pub fn accept() -> Self {
        Self {
            included: true,
            rejection: None,
        }
    }

    pub fn reject(reason: Rejection) -> Self {
        Self {
            included: false,
            rejection: Some(reason),
        }
    }
}

/// Selects the subset of a catalogue that satisfies a [`FilterSpec`]
pub struct ToolCatalogFilter {
    spec: FilterSpec,
    custom_filter: Option<DescriptorPredicate>,
    debug: bool,
    logger: Arc<dyn Logger>,
}

impl ToolCatalogFilter {
    pub fn new(spec: FilterSpec) -> Self {
        Self {
            spec,
            custom_filter: None,
            debug: false,
            logger: Arc::new(NoOpLogger::new()),
        }
    }

    /// Build from possibly-legacy options
    pub fn from_options(options: ToolFilterOptions) -> ToolResult<Self> {
        let (spec, custom_filter) = options.normalize()?;
        Ok(Self {
            custom_filter,
            ..Self::new(spec)
        })
    }

    pub fn with_custom_filter(mut self, filter: DescriptorPredicate) -> Self {
        self.custom_filter = Some(filter);
        self
    }

    /// Log accept/reject decisions to `logger` when `debug` is set
    pub fn with_logger(mut self, logger: Arc<dyn Logger>, debug: bool) -> Self {
        self.logger = logger;
        self.debug = debug;
        self
    }

    pub fn spec(&self) -> &FilterSpec {
        &self.spec
    }

    pub fn has_filters(&self) -> bool {
        !self.spec.is_empty() || self.custom_filter.is_some()
    }

    /// Decide for one descriptor
    pub fn evaluate(&self, tool: &ToolDescriptor) -> InclusionDecision {
        if let Some(custom) = &self.custom_filter {
            match guarded(|| custom(tool)) {
                Some(true) => {}
                Some(false) => return InclusionDecision::reject(Rejection::CustomFilter),
                None => return InclusionDecision::reject(Rejection::CustomFilterFailed),
            }
        }

        for (key, rule) in self.spec.rules() {
            let observed = tool.annotation(key);
            if !rule.matches(observed) {
                return InclusionDecision::reject(Rejection::Annotation {
                    key: key.to_string(),
                    observed: observed.clone(),
                    rule: rule.to_string(),
                });
            }
        }

        InclusionDecision::accept()
    }

    /// Keep the accepted descriptors, in order
    pub fn apply(&self, tools: Vec<ToolDescriptor>) -> Vec<ToolDescriptor> {
        if self.debug && self.has_filters() {
            let mut parts = Vec::new();
            if !self.spec.is_empty() {
                parts.push(format!("annotation_filters: {}", self.spec));
            }
            if self.custom_filter.is_some() {
                parts.push("custom_filter".to_string());
            }
            self.log(&format!("=== FILTERING TOOLS BY {} ===", parts.join(", ").to_uppercase()));
        }

        let accepted: Vec<ToolDescriptor> = tools
            .into_iter()
            .filter(|tool| {
                let decision = self.evaluate(tool);
                match &decision.rejection {
                    None => self.log(&format!("Including tool: {}", tool.name)),
                    Some(reason) => self.log(&format!(
                        "Excluding tool: {} ({}; {})",
                        tool.name,
                        reason,
                        self.observed_annotations(tool)
                    )),
                }
                decision.included
            })
            .collect();

        if self.debug && self.has_filters() {
            self.log(&format!("=== ANNOTATION FILTERED TOOLS COUNT: {} ===", accepted.len()));
        }
        accepted
    }

    fn observed_annotations(&self, tool: &ToolDescriptor) -> String {
        if self.spec.is_empty() {
            return "no matching annotations".to_string();
        }
        self.spec
            .keys()
            .map(|key| format!("{}={}", key, tool.annotation(key)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn log(&self, message: &str) {
        if self.debug {
            self.logger.debug(&format!("[ToolCatalogFilter] {}", message));
        }
    }
}

impl fmt::Debug for ToolCatalogFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolCatalogFilter")
            .field("spec", &self.spec)
            .field("custom_filter", &self.custom_filter.is_some())
            .field("debug", &self.debug)
            .finish()
    }
}
