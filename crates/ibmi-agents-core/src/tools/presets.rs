//! Ready-made tool sets for the IBM i MCP server
//!
//! Each preset returns [`RegistrarOptions`] that can be adjusted further
//! (include/exclude lists, collision policy, coercion) before building a
//! [`ToolRegistrar`](super::ToolRegistrar).

use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::filter::{FilterSpec, ToolFilterOptions};
use super::registrar::RegistrarOptions;
use super::rules::FilterRule;
use crate::types::ToolDescriptor;

static SYSADMIN_TOOLSETS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("discovery", "sysadmin_discovery"),
        ("browse", "sysadmin_browse"),
        ("search", "sysadmin_search"),
    ])
});

/// Toolset tag for a sysadmin kind; unknown kinds map to `sysadmin_<kind>`
pub fn sysadmin_toolset(kind: &str) -> String {
    SYSADMIN_TOOLSETS
        .get(kind)
        .map(|tag| tag.to_string())
        .unwrap_or_else(|| format!("sysadmin_{}", kind))
}

/// Performance monitoring tools
pub fn performance() -> RegistrarOptions {
    RegistrarOptions::new()
        .with_name("performance-tools")
        .with_filter(ToolFilterOptions::new().with_toolsets("performance"))
}

/// System administration tools of one kind (`discovery`, `browse`, `search`)
pub fn sysadmin(kind: &str) -> RegistrarOptions {
    let toolset = sysadmin_toolset(kind);
    RegistrarOptions::new()
        .with_name(format!("{}-tools", toolset))
        .with_filter(ToolFilterOptions::new().with_toolsets(toolset.as_str()))
}

/// Tools tagged with any of `toolsets`
pub fn multi_toolset<I, S>(toolsets: I) -> RegistrarOptions
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let toolsets: Vec<String> = toolsets.into_iter().map(Into::into).collect();
    RegistrarOptions::new()
        .with_name("multi-toolset-tools")
        .with_filter(ToolFilterOptions::new().with_toolsets(toolsets))
}

/// Tools accepted by a whole-descriptor predicate
pub fn custom_filtered<F>(filter: F) -> RegistrarOptions
where
    F: Fn(&ToolDescriptor) -> bool + Send + Sync + 'static,
{
    RegistrarOptions::new()
        .with_name("custom-filtered-tools")
        .with_filter(ToolFilterOptions::new().with_custom_filter(filter))
}

/// Tools matching an arbitrary annotation spec
pub fn annotation_filtered(spec: FilterSpec) -> RegistrarOptions {
    RegistrarOptions::new()
        .with_name("annotation-filtered-tools")
        .with_filter(ToolFilterOptions::new().with_annotation_filters(spec))
}

pub fn read_only() -> RegistrarOptions {
    annotation_filtered(FilterSpec::new().with_rule("readOnlyHint", FilterRule::equals(true)))
        .with_name("readonly-tools")
}

pub fn non_destructive() -> RegistrarOptions {
    annotation_filtered(FilterSpec::new().with_rule("destructiveHint", FilterRule::equals(false)))
        .with_name("non-destructive-tools")
}

pub fn closed_world() -> RegistrarOptions {
    annotation_filtered(FilterSpec::new().with_rule("openWorldHint", FilterRule::equals(false)))
        .with_name("closed-world-tools")
}

/// Read-only, non-destructive and closed-world
pub fn safe() -> RegistrarOptions {
    annotation_filtered(
        FilterSpec::new()
            .with_rule("readOnlyHint", FilterRule::equals(true))
            .with_rule("destructiveHint", FilterRule::equals(false))
            .with_rule("openWorldHint", FilterRule::equals(false)),
    )
    .with_name("safe-tools")
}

/// Performance tools whose title mentions "system"
pub fn system_performance() -> RegistrarOptions {
    annotation_filtered(
        FilterSpec::toolsets(["performance"]).with_rule("title", FilterRule::contains_text("system")),
    )
    .with_name("system-performance-tools")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::filter::ToolCatalogFilter;

    fn catalogue() -> Vec<ToolDescriptor> {
        vec![
            ToolDescriptor::new("system_status", "")
                .with_annotation("toolsets", vec!["performance"])
                .with_annotation("title", "System Status")
                .with_annotation("readOnlyHint", true)
                .with_annotation("destructiveHint", false)
                .with_annotation("openWorldHint", false),
            ToolDescriptor::new("active_jobs", "")
                .with_annotation("toolsets", vec!["performance"])
                .with_annotation("title", "Active Jobs")
                .with_annotation("readOnlyHint", true),
            ToolDescriptor::new("list_service_programs", "")
                .with_annotation("toolsets", vec!["sysadmin_browse"])
                .with_annotation("destructiveHint", false),
            ToolDescriptor::new("search_objects", "")
                .with_annotation("toolsets", vec!["sysadmin_search", "sysadmin_discovery"]),
        ]
    }

    fn names(options: RegistrarOptions) -> Vec<String> {
        let filter = ToolCatalogFilter::from_options(options.filter).unwrap();
        filter.apply(catalogue()).into_iter().map(|t| t.name).collect()
    }

    #[test]
    fn test_sysadmin_toolset_mapping() {
        assert_eq!(sysadmin_toolset("browse"), "sysadmin_browse");
        assert_eq!(sysadmin_toolset("audit"), "sysadmin_audit");
    }

    #[test]
    fn test_toolset_presets() {
        assert_eq!(names(performance()), vec!["system_status", "active_jobs"]);
        assert_eq!(names(sysadmin("discovery")), vec!["search_objects"]);
        assert_eq!(
            names(multi_toolset(["sysadmin_browse", "sysadmin_search"])),
            vec!["list_service_programs", "search_objects"]
        );
    }

    #[test]
    fn test_hint_presets() {
        assert_eq!(names(read_only()), vec!["system_status", "active_jobs"]);
        assert_eq!(names(non_destructive()), vec!["system_status", "list_service_programs"]);
        assert_eq!(names(closed_world()), vec!["system_status"]);
        assert_eq!(names(safe()), vec!["system_status"]);
    }

    #[test]
    fn test_system_performance() {
        assert_eq!(names(system_performance()), vec!["system_status"]);
    }

    #[test]
    fn test_custom_filtered() {
        let options = custom_filtered(|tool| tool.name.starts_with("search"));
        assert_eq!(names(options), vec!["search_objects"]);
    }

    #[test]
    fn test_preset_names() {
        assert_eq!(performance().name, "performance-tools");
        assert_eq!(sysadmin("search").name, "sysadmin_search-tools");
    }
}
