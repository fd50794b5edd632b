//! Allow/deny list over tool names, applied after annotation filtering

use std::collections::HashSet;

/// Name-based include/exclude filter
///
/// The exclude list always wins. When an include list is set, names not on
/// it are dropped no matter what the annotation filter decided.
#[derive(Debug, Clone, Default)]
pub struct NameFilter {
    /// If set, only include tools with these names
    pub include: Option<HashSet<String>>,
    /// Exclude tools with these names
    pub exclude: HashSet<String>,
}

impl NameFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Include only specific tools
    pub fn with_include(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.include = Some(names.into_iter().collect());
        self
    }

    /// Exclude specific tools
    pub fn with_exclude(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.exclude = names.into_iter().collect();
        self
    }

    /// Check if a tool name passes this filter
    pub fn matches(&self, name: &str) -> bool {
        if self.exclude.contains(name) {
            return false;
        }

        match &self.include {
            Some(include) => include.contains(name),
            None => true,
        }
    }

    /// Names on either list that are not among `available`, sorted
    ///
    /// Returns `(unknown includes, unknown excludes)`.
    pub fn unknown_names<'a>(&self, available: impl IntoIterator<Item = &'a str>) -> (Vec<String>, Vec<String>) {
        let available: HashSet<&str> = available.into_iter().collect();
        let missing = |names: &HashSet<String>| {
            let mut out: Vec<String> = names
                .iter()
                .filter(|n| !available.contains(n.as_str()))
                .cloned()
                .collect();
            out.sort();
            out
        };

        let includes = self.include.as_ref().map(|set| missing(set)).unwrap_or_default();
        (includes, missing(&self.exclude))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_allows_all() {
        let filter = NameFilter::new();
        assert!(filter.matches("system_status"));
    }

    #[test]
    fn test_exclude_wins_over_include() {
        let filter = NameFilter::new()
            .with_include(strings(&["x", "y"]))
            .with_exclude(strings(&["y"]));

        assert!(filter.matches("x"));
        assert!(!filter.matches("y"));
        assert!(!filter.matches("z"));
    }

    #[test]
    fn test_exclude_only() {
        let filter = NameFilter::new().with_exclude(strings(&["delete_job"]));
        assert!(filter.matches("active_jobs"));
        assert!(!filter.matches("delete_job"));
    }

    #[test]
    fn test_unknown_names() {
        let filter = NameFilter::new()
            .with_include(strings(&["b", "a", "known"]))
            .with_exclude(strings(&["ghost"]));

        let (includes, excludes) = filter.unknown_names(["known", "other"]);
        assert_eq!(includes, strings(&["a", "b"]));
        assert_eq!(excludes, strings(&["ghost"]));
    }
}
