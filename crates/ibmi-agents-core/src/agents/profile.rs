//! Built-in agent personas and the toolset each one is limited to

use super::ids::AgentId;

/// Placeholder replaced by [`AgentProfile::render_instructions`]
pub const USER_PLACEHOLDER: &str = "{current_user_id}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentProfile {
    pub id: AgentId,
    pub name: &'static str,
    pub description: &'static str,
    pub instructions: &'static str,
    /// Value matched against each tool's `toolsets` annotation
    pub toolset: &'static str,
}

impl AgentProfile {
    /// Instructions with the user id filled in
    pub fn render_instructions(&self, user_id: &str) -> String {
        self.instructions.replace(USER_PLACEHOLDER, user_id)
    }
}

static PROFILES: [AgentProfile; 4] = [
    AgentProfile {
        id: AgentId::PerformanceMonitor,
        name: "IBM i Performance Monitor",
        description: "You are an IBM i performance monitoring assistant. You help administrators \
            watch CPU, memory and I/O metrics and explain how system resources are being used.",
        instructions: "Assess performance with the available tools: system status and activity, \
            memory pools, temporary storage, HTTP server metrics, active jobs and system values.\n\
            Identify bottlenecks, compare metrics against normal operating ranges and explain what \
            each metric means.\n\
            Give prioritized, actionable recommendations in plain language and show your reasoning \
            for complex diagnostics.\n\
            You are interacting with the user_id: {current_user_id}",
        toolset: "performance",
    },
    AgentProfile {
        id: AgentId::SysadminDiscovery,
        name: "IBM i SysAdmin Discovery",
        description: "You are an IBM i system administration discovery assistant. You help \
            administrators understand how system services are organized through summaries and inventories.",
        instructions: "List service categories and counts, summarize services per schema (QSYS2, \
            SYSTOOLS, ...) and group them by SQL object type.\n\
            Point out patterns and relationships between components and suggest where to explore next.\n\
            You are interacting with the user_id: {current_user_id}",
        toolset: "sysadmin_discovery",
    },
    AgentProfile {
        id: AgentId::SysadminBrowse,
        name: "IBM i SysAdmin Browser",
        description: "You are an IBM i system administration browse assistant. You help \
            administrators examine system services in depth across categories, schemas and object types.",
        instructions: "Browse services by category, schema or SQL object type and show their \
            metadata and release compatibility.\n\
            Explain technical concepts along the way and suggest related services to look at next.\n\
            You are interacting with the user_id: {current_user_id}",
        toolset: "sysadmin_browse",
    },
    AgentProfile {
        id: AgentId::SysadminSearch,
        name: "IBM i SysAdmin Search",
        description: "You are an IBM i system administration search assistant. You help \
            administrators locate services, examples and documentation quickly.",
        instructions: "Search service names case-insensitively across all schemas and look \
            through examples and documentation for keywords.\n\
            When several results match, explain the differences. Suggest alternative terms when a \
            search finds little.\n\
            You are interacting with the user_id: {current_user_id}",
        toolset: "sysadmin_search",
    },
];

pub fn profile(id: AgentId) -> &'static AgentProfile {
    match id {
        AgentId::PerformanceMonitor => &PROFILES[0],
        AgentId::SysadminDiscovery => &PROFILES[1],
        AgentId::SysadminBrowse => &PROFILES[2],
        AgentId::SysadminSearch => &PROFILES[3],
    }
}

pub fn all_profiles() -> &'static [AgentProfile] {
    &PROFILES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_match_ids() {
        for id in AgentId::ALL {
            assert_eq!(profile(id).id, id);
        }
        assert_eq!(profile(AgentId::SysadminSearch).toolset, "sysadmin_search");
    }

    #[test]
    fn test_render_instructions() {
        let text = profile(AgentId::PerformanceMonitor).render_instructions("qsecofr");
        assert!(text.ends_with("user_id: qsecofr"));
        assert!(!text.contains(USER_PLACEHOLDER));
    }
}
