//! Tool registrar
//!
//! The registrar turns a session's catalogue into named, locally callable
//! actions:
//!
//! 1. handshake and fetch the full catalogue from the [`Session`]
//! 2. keep what the [`ToolCatalogFilter`] accepts
//! 3. apply the include/exclude [`NameFilter`]
//! 4. wrap every survivor in a coercing action
//! 5. publish the finished registry in one step
//!
//! Nothing built during a pass is visible until the whole pass succeeds.
//! A pass that fails leaves the registrar `Failed` with an empty registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::coerce::{coerce_arguments, CoercionMode, ParameterSchema};
use super::error::{ToolError, ToolResult};
use super::filter::{ToolCatalogFilter, ToolFilterOptions};
use super::names::NameFilter;
use crate::logging::{Logger, NoOpLogger};
use crate::session::{CallOutcome, Session};
use crate::types::{Tool, ToolDescriptor};

/// Lifecycle of a registrar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrarState {
    Uninitialized,
    Initializing,
    Ready,
    Failed,
}

impl fmt::Display for RegistrarState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RegistrarState::Uninitialized => "uninitialized",
            RegistrarState::Initializing => "initializing",
            RegistrarState::Ready => "ready",
            RegistrarState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// What to do when two accepted tools share a name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// The later tool replaces the earlier one; a warning is logged
    #[default]
    LastWins,
    /// Initialization fails with [`ToolError::DuplicateTool`]
    Error,
}

/// Result of invoking an action
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutput {
    /// The session returned one complete value
    Single(Value),
    /// The session streamed; every chunk in arrival order
    Collected(Vec<Value>),
}

impl ActionOutput {
    pub fn into_value(self) -> Value {
        match self {
            ActionOutput::Single(value) => value,
            ActionOutput::Collected(values) => Value::Array(values),
        }
    }
}

/// Identity of whoever invoked an action
///
/// Accepted by [`RegisteredAction::invoke_with_context`] and never
/// forwarded to the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallContext {
    pub agent_id: Option<String>,
    pub session_id: Option<String>,
    pub user_id: Option<String>,
}

type ActionFn = Arc<dyn Fn(Map<String, Value>) -> BoxFuture<'static, ToolResult<ActionOutput>> + Send + Sync>;

/// One published, invocable tool
#[derive(Clone)]
pub struct RegisteredAction {
    pub name: String,
    pub description: String,
    /// Copy of the descriptor's `inputSchema`
    pub parameter_schema: Value,
    entrypoint: ActionFn,
}

impl RegisteredAction {
    /// Coerce `arguments` and forward them to the session
    pub async fn invoke(&self, arguments: Map<String, Value>) -> ToolResult<ActionOutput> {
        (self.entrypoint)(arguments).await
    }

    /// Same as [`invoke`](Self::invoke); the context stays local
    pub async fn invoke_with_context(
        &self,
        _context: &CallContext,
        arguments: Map<String, Value>,
    ) -> ToolResult<ActionOutput> {
        self.invoke(arguments).await
    }

    /// Agent-facing definition
    pub fn to_tool(&self) -> Tool {
        Tool {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: Some(self.parameter_schema.clone()),
        }
    }
}

impl fmt::Debug for RegisteredAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredAction")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Published actions, keyed by name, in registration order
#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    order: Vec<String>,
    actions: HashMap<String, RegisteredAction>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an action, returning the one it replaced
    ///
    /// A replacement keeps the original position.
    pub fn insert(&mut self, action: RegisteredAction) -> Option<RegisteredAction> {
        let previous = self.actions.insert(action.name.clone(), action.clone());
        if previous.is_none() {
            self.order.push(action.name);
        }
        previous
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredAction> {
        self.actions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredAction> {
        self.order.iter().filter_map(|name| self.actions.get(name))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// How a registrar selects and wraps tools
#[derive(Debug, Clone)]
pub struct RegistrarOptions {
    /// Used in log lines
    pub name: String,
    pub filter: ToolFilterOptions,
    pub include_tools: Option<Vec<String>>,
    pub exclude_tools: Vec<String>,
    pub on_collision: CollisionPolicy,
    pub coercion: CoercionMode,
    /// Log every accept/reject decision and the per-pass counts
    pub debug_filtering: bool,
}

impl Default for RegistrarOptions {
    fn default() -> Self {
        Self {
            name: "mcp-tools".to_string(),
            filter: ToolFilterOptions::default(),
            include_tools: None,
            exclude_tools: Vec::new(),
            on_collision: CollisionPolicy::default(),
            coercion: CoercionMode::default(),
            debug_filtering: false,
        }
    }
}

impl RegistrarOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_filter(mut self, filter: ToolFilterOptions) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_include<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_tools = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_tools = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.on_collision = policy;
        self
    }

    pub fn with_coercion(mut self, mode: CoercionMode) -> Self {
        self.coercion = mode;
        self
    }

    pub fn with_debug_filtering(mut self, debug: bool) -> Self {
        self.debug_filtering = debug;
        self
    }
}

/// Rolls an interrupted `Initializing` pass back to `Uninitialized`
struct PassGuard<'a> {
    registrar: &'a ToolRegistrar,
    finished: bool,
}

impl<'a> PassGuard<'a> {
    fn new(registrar: &'a ToolRegistrar) -> Self {
        Self {
            registrar,
            finished: false,
        }
    }

    fn finish(&mut self) {
        self.finished = true;
    }
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let mut state = self.registrar.state.write();
        if *state == RegistrarState::Initializing {
            *state = RegistrarState::Uninitialized;
            crate::log_warn!(
                self.registrar.logger,
                "[ToolRegistrar] Initialization of {} was interrupted",
                self.registrar.name
            );
        }
    }
}

/// Builds and owns the filtered action registry for one tool set
pub struct ToolRegistrar {
    name: String,
    filter: ToolCatalogFilter,
    names: NameFilter,
    on_collision: CollisionPolicy,
    coercion: CoercionMode,
    debug_filtering: bool,
    session: RwLock<Option<Arc<dyn Session>>>,
    state: RwLock<RegistrarState>,
    registry: RwLock<Arc<ActionRegistry>>,
    logger: Arc<dyn Logger>,
}

impl ToolRegistrar {
    /// Create a registrar without a session
    ///
    /// Fails with [`ToolError::Configuration`] when the filter options mix
    /// structured annotation filters with legacy toolset tags.
    pub fn new(options: RegistrarOptions, logger: Arc<dyn Logger>) -> ToolResult<Self> {
        let filter = ToolCatalogFilter::from_options(options.filter)?
            .with_logger(logger.clone(), options.debug_filtering);

        let mut names = NameFilter::new().with_exclude(options.exclude_tools);
        if let Some(include) = options.include_tools {
            names = names.with_include(include);
        }

        Ok(Self {
            name: options.name,
            filter,
            names,
            on_collision: options.on_collision,
            coercion: options.coercion,
            debug_filtering: options.debug_filtering,
            session: RwLock::new(None),
            state: RwLock::new(RegistrarState::Uninitialized),
            registry: RwLock::new(Arc::new(ActionRegistry::new())),
            logger,
        })
    }

    /// Create a registrar bound to a session, logging nowhere
    pub fn with_session(options: RegistrarOptions, session: Arc<dyn Session>) -> ToolResult<Self> {
        let registrar = Self::new(options, Arc::new(NoOpLogger::new()))?;
        registrar.set_session(session);
        Ok(registrar)
    }

    /// Set the session (for lazy initialization)
    pub fn set_session(&self, session: Arc<dyn Session>) {
        *self.session.write() = Some(session);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> RegistrarState {
        *self.state.read()
    }

    pub fn filter(&self) -> &ToolCatalogFilter {
        &self.filter
    }

    /// Fetch, filter and publish the catalogue
    ///
    /// A no-op when already `Ready`. Without a session this fails with
    /// [`ToolError::Connection`] and the state stays `Uninitialized`.
    /// Any later failure moves the registrar to `Failed`; call
    /// [`reset`](Self::reset) before trying again. If the returned future is
    /// dropped mid-pass (a timeout, a cancelled task) the registrar goes back
    /// to `Uninitialized`.
    pub async fn initialize(&self) -> ToolResult<()> {
        let session = {
            let mut state = self.state.write();
            match *state {
                RegistrarState::Ready => {
                    crate::log_debug!(self.logger, "[ToolRegistrar] {} already initialized", self.name);
                    return Ok(());
                }
                RegistrarState::Initializing => {
                    return Err(ToolError::InvalidState(format!(
                        "{} is already initializing",
                        self.name
                    )))
                }
                RegistrarState::Failed => {
                    return Err(ToolError::InvalidState(format!(
                        "{} failed to initialize; reset it before retrying",
                        self.name
                    )))
                }
                RegistrarState::Uninitialized => {}
            }

            let session = self.session.read().clone().ok_or_else(|| {
                ToolError::Connection(format!("{}: no active session; connect before initializing", self.name))
            })?;
            *state = RegistrarState::Initializing;
            session
        };

        let mut pass = PassGuard::new(self);
        let built = self.build_registry(session).await;
        pass.finish();

        match built {
            Ok(registry) => {
                let count = registry.len();
                *self.registry.write() = Arc::new(registry);
                *self.state.write() = RegistrarState::Ready;
                crate::log_info!(self.logger, "[ToolRegistrar] {} initialized with {} tools", self.name, count);
                Ok(())
            }
            Err(e) => {
                *self.state.write() = RegistrarState::Failed;
                crate::log_error!(self.logger, "[ToolRegistrar] Failed to initialize {}: {}", self.name, e);
                Err(e)
            }
        }
    }

    /// Drop the published registry and return to `Uninitialized`
    pub fn reset(&self) -> ToolResult<()> {
        let mut state = self.state.write();
        if *state == RegistrarState::Initializing {
            return Err(ToolError::InvalidState(format!(
                "cannot reset {} while it is initializing",
                self.name
            )));
        }
        *self.registry.write() = Arc::new(ActionRegistry::new());
        *state = RegistrarState::Uninitialized;
        Ok(())
    }

    /// Reset and initialize again against the current catalogue
    pub async fn refresh(&self) -> ToolResult<()> {
        self.reset()?;
        self.initialize().await
    }

    /// Snapshot of the published registry
    pub fn actions(&self) -> Arc<ActionRegistry> {
        self.registry.read().clone()
    }

    pub fn action(&self, name: &str) -> Option<RegisteredAction> {
        self.registry.read().get(name).cloned()
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.registry.read().names()
    }

    /// Invoke a published action by name
    pub async fn invoke(&self, name: &str, arguments: Map<String, Value>) -> ToolResult<ActionOutput> {
        let action = self
            .action(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        action.invoke(arguments).await
    }

    async fn build_registry(&self, session: Arc<dyn Session>) -> ToolResult<ActionRegistry> {
        session.initialize_session().await.map_err(ToolError::Discovery)?;
        let catalogue = session.list_tools().await.map_err(ToolError::Discovery)?;
        crate::log_debug!(
            self.logger,
            "[ToolRegistrar] {} discovered {} tools",
            self.name,
            catalogue.len()
        );

        let filtered = self.filter.apply(catalogue);
        self.warn_unknown_names(&filtered);

        let selected: Vec<ToolDescriptor> = filtered
            .into_iter()
            .filter(|tool| self.names.matches(&tool.name))
            .collect();
        if self.debug_filtering {
            crate::log_debug!(
                self.logger,
                "[ToolRegistrar] === FINAL FILTERED TOOLS COUNT: {} ===",
                selected.len()
            );
        }

        let mut registry = ActionRegistry::new();
        for descriptor in selected {
            let action = match build_action(descriptor, session.clone(), self.coercion, self.logger.clone()) {
                Ok(action) => action,
                Err(e) => {
                    crate::log_warn!(self.logger, "[ToolRegistrar] {}", e);
                    continue;
                }
            };

            let name = action.name.clone();
            if registry.insert(action).is_some() {
                match self.on_collision {
                    CollisionPolicy::LastWins => crate::log_warn!(
                        self.logger,
                        "[ToolRegistrar] Tool '{}' appears more than once; keeping the last definition",
                        name
                    ),
                    CollisionPolicy::Error => return Err(ToolError::DuplicateTool(name)),
                }
            }
        }

        if self.debug_filtering {
            crate::log_debug!(
                self.logger,
                "[ToolRegistrar] === REGISTERED FUNCTIONS: {} ===",
                registry.len()
            );
        }
        Ok(registry)
    }

    fn warn_unknown_names(&self, available: &[ToolDescriptor]) {
        let (includes, excludes) = self
            .names
            .unknown_names(available.iter().map(|t| t.name.as_str()));
        if !includes.is_empty() {
            crate::log_warn!(
                self.logger,
                "[ToolRegistrar] include_tools not found in {}: {}",
                self.name,
                includes.join(", ")
            );
        }
        if !excludes.is_empty() {
            crate::log_warn!(
                self.logger,
                "[ToolRegistrar] exclude_tools not found in {}: {}",
                self.name,
                excludes.join(", ")
            );
        }
    }
}

impl fmt::Debug for ToolRegistrar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistrar")
            .field("name", &self.name)
            .field("state", &self.state())
            .field("tools", &self.tool_names())
            .finish()
    }
}

fn build_action(
    descriptor: ToolDescriptor,
    session: Arc<dyn Session>,
    mode: CoercionMode,
    logger: Arc<dyn Logger>,
) -> ToolResult<RegisteredAction> {
    if descriptor.name.trim().is_empty() {
        return Err(ToolError::registration("<unnamed>", "tool name is empty"));
    }
    let schema = ParameterSchema::parse(&descriptor.input_schema)
        .map_err(|message| ToolError::registration(&descriptor.name, message))?;

    let schema = Arc::new(schema);
    let tool = descriptor.name.clone();
    let entrypoint: ActionFn = Arc::new(move |arguments: Map<String, Value>| {
        let session = session.clone();
        let schema = schema.clone();
        let logger = logger.clone();
        let tool = tool.clone();
        async move { run_action(session, &tool, &schema, mode, logger, arguments).await }.boxed()
    });

    Ok(RegisteredAction {
        name: descriptor.name,
        description: descriptor.description,
        parameter_schema: descriptor.input_schema,
        entrypoint,
    })
}

async fn run_action(
    session: Arc<dyn Session>,
    tool: &str,
    schema: &ParameterSchema,
    mode: CoercionMode,
    logger: Arc<dyn Logger>,
    arguments: Map<String, Value>,
) -> ToolResult<ActionOutput> {
    let coercion = coerce_arguments(arguments, schema);
    for warning in &coercion.warnings {
        crate::log_warn!(logger, "[ToolRegistrar] {}: {}", tool, warning);
    }
    if mode == CoercionMode::Strict && !coercion.warnings.is_empty() {
        return Err(ToolError::Coercion {
            tool: tool.to_string(),
            warnings: coercion.warnings,
        });
    }
    if !coercion.changed.is_empty() {
        crate::log_debug!(logger, "[ToolRegistrar] {}: coerced {}", tool, coercion.changed.join(", "));
    }

    match session.call_tool(tool, coercion.arguments).await? {
        CallOutcome::Complete(value) => Ok(ActionOutput::Single(value)),
        CallOutcome::Stream(mut stream) => {
            let mut chunks = Vec::new();
            while let Some(chunk) = stream.next().await {
                chunks.push(chunk?);
            }
            Ok(ActionOutput::Collected(chunks))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::MemoryLogger;
    use crate::session::{MockResponse, MockSession, SessionError};
    use crate::tools::filter::FilterSpec;
    use serde_json::json;

    fn tool(name: &str, toolsets: &[&str]) -> ToolDescriptor {
        ToolDescriptor::new(name, format!("{} tool", name))
            .with_annotation("toolsets", toolsets.to_vec())
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "limit": {"type": "integer"},
                    "verbose": {"type": "boolean"}
                }
            }))
    }

    fn catalogue() -> Vec<ToolDescriptor> {
        vec![
            tool("system_status", &["performance"]),
            tool("active_jobs", &["performance"]),
            tool("list_schemas", &["sysadmin_browse"]),
        ]
    }

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn registrar(options: RegistrarOptions, session: Arc<MockSession>) -> ToolRegistrar {
        ToolRegistrar::with_session(options, session).unwrap()
    }

    /// Handshakes, then never answers a listing
    struct StalledSession;

    #[async_trait::async_trait]
    impl Session for StalledSession {
        async fn initialize_session(&self) -> crate::session::SessionResult<()> {
            Ok(())
        }

        async fn list_tools(&self) -> crate::session::SessionResult<Vec<ToolDescriptor>> {
            futures::future::pending().await
        }

        async fn call_tool(
            &self,
            _name: &str,
            _arguments: Map<String, Value>,
        ) -> crate::session::SessionResult<CallOutcome> {
            futures::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_timed_out_initialize_can_be_retried() {
        let logger = Arc::new(MemoryLogger::new());
        let registrar = ToolRegistrar::new(RegistrarOptions::new(), logger.clone()).unwrap();
        registrar.set_session(Arc::new(StalledSession));

        let outcome = tokio::time::timeout(std::time::Duration::from_millis(50), registrar.initialize()).await;
        assert!(outcome.is_err());
        assert_eq!(registrar.state(), RegistrarState::Uninitialized);
        assert!(logger.contains("warn", "was interrupted"));
        assert!(registrar.reset().is_ok());

        registrar.set_session(Arc::new(MockSession::new(catalogue())));
        registrar.initialize().await.unwrap();
        assert_eq!(registrar.state(), RegistrarState::Ready);
        assert_eq!(registrar.tool_names().len(), 3);
    }

    #[tokio::test]
    async fn test_initialize_filters_by_toolset() {
        let session = Arc::new(MockSession::new(catalogue()));
        let options = RegistrarOptions::new().with_filter(ToolFilterOptions::new().with_toolsets("performance"));
        let registrar = registrar(options, session.clone());

        assert_eq!(registrar.state(), RegistrarState::Uninitialized);
        registrar.initialize().await.unwrap();

        assert_eq!(registrar.state(), RegistrarState::Ready);
        assert_eq!(registrar.tool_names(), vec!["system_status", "active_jobs"]);
        assert_eq!(session.init_count(), 1);
    }

    #[tokio::test]
    async fn test_initialize_twice_is_noop() {
        let session = Arc::new(MockSession::new(catalogue()));
        let registrar = registrar(RegistrarOptions::new(), session.clone());

        registrar.initialize().await.unwrap();
        let first = registrar.actions();
        registrar.initialize().await.unwrap();

        assert_eq!(session.list_count(), 1);
        assert!(Arc::ptr_eq(&first, &registrar.actions()));
    }

    #[tokio::test]
    async fn test_malformed_schema_is_skipped() {
        let broken = ToolDescriptor::new("b", "broken").with_schema(json!({"properties": 3}));
        let session = Arc::new(MockSession::new(vec![tool("a", &[]), broken, tool("c", &[])]));
        let logger = Arc::new(MemoryLogger::new());
        let registrar = ToolRegistrar::new(RegistrarOptions::new(), logger.clone()).unwrap();
        registrar.set_session(session);

        registrar.initialize().await.unwrap();

        assert_eq!(registrar.state(), RegistrarState::Ready);
        assert_eq!(registrar.tool_names(), vec!["a", "c"]);
        assert!(logger.contains("warn", "Failed to register tool 'b'"));
    }

    #[tokio::test]
    async fn test_no_match_is_ready_and_empty() {
        let tools: Vec<ToolDescriptor> = (0..10).map(|i| tool(&format!("tool_{}", i), &["performance"])).collect();
        let session = Arc::new(MockSession::new(tools));
        let options = RegistrarOptions::new().with_filter(
            ToolFilterOptions::new().with_annotation_filters(FilterSpec::toolsets(["nonexistent"])),
        );
        let registrar = registrar(options, session);

        registrar.initialize().await.unwrap();

        assert_eq!(registrar.state(), RegistrarState::Ready);
        assert!(registrar.actions().is_empty());
    }

    #[tokio::test]
    async fn test_exclude_wins_over_include() {
        let session = Arc::new(MockSession::new(vec![tool("x", &[]), tool("y", &[]), tool("z", &[])]));
        let options = RegistrarOptions::new().with_include(["x", "y"]).with_exclude(["y"]);
        let registrar = registrar(options, session);

        registrar.initialize().await.unwrap();
        assert_eq!(registrar.tool_names(), vec!["x"]);
    }

    #[tokio::test]
    async fn test_unknown_names_warn() {
        let session = Arc::new(MockSession::new(catalogue()));
        let logger = Arc::new(MemoryLogger::new());
        let options = RegistrarOptions::new()
            .with_include(["system_status", "missing_tool"])
            .with_exclude(["ghost"]);
        let registrar = ToolRegistrar::new(options, logger.clone()).unwrap();
        registrar.set_session(session);

        registrar.initialize().await.unwrap();

        assert_eq!(registrar.tool_names(), vec!["system_status"]);
        assert!(logger.contains("warn", "include_tools not found in mcp-tools: missing_tool"));
        assert!(logger.contains("warn", "exclude_tools not found in mcp-tools: ghost"));
    }

    #[tokio::test]
    async fn test_invoke_coerces_arguments() {
        let session = Arc::new(MockSession::new(catalogue()));
        let registrar = registrar(RegistrarOptions::new(), session.clone());
        registrar.initialize().await.unwrap();

        let output = registrar
            .invoke("active_jobs", args(json!({"limit": "5", "verbose": "yes", "extra": "kept"})))
            .await
            .unwrap();

        let value = output.into_value();
        assert_eq!(value["arguments"], json!({"limit": 5, "verbose": true, "extra": "kept"}));
        assert_eq!(session.calls()[0].name, "active_jobs");
    }

    #[tokio::test]
    async fn test_lenient_coercion_forwards_raw_value() {
        let session = Arc::new(MockSession::new(catalogue()));
        let logger = Arc::new(MemoryLogger::new());
        let registrar = ToolRegistrar::new(RegistrarOptions::new(), logger.clone()).unwrap();
        registrar.set_session(session.clone());
        registrar.initialize().await.unwrap();

        registrar.invoke("active_jobs", args(json!({"limit": "abc"}))).await.unwrap();

        assert_eq!(session.calls()[0].arguments["limit"], json!("abc"));
        assert!(logger.contains("warn", "Failed to coerce parameter limit to integer"));
    }

    #[tokio::test]
    async fn test_strict_coercion_rejects_call() {
        let session = Arc::new(MockSession::new(catalogue()));
        let options = RegistrarOptions::new().with_coercion(CoercionMode::Strict);
        let registrar = registrar(options, session.clone());
        registrar.initialize().await.unwrap();

        let err = registrar
            .invoke("active_jobs", args(json!({"limit": "abc"})))
            .await
            .unwrap_err();

        match err {
            ToolError::Coercion { tool, warnings } => {
                assert_eq!(tool, "active_jobs");
                assert_eq!(warnings[0].parameter, "limit");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(session.calls().is_empty());
    }

    #[tokio::test]
    async fn test_stream_is_drained_in_order() {
        let session = Arc::new(
            MockSession::new(catalogue())
                .with_response("system_status", MockResponse::Chunks(vec![json!(1), json!(2), json!(3)])),
        );
        let registrar = registrar(RegistrarOptions::new(), session);
        registrar.initialize().await.unwrap();

        let output = registrar.invoke("system_status", Map::new()).await.unwrap();
        assert_eq!(output, ActionOutput::Collected(vec![json!(1), json!(2), json!(3)]));
    }

    #[tokio::test]
    async fn test_remote_failure_passes_through() {
        let session = Arc::new(
            MockSession::new(catalogue()).with_response("system_status", MockResponse::Error("SQL0204".to_string())),
        );
        let registrar = registrar(RegistrarOptions::new(), session);
        registrar.initialize().await.unwrap();

        let err = registrar.invoke("system_status", Map::new()).await.unwrap_err();
        assert!(err.is_remote());
        match err {
            ToolError::RemoteInvocation(SessionError::ToolFailed { tool, message }) => {
                assert_eq!(tool, "system_status");
                assert_eq!(message, "SQL0204");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stream_failure_passes_through() {
        let session = Arc::new(MockSession::new(catalogue()).with_response(
            "system_status",
            MockResponse::StreamError {
                chunks: vec![json!("partial")],
                message: "lost connection".to_string(),
            },
        ));
        let registrar = registrar(RegistrarOptions::new(), session);
        registrar.initialize().await.unwrap();

        let err = registrar.invoke("system_status", Map::new()).await.unwrap_err();
        assert!(err.is_remote());
    }

    #[tokio::test]
    async fn test_context_is_not_forwarded() {
        let session = Arc::new(MockSession::new(catalogue()));
        let registrar = registrar(RegistrarOptions::new(), session.clone());
        registrar.initialize().await.unwrap();

        let context = CallContext {
            agent_id: Some("ibmi-performance-monitor".to_string()),
            ..Default::default()
        };
        let action = registrar.action("system_status").unwrap();
        action
            .invoke_with_context(&context, args(json!({"limit": 1})))
            .await
            .unwrap();

        assert_eq!(session.calls()[0].arguments, args(json!({"limit": 1})));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let session = Arc::new(MockSession::new(catalogue()));
        let registrar = registrar(RegistrarOptions::new(), session);
        registrar.initialize().await.unwrap();

        let err = registrar.invoke("nope", Map::new()).await.unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool(name) if name == "nope"));
    }

    #[tokio::test]
    async fn test_missing_session() {
        let registrar = ToolRegistrar::new(RegistrarOptions::new(), Arc::new(NoOpLogger::new())).unwrap();

        let err = registrar.initialize().await.unwrap_err();
        assert!(matches!(err, ToolError::Connection(_)));
        assert_eq!(registrar.state(), RegistrarState::Uninitialized);
    }

    #[tokio::test]
    async fn test_failure_then_reset() {
        let session = Arc::new(MockSession::new(catalogue()));
        session.fail_listing(Some("connection refused".to_string()));
        let registrar = registrar(RegistrarOptions::new(), session.clone());

        let err = registrar.initialize().await.unwrap_err();
        assert!(matches!(err, ToolError::Discovery(SessionError::Transport(_))));
        assert_eq!(registrar.state(), RegistrarState::Failed);
        assert!(registrar.actions().is_empty());

        let err = registrar.initialize().await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidState(_)));

        session.fail_listing(None);
        registrar.reset().unwrap();
        registrar.initialize().await.unwrap();
        assert_eq!(registrar.state(), RegistrarState::Ready);
        assert_eq!(registrar.actions().len(), 3);
    }

    #[tokio::test]
    async fn test_refresh_picks_up_new_catalogue() {
        let session = Arc::new(MockSession::new(catalogue()));
        let registrar = registrar(RegistrarOptions::new(), session.clone());
        registrar.initialize().await.unwrap();

        session.set_tools(vec![tool("new_tool", &[])]);
        registrar.refresh().await.unwrap();

        assert_eq!(registrar.tool_names(), vec!["new_tool"]);
        assert_eq!(session.list_count(), 2);
    }

    #[tokio::test]
    async fn test_collision_last_wins() {
        let first = ToolDescriptor::new("dup", "first");
        let second = ToolDescriptor::new("dup", "second");
        let session = Arc::new(MockSession::new(vec![first, tool("other", &[]), second]));
        let logger = Arc::new(MemoryLogger::new());
        let registrar = ToolRegistrar::new(RegistrarOptions::new(), logger.clone()).unwrap();
        registrar.set_session(session);

        registrar.initialize().await.unwrap();

        assert_eq!(registrar.tool_names(), vec!["dup", "other"]);
        assert_eq!(registrar.action("dup").unwrap().description, "second");
        assert!(logger.contains("warn", "'dup' appears more than once"));
    }

    #[tokio::test]
    async fn test_collision_error_policy() {
        let session = Arc::new(MockSession::new(vec![
            ToolDescriptor::new("dup", "first"),
            ToolDescriptor::new("dup", "second"),
        ]));
        let options = RegistrarOptions::new().with_collision_policy(CollisionPolicy::Error);
        let registrar = registrar(options, session);

        let err = registrar.initialize().await.unwrap_err();
        assert!(matches!(err, ToolError::DuplicateTool(name) if name == "dup"));
        assert_eq!(registrar.state(), RegistrarState::Failed);
        assert!(registrar.actions().is_empty());
    }

    #[test]
    fn test_conflicting_filter_forms() {
        let options = RegistrarOptions::new().with_filter(
            ToolFilterOptions::new()
                .with_toolsets("performance")
                .with_annotation_filters(FilterSpec::toolsets(["performance"])),
        );
        let err = ToolRegistrar::new(options, Arc::new(NoOpLogger::new())).unwrap_err();
        assert!(matches!(err, ToolError::Configuration(_)));
    }
}
