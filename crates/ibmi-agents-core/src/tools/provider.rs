//! Structural integration point for agent runtimes
//!
//! An orchestration layer discovers tool sets through [`ToolProvider`]
//! rather than by inspecting concrete types.

use async_trait::async_trait;

use super::error::{ToolError, ToolResult};
use super::registrar::{ActionOutput, ToolRegistrar};
use crate::types::{Tool, ToolCall};

/// A named set of tools an agent can call
#[async_trait]
pub trait ToolProvider: Send + Sync {
    /// Name used in logs and by the orchestration layer
    fn provider_name(&self) -> &str;

    /// Currently callable tools, in registration order
    fn tools(&self) -> Vec<Tool>;

    /// Execute one tool call from a model response
    async fn call(&self, call: &ToolCall) -> ToolResult<ActionOutput>;
}

#[async_trait]
impl ToolProvider for ToolRegistrar {
    fn provider_name(&self) -> &str {
        self.name()
    }

    fn tools(&self) -> Vec<Tool> {
        self.actions().iter().map(|action| action.to_tool()).collect()
    }

    async fn call(&self, call: &ToolCall) -> ToolResult<ActionOutput> {
        let arguments = call.arguments().ok_or_else(|| ToolError::InvalidArguments {
            tool: call.name.clone(),
            message: "arguments must be a JSON object".to_string(),
        })?;
        self.invoke(&call.name, arguments).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MockSession;
    use crate::tools::registrar::RegistrarOptions;
    use crate::types::ToolDescriptor;
    use serde_json::json;
    use std::sync::Arc;

    async fn provider() -> Arc<dyn ToolProvider> {
        let session = Arc::new(MockSession::new(vec![
            ToolDescriptor::new("system_status", "Overall system status")
                .with_schema(json!({"properties": {"detailed": {"type": "boolean"}}})),
            ToolDescriptor::new("active_jobs", "Active jobs"),
        ]));
        let registrar = ToolRegistrar::with_session(RegistrarOptions::new().with_name("performance"), session).unwrap();
        registrar.initialize().await.unwrap();
        Arc::new(registrar)
    }

    #[tokio::test]
    async fn test_tools_listed_in_order() {
        let provider = provider().await;
        let tools = provider.tools();

        assert_eq!(provider.provider_name(), "performance");
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].name, "system_status");
        assert_eq!(tools[0].description, "Overall system status");
        assert!(tools[0].input_schema.is_some());
    }

    #[tokio::test]
    async fn test_call_dispatches_by_name() {
        let provider = provider().await;
        let call = ToolCall::new("call_1", "system_status", json!({"detailed": "true"}));

        let output = provider.call(&call).await.unwrap().into_value();
        assert_eq!(output["arguments"]["detailed"], json!(true));
    }

    #[tokio::test]
    async fn test_call_rejects_non_object_arguments() {
        let provider = provider().await;
        let call = ToolCall::new("call_2", "system_status", json!([1, 2]));

        let err = provider.call(&call).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
    }

    #[tokio::test]
    async fn test_null_arguments_are_empty() {
        let provider = provider().await;
        let call = ToolCall::new("call_3", "active_jobs", serde_json::Value::Null);

        let output = provider.call(&call).await.unwrap().into_value();
        assert_eq!(output["arguments"], json!({}));
    }
}
