//! Tool trait and name-keyed dispatch registry.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;

/// A tool an agent can invoke by name with a JSON payload.
#[async_trait]
pub trait AgentTool: Send + Sync {
    /// Unique tool name for routing.
    fn name(&self) -> &str;

    /// Human-readable description surfaced in tool discovery.
    fn description(&self) -> &str;

    /// Executes the tool with an optional JSON payload.
    async fn execute(&self, payload: Option<serde_json::Value>) -> Result<serde_json::Value>;
}

/// Discovery entry for one registered tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
}

/// Registry of agent tools that can be dispatched by name.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn AgentTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    pub fn register(&mut self, tool: Arc<dyn AgentTool>) {
        self.tools.push(tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn AgentTool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    /// Discovery listing in registration order.
    pub fn descriptors(&self) -> Vec<ToolInfo> {
        self.tools
            .iter()
            .map(|t| ToolInfo {
                name: t.name().to_string(),
                description: t.description().to_string(),
            })
            .collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
