//! Tool registry (§4.6).

use crate::descriptor::ToolDescriptor;
use crate::sanitize::{sanitize_name, sanitize_schema, qualify_name};
use relay_types::ToolMeta;
use std::collections::HashMap;
use std::sync::Arc;

/// A single model-facing tool declaration: name, description, and a
/// sanitized JSON Schema of its parameters.
#[derive(Debug, Clone)]
pub struct ToolDeclaration {
    /// Registry name.
    pub name: String,
    /// Human-facing description.
    pub description: String,
    /// Schema with unsupported combinations stripped (§4.6).
    pub params_schema: serde_json::Value,
}

/// Registry of tools, keyed by sanitized name.
///
/// Insertion order is irrelevant — the registry is a pure name→descriptor
/// map (§9 design notes).
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn ToolDescriptor>>,
}

impl ToolRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a locally defined (statically known) tool.
    ///
    /// If the name is already registered, the existing entry is
    /// overwritten and a warning is logged.
    pub fn register_static(&mut self, tool: Arc<dyn ToolDescriptor>) {
        let name = sanitize_name(&tool.meta().name);
        if self.tools.contains_key(&name) {
            tracing::warn!(tool = %name, "overwriting existing tool registration");
        }
        self.tools.insert(name, tool);
    }

    /// Register a tool discovered from an external source (e.g. an MCP
    /// server) at runtime.
    ///
    /// If `name` collides with an existing registration, the incoming
    /// tool is re-registered under `{source}__{name}` instead of
    /// overwriting (§4.6, §9).
    pub fn register_dynamic(&mut self, source: &str, tool: Arc<dyn ToolDescriptor>) -> String {
        let name = sanitize_name(&tool.meta().name);
        let final_name = if self.tools.contains_key(&name) {
            qualify_name(source, &name)
        } else {
            name
        };
        self.tools.insert(final_name.clone(), tool);
        final_name
    }

    /// Look up a tool by (already sanitized) name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolDescriptor>> {
        self.tools.get(name).cloned()
    }

    /// Whether a tool is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry has no tools.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Build the model-facing declaration list, with schemas sanitized
    /// per §4.6.
    pub fn declarations(&self) -> Vec<ToolDeclaration> {
        self.tools
            .values()
            .map(|tool| {
                let ToolMeta {
                    name,
                    description,
                    params_schema,
                    ..
                } = tool.meta().clone();
                ToolDeclaration {
                    name,
                    description,
                    params_schema: sanitize_schema(&params_schema),
                }
            })
            .collect()
    }

    /// The same declarations, as full `ToolMeta` values, for callers that
    /// build a `GenerateRequest` directly (`relay-session`).
    pub fn tool_metas(&self) -> Vec<ToolMeta> {
        self.tools
            .values()
            .map(|tool| {
                let mut meta = tool.meta().clone();
                meta.params_schema = sanitize_schema(&meta.params_schema);
                meta
            })
            .collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
