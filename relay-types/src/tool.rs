//! Shared tool metadata types (§3, §4.6).

use serde::{Deserialize, Serialize};

/// Behavioral class of a tool. Drives the scheduler's default confirmation
/// policy (§3): anything beyond `Pure` is confirmed unless approval mode is
/// `Yolo` or the tool/source is allowlisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    /// Read-only, no side effects (e.g. grep, read file).
    Pure,
    /// Mutates local state (e.g. write file, edit).
    Mutating,
    /// Runs an external process (e.g. shell).
    Executing,
    /// Performs network I/O (e.g. web fetch).
    Fetching,
}

/// Static, model-facing description of a tool.
///
/// Carries everything the registry needs to advertise the tool and the
/// scheduler needs to pick a default confirmation policy. The executable
/// behavior lives behind the `ToolDescriptor` trait in `relay-tool`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolMeta {
    /// Sanitized, registry-unique name (see `relay_tool::sanitize_name`).
    pub name: String,
    /// Human-facing label.
    pub display_name: String,
    /// Description shown to the model.
    pub description: String,
    /// JSON Schema of the tool's parameters.
    pub params_schema: serde_json::Value,
    /// Behavioral class.
    pub kind: ToolKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_roundtrips_through_serde() {
        for kind in [
            ToolKind::Pure,
            ToolKind::Mutating,
            ToolKind::Executing,
            ToolKind::Fetching,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            let back: ToolKind = serde_json::from_str(&json).unwrap();
            assert_eq!(kind, back);
        }
    }
}
