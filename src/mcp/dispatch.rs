//! MCP method dispatch.
//!
//! Maps JSON-RPC method strings onto type-safe enum variants so the
//! server's dispatch is a single exhaustive match. Unknown methods are
//! captured for error reporting.

use std::fmt;

/// MCP protocol method identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum McpMethod {
    /// Initialize the MCP session.
    Initialize,
    /// List available tools.
    ListTools,
    /// Call a specific tool.
    CallTool,
    /// List available resources.
    ListResources,
    /// Read a specific resource.
    ReadResource,
    /// List available prompts.
    ListPrompts,
    /// Get a specific prompt.
    GetPrompt,
    /// Health check.
    Ping,
    /// Unknown method (for error handling).
    Unknown(String),
}

impl McpMethod {
    /// Returns the MCP protocol method name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Initialize => "initialize",
            Self::ListTools => "tools/list",
            Self::CallTool => "tools/call",
            Self::ListResources => "resources/list",
            Self::ReadResource => "resources/read",
            Self::ListPrompts => "prompts/list",
            Self::GetPrompt => "prompts/get",
            Self::Ping => "ping",
            Self::Unknown(s) => s.as_str(),
        }
    }
}

impl From<&str> for McpMethod {
    fn from(s: &str) -> Self {
        match s {
            "initialize" => Self::Initialize,
            "tools/list" => Self::ListTools,
            "tools/call" => Self::CallTool,
            "resources/list" => Self::ListResources,
            "resources/read" => Self::ReadResource,
            "prompts/list" => Self::ListPrompts,
            "prompts/get" => Self::GetPrompt,
            "ping" => Self::Ping,
            unknown => Self::Unknown(unknown.to_string()),
        }
    }
}

impl fmt::Display for McpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_methods_round_trip() {
        for name in [
            "initialize",
            "tools/list",
            "tools/call",
            "resources/list",
            "resources/read",
            "prompts/list",
            "prompts/get",
            "ping",
        ] {
            let method = McpMethod::from(name);
            assert!(!matches!(method, McpMethod::Unknown(_)), "{name}");
            assert_eq!(method.as_str(), name);
        }
    }

    #[test]
    fn test_unknown_method_preserved() {
        let method = McpMethod::from("sampling/createMessage");
        assert_eq!(
            method,
            McpMethod::Unknown("sampling/createMessage".to_string())
        );
        assert_eq!(method.to_string(), "sampling/createMessage");
    }
}
