//! MCP server implementation.
//!
//! Provides a Model Context Protocol server over stdio so AI agents can
//! drive a BlueBubbles messaging server.
//!
//! ## Features
//!
//! - **Tools**: the `bb_*` family: send/search/react to messages, manage
//!   chats and participants, look up contacts, Find My, server admin
//! - **Resources**: `bluebubbles://server/info`, `bluebubbles://chats`,
//!   `bluebubbles://chat/{guid}/messages`
//! - **Prompts**: `summarize_chat`, `draft_reply`, `catch_up`
//!
//! ## Claude Desktop Configuration
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "bluebubbles": {
//!       "command": "bluebubbles-mcp",
//!       "args": ["serve"],
//!       "env": {
//!         "BLUEBUBBLES_URL": "http://localhost:1234",
//!         "BLUEBUBBLES_PASSWORD": "your-password"
//!       }
//!     }
//!   }
//! }
//! ```

mod dispatch;
mod prompts;
mod resources;
mod server;
mod tools;

pub use prompts::{PromptArgument, PromptDefinition, PromptMessage, PromptRegistry, PromptResult};
pub use resources::{ResourceContent, ResourceDefinition, ResourceHandler};
pub use server::{McpServer, RateLimitConfig};
pub use tools::{ToolContent, ToolDefinition, ToolRegistry, ToolResult};
