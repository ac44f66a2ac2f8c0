//! MCP tool implementations.
//!
//! # Module Structure
//!
//! - [`definitions`]: JSON Schema definitions for every tool
//! - [`handlers`]: tool execution logic, grouped the way the upstream API
//!   groups endpoints (messaging, chat, contacts, findmy, server)

mod definitions;
mod handlers;

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::ApiClient;
use crate::enrichment::ContactResolver;
use crate::{Error, Result};

/// Everything a tool handler needs: the API client and the resolver that
/// enriches chat/message payloads before they go back to the agent.
pub(crate) struct ToolContext {
    pub client: ApiClient,
    pub resolver: Arc<ContactResolver<ApiClient>>,
}

/// Registry of MCP tools.
pub struct ToolRegistry {
    /// Available tools.
    tools: HashMap<String, ToolDefinition>,
    /// Shared handler context.
    context: ToolContext,
}

impl ToolRegistry {
    /// Creates a registry with the full BlueBubbles tool set.
    #[must_use]
    pub fn new(client: ApiClient, resolver: Arc<ContactResolver<ApiClient>>) -> Self {
        let mut tools = HashMap::new();
        for tool in definitions::all_tools() {
            tools.insert(tool.name.clone(), tool);
        }

        Self {
            tools,
            context: ToolContext { client, resolver },
        }
    }

    /// Returns all tool definitions.
    #[must_use]
    pub fn list_tools(&self) -> Vec<&ToolDefinition> {
        self.tools.values().collect()
    }

    /// Gets a tool definition by name.
    #[must_use]
    pub fn get_tool(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    /// Executes a tool with the given arguments.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown tools, invalid arguments, or upstream
    /// request failures. The server maps these into `isError` tool
    /// results rather than protocol errors.
    pub async fn execute(&self, name: &str, arguments: Value) -> Result<ToolResult> {
        let ctx = &self.context;
        match name {
            // Messaging
            "bb_send_message" => handlers::messaging::send_message(ctx, arguments).await,
            "bb_send_message_to_address" => {
                handlers::messaging::send_message_to_address(ctx, arguments).await
            }
            "bb_reply_to_message" => handlers::messaging::reply_to_message(ctx, arguments).await,
            "bb_react_to_message" => handlers::messaging::react_to_message(ctx, arguments).await,
            "bb_edit_message" => handlers::messaging::edit_message(ctx, arguments).await,
            "bb_unsend_message" => handlers::messaging::unsend_message(ctx, arguments).await,
            "bb_search_messages" => handlers::messaging::search_messages(ctx, arguments).await,
            "bb_get_recent_messages" => {
                handlers::messaging::get_recent_messages(ctx, arguments).await
            }
            "bb_get_message" => handlers::messaging::get_message(ctx, arguments).await,
            // Chats
            "bb_list_chats" => handlers::chat::list_chats(ctx, arguments).await,
            "bb_get_chat" => handlers::chat::get_chat(ctx, arguments).await,
            "bb_create_group_chat" => handlers::chat::create_group_chat(ctx, arguments).await,
            "bb_rename_group_chat" => handlers::chat::rename_group_chat(ctx, arguments).await,
            "bb_add_participant" => handlers::chat::add_participant(ctx, arguments).await,
            "bb_remove_participant" => handlers::chat::remove_participant(ctx, arguments).await,
            "bb_mark_chat_read" => handlers::chat::mark_chat_read(ctx, arguments).await,
            "bb_mark_chat_unread" => handlers::chat::mark_chat_unread(ctx, arguments).await,
            "bb_start_typing" => handlers::chat::start_typing(ctx, arguments).await,
            "bb_stop_typing" => handlers::chat::stop_typing(ctx, arguments).await,
            "bb_leave_chat" => handlers::chat::leave_chat(ctx, arguments).await,
            "bb_delete_chat" => handlers::chat::delete_chat(ctx, arguments).await,
            "bb_delete_message" => handlers::chat::delete_message(ctx, arguments).await,
            // Contacts
            "bb_get_contacts" => handlers::contacts::get_contacts(ctx, arguments).await,
            "bb_search_contacts" => handlers::contacts::search_contacts(ctx, arguments).await,
            "bb_get_contact_detail" => {
                handlers::contacts::get_contact_detail(ctx, arguments).await
            }
            "bb_get_contact_photo" => handlers::contacts::get_contact_photo(ctx, arguments).await,
            "bb_check_imessage_status" => {
                handlers::contacts::check_imessage_status(ctx, arguments).await
            }
            "bb_get_suggested_names" => {
                handlers::contacts::get_suggested_names(ctx, arguments).await
            }
            "bb_detect_business" => handlers::contacts::detect_business(ctx, arguments).await,
            // Find My
            "bb_get_findmy_devices" => handlers::findmy::get_devices(ctx, arguments).await,
            "bb_refresh_findmy_devices" => handlers::findmy::refresh_devices(ctx, arguments).await,
            "bb_get_findmy_friends" => handlers::findmy::get_friends(ctx, arguments).await,
            "bb_refresh_findmy_friends" => handlers::findmy::refresh_friends(ctx, arguments).await,
            // Server
            "bb_get_server_info" => handlers::server::get_server_info(ctx, arguments).await,
            "bb_get_server_stats" => handlers::server::get_server_stats(ctx, arguments).await,
            "bb_get_handles" => handlers::server::get_handles(ctx, arguments).await,
            "bb_check_handle_availability" => {
                handlers::server::check_handle_availability(ctx, arguments).await
            }
            "bb_get_focus_status" => handlers::server::get_focus_status(ctx, arguments).await,
            "bb_get_scheduled_messages" => {
                handlers::server::get_scheduled_messages(ctx, arguments).await
            }
            "bb_create_scheduled_message" => {
                handlers::server::create_scheduled_message(ctx, arguments).await
            }
            "bb_delete_scheduled_message" => {
                handlers::server::delete_scheduled_message(ctx, arguments).await
            }
            "bb_restart_imessage" => handlers::server::restart_imessage(ctx, arguments).await,
            _ => Err(Error::InvalidInput(format!("Unknown tool: {name}"))),
        }
    }
}

/// Definition of an MCP tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name.
    pub name: String,
    /// Tool description.
    pub description: String,
    /// JSON Schema for input validation.
    pub input_schema: Value,
}

/// Result of a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Content returned by the tool.
    pub content: Vec<ToolContent>,
    /// Whether the result represents an error.
    #[serde(default)]
    pub is_error: bool,
}

impl ToolResult {
    /// A successful result rendering the value as pretty JSON.
    pub(crate) fn json(value: &impl Serialize) -> Self {
        let text = serde_json::to_string_pretty(value)
            .unwrap_or_else(|_| "null".to_string());
        Self {
            content: vec![ToolContent::Text { text }],
            is_error: false,
        }
    }
}

/// Content types that can be returned by tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
}

/// Deserializes tool arguments into a typed struct.
pub(crate) fn parse_args<T: serde::de::DeserializeOwned>(arguments: Value) -> Result<T> {
    serde_json::from_value(arguments).map_err(|e| Error::InvalidInput(e.to_string()))
}
