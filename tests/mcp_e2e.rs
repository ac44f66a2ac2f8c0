//! MCP server end-to-end tests.
//!
//! Tests MCP server components in integration, focusing on:
//! - Tool registration and discovery
//! - Resource and prompt listing
//! - Contact enrichment flowing through chat and message payloads
//! - Input validation and error handling
//!
//! These tests verify the internal component integration without requiring
//! a live BlueBubbles server.

// Integration tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use std::sync::Arc;

use bluebubbles_mcp::api::ApiClient;
use bluebubbles_mcp::config::ServerConfig;
use bluebubbles_mcp::enrichment::{Chat, ContactDirectory, ContactResolver, Message, RawContact};

fn offline_client() -> ApiClient {
    ApiClient::new(&ServerConfig::new("http://localhost:1234", "test-password")).unwrap()
}

/// A contact directory serving a fixed list, for exercising enrichment
/// without the network.
#[derive(Clone)]
struct StaticDirectory {
    contacts: Vec<RawContact>,
}

impl StaticDirectory {
    fn with_alice_and_bob() -> Self {
        let contacts = serde_json::from_value(serde_json::json!([
            {
                "displayName": "Alice Smith",
                "phoneNumbers": [{ "address": "+1 (555) 123-4567" }],
                "emails": []
            },
            {
                "firstName": "Bob",
                "lastName": "Jones",
                "phoneNumbers": ["555-987-6543"],
                "emails": [{ "address": "Bob@Example.com" }]
            }
        ]))
        .unwrap();
        Self { contacts }
    }
}

impl ContactDirectory for StaticDirectory {
    fn list_contacts(
        &self,
    ) -> impl Future<Output = bluebubbles_mcp::Result<Vec<RawContact>>> + Send {
        let contacts = self.contacts.clone();
        async move { Ok(contacts) }
    }
}

mod tool_registry {
    use super::*;
    use bluebubbles_mcp::mcp::ToolRegistry;

    fn registry() -> ToolRegistry {
        let client = offline_client();
        let resolver = Arc::new(ContactResolver::new(client.clone()));
        ToolRegistry::new(client, resolver)
    }

    #[test]
    fn test_registry_contains_all_core_tools() {
        let registry = registry();

        // Messaging
        assert!(registry.get_tool("bb_send_message").is_some());
        assert!(registry.get_tool("bb_send_message_to_address").is_some());
        assert!(registry.get_tool("bb_reply_to_message").is_some());
        assert!(registry.get_tool("bb_react_to_message").is_some());
        assert!(registry.get_tool("bb_search_messages").is_some());

        // Chats
        assert!(registry.get_tool("bb_list_chats").is_some());
        assert!(registry.get_tool("bb_get_chat").is_some());
        assert!(registry.get_tool("bb_create_group_chat").is_some());
        assert!(registry.get_tool("bb_mark_chat_read").is_some());

        // Contacts
        assert!(registry.get_tool("bb_get_contacts").is_some());
        assert!(registry.get_tool("bb_search_contacts").is_some());

        // Find My and server admin
        assert!(registry.get_tool("bb_get_findmy_devices").is_some());
        assert!(registry.get_tool("bb_get_server_info").is_some());
        assert!(registry.get_tool("bb_create_scheduled_message").is_some());
    }

    #[test]
    fn test_tool_count() {
        let registry = registry();
        let tools = registry.list_tools();

        assert!(
            tools.len() >= 40,
            "Expected at least 40 tools, got {}",
            tools.len()
        );
    }

    #[test]
    fn test_tool_definitions_have_required_fields() {
        let registry = registry();

        for tool in registry.list_tools() {
            assert!(!tool.name.is_empty());
            assert!(tool.name.starts_with("bb_"), "{} lacks prefix", tool.name);
            assert!(!tool.description.is_empty(), "{} lacks description", tool.name);
            assert_eq!(
                tool.input_schema["type"], "object",
                "{} schema is not an object",
                tool.name
            );
        }
    }

    #[tokio::test]
    async fn test_unknown_tool_returns_error() {
        let result = registry()
            .execute("bb_not_a_tool", serde_json::json!({}))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_invalid_arguments_return_error() {
        // chatGuid must be a string
        let result = registry()
            .execute("bb_send_message", serde_json::json!({ "chatGuid": 42 }))
            .await;
        assert!(result.is_err());
    }
}

mod resources {
    use super::*;
    use bluebubbles_mcp::mcp::ResourceHandler;

    fn handler() -> ResourceHandler {
        let client = offline_client();
        let resolver = Arc::new(ContactResolver::new(client.clone()));
        ResourceHandler::new(client, resolver)
    }

    #[test]
    fn test_resources_are_listed() {
        let resources = handler().list_resources();
        let uris: Vec<&str> = resources.iter().map(|r| r.uri.as_str()).collect();

        assert!(uris.contains(&"bluebubbles://server/info"));
        assert!(uris.contains(&"bluebubbles://chats"));
        assert!(uris.contains(&"bluebubbles://chat/{guid}/messages"));
    }

    #[tokio::test]
    async fn test_unknown_uri_is_rejected() {
        let result = handler().read_resource("file:///etc/passwd").await;
        assert!(result.is_err());
    }
}

mod prompts {
    use super::*;
    use bluebubbles_mcp::mcp::PromptRegistry;

    fn registry() -> PromptRegistry {
        let client = offline_client();
        let resolver = Arc::new(ContactResolver::new(client.clone()));
        PromptRegistry::new(client, resolver)
    }

    #[test]
    fn test_prompts_are_listed() {
        let prompts = registry().list_prompts();
        let names: Vec<&str> = prompts.iter().map(|p| p.name.as_str()).collect();

        assert!(names.contains(&"summarize_chat"));
        assert!(names.contains(&"draft_reply"));
        assert!(names.contains(&"catch_up"));
    }

    #[tokio::test]
    async fn test_prompt_with_missing_argument_is_rejected() {
        let result = registry()
            .get_prompt("draft_reply", &serde_json::json!({}))
            .await;
        assert!(result.is_err());
    }
}

mod enrichment_flow {
    use super::*;

    #[tokio::test]
    async fn test_chat_display_names_are_filled_from_contacts() {
        let resolver = ContactResolver::new(StaticDirectory::with_alice_and_bob());

        let mut chats: Vec<Chat> = serde_json::from_value(serde_json::json!([
            {
                "guid": "iMessage;-;+15551234567",
                "participants": [{ "address": "+15551234567" }]
            },
            {
                "guid": "iMessage;+;chat9",
                "displayName": "Family",
                "participants": [{ "address": "+15551234567" }]
            }
        ]))
        .unwrap();

        resolver.enrich_chats(&mut chats).await;

        assert_eq!(chats[0].display_name.as_deref(), Some("Alice Smith"));
        assert_eq!(chats[0].resolved_name, Some(true));
        // Existing group names are left alone
        assert_eq!(chats[1].display_name.as_deref(), Some("Family"));
        assert_eq!(chats[1].resolved_name, None);
    }

    #[tokio::test]
    async fn test_message_sender_names_survive_serialization() {
        let resolver = ContactResolver::new(StaticDirectory::with_alice_and_bob());

        let mut message: Message = serde_json::from_value(serde_json::json!({
            "guid": "m1",
            "text": "lunch?",
            "handle": { "address": "(555) 987-6543" }
        }))
        .unwrap();

        resolver.enrich_message(&mut message).await;
        assert_eq!(message.sender_name.as_deref(), Some("Bob Jones"));

        let round_tripped = serde_json::to_value(&message).unwrap();
        assert_eq!(round_tripped["_senderName"], "Bob Jones");
        assert_eq!(round_tripped["text"], "lunch?");
    }

    #[tokio::test]
    async fn test_email_addresses_resolve_case_insensitively() {
        let resolver = ContactResolver::new(StaticDirectory::with_alice_and_bob());
        assert_eq!(
            resolver.resolve("BOB@example.COM").await.as_deref(),
            Some("Bob Jones")
        );
    }
}
