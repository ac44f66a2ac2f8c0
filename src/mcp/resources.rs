//! MCP resource implementations.
//!
//! Resources expose read-only views of the messaging server under the
//! `bluebubbles://` scheme. Chat and message payloads are enriched with
//! contact names before they are returned.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::{ApiClient, ChatMessagesParams, ChatQuery};
use crate::enrichment::{Chat, ContactResolver, Message};
use crate::{Error, Result};

/// Definition of an MCP resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDefinition {
    /// Resource URI.
    pub uri: String,
    /// Human-readable name.
    pub name: String,
    /// Resource description.
    pub description: String,
    /// MIME type of the content.
    #[serde(rename = "mimeType")]
    pub mime_type: String,
}

/// Content of a read resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceContent {
    /// Resource URI.
    pub uri: String,
    /// MIME type of the content.
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    /// The content text.
    pub text: String,
}

/// Serves `bluebubbles://` resources from the upstream server.
pub struct ResourceHandler {
    client: ApiClient,
    resolver: Arc<ContactResolver<ApiClient>>,
}

impl ResourceHandler {
    /// Creates a resource handler.
    #[must_use]
    pub fn new(client: ApiClient, resolver: Arc<ContactResolver<ApiClient>>) -> Self {
        Self { client, resolver }
    }

    /// Returns all resource definitions, including the templated
    /// per-chat message feed.
    #[must_use]
    pub fn list_resources(&self) -> Vec<ResourceDefinition> {
        vec![
            ResourceDefinition {
                uri: "bluebubbles://server/info".to_string(),
                name: "Server Info".to_string(),
                description: "BlueBubbles server status, version, and capabilities".to_string(),
                mime_type: "application/json".to_string(),
            },
            ResourceDefinition {
                uri: "bluebubbles://chats".to_string(),
                name: "Recent Chats".to_string(),
                description: "Recent conversations sorted by last message, with contact names resolved".to_string(),
                mime_type: "application/json".to_string(),
            },
            ResourceDefinition {
                uri: "bluebubbles://chat/{guid}/messages".to_string(),
                name: "Chat Messages".to_string(),
                description: "Recent messages in a chat, newest first, with sender names resolved".to_string(),
                mime_type: "application/json".to_string(),
            },
        ]
    }

    /// Reads a resource by URI.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for unknown URIs and
    /// [`Error::Upstream`] when the upstream request fails.
    pub async fn read_resource(&self, uri: &str) -> Result<ResourceContent> {
        let text = match uri {
            "bluebubbles://server/info" => self.server_info().await?,
            "bluebubbles://chats" => self.recent_chats().await?,
            _ => {
                let guid = uri
                    .strip_prefix("bluebubbles://chat/")
                    .and_then(|rest| rest.strip_suffix("/messages"))
                    .filter(|guid| !guid.is_empty())
                    .ok_or_else(|| Error::InvalidInput(format!("Unknown resource: {uri}")))?;
                self.chat_messages(guid).await?
            }
        };

        Ok(ResourceContent {
            uri: uri.to_string(),
            mime_type: "application/json".to_string(),
            text,
        })
    }

    async fn server_info(&self) -> Result<String> {
        let resp = self.client.server_info().await?;
        render(&resp.data_or_null())
    }

    async fn recent_chats(&self) -> Result<String> {
        let resp = self
            .client
            .query_chats(&ChatQuery {
                limit: Some(50),
                offset: Some(0),
                sort: Some("lastmessage".to_string()),
                with: Some(vec!["lastMessage".to_string(), "sms".to_string()]),
            })
            .await?;
        let data = resp.data_or_null();
        match serde_json::from_value::<Vec<Chat>>(data.clone()) {
            Ok(mut chats) => {
                self.resolver.enrich_chats(&mut chats).await;
                render(&chats)
            }
            Err(_) => render(&data),
        }
    }

    async fn chat_messages(&self, guid: &str) -> Result<String> {
        let resp = self
            .client
            .chat_messages(
                guid,
                &ChatMessagesParams {
                    limit: Some(50),
                    offset: Some(0),
                    sort: Some("DESC".to_string()),
                    after: None,
                    before: None,
                    with: Some("chat,handle".to_string()),
                },
            )
            .await?;
        let data = resp.data_or_null();
        match serde_json::from_value::<Vec<Message>>(data.clone()) {
            Ok(mut messages) => {
                self.resolver.enrich_messages(&mut messages).await;
                render(&messages)
            }
            Err(_) => render(&data),
        }
    }
}

fn render(value: &impl Serialize) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| Error::OperationFailed {
        operation: "render resource".to_string(),
        cause: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;

    fn handler() -> ResourceHandler {
        let client = ApiClient::new(&ServerConfig::new("http://localhost:1234", "pw")).unwrap();
        let resolver = Arc::new(ContactResolver::new(client.clone()));
        ResourceHandler::new(client, resolver)
    }

    #[test]
    fn test_list_resources_uses_bluebubbles_scheme() {
        let resources = handler().list_resources();
        assert_eq!(resources.len(), 3);
        for resource in &resources {
            assert!(resource.uri.starts_with("bluebubbles://"));
            assert_eq!(resource.mime_type, "application/json");
        }
    }

    #[tokio::test]
    async fn test_read_unknown_uri_is_invalid_input() {
        let result = handler().read_resource("bluebubbles://nope").await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_read_chat_messages_requires_guid() {
        let result = handler().read_resource("bluebubbles://chat//messages").await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}
