//! MCP prompt implementations.
//!
//! Prompts fetch live data from the messaging server and hand the agent
//! a ready-to-use instruction with the conversation context inlined.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{ApiClient, ChatMessagesParams, ChatQuery};
use crate::enrichment::{Chat, ContactResolver, Message};
use crate::{Error, Result};

/// Definition of an MCP prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Prompt name.
    pub name: String,
    /// Prompt description.
    pub description: String,
    /// Arguments the prompt accepts.
    pub arguments: Vec<PromptArgument>,
}

/// An argument accepted by a prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptArgument {
    /// Argument name.
    pub name: String,
    /// Argument description.
    pub description: String,
    /// Whether the argument is required.
    pub required: bool,
}

/// A message in a prompt result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptMessage {
    /// Message role (`user` or `assistant`).
    pub role: String,
    /// Message content.
    pub content: PromptContent,
}

/// Content of a prompt message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PromptContent {
    /// Text content.
    Text {
        /// The text.
        text: String,
    },
}

/// A rendered prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptResult {
    /// Description of what the prompt does.
    pub description: String,
    /// Messages making up the prompt.
    pub messages: Vec<PromptMessage>,
}

impl PromptResult {
    fn user(description: &str, text: String) -> Self {
        Self {
            description: description.to_string(),
            messages: vec![PromptMessage {
                role: "user".to_string(),
                content: PromptContent::Text { text },
            }],
        }
    }
}

/// Registry of MCP prompts.
pub struct PromptRegistry {
    client: ApiClient,
    resolver: Arc<ContactResolver<ApiClient>>,
}

impl PromptRegistry {
    /// Creates a prompt registry.
    #[must_use]
    pub fn new(client: ApiClient, resolver: Arc<ContactResolver<ApiClient>>) -> Self {
        Self { client, resolver }
    }

    /// Returns all prompt definitions.
    #[must_use]
    pub fn list_prompts(&self) -> Vec<PromptDefinition> {
        vec![
            PromptDefinition {
                name: "summarize_chat".to_string(),
                description: "Summarize the recent history of a conversation".to_string(),
                arguments: vec![PromptArgument {
                    name: "chatGuid".to_string(),
                    description: "The chat GUID to summarize".to_string(),
                    required: true,
                }],
            },
            PromptDefinition {
                name: "draft_reply".to_string(),
                description: "Draft a reply that fits the tone of a conversation".to_string(),
                arguments: vec![
                    PromptArgument {
                        name: "chatGuid".to_string(),
                        description: "The chat GUID to draft a reply for".to_string(),
                        required: true,
                    },
                    PromptArgument {
                        name: "instructions".to_string(),
                        description: "Optional guidance for the reply (tone, content, length)"
                            .to_string(),
                        required: false,
                    },
                ],
            },
            PromptDefinition {
                name: "catch_up".to_string(),
                description: "Review recent conversations and surface what needs attention"
                    .to_string(),
                arguments: vec![],
            },
        ]
    }

    /// Renders a prompt with live data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for unknown prompts or missing
    /// arguments and [`Error::Upstream`] when the upstream request fails.
    pub async fn get_prompt(&self, name: &str, arguments: &Value) -> Result<PromptResult> {
        match name {
            "summarize_chat" => self.summarize_chat(required_arg(arguments, "chatGuid")?).await,
            "draft_reply" => {
                let chat_guid = required_arg(arguments, "chatGuid")?;
                let instructions = arguments.get("instructions").and_then(Value::as_str);
                self.draft_reply(chat_guid, instructions).await
            }
            "catch_up" => self.catch_up().await,
            _ => Err(Error::InvalidInput(format!("Unknown prompt: {name}"))),
        }
    }

    async fn summarize_chat(&self, chat_guid: &str) -> Result<PromptResult> {
        let transcript = self.transcript(chat_guid, 50).await?;
        let text = format!(
            "Summarize the following iMessage conversation. Mention the main topics, \
             any decisions made, and anything that still needs a response.\n\n{transcript}"
        );
        Ok(PromptResult::user(
            "Summary of the recent conversation",
            text,
        ))
    }

    async fn draft_reply(
        &self,
        chat_guid: &str,
        instructions: Option<&str>,
    ) -> Result<PromptResult> {
        let transcript = self.transcript(chat_guid, 25).await?;
        let guidance = instructions
            .map(|i| format!("\n\nGuidance for the reply: {i}"))
            .unwrap_or_default();
        let text = format!(
            "Draft a reply to the most recent message in this iMessage conversation. \
             Match the tone and length of the existing messages. Return only the reply \
             text.{guidance}\n\n{transcript}"
        );
        Ok(PromptResult::user("A drafted reply", text))
    }

    async fn catch_up(&self) -> Result<PromptResult> {
        let resp = self
            .client
            .query_chats(&ChatQuery {
                limit: Some(20),
                offset: Some(0),
                sort: Some("lastmessage".to_string()),
                with: Some(vec!["lastMessage".to_string()]),
            })
            .await?;
        let mut chats: Vec<Chat> =
            serde_json::from_value(resp.data_or_null()).unwrap_or_default();
        self.resolver.enrich_chats(&mut chats).await;

        let mut lines = Vec::with_capacity(chats.len());
        for chat in &chats {
            let name = chat
                .display_name
                .clone()
                .filter(|n| !n.is_empty())
                .or_else(|| chat.guid.clone())
                .unwrap_or_else(|| "Unknown chat".to_string());
            let last = chat
                .extra
                .get("lastMessage")
                .and_then(|m| m.get("text"))
                .and_then(Value::as_str)
                .unwrap_or("[no text]");
            lines.push(format!("- {name}: {last}"));
        }
        let text = format!(
            "Here are my most recent conversations with their latest messages. \
             Tell me which ones likely need a reply and summarize what each is \
             waiting on.\n\n{}",
            lines.join("\n")
        );
        Ok(PromptResult::user("Overview of recent conversations", text))
    }

    /// Fetches recent messages for a chat and renders them oldest first.
    async fn transcript(&self, chat_guid: &str, limit: i64) -> Result<String> {
        let resp = self
            .client
            .chat_messages(
                chat_guid,
                &ChatMessagesParams {
                    limit: Some(limit),
                    offset: Some(0),
                    sort: Some("DESC".to_string()),
                    after: None,
                    before: None,
                    with: Some("handle".to_string()),
                },
            )
            .await?;
        let mut messages: Vec<Message> =
            serde_json::from_value(resp.data_or_null()).unwrap_or_default();
        self.resolver.enrich_messages(&mut messages).await;
        messages.reverse();

        let lines: Vec<String> = messages.iter().map(transcript_line).collect();
        Ok(lines.join("\n"))
    }
}

fn required_arg<'a>(arguments: &'a Value, name: &str) -> Result<&'a str> {
    arguments
        .get(name)
        .and_then(Value::as_str)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::InvalidInput(format!("Missing required argument: {name}")))
}

fn transcript_line(msg: &Message) -> String {
    let sender = if msg
        .extra
        .get("isFromMe")
        .and_then(Value::as_bool)
        .unwrap_or(false)
    {
        "Me".to_string()
    } else {
        msg.sender_name
            .clone()
            .or_else(|| msg.sender_address().map(str::to_string))
            .unwrap_or_else(|| "Unknown".to_string())
    };
    let text = msg
        .extra
        .get("text")
        .and_then(Value::as_str)
        .unwrap_or("[attachment or non-text message]");
    format!("{sender}: {text}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;

    fn registry() -> PromptRegistry {
        let client = ApiClient::new(&ServerConfig::new("http://localhost:1234", "pw")).unwrap();
        let resolver = Arc::new(ContactResolver::new(client.clone()));
        PromptRegistry::new(client, resolver)
    }

    #[test]
    fn test_list_prompts_marks_chat_guid_required() {
        let prompts = registry().list_prompts();
        assert_eq!(prompts.len(), 3);
        let summarize = prompts.iter().find(|p| p.name == "summarize_chat").unwrap();
        assert!(summarize.arguments[0].required);
        let catch_up = prompts.iter().find(|p| p.name == "catch_up").unwrap();
        assert!(catch_up.arguments.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_prompt_is_invalid_input() {
        let result = registry().get_prompt("nope", &serde_json::json!({})).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_summarize_requires_chat_guid() {
        let result = registry()
            .get_prompt("summarize_chat", &serde_json::json!({}))
            .await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_transcript_line_prefers_resolved_sender() {
        let msg: Message = serde_json::from_value(serde_json::json!({
            "guid": "m1",
            "text": "see you there",
            "_senderName": "Alice Smith",
            "handle": { "address": "+15551234567" }
        }))
        .unwrap();
        assert_eq!(transcript_line(&msg), "Alice Smith: see you there");
    }

    #[test]
    fn test_transcript_line_uses_me_for_own_messages() {
        let msg: Message = serde_json::from_value(serde_json::json!({
            "guid": "m2",
            "text": "on my way",
            "isFromMe": true,
            "handle": { "address": "+15551234567" }
        }))
        .unwrap();
        assert_eq!(transcript_line(&msg), "Me: on my way");
    }
}
