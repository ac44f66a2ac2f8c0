//! Tool execution logic, grouped the way the upstream API groups
//! endpoints.
//!
//! Handlers that return chats or messages run the payload through the
//! [`ContactResolver`] before rendering, so agents see contact names
//! instead of bare phone numbers. Enrichment is best effort: payloads
//! that don't deserialize are returned untouched.

pub(crate) mod chat;
pub(crate) mod contacts;
pub(crate) mod findmy;
pub(crate) mod messaging;
pub(crate) mod server;

use crate::api::{ApiClient, ApiResponse};
use crate::enrichment::{Chat, ContactResolver, Message};

/// Enriches a `data` payload holding a list of chats.
pub(super) async fn enrich_chat_list(resp: &mut ApiResponse, resolver: &ContactResolver<ApiClient>) {
    let Some(data) = resp.data.take() else { return };
    match serde_json::from_value::<Vec<Chat>>(data.clone()) {
        Ok(mut chats) => {
            resolver.enrich_chats(&mut chats).await;
            resp.data = serde_json::to_value(chats).ok().or(Some(data));
        }
        Err(_) => resp.data = Some(data),
    }
}

/// Enriches a `data` payload holding a single chat.
pub(super) async fn enrich_chat_one(resp: &mut ApiResponse, resolver: &ContactResolver<ApiClient>) {
    let Some(data) = resp.data.take() else { return };
    match serde_json::from_value::<Chat>(data.clone()) {
        Ok(mut chat) => {
            resolver.enrich_chat(&mut chat).await;
            resp.data = serde_json::to_value(chat).ok().or(Some(data));
        }
        Err(_) => resp.data = Some(data),
    }
}

/// Enriches a `data` payload holding a list of messages.
pub(super) async fn enrich_message_list(
    resp: &mut ApiResponse,
    resolver: &ContactResolver<ApiClient>,
) {
    let Some(data) = resp.data.take() else { return };
    match serde_json::from_value::<Vec<Message>>(data.clone()) {
        Ok(mut messages) => {
            resolver.enrich_messages(&mut messages).await;
            resp.data = serde_json::to_value(messages).ok().or(Some(data));
        }
        Err(_) => resp.data = Some(data),
    }
}

/// Enriches a `data` payload holding a single message.
pub(super) async fn enrich_message_one(
    resp: &mut ApiResponse,
    resolver: &ContactResolver<ApiClient>,
) {
    let Some(data) = resp.data.take() else { return };
    match serde_json::from_value::<Message>(data.clone()) {
        Ok(mut message) => {
            resolver.enrich_message(&mut message).await;
            resp.data = serde_json::to_value(message).ok().or(Some(data));
        }
        Err(_) => resp.data = Some(data),
    }
}
