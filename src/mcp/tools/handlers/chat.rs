//! Chat listing, group management, and read-state tools.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{enrich_chat_list, enrich_chat_one};
use crate::api::{ChatQuery, NewChat};
use crate::mcp::tools::{parse_args, ToolContext, ToolResult};
use crate::{Error, Result};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListChatsArgs {
    limit: Option<i64>,
    offset: Option<i64>,
    sort: Option<String>,
}

pub(crate) async fn list_chats(ctx: &ToolContext, arguments: Value) -> Result<ToolResult> {
    let args: ListChatsArgs = parse_args(arguments)?;
    let mut resp = ctx
        .client
        .query_chats(&ChatQuery {
            limit: Some(args.limit.unwrap_or(25)),
            offset: Some(args.offset.unwrap_or(0)),
            sort: Some(args.sort.unwrap_or_else(|| "lastmessage".to_string())),
            with: Some(vec!["lastMessage".to_string()]),
        })
        .await?;
    enrich_chat_list(&mut resp, &ctx.resolver).await;
    Ok(ToolResult::json(&resp))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatGuidArgs {
    chat_guid: String,
}

pub(crate) async fn get_chat(ctx: &ToolContext, arguments: Value) -> Result<ToolResult> {
    let args: ChatGuidArgs = parse_args(arguments)?;
    let mut resp = ctx.client.get_chat(&args.chat_guid).await?;
    enrich_chat_one(&mut resp, &ctx.resolver).await;
    Ok(ToolResult::json(&resp))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateGroupArgs {
    addresses: Vec<String>,
    message: Option<String>,
    service: Option<String>,
}

pub(crate) async fn create_group_chat(ctx: &ToolContext, arguments: Value) -> Result<ToolResult> {
    let args: CreateGroupArgs = parse_args(arguments)?;
    if args.addresses.len() < 2 {
        return Err(Error::InvalidInput(
            "A group chat needs at least 2 addresses".to_string(),
        ));
    }
    debug!(participants = args.addresses.len(), "creating group chat");
    let resp = ctx
        .client
        .create_chat(&NewChat {
            addresses: args.addresses,
            message: args.message,
            service: args.service,
        })
        .await?;
    Ok(ToolResult::json(&resp))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenameArgs {
    chat_guid: String,
    display_name: String,
}

pub(crate) async fn rename_group_chat(ctx: &ToolContext, arguments: Value) -> Result<ToolResult> {
    let args: RenameArgs = parse_args(arguments)?;
    let resp = ctx
        .client
        .update_chat(&args.chat_guid, &args.display_name)
        .await?;
    Ok(ToolResult::json(&resp))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParticipantArgs {
    chat_guid: String,
    address: String,
}

pub(crate) async fn add_participant(ctx: &ToolContext, arguments: Value) -> Result<ToolResult> {
    let args: ParticipantArgs = parse_args(arguments)?;
    let resp = ctx
        .client
        .add_participant(&args.chat_guid, &args.address)
        .await?;
    Ok(ToolResult::json(&resp))
}

pub(crate) async fn remove_participant(ctx: &ToolContext, arguments: Value) -> Result<ToolResult> {
    let args: ParticipantArgs = parse_args(arguments)?;
    let resp = ctx
        .client
        .remove_participant(&args.chat_guid, &args.address)
        .await?;
    Ok(ToolResult::json(&resp))
}

pub(crate) async fn mark_chat_read(ctx: &ToolContext, arguments: Value) -> Result<ToolResult> {
    let args: ChatGuidArgs = parse_args(arguments)?;
    let resp = ctx.client.mark_chat_read(&args.chat_guid).await?;
    Ok(ToolResult::json(&resp))
}

pub(crate) async fn mark_chat_unread(ctx: &ToolContext, arguments: Value) -> Result<ToolResult> {
    let args: ChatGuidArgs = parse_args(arguments)?;
    let resp = ctx.client.mark_chat_unread(&args.chat_guid).await?;
    Ok(ToolResult::json(&resp))
}

pub(crate) async fn start_typing(ctx: &ToolContext, arguments: Value) -> Result<ToolResult> {
    let args: ChatGuidArgs = parse_args(arguments)?;
    let resp = ctx.client.start_typing(&args.chat_guid).await?;
    Ok(ToolResult::json(&resp))
}

pub(crate) async fn stop_typing(ctx: &ToolContext, arguments: Value) -> Result<ToolResult> {
    let args: ChatGuidArgs = parse_args(arguments)?;
    let resp = ctx.client.stop_typing(&args.chat_guid).await?;
    Ok(ToolResult::json(&resp))
}

pub(crate) async fn leave_chat(ctx: &ToolContext, arguments: Value) -> Result<ToolResult> {
    let args: ChatGuidArgs = parse_args(arguments)?;
    let resp = ctx.client.leave_chat(&args.chat_guid).await?;
    Ok(ToolResult::json(&resp))
}

pub(crate) async fn delete_chat(ctx: &ToolContext, arguments: Value) -> Result<ToolResult> {
    let args: ChatGuidArgs = parse_args(arguments)?;
    let resp = ctx.client.delete_chat(&args.chat_guid).await?;
    Ok(ToolResult::json(&resp))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteMessageArgs {
    chat_guid: String,
    message_guid: String,
}

pub(crate) async fn delete_message(ctx: &ToolContext, arguments: Value) -> Result<ToolResult> {
    let args: DeleteMessageArgs = parse_args(arguments)?;
    let resp = ctx
        .client
        .delete_chat_message(&args.chat_guid, &args.message_guid)
        .await?;
    Ok(ToolResult::json(&resp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::config::ServerConfig;
    use crate::enrichment::ContactResolver;
    use std::sync::Arc;

    fn test_context() -> ToolContext {
        let client = ApiClient::new(&ServerConfig::new("http://localhost:1234", "pw")).unwrap();
        let resolver = Arc::new(ContactResolver::new(client.clone()));
        ToolContext { client, resolver }
    }

    #[tokio::test]
    async fn test_create_group_chat_rejects_single_address() {
        let ctx = test_context();
        let result = create_group_chat(
            &ctx,
            serde_json::json!({ "addresses": ["+15551234567"] }),
        )
        .await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_list_chats_args_default_to_none() {
        let args: ListChatsArgs = parse_args(serde_json::json!({})).unwrap();
        assert!(args.limit.is_none());
        assert!(args.sort.is_none());
    }
}
