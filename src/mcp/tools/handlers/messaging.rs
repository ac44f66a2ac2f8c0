//! Message sending, editing, reactions, and search.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{enrich_message_list, enrich_message_one};
use crate::api::{ChatMessagesParams, MessageQuery, NewChat, Reaction, TextMessage};
use crate::mcp::tools::{parse_args, ToolContext, ToolResult};
use crate::{Error, Result};

/// Tapback names the upstream server understands, with and without the
/// removal prefix.
const REACTIONS: &[&str] = &[
    "love",
    "like",
    "dislike",
    "laugh",
    "emphasize",
    "question",
    "-love",
    "-like",
    "-dislike",
    "-laugh",
    "-emphasize",
    "-question",
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendMessageArgs {
    chat_guid: String,
    message: String,
    method: Option<String>,
    effect_id: Option<String>,
    subject: Option<String>,
}

pub(crate) async fn send_message(ctx: &ToolContext, arguments: Value) -> Result<ToolResult> {
    let args: SendMessageArgs = parse_args(arguments)?;
    debug!(chat_guid = %args.chat_guid, "sending message");
    let resp = ctx
        .client
        .send_text(&TextMessage {
            chat_guid: args.chat_guid,
            message: args.message,
            method: args.method,
            effect_id: args.effect_id,
            subject: args.subject,
            selected_message_guid: None,
            part_index: None,
        })
        .await?;
    Ok(ToolResult::json(&resp))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendToAddressArgs {
    address: String,
    message: String,
    service: Option<String>,
}

pub(crate) async fn send_message_to_address(
    ctx: &ToolContext,
    arguments: Value,
) -> Result<ToolResult> {
    let args: SendToAddressArgs = parse_args(arguments)?;
    let resp = ctx
        .client
        .create_chat(&NewChat {
            addresses: vec![args.address],
            message: Some(args.message),
            service: args.service,
        })
        .await?;
    Ok(ToolResult::json(&resp))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplyArgs {
    chat_guid: String,
    message: String,
    reply_guid: String,
    part_index: Option<i64>,
}

pub(crate) async fn reply_to_message(ctx: &ToolContext, arguments: Value) -> Result<ToolResult> {
    let args: ReplyArgs = parse_args(arguments)?;
    let resp = ctx
        .client
        .send_text(&TextMessage {
            chat_guid: args.chat_guid,
            message: args.message,
            method: None,
            effect_id: None,
            subject: None,
            selected_message_guid: Some(args.reply_guid),
            part_index: Some(args.part_index.unwrap_or(0)),
        })
        .await?;
    Ok(ToolResult::json(&resp))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReactArgs {
    chat_guid: String,
    selected_message_guid: String,
    reaction: String,
    part_index: Option<i64>,
}

pub(crate) async fn react_to_message(ctx: &ToolContext, arguments: Value) -> Result<ToolResult> {
    let args: ReactArgs = parse_args(arguments)?;
    if !REACTIONS.contains(&args.reaction.as_str()) {
        return Err(Error::InvalidInput(format!(
            "Unknown reaction: {}",
            args.reaction
        )));
    }
    let resp = ctx
        .client
        .react(&Reaction {
            chat_guid: args.chat_guid,
            selected_message_guid: args.selected_message_guid,
            reaction: args.reaction,
            part_index: Some(args.part_index.unwrap_or(0)),
        })
        .await?;
    Ok(ToolResult::json(&resp))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EditArgs {
    message_guid: String,
    edited_message: String,
    backwards_compat_message: String,
    part_index: Option<i64>,
}

pub(crate) async fn edit_message(ctx: &ToolContext, arguments: Value) -> Result<ToolResult> {
    let args: EditArgs = parse_args(arguments)?;
    let resp = ctx
        .client
        .edit_message(
            &args.message_guid,
            &args.edited_message,
            &args.backwards_compat_message,
            Some(args.part_index.unwrap_or(0)),
        )
        .await?;
    Ok(ToolResult::json(&resp))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnsendArgs {
    message_guid: String,
    part_index: Option<i64>,
}

pub(crate) async fn unsend_message(ctx: &ToolContext, arguments: Value) -> Result<ToolResult> {
    let args: UnsendArgs = parse_args(arguments)?;
    let resp = ctx
        .client
        .unsend_message(&args.message_guid, Some(args.part_index.unwrap_or(0)))
        .await?;
    Ok(ToolResult::json(&resp))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchArgs {
    chat_guid: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
    sort: Option<String>,
    after: Option<i64>,
    before: Option<i64>,
    with_chat: Option<bool>,
}

pub(crate) async fn search_messages(ctx: &ToolContext, arguments: Value) -> Result<ToolResult> {
    let args: SearchArgs = parse_args(arguments)?;
    let mut with = vec!["handle".to_string()];
    if args.with_chat.unwrap_or(false) {
        with.push("chat".to_string());
    }
    let mut resp = ctx
        .client
        .query_messages(&MessageQuery {
            chat_guid: args.chat_guid,
            limit: Some(args.limit.unwrap_or(25)),
            offset: Some(args.offset.unwrap_or(0)),
            sort: Some(args.sort.unwrap_or_else(|| "DESC".to_string())),
            after: args.after,
            before: args.before,
            with: Some(with),
        })
        .await?;
    enrich_message_list(&mut resp, &ctx.resolver).await;
    Ok(ToolResult::json(&resp))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecentMessagesArgs {
    chat_guid: String,
    limit: Option<i64>,
    offset: Option<i64>,
    sort: Option<String>,
    after: Option<String>,
    before: Option<String>,
}

pub(crate) async fn get_recent_messages(ctx: &ToolContext, arguments: Value) -> Result<ToolResult> {
    let args: RecentMessagesArgs = parse_args(arguments)?;
    let mut resp = ctx
        .client
        .chat_messages(
            &args.chat_guid,
            &ChatMessagesParams {
                limit: Some(args.limit.unwrap_or(25)),
                offset: Some(args.offset.unwrap_or(0)),
                sort: Some(args.sort.unwrap_or_else(|| "DESC".to_string())),
                after: args.after,
                before: args.before,
                with: Some("handle".to_string()),
            },
        )
        .await?;
    enrich_message_list(&mut resp, &ctx.resolver).await;
    Ok(ToolResult::json(&resp))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetMessageArgs {
    message_guid: String,
    with_chat: Option<bool>,
}

pub(crate) async fn get_message(ctx: &ToolContext, arguments: Value) -> Result<ToolResult> {
    let args: GetMessageArgs = parse_args(arguments)?;
    let with = if args.with_chat.unwrap_or(false) {
        "chat,handle"
    } else {
        "handle"
    };
    let mut resp = ctx.client.get_message(&args.message_guid, Some(with)).await?;
    enrich_message_one(&mut resp, &ctx.resolver).await;
    Ok(ToolResult::json(&resp))
}
