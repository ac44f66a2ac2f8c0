//! Server status, handles, and scheduled message tools.

use serde::Deserialize;
use serde_json::Value;

use crate::api::HandleQuery;
use crate::mcp::tools::{parse_args, ToolContext, ToolResult};
use crate::Result;

pub(crate) async fn get_server_info(ctx: &ToolContext, _arguments: Value) -> Result<ToolResult> {
    let resp = ctx.client.server_info().await?;
    Ok(ToolResult::json(&resp.data_or_null()))
}

pub(crate) async fn get_server_stats(ctx: &ToolContext, _arguments: Value) -> Result<ToolResult> {
    let (totals, media) = tokio::try_join!(ctx.client.stat_totals(), ctx.client.stat_media())?;
    Ok(ToolResult::json(&serde_json::json!({
        "totals": totals.data_or_null(),
        "media": media.data_or_null(),
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetHandlesArgs {
    limit: Option<i64>,
    offset: Option<i64>,
    address: Option<String>,
}

pub(crate) async fn get_handles(ctx: &ToolContext, arguments: Value) -> Result<ToolResult> {
    let args: GetHandlesArgs = parse_args(arguments)?;
    let resp = ctx
        .client
        .query_handles(&HandleQuery {
            limit: Some(args.limit.unwrap_or(100)),
            offset: Some(args.offset.unwrap_or(0)),
            with: Some(vec!["chat".to_string()]),
            address: args.address,
        })
        .await?;
    Ok(ToolResult::json(&resp.data_or_null()))
}

#[derive(Debug, Deserialize)]
struct AddressArgs {
    address: String,
}

pub(crate) async fn check_handle_availability(
    ctx: &ToolContext,
    arguments: Value,
) -> Result<ToolResult> {
    let args: AddressArgs = parse_args(arguments)?;
    let (imessage, facetime) = tokio::try_join!(
        ctx.client.imessage_availability(&args.address),
        ctx.client.facetime_availability(&args.address),
    )?;
    Ok(ToolResult::json(&serde_json::json!({
        "address": args.address,
        "imessage": imessage.data_or_null(),
        "facetime": facetime.data_or_null(),
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FocusStatusArgs {
    handle_guid: String,
}

pub(crate) async fn get_focus_status(ctx: &ToolContext, arguments: Value) -> Result<ToolResult> {
    let args: FocusStatusArgs = parse_args(arguments)?;
    let resp = ctx.client.focus_status(&args.handle_guid).await?;
    Ok(ToolResult::json(&resp.data_or_null()))
}

pub(crate) async fn get_scheduled_messages(
    ctx: &ToolContext,
    _arguments: Value,
) -> Result<ToolResult> {
    let resp = ctx.client.scheduled_messages().await?;
    Ok(ToolResult::json(&resp.data_or_null()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateScheduledArgs {
    chat_guid: String,
    message: String,
    scheduled_for: String,
    method: Option<String>,
}

pub(crate) async fn create_scheduled_message(
    ctx: &ToolContext,
    arguments: Value,
) -> Result<ToolResult> {
    let args: CreateScheduledArgs = parse_args(arguments)?;
    let body = serde_json::json!({
        "chatGuid": args.chat_guid,
        "message": args.message,
        "scheduledFor": args.scheduled_for,
        "type": "send-message",
        "payload": {
            "chatGuid": args.chat_guid,
            "message": args.message,
            "method": args.method.as_deref().unwrap_or("apple-script"),
        },
    });
    let resp = ctx.client.create_scheduled_message(&body).await?;
    Ok(ToolResult::json(&resp.data_or_null()))
}

#[derive(Debug, Deserialize)]
struct DeleteScheduledArgs {
    id: String,
}

pub(crate) async fn delete_scheduled_message(
    ctx: &ToolContext,
    arguments: Value,
) -> Result<ToolResult> {
    let args: DeleteScheduledArgs = parse_args(arguments)?;
    let resp = ctx.client.delete_scheduled_message(&args.id).await?;
    Ok(ToolResult::json(&resp.data_or_null()))
}

pub(crate) async fn restart_imessage(ctx: &ToolContext, _arguments: Value) -> Result<ToolResult> {
    let resp = ctx.client.restart_messages_app().await?;
    Ok(ToolResult::json(&resp.data_or_null()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduled_body_defaults_to_apple_script() {
        let args: CreateScheduledArgs = parse_args(serde_json::json!({
            "chatGuid": "iMessage;-;+15551234567",
            "message": "happy birthday!",
            "scheduledFor": "2026-09-01T09:00:00Z"
        }))
        .unwrap();
        assert_eq!(args.method.as_deref().unwrap_or("apple-script"), "apple-script");
    }
}
