//! Find My device and friend location tools.

use serde_json::Value;

use crate::mcp::tools::{ToolContext, ToolResult};
use crate::Result;

pub(crate) async fn get_devices(ctx: &ToolContext, _arguments: Value) -> Result<ToolResult> {
    let resp = ctx.client.findmy_devices().await?;
    Ok(ToolResult::json(&resp.data_or_null()))
}

pub(crate) async fn refresh_devices(ctx: &ToolContext, _arguments: Value) -> Result<ToolResult> {
    let resp = ctx.client.refresh_findmy_devices().await?;
    Ok(ToolResult::json(&resp.data_or_null()))
}

pub(crate) async fn get_friends(ctx: &ToolContext, _arguments: Value) -> Result<ToolResult> {
    let resp = ctx.client.findmy_friends().await?;
    Ok(ToolResult::json(&resp.data_or_null()))
}

pub(crate) async fn refresh_friends(ctx: &ToolContext, _arguments: Value) -> Result<ToolResult> {
    let resp = ctx.client.refresh_findmy_friends().await?;
    Ok(ToolResult::json(&resp.data_or_null()))
}
