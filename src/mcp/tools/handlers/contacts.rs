//! Contact lookup tools.

use serde::Deserialize;
use serde_json::Value;

use crate::mcp::tools::{parse_args, ToolContext, ToolResult};
use crate::Result;

pub(crate) async fn get_contacts(ctx: &ToolContext, _arguments: Value) -> Result<ToolResult> {
    let resp = ctx.client.contacts().await?;
    Ok(ToolResult::json(&resp.data_or_null()))
}

#[derive(Debug, Deserialize)]
struct SearchContactsArgs {
    query: String,
}

pub(crate) async fn search_contacts(ctx: &ToolContext, arguments: Value) -> Result<ToolResult> {
    let args: SearchContactsArgs = parse_args(arguments)?;
    let clauses = serde_json::json!([{
        "statement": "firstName LIKE :query OR lastName LIKE :query OR displayName LIKE :query",
        "args": { "query": format!("%{}%", args.query) }
    }]);
    let resp = ctx.client.query_contacts(&clauses).await?;
    Ok(ToolResult::json(&resp.data_or_null()))
}

#[derive(Debug, Deserialize)]
struct AddressArgs {
    address: String,
}

pub(crate) async fn get_contact_detail(ctx: &ToolContext, arguments: Value) -> Result<ToolResult> {
    let args: AddressArgs = parse_args(arguments)?;
    let resp = ctx.client.contact_for_handle(&args.address).await?;
    Ok(ToolResult::json(&resp.data_or_null()))
}

#[derive(Debug, Deserialize)]
struct ContactPhotoArgs {
    address: String,
    quality: Option<String>,
}

pub(crate) async fn get_contact_photo(ctx: &ToolContext, arguments: Value) -> Result<ToolResult> {
    let args: ContactPhotoArgs = parse_args(arguments)?;
    let resp = ctx
        .client
        .contact_photo(&args.address, args.quality.as_deref())
        .await?;
    Ok(ToolResult::json(&resp.data_or_null()))
}

#[derive(Debug, Deserialize)]
struct BatchCheckArgs {
    addresses: Vec<String>,
}

pub(crate) async fn check_imessage_status(
    ctx: &ToolContext,
    arguments: Value,
) -> Result<ToolResult> {
    let args: BatchCheckArgs = parse_args(arguments)?;
    let resp = ctx.client.batch_check_imessage(&args.addresses).await?;
    Ok(ToolResult::json(&resp.data_or_null()))
}

pub(crate) async fn get_suggested_names(ctx: &ToolContext, _arguments: Value) -> Result<ToolResult> {
    let resp = ctx.client.suggested_names().await?;
    Ok(ToolResult::json(&resp.data_or_null()))
}

pub(crate) async fn detect_business(ctx: &ToolContext, arguments: Value) -> Result<ToolResult> {
    let args: AddressArgs = parse_args(arguments)?;
    let resp = ctx.client.detect_business(&args.address).await?;
    Ok(ToolResult::json(&resp.data_or_null()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_clause_wraps_query_in_wildcards() {
        let clauses = serde_json::json!([{
            "statement": "firstName LIKE :query OR lastName LIKE :query OR displayName LIKE :query",
            "args": { "query": format!("%{}%", "Ali") }
        }]);
        assert_eq!(clauses[0]["args"]["query"], "%Ali%");
    }

    #[test]
    fn test_address_args_reject_missing_field() {
        let result: crate::Result<AddressArgs> = parse_args(serde_json::json!({}));
        assert!(result.is_err());
    }
}
