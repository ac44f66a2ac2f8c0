//! Tool definitions for MCP tools.
//!
//! Contains the JSON Schema definitions for every BlueBubbles tool,
//! grouped like the upstream API surface.

use super::ToolDefinition;
use serde_json::json;

/// All tool definitions.
pub fn all_tools() -> Vec<ToolDefinition> {
    let mut tools = messaging_tools();
    tools.extend(chat_tools());
    tools.extend(contacts_tools());
    tools.extend(findmy_tools());
    tools.extend(server_tools());
    tools
}

fn tool(name: &str, description: &str, input_schema: serde_json::Value) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        input_schema,
    }
}

/// Schema shorthand for tools without parameters.
fn no_params() -> serde_json::Value {
    json!({ "type": "object", "properties": {}, "required": [] })
}

fn messaging_tools() -> Vec<ToolDefinition> {
    vec![
        tool(
            "bb_send_message",
            "Send a text message to an existing iMessage/SMS chat. Requires the chat GUID \
             (e.g. 'iMessage;-;+1234567890' for a DM or 'iMessage;+;chat123456' for a group \
             chat). Use bb_list_chats to find chat GUIDs.",
            json!({
                "type": "object",
                "properties": {
                    "chatGuid": {
                        "type": "string",
                        "description": "The chat GUID to send the message to (e.g. 'iMessage;-;+1234567890')"
                    },
                    "message": { "type": "string", "description": "The text message to send" },
                    "method": {
                        "type": "string",
                        "enum": ["private-api", "apple-script"],
                        "description": "Send method. 'private-api' supports more features. Defaults to server setting."
                    },
                    "effectId": {
                        "type": "string",
                        "description": "iMessage effect ID (e.g. 'com.apple.MobileSMS.expressivesend.impact' for slam)"
                    },
                    "subject": { "type": "string", "description": "Subject line for the message" }
                },
                "required": ["chatGuid", "message"]
            }),
        ),
        tool(
            "bb_send_message_to_address",
            "Start a new conversation or send a message to a phone number or email address. \
             Creates a new chat if one doesn't exist. Use this when you have a phone number or \
             email but not a chat GUID.",
            json!({
                "type": "object",
                "properties": {
                    "address": {
                        "type": "string",
                        "description": "Phone number (e.g. '+1234567890') or email address to message"
                    },
                    "message": { "type": "string", "description": "The text message to send" },
                    "service": {
                        "type": "string",
                        "enum": ["iMessage", "SMS"],
                        "description": "Service to use. Defaults to iMessage."
                    }
                },
                "required": ["address", "message"]
            }),
        ),
        tool(
            "bb_reply_to_message",
            "Reply to a specific message in a chat. The reply will appear as a threaded reply \
             linked to the original message. Requires the Private API.",
            json!({
                "type": "object",
                "properties": {
                    "chatGuid": { "type": "string", "description": "The chat GUID containing the message to reply to" },
                    "message": { "type": "string", "description": "The reply text" },
                    "replyGuid": { "type": "string", "description": "The GUID of the message to reply to" },
                    "partIndex": { "type": "integer", "description": "Part index of the message to reply to (default 0)" }
                },
                "required": ["chatGuid", "message", "replyGuid"]
            }),
        ),
        tool(
            "bb_react_to_message",
            "Add a tapback reaction to a message. Valid reactions: 'love', 'like', 'dislike', \
             'laugh', 'emphasize', 'question'. Prefix with '-' to remove a reaction \
             (e.g. '-love'). Requires the Private API.",
            json!({
                "type": "object",
                "properties": {
                    "chatGuid": { "type": "string", "description": "The chat GUID containing the message" },
                    "selectedMessageGuid": { "type": "string", "description": "The GUID of the message to react to" },
                    "reaction": {
                        "type": "string",
                        "enum": [
                            "love", "like", "dislike", "laugh", "emphasize", "question",
                            "-love", "-like", "-dislike", "-laugh", "-emphasize", "-question"
                        ],
                        "description": "The reaction type. Prefix with '-' to remove."
                    },
                    "partIndex": { "type": "integer", "description": "Part index of the message to react to (default 0)" }
                },
                "required": ["chatGuid", "selectedMessageGuid", "reaction"]
            }),
        ),
        tool(
            "bb_edit_message",
            "Edit a previously sent iMessage. Only works on messages you sent, and only on \
             iMessage (not SMS). Requires the Private API and macOS Ventura+.",
            json!({
                "type": "object",
                "properties": {
                    "messageGuid": { "type": "string", "description": "The GUID of the message to edit" },
                    "editedMessage": { "type": "string", "description": "The new message text" },
                    "backwardsCompatMessage": {
                        "type": "string",
                        "description": "Fallback text shown to recipients on older devices (e.g. 'Edited to: new text')"
                    },
                    "partIndex": { "type": "integer", "description": "Part index of the message to edit (default 0)" }
                },
                "required": ["messageGuid", "editedMessage", "backwardsCompatMessage"]
            }),
        ),
        tool(
            "bb_unsend_message",
            "Unsend/retract a previously sent iMessage. Only works on messages you sent, on \
             iMessage, and within 2 minutes of sending. Requires the Private API and macOS \
             Ventura+.",
            json!({
                "type": "object",
                "properties": {
                    "messageGuid": { "type": "string", "description": "The GUID of the message to unsend" },
                    "partIndex": { "type": "integer", "description": "Part index of the message to unsend (default 0)" }
                },
                "required": ["messageGuid"]
            }),
        ),
        tool(
            "bb_search_messages",
            "Search messages with flexible filters. Can filter by chat, date range, and sort \
             order. Returns message content, sender, timestamps, and associated chat info. \
             Sender names are resolved from Contacts where possible.",
            json!({
                "type": "object",
                "properties": {
                    "chatGuid": { "type": "string", "description": "Filter to a specific chat GUID" },
                    "limit": { "type": "integer", "description": "Max number of messages to return (default 25, max 1000)" },
                    "offset": { "type": "integer", "description": "Number of messages to skip for pagination" },
                    "sort": {
                        "type": "string",
                        "enum": ["ASC", "DESC"],
                        "description": "Sort by date: 'DESC' for newest first (default), 'ASC' for oldest first"
                    },
                    "after": { "type": "integer", "description": "Only messages after this Unix timestamp (seconds)" },
                    "before": { "type": "integer", "description": "Only messages before this Unix timestamp (seconds)" },
                    "withChat": { "type": "boolean", "description": "Include associated chat details in the response" }
                },
                "required": []
            }),
        ),
        tool(
            "bb_get_recent_messages",
            "Get recent messages from a specific chat. Returns messages with sender info and \
             timestamps, with sender names resolved from Contacts where possible. Supports \
             pagination for scrolling through history.",
            json!({
                "type": "object",
                "properties": {
                    "chatGuid": { "type": "string", "description": "The chat GUID to get messages from" },
                    "limit": { "type": "integer", "description": "Max number of messages to return (default 25)" },
                    "offset": { "type": "integer", "description": "Number of messages to skip for pagination" },
                    "sort": {
                        "type": "string",
                        "enum": ["ASC", "DESC"],
                        "description": "Sort order: 'DESC' for newest first (default), 'ASC' for oldest first"
                    },
                    "after": { "type": "string", "description": "Only messages after this date (ISO 8601 or Unix timestamp)" },
                    "before": { "type": "string", "description": "Only messages before this date (ISO 8601 or Unix timestamp)" }
                },
                "required": ["chatGuid"]
            }),
        ),
        tool(
            "bb_get_message",
            "Get a specific message by its GUID. Returns full message details including text, \
             sender, timestamps, reactions, and thread info.",
            json!({
                "type": "object",
                "properties": {
                    "messageGuid": { "type": "string", "description": "The GUID of the message to retrieve" },
                    "withChat": { "type": "boolean", "description": "Include associated chat details in the response" }
                },
                "required": ["messageGuid"]
            }),
        ),
    ]
}

fn chat_tools() -> Vec<ToolDefinition> {
    vec![
        tool(
            "bb_list_chats",
            "List iMessage/SMS conversations with pagination and sorting. Returns chat GUIDs, \
             display names (resolved from Contacts for 1:1 chats), participant lists, and last \
             message info. Use this to discover chat GUIDs for other tools.",
            json!({
                "type": "object",
                "properties": {
                    "limit": { "type": "integer", "description": "Max number of chats to return (default 25)" },
                    "offset": { "type": "integer", "description": "Number of chats to skip for pagination" },
                    "sort": {
                        "type": "string",
                        "enum": ["lastmessage", "ASC", "DESC"],
                        "description": "Sort order: 'lastmessage' for most recent activity (default)"
                    }
                },
                "required": []
            }),
        ),
        tool(
            "bb_get_chat",
            "Get detailed information about a specific chat by its GUID. Returns display name, \
             participants, service type, and metadata.",
            json!({
                "type": "object",
                "properties": {
                    "chatGuid": {
                        "type": "string",
                        "description": "The chat GUID (e.g. 'iMessage;-;+1234567890' or 'iMessage;+;chat123456')"
                    }
                },
                "required": ["chatGuid"]
            }),
        ),
        tool(
            "bb_create_group_chat",
            "Create a new group chat with multiple participants. Requires at least 2 addresses. \
             Optionally sends an initial message. Returns the new chat GUID.",
            json!({
                "type": "object",
                "properties": {
                    "addresses": {
                        "type": "array",
                        "items": { "type": "string" },
                        "minItems": 2,
                        "description": "Array of phone numbers or email addresses to add to the group (minimum 2)"
                    },
                    "message": { "type": "string", "description": "Optional initial message to send to the group" },
                    "service": {
                        "type": "string",
                        "enum": ["iMessage", "SMS"],
                        "description": "Service to use. Defaults to iMessage."
                    }
                },
                "required": ["addresses"]
            }),
        ),
        tool(
            "bb_rename_group_chat",
            "Rename a group chat. Sets the display name visible to all participants. Requires \
             the Private API.",
            json!({
                "type": "object",
                "properties": {
                    "chatGuid": { "type": "string", "description": "The group chat GUID to rename" },
                    "displayName": { "type": "string", "description": "The new display name for the group chat" }
                },
                "required": ["chatGuid", "displayName"]
            }),
        ),
        tool(
            "bb_add_participant",
            "Add a participant to a group chat. The address must be a phone number or email. \
             Requires the Private API.",
            json!({
                "type": "object",
                "properties": {
                    "chatGuid": { "type": "string", "description": "The group chat GUID to add the participant to" },
                    "address": { "type": "string", "description": "Phone number or email address of the person to add" }
                },
                "required": ["chatGuid", "address"]
            }),
        ),
        tool(
            "bb_remove_participant",
            "Remove a participant from a group chat. Requires the Private API.",
            json!({
                "type": "object",
                "properties": {
                    "chatGuid": { "type": "string", "description": "The group chat GUID to remove the participant from" },
                    "address": { "type": "string", "description": "Phone number or email address of the person to remove" }
                },
                "required": ["chatGuid", "address"]
            }),
        ),
        tool(
            "bb_mark_chat_read",
            "Mark all messages in a chat as read. Clears the unread badge for this conversation.",
            json!({
                "type": "object",
                "properties": {
                    "chatGuid": { "type": "string", "description": "The chat GUID to mark as read" }
                },
                "required": ["chatGuid"]
            }),
        ),
        tool(
            "bb_mark_chat_unread",
            "Mark a chat as unread. Adds an unread badge to the conversation.",
            json!({
                "type": "object",
                "properties": {
                    "chatGuid": { "type": "string", "description": "The chat GUID to mark as unread" }
                },
                "required": ["chatGuid"]
            }),
        ),
        tool(
            "bb_start_typing",
            "Show a typing indicator in a chat. The recipient will see the '...' bubble. \
             Requires the Private API.",
            json!({
                "type": "object",
                "properties": {
                    "chatGuid": { "type": "string", "description": "The chat GUID to show typing indicator in" }
                },
                "required": ["chatGuid"]
            }),
        ),
        tool(
            "bb_stop_typing",
            "Stop the typing indicator in a chat. Requires the Private API.",
            json!({
                "type": "object",
                "properties": {
                    "chatGuid": { "type": "string", "description": "The chat GUID to stop typing indicator in" }
                },
                "required": ["chatGuid"]
            }),
        ),
        tool(
            "bb_leave_chat",
            "Leave a group chat. You will no longer receive messages from this chat. This \
             cannot be undone.",
            json!({
                "type": "object",
                "properties": {
                    "chatGuid": { "type": "string", "description": "The group chat GUID to leave" }
                },
                "required": ["chatGuid"]
            }),
        ),
        tool(
            "bb_delete_chat",
            "Delete a chat entirely. This removes the conversation from your device. This \
             cannot be undone.",
            json!({
                "type": "object",
                "properties": {
                    "chatGuid": { "type": "string", "description": "The chat GUID to delete" }
                },
                "required": ["chatGuid"]
            }),
        ),
        tool(
            "bb_delete_message",
            "Delete a specific message from a chat. This removes it from your local \
             conversation. This cannot be undone.",
            json!({
                "type": "object",
                "properties": {
                    "chatGuid": { "type": "string", "description": "The chat GUID containing the message" },
                    "messageGuid": { "type": "string", "description": "The GUID of the message to delete" }
                },
                "required": ["chatGuid", "messageGuid"]
            }),
        ),
    ]
}

fn contacts_tools() -> Vec<ToolDefinition> {
    vec![
        tool(
            "bb_get_contacts",
            "Get all contacts from the macOS Contacts database",
            no_params(),
        ),
        tool(
            "bb_search_contacts",
            "Search contacts by name, email, or phone number",
            json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search query to match against contact names, emails, or phone numbers"
                    }
                },
                "required": ["query"]
            }),
        ),
        tool(
            "bb_get_contact_detail",
            "Get detailed contact info for a handle/address. Requires Private API to be enabled.",
            json!({
                "type": "object",
                "properties": {
                    "address": { "type": "string", "description": "Phone number or email address to look up" }
                },
                "required": ["address"]
            }),
        ),
        tool(
            "bb_get_contact_photo",
            "Get the contact photo as base64 data for a handle/address. Requires Private API \
             to be enabled.",
            json!({
                "type": "object",
                "properties": {
                    "address": { "type": "string", "description": "Phone number or email address" },
                    "quality": {
                        "type": "string",
                        "enum": ["low", "medium", "high"],
                        "description": "Image quality (default: medium)"
                    }
                },
                "required": ["address"]
            }),
        ),
        tool(
            "bb_check_imessage_status",
            "Batch check whether addresses are registered with iMessage. Requires Private API \
             to be enabled.",
            json!({
                "type": "object",
                "properties": {
                    "addresses": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "List of phone numbers or email addresses to check"
                    }
                },
                "required": ["addresses"]
            }),
        ),
        tool(
            "bb_get_suggested_names",
            "Get Siri-suggested names for handles that are not in the Contacts database. \
             Requires Private API to be enabled.",
            no_params(),
        ),
        tool(
            "bb_detect_business",
            "Check if a handle/address belongs to a business. Requires Private API to be \
             enabled.",
            json!({
                "type": "object",
                "properties": {
                    "address": { "type": "string", "description": "Phone number or email address to check" }
                },
                "required": ["address"]
            }),
        ),
    ]
}

fn findmy_tools() -> Vec<ToolDefinition> {
    vec![
        tool(
            "bb_get_findmy_devices",
            "Get Find My device locations for your iCloud account",
            no_params(),
        ),
        tool(
            "bb_refresh_findmy_devices",
            "Refresh Find My device locations to get the latest positions",
            no_params(),
        ),
        tool(
            "bb_get_findmy_friends",
            "Get Find My friend locations. Requires Private API to be enabled.",
            no_params(),
        ),
        tool(
            "bb_refresh_findmy_friends",
            "Refresh Find My friend locations to get the latest positions. Requires Private \
             API to be enabled.",
            no_params(),
        ),
    ]
}

fn server_tools() -> Vec<ToolDefinition> {
    vec![
        tool(
            "bb_get_server_info",
            "Get BlueBubbles server status, version, and capabilities",
            no_params(),
        ),
        tool(
            "bb_get_server_stats",
            "Get message, chat, and attachment statistics from the server",
            no_params(),
        ),
        tool(
            "bb_get_handles",
            "Query handles (contacts/addresses) with pagination",
            json!({
                "type": "object",
                "properties": {
                    "limit": { "type": "integer", "description": "Max number of handles to return (default: 100)" },
                    "offset": { "type": "integer", "description": "Number of handles to skip for pagination" },
                    "address": { "type": "string", "description": "Filter by specific address (phone number or email)" }
                },
                "required": []
            }),
        ),
        tool(
            "bb_check_handle_availability",
            "Check iMessage and FaceTime availability for an address",
            json!({
                "type": "object",
                "properties": {
                    "address": { "type": "string", "description": "Phone number or email address to check" }
                },
                "required": ["address"]
            }),
        ),
        tool(
            "bb_get_focus_status",
            "Get the focus/Do Not Disturb status for a handle. Requires Private API to be \
             enabled.",
            json!({
                "type": "object",
                "properties": {
                    "handleGuid": { "type": "string", "description": "The handle GUID to check focus status for" }
                },
                "required": ["handleGuid"]
            }),
        ),
        tool(
            "bb_get_scheduled_messages",
            "List all scheduled messages",
            no_params(),
        ),
        tool(
            "bb_create_scheduled_message",
            "Schedule a message for future delivery",
            json!({
                "type": "object",
                "properties": {
                    "chatGuid": { "type": "string", "description": "Chat GUID to send the message to (e.g. iMessage;-;+1234567890)" },
                    "message": { "type": "string", "description": "The message text to send" },
                    "scheduledFor": { "type": "string", "description": "ISO 8601 datetime string for when to send the message" },
                    "method": { "type": "string", "description": "Send method: apple-script or private-api (default: apple-script)" }
                },
                "required": ["chatGuid", "message", "scheduledFor"]
            }),
        ),
        tool(
            "bb_delete_scheduled_message",
            "Cancel a scheduled message by its ID",
            json!({
                "type": "object",
                "properties": {
                    "id": { "type": "string", "description": "The scheduled message ID to cancel" }
                },
                "required": ["id"]
            }),
        ),
        tool(
            "bb_restart_imessage",
            "Restart the Messages.app on the server Mac. Use this to recover from connection \
             issues.",
            no_params(),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_names_are_unique() {
        let tools = all_tools();
        let mut names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        let before = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), before);
    }

    #[test]
    fn test_required_fields_exist_in_properties() {
        for tool in all_tools() {
            let schema = &tool.input_schema;
            let properties = schema["properties"].as_object().unwrap();
            for required in schema["required"].as_array().unwrap() {
                let key = required.as_str().unwrap();
                assert!(
                    properties.contains_key(key),
                    "{}: required field '{key}' missing from properties",
                    tool.name
                );
            }
        }
    }
}
