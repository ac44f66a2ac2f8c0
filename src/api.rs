//! BlueBubbles REST API client.
//!
//! Thin request/response plumbing over the server's `/api/v1` surface.
//! Every call authenticates with the server password as a query parameter
//! and returns the standard response envelope.

use reqwest::Method;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ServerConfig;
use crate::enrichment::{ContactDirectory, RawContact};
use crate::{Error, Result};

/// No query parameters.
const NO_QUERY: [(&str, &str); 0] = [];

/// The BlueBubbles response envelope.
///
/// Fields are optional because error responses and some private-API
/// endpoints omit parts of the envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    /// HTTP-like status code reported in the body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i64>,
    /// Human-readable status message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// The payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Pagination and count metadata, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    /// Error details, when the server reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl ApiResponse {
    /// The payload, with a missing `data` field read as JSON null.
    #[must_use]
    pub fn data_or_null(&self) -> Value {
        self.data.clone().unwrap_or(Value::Null)
    }
}

/// A text message send request (`POST message/text`).
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextMessage {
    /// Target chat guid.
    pub chat_guid: String,
    /// Message body.
    pub message: String,
    /// Send method: `private-api` or `apple-script`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// iMessage screen/bubble effect identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect_id: Option<String>,
    /// Subject line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Guid of the message being replied to (threaded replies).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_message_guid: Option<String>,
    /// Part of the replied-to message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_index: Option<i64>,
}

/// A tapback request (`POST message/react`).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    /// Chat containing the message.
    pub chat_guid: String,
    /// The message being reacted to.
    pub selected_message_guid: String,
    /// Reaction type, `-` prefix removes.
    pub reaction: String,
    /// Part of the message being reacted to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_index: Option<i64>,
}

/// A message query (`POST message/query`).
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageQuery {
    /// Restrict to one chat.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_guid: Option<String>,
    /// Page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    /// Page offset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    /// `ASC` or `DESC` by date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    /// Only messages after this Unix timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<i64>,
    /// Only messages before this Unix timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<i64>,
    /// Related records to include, e.g. `chat`, `handle`.
    #[serde(skip_serializing_if = "Option::is_none", rename = "with")]
    pub with: Option<Vec<String>>,
}

/// A chat query (`POST chat/query`).
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatQuery {
    /// Page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    /// Page offset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    /// `lastmessage`, `ASC` or `DESC`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    /// Related records to include.
    #[serde(skip_serializing_if = "Option::is_none", rename = "with")]
    pub with: Option<Vec<String>>,
}

/// Query parameters for `GET chat/{guid}/message`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessagesParams {
    /// Page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    /// Page offset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    /// `ASC` or `DESC`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    /// Only messages after this date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
    /// Only messages before this date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    /// Related records, comma-separated, e.g. `chat,handle`.
    #[serde(skip_serializing_if = "Option::is_none", rename = "with")]
    pub with: Option<String>,
}

/// A chat creation request (`POST chat/new`).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChat {
    /// Participant addresses; one address starts a 1:1 chat.
    pub addresses: Vec<String>,
    /// Optional initial message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// `iMessage` or `SMS`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

/// A handle query (`POST handle/query`).
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandleQuery {
    /// Page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    /// Page offset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    /// Related records to include.
    #[serde(skip_serializing_if = "Option::is_none", rename = "with")]
    pub with: Option<Vec<String>>,
    /// Filter to one address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Filters for the message count endpoint (`GET message/count`).
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageCountQuery {
    /// Only messages after this date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
    /// Only messages before this date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    /// Restrict the count to one chat.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_guid: Option<String>,
}

/// HTTP client for a BlueBubbles server.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    password: secrecy::SecretString,
}

impl ApiClient {
    /// Creates a client from the server configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the base URL
    /// does not parse.
    pub fn new(config: &ServerConfig) -> Result<Self> {
        // Validate the base URL once at startup instead of on every call.
        reqwest::Url::parse(&config.base_url).map_err(|e| {
            Error::Config(format!("BLUEBUBBLES_URL is not a valid URL: {e}"))
        })?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::OperationFailed {
                operation: "build_http_client".to_string(),
                cause: e.to_string(),
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            password: config.password.clone(),
        })
    }

    /// Builds the URL for an endpoint, percent-encoding each path segment.
    fn endpoint_url(&self, segments: &[&str]) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.base_url).map_err(|e| Error::Upstream {
            endpoint: segments.join("/"),
            cause: format!("invalid base URL: {e}"),
        })?;
        {
            let mut parts = url.path_segments_mut().map_err(|()| Error::Upstream {
                endpoint: segments.join("/"),
                cause: "base URL cannot carry a path".to_string(),
            })?;
            parts.pop_if_empty();
            parts.extend(["api", "v1"]);
            parts.extend(segments);
        }
        Ok(url)
    }

    async fn request<Q, B>(
        &self,
        method: Method,
        segments: &[&str],
        query: &Q,
        body: Option<&B>,
    ) -> Result<ApiResponse>
    where
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let endpoint = segments.join("/");
        let url = self.endpoint_url(segments)?;

        let mut request = self
            .http
            .request(method, url)
            .query(&[("password", self.password.expose_secret())])
            .query(query);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| Error::Upstream {
            endpoint: endpoint.clone(),
            cause: e.to_string(),
        })?;

        response
            .json::<ApiResponse>()
            .await
            .map_err(|e| Error::Upstream {
                endpoint,
                cause: format!("invalid response body: {e}"),
            })
    }

    async fn get(&self, segments: &[&str]) -> Result<ApiResponse> {
        self.request(Method::GET, segments, &NO_QUERY, None::<&Value>)
            .await
    }

    async fn get_with<Q: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        query: &Q,
    ) -> Result<ApiResponse> {
        self.request(Method::GET, segments, query, None::<&Value>)
            .await
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<ApiResponse> {
        self.request(Method::POST, segments, &NO_QUERY, Some(body))
            .await
    }

    async fn post_empty(&self, segments: &[&str]) -> Result<ApiResponse> {
        self.request(Method::POST, segments, &NO_QUERY, None::<&Value>)
            .await
    }

    async fn put<B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<ApiResponse> {
        self.request(Method::PUT, segments, &NO_QUERY, Some(body))
            .await
    }

    async fn delete(&self, segments: &[&str]) -> Result<ApiResponse> {
        self.request(Method::DELETE, segments, &NO_QUERY, None::<&Value>)
            .await
    }

    // ── Ping / server ──

    /// Checks connectivity with the server.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] when the server is unreachable.
    pub async fn ping(&self) -> Result<ApiResponse> {
        self.get(&["ping"]).await
    }

    /// Server status, version and capabilities.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn server_info(&self) -> Result<ApiResponse> {
        self.get(&["server", "info"]).await
    }

    /// Total message/chat/handle statistics.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn stat_totals(&self) -> Result<ApiResponse> {
        self.get(&["server", "statistics", "totals"]).await
    }

    /// Media statistics.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn stat_media(&self) -> Result<ApiResponse> {
        self.get(&["server", "statistics", "media"]).await
    }

    /// Recent server log output.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn server_logs(&self) -> Result<ApiResponse> {
        self.get(&["server", "logs"]).await
    }

    /// Active server alerts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn alerts(&self) -> Result<ApiResponse> {
        self.get(&["server", "alert"]).await
    }

    /// Checks whether a newer server release is available.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn check_for_update(&self) -> Result<ApiResponse> {
        self.get(&["server", "update", "check"]).await
    }

    /// Restarts Messages.app on the host Mac.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn restart_messages_app(&self) -> Result<ApiResponse> {
        self.post_empty(&["mac", "imessage", "restart"]).await
    }

    // ── Messages ──

    /// Sends a text message (also used for threaded replies).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn send_text(&self, body: &TextMessage) -> Result<ApiResponse> {
        self.post(&["message", "text"], body).await
    }

    /// Adds or removes a tapback reaction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn react(&self, body: &Reaction) -> Result<ApiResponse> {
        self.post(&["message", "react"], body).await
    }

    /// Edits a sent message (private API, Ventura+).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn edit_message(
        &self,
        message_guid: &str,
        edited_message: &str,
        backwards_compat_message: &str,
        part_index: Option<i64>,
    ) -> Result<ApiResponse> {
        self.post(
            &["message", message_guid, "edit"],
            &serde_json::json!({
                "editedMessage": edited_message,
                "backwardsCompatibilityMessage": backwards_compat_message,
                "partIndex": part_index,
            }),
        )
        .await
    }

    /// Unsends a sent message (private API, Ventura+).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn unsend_message(
        &self,
        message_guid: &str,
        part_index: Option<i64>,
    ) -> Result<ApiResponse> {
        self.post(
            &["message", message_guid, "unsend"],
            &serde_json::json!({ "partIndex": part_index }),
        )
        .await
    }

    /// Fetches one message by guid.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn get_message(&self, message_guid: &str, with: Option<&str>) -> Result<ApiResponse> {
        match with {
            Some(with) => {
                self.get_with(&["message", message_guid], &[("with", with)])
                    .await
            }
            None => self.get(&["message", message_guid]).await,
        }
    }

    /// Queries messages with filters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn query_messages(&self, query: &MessageQuery) -> Result<ApiResponse> {
        self.post(&["message", "query"], query).await
    }

    /// Counts messages, optionally filtered by date range or chat.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn message_count(&self, query: &MessageCountQuery) -> Result<ApiResponse> {
        self.get_with(&["message", "count"], query).await
    }

    /// Counts messages sent from this account.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn sent_message_count(&self) -> Result<ApiResponse> {
        self.get(&["message", "count", "me"]).await
    }

    // ── Chats ──

    /// Creates a chat (1:1 or group) and optionally sends a first message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn create_chat(&self, body: &NewChat) -> Result<ApiResponse> {
        self.post(&["chat", "new"], body).await
    }

    /// Queries chats with pagination and sorting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn query_chats(&self, query: &ChatQuery) -> Result<ApiResponse> {
        self.post(&["chat", "query"], query).await
    }

    /// Counts chats on the server.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn chat_count(&self) -> Result<ApiResponse> {
        self.get(&["chat", "count"]).await
    }

    /// Messages of one chat.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn chat_messages(
        &self,
        chat_guid: &str,
        params: &ChatMessagesParams,
    ) -> Result<ApiResponse> {
        self.get_with(&["chat", chat_guid, "message"], params).await
    }

    /// Fetches one chat by guid.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn get_chat(&self, chat_guid: &str) -> Result<ApiResponse> {
        self.get(&["chat", chat_guid]).await
    }

    /// Renames a group chat.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn update_chat(&self, chat_guid: &str, display_name: &str) -> Result<ApiResponse> {
        self.put(
            &["chat", chat_guid],
            &serde_json::json!({ "displayName": display_name }),
        )
        .await
    }

    /// Adds a participant to a group chat.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn add_participant(&self, chat_guid: &str, address: &str) -> Result<ApiResponse> {
        self.post(
            &["chat", chat_guid, "participant", "add"],
            &serde_json::json!({ "address": address }),
        )
        .await
    }

    /// Removes a participant from a group chat.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn remove_participant(&self, chat_guid: &str, address: &str) -> Result<ApiResponse> {
        self.post(
            &["chat", chat_guid, "participant", "remove"],
            &serde_json::json!({ "address": address }),
        )
        .await
    }

    /// Marks a chat read.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn mark_chat_read(&self, chat_guid: &str) -> Result<ApiResponse> {
        self.post_empty(&["chat", chat_guid, "read"]).await
    }

    /// Marks a chat unread.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn mark_chat_unread(&self, chat_guid: &str) -> Result<ApiResponse> {
        self.post_empty(&["chat", chat_guid, "unread"]).await
    }

    /// Shows the typing indicator in a chat.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn start_typing(&self, chat_guid: &str) -> Result<ApiResponse> {
        self.post_empty(&["chat", chat_guid, "typing"]).await
    }

    /// Clears the typing indicator in a chat.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn stop_typing(&self, chat_guid: &str) -> Result<ApiResponse> {
        self.delete(&["chat", chat_guid, "typing"]).await
    }

    /// Leaves a group chat.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn leave_chat(&self, chat_guid: &str) -> Result<ApiResponse> {
        self.post_empty(&["chat", chat_guid, "leave"]).await
    }

    /// Deletes a chat.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn delete_chat(&self, chat_guid: &str) -> Result<ApiResponse> {
        self.delete(&["chat", chat_guid]).await
    }

    /// Deletes one message from a chat.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn delete_chat_message(
        &self,
        chat_guid: &str,
        message_guid: &str,
    ) -> Result<ApiResponse> {
        self.delete(&["chat", chat_guid, message_guid]).await
    }

    // ── Contacts ──

    /// The full contact list from the macOS Contacts database.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn contacts(&self) -> Result<ApiResponse> {
        self.get(&["contact"]).await
    }

    /// Queries contacts with a raw `where` clause.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn query_contacts(&self, where_clauses: &Value) -> Result<ApiResponse> {
        self.post(&["contact", "query"], where_clauses).await
    }

    /// Contact details for one handle (private API).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn contact_for_handle(&self, address: &str) -> Result<ApiResponse> {
        self.get(&["contact", "papi", "handle", address]).await
    }

    /// Contact photo as base64 (private API).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn contact_photo(&self, address: &str, quality: Option<&str>) -> Result<ApiResponse> {
        let segments = ["contact", "papi", "handle", address, "photo"];
        match quality {
            Some(quality) => self.get_with(&segments, &[("quality", quality)]).await,
            None => self.get(&segments).await,
        }
    }

    /// Batch-checks iMessage registration for addresses (private API).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn batch_check_imessage(&self, addresses: &[String]) -> Result<ApiResponse> {
        self.post(
            &["contact", "papi", "imessage-status"],
            &serde_json::json!({ "addresses": addresses }),
        )
        .await
    }

    /// Siri-suggested names for unsaved handles (private API).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn suggested_names(&self) -> Result<ApiResponse> {
        self.get(&["contact", "papi", "suggested-names"]).await
    }

    /// Business detection for a handle (private API).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn detect_business(&self, address: &str) -> Result<ApiResponse> {
        self.get(&["contact", "papi", "handle", address, "business"])
            .await
    }

    // ── Handles ──

    /// Queries handles with pagination.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn query_handles(&self, query: &HandleQuery) -> Result<ApiResponse> {
        self.post(&["handle", "query"], query).await
    }

    /// iMessage availability for an address.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn imessage_availability(&self, address: &str) -> Result<ApiResponse> {
        self.get_with(
            &["handle", "availability", "imessage"],
            &[("address", address)],
        )
        .await
    }

    /// FaceTime availability for an address.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn facetime_availability(&self, address: &str) -> Result<ApiResponse> {
        self.get_with(
            &["handle", "availability", "facetime"],
            &[("address", address)],
        )
        .await
    }

    /// Focus / Do Not Disturb status of a handle (private API).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn focus_status(&self, handle_guid: &str) -> Result<ApiResponse> {
        self.get(&["handle", handle_guid, "focus"]).await
    }

    // ── Find My ──

    /// Find My device locations.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn findmy_devices(&self) -> Result<ApiResponse> {
        self.get(&["icloud", "findmy", "devices"]).await
    }

    /// Forces a refresh of Find My device locations.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn refresh_findmy_devices(&self) -> Result<ApiResponse> {
        self.post_empty(&["icloud", "findmy", "devices", "refresh"])
            .await
    }

    /// Find My friend locations (private API).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn findmy_friends(&self) -> Result<ApiResponse> {
        self.get(&["icloud", "findmy", "friends"]).await
    }

    /// Forces a refresh of Find My friend locations (private API).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn refresh_findmy_friends(&self) -> Result<ApiResponse> {
        self.post_empty(&["icloud", "findmy", "friends", "refresh"])
            .await
    }

    // ── Scheduled messages ──

    /// Lists scheduled messages.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn scheduled_messages(&self) -> Result<ApiResponse> {
        self.get(&["message", "schedule"]).await
    }

    /// Schedules a message for future delivery.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn create_scheduled_message(&self, body: &Value) -> Result<ApiResponse> {
        self.post(&["message", "schedule"], body).await
    }

    /// Cancels a scheduled message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] on request failure.
    pub async fn delete_scheduled_message(&self, id: &str) -> Result<ApiResponse> {
        self.delete(&["message", "schedule", id]).await
    }
}

impl ContactDirectory for ApiClient {
    async fn list_contacts(&self) -> Result<Vec<RawContact>> {
        let response = self.contacts().await?;
        match response.data {
            // Missing or null data reads as an empty contact list.
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(data) => serde_json::from_value(data).map_err(|e| Error::Upstream {
                endpoint: "contact".to_string(),
                cause: format!("malformed contact list: {e}"),
            }),
        }
    }
}
