//! Structured views of BlueBubbles payloads.
//!
//! The upstream server returns loosely shaped JSON. These types name the
//! fields enrichment cares about as explicit optionals and keep everything
//! else intact through `#[serde(flatten)]`, so an enriched payload
//! round-trips with no original field removed or renamed.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A contact record from the macOS Contacts database.
///
/// Only consumed, never re-serialized: the resolver turns each contact
/// into zero or more index entries.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawContact {
    /// Preferred display name, when the Contacts database has one.
    pub display_name: Option<String>,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Phone entries, as strings or `{ "address": ... }` objects.
    pub phone_numbers: Vec<ContactAddress>,
    /// Email entries, same shapes as phones.
    pub emails: Vec<ContactAddress>,
}

impl RawContact {
    /// Builds the indexable name: `displayName`, falling back to
    /// `"first last"`. Returns `None` when no usable name exists, in which
    /// case the whole contact is skipped.
    #[must_use]
    pub fn display(&self) -> Option<String> {
        if let Some(name) = self.display_name.as_deref()
            && !name.is_empty()
        {
            return Some(name.to_string());
        }
        let first = self.first_name.as_deref().unwrap_or("");
        let last = self.last_name.as_deref().unwrap_or("");
        let combined = format!("{first} {last}");
        let combined = combined.trim();
        if combined.is_empty() {
            None
        } else {
            Some(combined.to_string())
        }
    }

    /// Iterates every phone and email address string on this contact.
    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.phone_numbers
            .iter()
            .chain(self.emails.iter())
            .filter_map(ContactAddress::address)
    }
}

/// A phone or email entry, which the server returns either as a bare
/// string or as an object carrying an `address` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ContactAddress {
    /// Bare string entry.
    Plain(String),
    /// Object entry; `address` may still be missing.
    Entry {
        /// The address value, when present.
        address: Option<String>,
    },
}

impl ContactAddress {
    /// Returns the address string, if any.
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        match self {
            Self::Plain(s) => (!s.is_empty()).then_some(s.as_str()),
            Self::Entry { address } => address
                .as_deref()
                .and_then(|s| (!s.is_empty()).then_some(s)),
        }
    }
}

/// A chat payload, enrichable in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    /// Chat identifier, e.g. `iMessage;-;+19186257838`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    /// Display name; blank for most 1:1 chats.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Chat participants, when the query included them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participants: Option<Vec<Participant>>,
    /// Marker set by enrichment when `displayName` was synthesized.
    #[serde(rename = "_resolvedName", skip_serializing_if = "Option::is_none")]
    pub resolved_name: Option<bool>,
    /// All other fields, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A chat participant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    /// Nested handle, preferred source of the participant's address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<Handle>,
    /// Flat address, used when no handle is nested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// All other fields, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Participant {
    /// Best address for this participant: handle address, then handle
    /// identifier, then the flat address field.
    #[must_use]
    pub fn best_address(&self) -> Option<&str> {
        self.handle
            .as_ref()
            .and_then(Handle::best_address)
            .or_else(|| self.address.as_deref())
            .and_then(|s| (!s.is_empty()).then_some(s))
    }
}

/// A message handle (the addressable identity of a sender).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handle {
    /// The handle's address (phone number or email).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// The handle's identifier; numeric row ids are ignored as addresses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// Marker set by enrichment: the resolved contact name.
    #[serde(rename = "_resolvedName", skip_serializing_if = "Option::is_none")]
    pub resolved_name: Option<String>,
    /// All other fields, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Handle {
    /// Best address for this handle: `address`, then a string `id`.
    #[must_use]
    pub fn best_address(&self) -> Option<&str> {
        self.address
            .as_deref()
            .and_then(|s| (!s.is_empty()).then_some(s))
            .or_else(|| self.id.as_ref().and_then(Value::as_str))
            .and_then(|s| (!s.is_empty()).then_some(s))
    }
}

/// A message payload, enrichable in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Message identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    /// Sender handle, when the query included it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<Handle>,
    /// Flat sender identifier, used when no handle is nested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle_id: Option<Value>,
    /// Marker set by enrichment: the resolved sender name.
    #[serde(rename = "_senderName", skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    /// All other fields, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Message {
    /// Best sender address: handle address, handle string id, then the
    /// flat `handleId` when it is a string.
    #[must_use]
    pub fn sender_address(&self) -> Option<&str> {
        self.handle
            .as_ref()
            .and_then(Handle::best_address)
            .or_else(|| self.handle_id.as_ref().and_then(Value::as_str))
            .and_then(|s| (!s.is_empty()).then_some(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_contact_display_precedence() {
        let contact: RawContact = serde_json::from_value(json!({
            "displayName": "Alice Smith",
            "firstName": "Alicia",
            "lastName": "Smith"
        }))
        .unwrap();
        assert_eq!(contact.display().as_deref(), Some("Alice Smith"));

        let contact: RawContact = serde_json::from_value(json!({
            "firstName": "Bob",
            "lastName": "Jones"
        }))
        .unwrap();
        assert_eq!(contact.display().as_deref(), Some("Bob Jones"));

        let contact: RawContact = serde_json::from_value(json!({
            "firstName": "Carol"
        }))
        .unwrap();
        assert_eq!(contact.display().as_deref(), Some("Carol"));

        let contact: RawContact = serde_json::from_value(json!({})).unwrap();
        assert_eq!(contact.display(), None);
    }

    #[test]
    fn test_contact_address_shapes() {
        let contact: RawContact = serde_json::from_value(json!({
            "displayName": "Alice",
            "phoneNumbers": [
                { "address": "+19186257838" },
                "918-555-0100",
                { "label": "home" }
            ],
            "emails": [{ "address": "alice@example.com" }]
        }))
        .unwrap();

        let addresses: Vec<&str> = contact.addresses().collect();
        assert_eq!(
            addresses,
            vec!["+19186257838", "918-555-0100", "alice@example.com"]
        );
    }

    #[test]
    fn test_chat_round_trip_preserves_unknown_fields() {
        let original = json!({
            "guid": "iMessage;-;+19186257838",
            "displayName": "",
            "chatIdentifier": "+19186257838",
            "isArchived": false
        });
        let chat: Chat = serde_json::from_value(original.clone()).unwrap();
        let back = serde_json::to_value(&chat).unwrap();
        assert_eq!(back["chatIdentifier"], "+19186257838");
        assert_eq!(back["isArchived"], json!(false));
        assert_eq!(back["guid"], "iMessage;-;+19186257838");
        // Marker only appears after enrichment sets it
        assert!(back.get("_resolvedName").is_none());
    }

    #[test]
    fn test_message_sender_address_precedence() {
        let msg: Message = serde_json::from_value(json!({
            "handle": { "address": "+19186257838", "id": 42 },
            "handleId": 42
        }))
        .unwrap();
        assert_eq!(msg.sender_address(), Some("+19186257838"));

        let msg: Message = serde_json::from_value(json!({
            "handle": { "id": "bob@example.com" }
        }))
        .unwrap();
        assert_eq!(msg.sender_address(), Some("bob@example.com"));

        // Numeric handleId is a database row id, not an address
        let msg: Message = serde_json::from_value(json!({ "handleId": 42 })).unwrap();
        assert_eq!(msg.sender_address(), None);
    }
}
