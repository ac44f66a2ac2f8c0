//! Cached contact resolution.
//!
//! The resolver owns an in-memory index from normalized address to display
//! name, rebuilt wholesale from the upstream contact list at most once per
//! TTL. Concurrent callers racing a cold or expired cache share a single
//! upstream fetch.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use futures::future::join_all;
use tokio::sync::{Mutex, RwLock};

use super::entities::{Chat, Message, RawContact};
use super::normalize::normalize_address;
use crate::Result;

/// How long a successfully built contact index stays fresh.
pub const CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Read-only source of the full contact list.
///
/// Implemented by the live API client and by test doubles. The resolver
/// assumes the complete list comes back in one call; it does not paginate.
pub trait ContactDirectory: Send + Sync {
    /// Fetches all contacts.
    fn list_contacts(&self) -> impl Future<Output = Result<Vec<RawContact>>> + Send;
}

/// The address-to-name index plus its freshness stamp.
///
/// Replaced wholesale on every successful refresh; readers see either the
/// previous index or the fully rebuilt one, never a partial state.
#[derive(Debug, Default)]
struct ContactIndex {
    names: HashMap<String, String>,
    /// Stamped only when a refresh succeeds. A failed refresh leaves it
    /// untouched so the next caller retries immediately instead of
    /// waiting out the TTL.
    last_refresh: Option<Instant>,
}

impl ContactIndex {
    fn is_fresh(&self, ttl: Duration) -> bool {
        !self.names.is_empty()
            && self
                .last_refresh
                .is_some_and(|stamp| stamp.elapsed() < ttl)
    }
}

/// Resolves phone/email addresses to contact display names and enriches
/// chat and message payloads in place.
///
/// All operations are best-effort: an upstream failure degrades to "no
/// names available" and never propagates to the caller.
pub struct ContactResolver<D> {
    directory: D,
    cache: RwLock<ContactIndex>,
    /// Single-flight gate: the task holding this is the one allowed to
    /// fetch. Late arrivals queue here instead of fetching themselves.
    refresh_gate: Mutex<()>,
    /// Bumped after every refresh attempt, success or failure. A caller
    /// that queued on the gate compares generations to learn whether an
    /// attempt already ran on its behalf.
    refresh_generation: AtomicU64,
    ttl: Duration,
}

impl<D: ContactDirectory> ContactResolver<D> {
    /// Creates a resolver over the given contact directory.
    #[must_use]
    pub fn new(directory: D) -> Self {
        Self {
            directory,
            cache: RwLock::new(ContactIndex::default()),
            refresh_gate: Mutex::new(()),
            refresh_generation: AtomicU64::new(0),
            ttl: CACHE_TTL,
        }
    }

    /// Overrides the cache TTL. Used by tests; production keeps
    /// [`CACHE_TTL`].
    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Resolves an address (phone or email) to a contact name.
    ///
    /// Empty input returns `None` without touching the cache or the
    /// network. A miss is a normal outcome; callers fall back to showing
    /// the raw address.
    pub async fn resolve(&self, address: &str) -> Option<String> {
        if address.is_empty() {
            return None;
        }
        self.ensure_fresh().await;
        let key = normalize_address(address);
        self.cache.read().await.names.get(&key).cloned()
    }

    /// Fills in a blank chat `displayName` from resolved participant
    /// names.
    ///
    /// Chats that already carry a non-blank name are left untouched.
    /// Participants yield candidate addresses (handle address, handle id,
    /// flat address, in that order); when none do, the address embedded in
    /// a 1:1 chat guid (`service;type;address`) is used instead. Each
    /// candidate resolves to a name or falls back to the raw address; the
    /// results are joined with `", "`.
    pub async fn enrich_chat(&self, chat: &mut Chat) {
        if chat
            .display_name
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty())
        {
            return;
        }

        let mut candidates: Vec<String> = chat
            .participants
            .iter()
            .flatten()
            .filter_map(|p| p.best_address().map(str::to_string))
            .collect();

        if candidates.is_empty()
            && let Some(address) = chat.guid.as_deref().and_then(guid_address)
        {
            candidates.push(address);
        }

        if candidates.is_empty() {
            return;
        }

        let mut names = Vec::with_capacity(candidates.len());
        for address in candidates {
            let name = self.resolve(&address).await.unwrap_or(address);
            names.push(name);
        }

        chat.display_name = Some(names.join(", "));
        chat.resolved_name = Some(true);
    }

    /// Enriches every chat in the slice, fanning out concurrently and
    /// preserving order.
    pub async fn enrich_chats(&self, chats: &mut [Chat]) {
        join_all(chats.iter_mut().map(|chat| self.enrich_chat(chat))).await;
    }

    /// Stamps the resolved sender name on a message.
    ///
    /// No-op when a sender name is already present, when no sender address
    /// can be derived, or when resolution misses. On success the nested
    /// handle (if any) also gets the resolved name.
    pub async fn enrich_message(&self, msg: &mut Message) {
        if msg.sender_name.is_some() {
            return;
        }
        let Some(address) = msg.sender_address().map(str::to_string) else {
            return;
        };
        if let Some(name) = self.resolve(&address).await {
            msg.sender_name = Some(name.clone());
            if let Some(handle) = msg.handle.as_mut() {
                handle.resolved_name = Some(name);
            }
        }
    }

    /// Enriches every message in the slice, fanning out concurrently and
    /// preserving order.
    pub async fn enrich_messages(&self, messages: &mut [Message]) {
        join_all(messages.iter_mut().map(|msg| self.enrich_message(msg))).await;
    }

    /// Makes sure the index is usable, refreshing it at most once across
    /// concurrent callers.
    async fn ensure_fresh(&self) {
        if self.cache.read().await.is_fresh(self.ttl) {
            return;
        }

        let observed = self.refresh_generation.load(Ordering::Acquire);
        let _gate = self.refresh_gate.lock().await;

        // A refresh attempt completed while we queued on the gate; its
        // outcome (fresh index or swallowed failure) is our outcome.
        if self.refresh_generation.load(Ordering::Acquire) != observed {
            return;
        }
        if self.cache.read().await.is_fresh(self.ttl) {
            return;
        }

        self.refresh().await;
        self.refresh_generation.fetch_add(1, Ordering::AcqRel);
        // Gate guard drops here on success and failure alike, freeing the
        // slot for the next caller.
    }

    /// Fetches the contact list and republishes the index.
    ///
    /// Builds into a temporary map and swaps it in only after full
    /// population. Failures are swallowed: enrichment must never be the
    /// reason a chat or message listing fails.
    async fn refresh(&self) {
        let contacts = match self.directory.list_contacts().await {
            Ok(contacts) => contacts,
            Err(err) => {
                tracing::warn!(error = %err, "contact refresh failed, keeping stale index");
                return;
            }
        };

        let mut names = HashMap::new();
        for contact in &contacts {
            let Some(name) = contact.display() else {
                continue;
            };
            for address in contact.addresses() {
                let key = normalize_address(address);
                if !key.is_empty() {
                    // Last write wins for duplicate keys.
                    names.insert(key, name.clone());
                }
            }
        }

        let entries = names.len();
        let mut cache = self.cache.write().await;
        cache.names = names;
        cache.last_refresh = Some(Instant::now());
        drop(cache);
        tracing::debug!(contacts = contacts.len(), entries, "contact index rebuilt");
    }
}

/// Extracts the address segment of a chat guid.
///
/// 1:1 chat guids look like `iMessage;-;+19186257838`; everything from the
/// third segment onward is the address (rejoined in case the address
/// itself contains `;`).
fn guid_address(guid: &str) -> Option<String> {
    let parts: Vec<&str> = guid.split(';').collect();
    if parts.len() >= 3 {
        Some(parts[2..].join(";"))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    /// Scripted contact directory that counts upstream fetches.
    #[derive(Default)]
    struct MockDirectory {
        contacts: Vec<serde_json::Value>,
        calls: Arc<AtomicUsize>,
        fail: bool,
        delay: Option<Duration>,
    }

    impl MockDirectory {
        fn with_alice() -> Self {
            Self {
                contacts: vec![json!({
                    "displayName": "Alice",
                    "phoneNumbers": [{ "address": "+19186257838" }],
                    "emails": [{ "address": "alice@example.com" }]
                })],
                ..Self::default()
            }
        }
    }

    impl ContactDirectory for MockDirectory {
        async fn list_contacts(&self) -> Result<Vec<RawContact>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(Error::Upstream {
                    endpoint: "contact".to_string(),
                    cause: "simulated outage".to_string(),
                });
            }
            Ok(self
                .contacts
                .iter()
                .map(|v| serde_json::from_value(v.clone()).unwrap())
                .collect())
        }
    }

    #[tokio::test]
    async fn test_resolve_through_formatting_differences() {
        let resolver = ContactResolver::new(MockDirectory::with_alice());
        assert_eq!(resolver.resolve("918-625-7838").await.as_deref(), Some("Alice"));
        assert_eq!(resolver.resolve("+19186257838").await.as_deref(), Some("Alice"));
        assert_eq!(resolver.resolve("ALICE@example.com ").await.as_deref(), Some("Alice"));
        assert_eq!(resolver.resolve("555-000-0000").await, None);
    }

    #[tokio::test]
    async fn test_empty_address_skips_fetch() {
        let directory = MockDirectory::with_alice();
        let calls = Arc::clone(&directory.calls);
        let resolver = ContactResolver::new(directory);

        assert_eq!(resolver.resolve("").await, None);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cache_hit_does_no_io() {
        let directory = MockDirectory::with_alice();
        let calls = Arc::clone(&directory.calls);
        let resolver = ContactResolver::new(directory);

        for _ in 0..5 {
            resolver.resolve("+19186257838").await;
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cold_cache_single_flight() {
        let directory = MockDirectory {
            delay: Some(Duration::from_millis(20)),
            ..MockDirectory::with_alice()
        };
        let calls = Arc::clone(&directory.calls);
        let resolver = ContactResolver::new(directory);

        let results =
            join_all((0..16).map(|_| resolver.resolve("918-625-7838"))).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(results.iter().all(|r| r.as_deref() == Some("Alice")));
    }

    #[tokio::test]
    async fn test_ttl_expiry_triggers_one_refetch() {
        let directory = MockDirectory::with_alice();
        let calls = Arc::clone(&directory.calls);
        let resolver =
            ContactResolver::new(directory).with_ttl(Duration::from_millis(30));

        resolver.resolve("+19186257838").await;
        resolver.resolve("+19186257838").await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(40)).await;
        resolver.resolve("+19186257838").await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_refresh_is_silent_and_retries() {
        let directory = MockDirectory {
            fail: true,
            ..MockDirectory::with_alice()
        };
        let calls = Arc::clone(&directory.calls);
        let resolver = ContactResolver::new(directory);

        // Failure never surfaces; resolution just misses.
        assert_eq!(resolver.resolve("+19186257838").await, None);
        // No timestamp was stamped, so the next call retries immediately.
        assert_eq!(resolver.resolve("+19186257838").await, None);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_failed_attempt() {
        let directory = MockDirectory {
            fail: true,
            delay: Some(Duration::from_millis(20)),
            ..MockDirectory::default()
        };
        let calls = Arc::clone(&directory.calls);
        let resolver = ContactResolver::new(directory);

        join_all((0..8).map(|_| resolver.resolve("918-625-7838"))).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_enrich_chat_respects_existing_name() {
        let resolver = ContactResolver::new(MockDirectory::with_alice());
        let mut chat: Chat = serde_json::from_value(json!({
            "guid": "iMessage;+;chat123",
            "displayName": "Family"
        }))
        .unwrap();

        resolver.enrich_chat(&mut chat).await;
        assert_eq!(chat.display_name.as_deref(), Some("Family"));
        assert_eq!(chat.resolved_name, None);
    }

    #[tokio::test]
    async fn test_enrich_chat_from_participant_handle() {
        let resolver = ContactResolver::new(MockDirectory::with_alice());
        let mut chat: Chat = serde_json::from_value(json!({
            "guid": "iMessage;-;+19186257838",
            "displayName": "",
            "participants": [{ "handle": { "address": "+19186257838" } }]
        }))
        .unwrap();

        resolver.enrich_chat(&mut chat).await;
        assert_eq!(chat.display_name.as_deref(), Some("Alice"));
        assert_eq!(chat.resolved_name, Some(true));
    }

    #[tokio::test]
    async fn test_enrich_chat_guid_fallback() {
        let resolver = ContactResolver::new(MockDirectory::with_alice());
        let mut chat: Chat = serde_json::from_value(json!({
            "guid": "iMessage;-;+19186257838",
            "displayName": ""
        }))
        .unwrap();

        resolver.enrich_chat(&mut chat).await;
        assert_eq!(chat.display_name.as_deref(), Some("Alice"));
        assert_eq!(chat.resolved_name, Some(true));
    }

    #[tokio::test]
    async fn test_enrich_chat_unknown_participants_fall_back_to_addresses() {
        let resolver = ContactResolver::new(MockDirectory::with_alice());
        let mut chat: Chat = serde_json::from_value(json!({
            "displayName": "",
            "participants": [
                { "handle": { "address": "+19186257838" } },
                { "address": "+15550001111" }
            ]
        }))
        .unwrap();

        resolver.enrich_chat(&mut chat).await;
        assert_eq!(chat.display_name.as_deref(), Some("Alice, +15550001111"));
    }

    #[tokio::test]
    async fn test_enrich_chat_without_any_address_is_untouched() {
        let resolver = ContactResolver::new(MockDirectory::with_alice());
        let mut chat: Chat = serde_json::from_value(json!({
            "guid": "not-a-chat-guid",
            "displayName": ""
        }))
        .unwrap();

        resolver.enrich_chat(&mut chat).await;
        assert_eq!(chat.display_name.as_deref(), Some(""));
        assert_eq!(chat.resolved_name, None);
    }

    #[tokio::test]
    async fn test_enrich_chats_preserves_order() {
        let resolver = ContactResolver::new(MockDirectory::with_alice());
        let mut chats: Vec<Chat> = serde_json::from_value(json!([
            { "guid": "iMessage;-;+19186257838", "displayName": "" },
            { "guid": "iMessage;+;chat123", "displayName": "Family" },
            { "guid": "iMessage;-;alice@example.com", "displayName": "" }
        ]))
        .unwrap();

        resolver.enrich_chats(&mut chats).await;
        assert_eq!(chats[0].display_name.as_deref(), Some("Alice"));
        assert_eq!(chats[1].display_name.as_deref(), Some("Family"));
        assert_eq!(chats[2].display_name.as_deref(), Some("Alice"));
    }

    #[tokio::test]
    async fn test_enrich_message_stamps_sender_and_handle() {
        let resolver = ContactResolver::new(MockDirectory::with_alice());
        let mut msg: Message = serde_json::from_value(json!({
            "guid": "m1",
            "handle": { "address": "+19186257838" }
        }))
        .unwrap();

        resolver.enrich_message(&mut msg).await;
        assert_eq!(msg.sender_name.as_deref(), Some("Alice"));
        assert_eq!(
            msg.handle.as_ref().unwrap().resolved_name.as_deref(),
            Some("Alice")
        );
    }

    #[tokio::test]
    async fn test_enrich_message_miss_leaves_message_unchanged() {
        let resolver = ContactResolver::new(MockDirectory::with_alice());
        let mut msg: Message = serde_json::from_value(json!({
            "guid": "m1",
            "handle": { "address": "+15550001111" }
        }))
        .unwrap();

        resolver.enrich_message(&mut msg).await;
        assert_eq!(msg.sender_name, None);
        assert_eq!(msg.handle.as_ref().unwrap().resolved_name, None);
    }

    #[tokio::test]
    async fn test_enrich_message_existing_marker_short_circuits() {
        let directory = MockDirectory::with_alice();
        let calls = Arc::clone(&directory.calls);
        let resolver = ContactResolver::new(directory);

        let mut msg: Message = serde_json::from_value(json!({
            "guid": "m1",
            "_senderName": "Someone",
            "handle": { "address": "+19186257838" }
        }))
        .unwrap();

        resolver.enrich_message(&mut msg).await;
        assert_eq!(msg.sender_name.as_deref(), Some("Someone"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_guid_address_parsing() {
        assert_eq!(
            guid_address("iMessage;-;+19186257838").as_deref(),
            Some("+19186257838")
        );
        // Address segments containing ';' are rejoined
        assert_eq!(guid_address("SMS;-;a;b").as_deref(), Some("a;b"));
        assert_eq!(guid_address("justtwo;segments"), None);
        assert_eq!(guid_address(""), None);
    }

    #[test]
    fn test_last_write_wins_on_duplicate_keys() {
        // Two contacts sharing a number: the later one owns the key.
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let directory = MockDirectory {
                contacts: vec![
                    json!({ "displayName": "Old", "phoneNumbers": ["+19186257838"] }),
                    json!({ "displayName": "New", "phoneNumbers": ["918-625-7838"] }),
                ],
                ..MockDirectory::default()
            };
            let resolver = ContactResolver::new(directory);
            assert_eq!(resolver.resolve("9186257838").await.as_deref(), Some("New"));
        });
    }
}
