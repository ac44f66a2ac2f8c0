//! Contact resolution and data enrichment.
//!
//! BlueBubbles chat objects often return a blank `displayName` for 1:1
//! chats, so callers only see raw phone numbers. This module builds a
//! lookup index from the Contacts database and enriches chat and message
//! payloads with resolved names.
//!
//! Enrichment is strictly best-effort: a failed contact fetch degrades to
//! unenriched data and is never surfaced to the caller.

mod entities;
mod normalize;
mod resolver;

pub use entities::{Chat, ContactAddress, Handle, Message, Participant, RawContact};
pub use normalize::{normalize_address, normalize_phone};
pub use resolver::{CACHE_TTL, ContactDirectory, ContactResolver};
