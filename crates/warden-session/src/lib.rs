//! warden-session: JSONL session event log and session-scoped memory.

mod error;
pub mod format;
pub mod memory;
pub mod store;

pub use error::SessionError;
pub use format::{entry_id, entry_timestamp, Part, SessionEntry, SessionMeta};
pub use memory::{MemoryBank, MemoryEntry, MemoryStore};
pub use store::{Session, SessionStore};
