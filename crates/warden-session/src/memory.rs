//! Keyword memory scoped to a session.

use crate::format::now_secs;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// One remembered piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryEntry {
    pub author: String,
    pub text: String,
    pub timestamp: u64,
    seq: u64,
}

#[derive(Debug, Default)]
struct Inner {
    entries: Vec<MemoryEntry>,
    next_seq: u64,
}

/// Text remembered for one session, searchable by keyword overlap.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, author: impl Into<String>, text: impl Into<String>) {
        let text = text.into();
        if text.trim().is_empty() {
            return;
        }
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.entries.push(MemoryEntry {
            author: author.into(),
            text,
            timestamp: now_secs(),
            seq,
        });
    }

    /// Entries sharing the most keywords with `query`, newest first on ties.
    pub fn search(&self, query: &str, limit: usize) -> Vec<MemoryEntry> {
        let terms = keywords(query);
        if terms.is_empty() {
            return Vec::new();
        }
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let mut scored: Vec<(usize, &MemoryEntry)> = inner
            .entries
            .iter()
            .filter_map(|entry| {
                let words = keywords(&entry.text);
                let score = terms.iter().filter(|t| words.contains(*t)).count();
                (score > 0).then_some((score, entry))
            })
            .collect();
        scored.sort_by(|(sa, a), (sb, b)| sb.cmp(sa).then(b.seq.cmp(&a.seq)));
        scored
            .into_iter()
            .take(limit)
            .map(|(_, entry)| entry.clone())
            .collect()
    }

    /// The `n` most recent entries, newest first.
    pub fn recent(&self, n: usize) -> Vec<MemoryEntry> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.entries.iter().rev().take(n).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.entries.clear();
        inner.next_seq = 0;
    }
}

fn keywords(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Memory stores keyed by session id.
#[derive(Debug, Default)]
pub struct MemoryBank {
    stores: Mutex<HashMap<String, Arc<MemoryStore>>>,
}

impl MemoryBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store for `session_id`, created empty on first use.
    pub fn memory(&self, session_id: &str) -> Arc<MemoryStore> {
        let mut stores = self.stores.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(stores.entry(session_id.to_string()).or_default())
    }

    /// Drop the store for `session_id`, if any.
    pub fn forget(&self, session_id: &str) -> bool {
        self.stores
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(session_id)
            .is_some()
    }
}
