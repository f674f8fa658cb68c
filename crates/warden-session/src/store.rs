//! JSONL session store implementation.

use crate::error::SessionError;
use crate::format::{entry_timestamp, now_secs, SessionEntry, SessionMeta};
use crate::memory::{MemoryBank, MemoryStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Active session handle.
#[derive(Debug)]
pub struct Session {
    /// Session identifier.
    pub id: String,
    /// Path to the JSONL file.
    pub file_path: PathBuf,
    /// Working directory for this session.
    pub cwd: PathBuf,
    /// Loaded entries.
    pub entries: Vec<SessionEntry>,
}

/// Persistent session storage. Owns the per-session memory stores.
pub struct SessionStore {
    sessions_dir: PathBuf,
    memory: MemoryBank,
}

impl SessionStore {
    /// Create a new session store. Uses `~/.local/share/warden/sessions/` by default.
    pub fn new() -> Self {
        let base = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("warden")
            .join("sessions");
        Self::with_dir(base)
    }

    /// Create with a custom directory (for testing).
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            sessions_dir: dir.into(),
            memory: MemoryBank::new(),
        }
    }

    /// Memory for `session_id`, created empty on first use.
    pub fn memory(&self, session_id: &str) -> Arc<MemoryStore> {
        self.memory.memory(session_id)
    }

    /// Hash a working directory into a short folder name.
    fn cwd_hash(cwd: &Path) -> String {
        let hash = blake3::hash(cwd.to_string_lossy().as_bytes());
        hash.to_hex()[..16].to_string()
    }

    /// Get the session file path. Only ULIDs are accepted as ids.
    fn session_path(&self, cwd: &Path, id: &str) -> Result<PathBuf, SessionError> {
        if ulid::Ulid::from_string(id).is_err() {
            return Err(SessionError::InvalidId(id.to_string()));
        }
        Ok(self
            .sessions_dir
            .join(Self::cwd_hash(cwd))
            .join(format!("{id}.jsonl")))
    }

    /// Create a new session.
    pub async fn create(
        &self,
        cwd: &Path,
        model: &str,
        provider: &str,
    ) -> Result<Session, SessionError> {
        let id = ulid::Ulid::new().to_string();
        let file_path = self.session_path(cwd, &id)?;

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let start_entry = SessionEntry::SessionStart {
            id: id.clone(),
            timestamp: now_secs(),
            cwd: cwd.to_string_lossy().to_string(),
            model: model.to_string(),
            provider: provider.to_string(),
        };

        let line = serde_json::to_string(&start_entry)?;
        fs::write(&file_path, format!("{line}\n")).await?;
        tracing::debug!(session = %id, path = %file_path.display(), "Created session");

        Ok(Session {
            id,
            file_path,
            cwd: cwd.to_path_buf(),
            entries: vec![start_entry],
        })
    }

    /// Load an existing session by ID and index its text into memory.
    pub async fn load(&self, cwd: &Path, id: &str) -> Result<Session, SessionError> {
        let file_path = self.session_path(cwd, id)?;

        let content = match fs::read_to_string(&file_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SessionError::NotFound(id.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let memory = self.memory(id);
        memory.clear();

        let mut entries = Vec::new();
        for (line_num, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let entry: SessionEntry = serde_json::from_str(line).map_err(|e| {
                SessionError::InvalidFormat(format!("Line {}: {e}", line_num + 1))
            })?;
            index_entry(&memory, &entry);
            entries.push(entry);
        }

        Ok(Session {
            id: id.to_string(),
            file_path,
            cwd: cwd.to_path_buf(),
            entries,
        })
    }

    /// Append an event to a session.
    pub async fn append_event(
        &self,
        session: &mut Session,
        entry: SessionEntry,
    ) -> Result<(), SessionError> {
        if !matches!(entry, SessionEntry::Event { .. }) {
            return Err(SessionError::InvalidFormat(
                "Only events can be appended".to_string(),
            ));
        }
        let line = serde_json::to_string(&entry)?;
        let mut file = fs::OpenOptions::new()
            .append(true)
            .open(&session.file_path)
            .await?;
        file.write_all(format!("{line}\n").as_bytes()).await?;

        index_entry(&self.memory(&session.id), &entry);
        session.entries.push(entry);

        Ok(())
    }

    /// List recent sessions for a working directory.
    pub async fn list_recent(
        &self,
        cwd: &Path,
        limit: usize,
    ) -> Result<Vec<SessionMeta>, SessionError> {
        let dir = self.sessions_dir.join(Self::cwd_hash(cwd));
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&dir).await?;
        let mut sessions = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "jsonl") {
                match self.read_session_meta(&path).await {
                    Ok(meta) => sessions.push(meta),
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable session")
                    }
                }
            }
        }

        // Most recent first; ULIDs sort by creation time.
        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        sessions.truncate(limit);
        Ok(sessions)
    }

    /// Read metadata from a session file (parses first and last lines).
    async fn read_session_meta(&self, path: &Path) -> Result<SessionMeta, SessionError> {
        let content = fs::read_to_string(path).await?;
        let lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();

        let (Some(first_line), Some(last_line)) = (lines.first(), lines.last()) else {
            return Err(SessionError::InvalidFormat("Empty session file".to_string()));
        };
        let first: SessionEntry = serde_json::from_str(first_line)?;
        let last: SessionEntry = serde_json::from_str(last_line)?;

        match first {
            SessionEntry::SessionStart {
                id,
                timestamp,
                cwd,
                model,
                provider,
            } => Ok(SessionMeta {
                id,
                created_at: timestamp,
                updated_at: entry_timestamp(&last),
                cwd,
                model,
                provider,
                event_count: lines.len() - 1,
            }),
            SessionEntry::Event { .. } => Err(SessionError::InvalidFormat(
                "First entry is not SessionStart".to_string(),
            )),
        }
    }
}

fn index_entry(memory: &MemoryStore, entry: &SessionEntry) {
    if let SessionEntry::Event { author, parts, .. } = entry {
        for part in parts {
            memory.add(author.as_str(), part.searchable_text());
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
