//! Session entry types for JSONL persistence.

use serde::{Deserialize, Serialize};

/// A single entry in a session JSONL file.
///
/// Each line in a session file is one `SessionEntry` serialized as JSON.
/// Uses `#[serde(tag = "type")]` for discriminated union format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEntry {
    /// Session start marker (first line).
    #[serde(rename = "session/start")]
    SessionStart {
        id: String,
        timestamp: u64,
        cwd: String,
        model: String,
        provider: String,
    },

    /// One turn's contribution from a single author.
    #[serde(rename = "event")]
    Event {
        id: String,
        timestamp: u64,
        /// Groups the events of one agent invocation.
        invocation_id: String,
        /// "user", the agent name, or "tool".
        author: String,
        parts: Vec<Part>,
    },
}

/// Content carried by an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Part {
    Text {
        text: String,
    },
    FunctionCall {
        name: String,
        args: serde_json::Value,
    },
    FunctionResponse {
        name: String,
        response: serde_json::Value,
    },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Text content, for parts that have any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::FunctionCall { .. } | Self::FunctionResponse { .. } => None,
        }
    }

    /// Text indexed into session memory.
    ///
    /// Calls contribute the tool name and arguments; responses the tool name
    /// and the `output` field when there is one.
    pub fn searchable_text(&self) -> String {
        match self {
            Self::Text { text } => text.clone(),
            Self::FunctionCall { name, args } => format!("{name} {args}"),
            Self::FunctionResponse { name, response } => match response.get("output") {
                Some(serde_json::Value::String(output)) => format!("{name} {output}"),
                _ => format!("{name} {response}"),
            },
        }
    }
}

impl SessionEntry {
    /// New event stamped with a fresh ULID and the current time.
    pub fn event(
        invocation_id: impl Into<String>,
        author: impl Into<String>,
        parts: Vec<Part>,
    ) -> Self {
        Self::Event {
            id: ulid::Ulid::new().to_string(),
            timestamp: now_secs(),
            invocation_id: invocation_id.into(),
            author: author.into(),
            parts,
        }
    }
}

pub(crate) fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Metadata about a session (read from first line + computed stats).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMeta {
    /// Session identifier.
    pub id: String,
    /// Unix timestamp when session was created.
    pub created_at: u64,
    /// Unix timestamp of last update.
    pub updated_at: u64,
    /// Working directory.
    pub cwd: String,
    /// Model used.
    pub model: String,
    /// Provider used.
    pub provider: String,
    /// Number of event entries.
    pub event_count: usize,
}

/// Helper to get the ID from any entry type.
pub fn entry_id(entry: &SessionEntry) -> &str {
    match entry {
        SessionEntry::SessionStart { id, .. } => id,
        SessionEntry::Event { id, .. } => id,
    }
}

/// Helper to get the timestamp from any entry type.
pub fn entry_timestamp(entry: &SessionEntry) -> u64 {
    match entry {
        SessionEntry::SessionStart { timestamp, .. } => *timestamp,
        SessionEntry::Event { timestamp, .. } => *timestamp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_start_serialization() {
        let entry = SessionEntry::SessionStart {
            id: "01HX123".to_string(),
            timestamp: 1234567890,
            cwd: "/home/user/project".to_string(),
            model: "gpt-4o".to_string(),
            provider: "openai".to_string(),
        };

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"type\":\"session/start\""));
        assert!(json.contains("\"id\":\"01HX123\""));

        let deserialized: SessionEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(entry_id(&deserialized), "01HX123");
    }

    #[test]
    fn test_event_wire_format() {
        let entry = SessionEntry::Event {
            id: "e1".to_string(),
            timestamp: 5,
            invocation_id: "inv1".to_string(),
            author: "tool".to_string(),
            parts: vec![
                Part::FunctionCall {
                    name: "read".to_string(),
                    args: serde_json::json!({"path": "main.rs"}),
                },
                Part::text("done"),
            ],
        };

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["type"], "event");
        assert_eq!(value["parts"][0]["kind"], "function_call");
        assert_eq!(value["parts"][1]["kind"], "text");

        let parsed: SessionEntry = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, entry);
    }

    #[test]
    fn test_event_constructor_stamps_id_and_time() {
        let a = SessionEntry::event("inv", "user", vec![Part::text("hi")]);
        let b = SessionEntry::event("inv", "user", vec![Part::text("hi")]);
        assert_ne!(entry_id(&a), entry_id(&b));
        assert!(entry_timestamp(&a) > 0);
    }

    #[test]
    fn test_as_text() {
        assert_eq!(Part::text("x").as_text(), Some("x"));
        let call = Part::FunctionResponse {
            name: "bash".to_string(),
            response: serde_json::json!({"output": "x"}),
        };
        assert_eq!(call.as_text(), None);
    }

    #[test]
    fn test_searchable_text_covers_tool_parts() {
        let call = Part::FunctionCall {
            name: "read".to_string(),
            args: serde_json::json!({"path": "parser.rs"}),
        };
        assert_eq!(call.searchable_text(), r#"read {"path":"parser.rs"}"#);

        let response = Part::FunctionResponse {
            name: "read".to_string(),
            response: serde_json::json!({"output": "fn parse()", "is_error": false}),
        };
        assert_eq!(response.searchable_text(), "read fn parse()");

        let bare = Part::FunctionResponse {
            name: "bash".to_string(),
            response: serde_json::json!(3),
        };
        assert_eq!(bare.searchable_text(), "bash 3");
    }
}
