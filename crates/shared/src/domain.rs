use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of the analysis tool that produced an answer.
///
/// Backends report tool names as free-form strings, so this stays open:
/// unknown names are carried verbatim rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolId(pub String);

impl ToolId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    User,
    Agent,
    SystemNote,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub kind: EntryKind,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<ToolId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
}

impl ConversationEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self::plain(EntryKind::User, text)
    }

    pub fn agent(text: impl Into<String>, tool: Option<ToolId>, elapsed_ms: Option<u64>) -> Self {
        Self {
            kind: EntryKind::Agent,
            text: text.into(),
            timestamp: Utc::now(),
            tool,
            elapsed_ms,
        }
    }

    pub fn system_note(text: impl Into<String>) -> Self {
        Self::plain(EntryKind::SystemNote, text)
    }

    fn plain(kind: EntryKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            timestamp: Utc::now(),
            tool: None,
            elapsed_ms: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusSeverity {
    Info,
    Success,
    Error,
}

impl StatusSeverity {
    /// Terminal severities are the ones that expire on their own.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Info)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadStatus {
    pub severity: StatusSeverity,
    pub message: String,
}

impl UploadStatus {
    pub fn new(severity: StatusSeverity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(StatusSeverity::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(StatusSeverity::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(StatusSeverity::Error, message)
    }
}
