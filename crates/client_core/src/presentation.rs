//! Display metadata for transcript entries and tool identifiers.

use chrono::Local;
use shared::domain::{ConversationEntry, EntryKind, StatusSeverity, ToolId, UploadStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolIcon {
    Psychology,
    Insights,
    DataObject,
}

impl ToolIcon {
    pub fn key(self) -> &'static str {
        match self {
            Self::Psychology => "psychology",
            Self::Insights => "insights",
            Self::DataObject => "data_object",
        }
    }
}

const KNOWN_TOOLS: &[(&str, ToolIcon, &str)] = &[
    ("qa_tool", ToolIcon::Psychology, "Q&A"),
    ("insights_tool", ToolIcon::Insights, "Insights"),
    ("extract_tool", ToolIcon::DataObject, "Extract"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDisplay {
    pub icon: Option<ToolIcon>,
    pub label: String,
}

/// Unknown tools get no icon and their raw identifier as label.
pub fn tool_display(tool: &ToolId) -> ToolDisplay {
    KNOWN_TOOLS
        .iter()
        .find(|(name, _, _)| *name == tool.as_str())
        .map(|(_, icon, label)| ToolDisplay {
            icon: Some(*icon),
            label: (*label).to_string(),
        })
        .unwrap_or_else(|| ToolDisplay {
            icon: None,
            label: tool.as_str().to_string(),
        })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryView {
    pub kind: EntryKind,
    pub text: String,
    pub time: String,
    pub tool: Option<ToolDisplay>,
    pub elapsed: Option<String>,
}

pub fn entry_view(entry: &ConversationEntry) -> EntryView {
    EntryView {
        kind: entry.kind,
        text: entry.text.clone(),
        time: entry
            .timestamp
            .with_timezone(&Local)
            .format("%H:%M")
            .to_string(),
        tool: entry.tool.as_ref().map(tool_display),
        elapsed: entry.elapsed_ms.map(|ms| format!("{ms}ms")),
    }
}

pub fn severity_label(severity: StatusSeverity) -> &'static str {
    match severity {
        StatusSeverity::Info => "info",
        StatusSeverity::Success => "success",
        StatusSeverity::Error => "error",
    }
}

pub fn status_line(status: &UploadStatus) -> String {
    format!("[{}] {}", severity_label(status.severity), status.message)
}
