use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }

    /// Prefix used when an entry is rendered as a transcript line.
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Model => "MODEL",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    role: Role,
    text: String,
}

impl LogEntry {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn display_line(&self) -> String {
        format!("{}: {}", self.role.label(), self.text)
    }
}

/// Append-only record of displayed exchanges. Insertion order is display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationLog {
    entries: Vec<LogEntry>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.entries.push(LogEntry::new(Role::User, text));
    }

    pub fn push_model(&mut self, text: impl Into<String>) {
        self.entries.push(LogEntry::new(Role::Model, text));
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn with_role(&self, role: Role) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(move |e| e.role == role)
    }

    /// Explicit reset; returns what was cleared.
    pub fn clear(&mut self) -> Vec<LogEntry> {
        std::mem::take(&mut self.entries)
    }
}
