use serde::{Deserialize, Serialize};

/// One message from the provider's own record of a chat session.
///
/// The role is kept as the provider reports it; providers are free to use
/// roles beyond `user` and `model`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    role: String,
    text: String,
}

impl HistoryEntry {
    pub fn new(role: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            text: text.into(),
        }
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn display_line(&self) -> String {
        format!("role - {}: {}", self.role, self.text)
    }
}

/// Renders entries one per line, the format used when history is printed
/// to a console.
pub fn format_history(entries: &[HistoryEntry]) -> String {
    entries
        .iter()
        .map(HistoryEntry::display_line)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_role_prefixed_lines() {
        let entries = vec![
            HistoryEntry::new("user", "Hello"),
            HistoryEntry::new("model", "Hi there"),
        ];
        assert_eq!(
            format_history(&entries),
            "role - user: Hello\nrole - model: Hi there"
        );
    }
}
