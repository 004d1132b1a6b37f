use serde::{Deserialize, Serialize};

/// One user-submitted message awaiting a reply.
///
/// A `Turn` can only be built from text that is non-empty after trimming;
/// blank input never produces a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    seq: u64,
    text: String,
}

impl Turn {
    /// Returns `None` when `raw` is empty or whitespace-only.
    pub fn new(seq: u64, raw: &str) -> Option<Self> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            seq,
            text: text.to_string(),
        })
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}
