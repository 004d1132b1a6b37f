use serde::{Deserialize, Serialize};

/// Result of processing a single turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Success { text: String },
    Failure { reason: String },
}

impl Outcome {
    pub fn success(text: impl Into<String>) -> Self {
        Self::Success { text: text.into() }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        Self::Failure {
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// An outcome tagged with the sequence number of the turn that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    seq: u64,
    outcome: Outcome,
}

impl Delivery {
    pub fn new(seq: u64, outcome: Outcome) -> Self {
        Self { seq, outcome }
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn into_outcome(self) -> Outcome {
        self.outcome
    }
}
