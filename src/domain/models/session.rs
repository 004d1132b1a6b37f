use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Handle to a chat session created by a [`crate::ChatClient`].
///
/// Cheap to clone; the client owns whatever state lives behind it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionHandle {
    id: String,
    model: String,
}

impl SessionHandle {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            model: model.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}
