//! One user/AI exchange.

/// A completed turn, before it is written to memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub input: String,
    pub response: String,
}

impl Turn {
    pub fn new(input: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            response: response.into(),
        }
    }

    /// The text stored as a memory record.
    pub fn to_record_text(&self) -> String {
        format!("User: {} / AI: {}", self.input, self.response)
    }
}
