//! Turn-level error taxonomy.

use thiserror::Error;
use uuid::Uuid;

use crate::llm::CompletionError;

use super::transcript::Transcript;

/// Why a turn stopped without an OUTPUT step.
///
/// A failing tool is not listed here: its error becomes the observation
/// output and the turn goes on.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Completion failed: {0}")]
    Completion(#[from] CompletionError),

    #[error("Model requested unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("Step limit ({limit}) reached without an OUTPUT step")]
    StepLimitExceeded { limit: usize },

    #[error("Turn cancelled")]
    Cancelled,

    #[error("User query is empty")]
    EmptyQuery,

    #[error("Transcript must start with a system message")]
    MissingSystemMessage,
}

/// A failed turn, with everything appended before the failure.
#[derive(Debug)]
pub struct TurnError {
    pub turn_id: Uuid,
    pub error: AgentError,
    pub transcript: Transcript,
}

impl TurnError {
    pub(crate) fn new(turn_id: Uuid, error: AgentError, transcript: Transcript) -> Self {
        Self {
            turn_id,
            error,
            transcript,
        }
    }

    /// Split into the cause and the partial transcript.
    pub fn into_parts(self) -> (AgentError, Transcript) {
        (self.error, self.transcript)
    }
}

impl std::fmt::Display for TurnError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "turn {} failed: {}", self.turn_id, self.error)
    }
}

impl std::error::Error for TurnError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
