//! Completion service abstraction.
//!
//! The agent loop only needs one thing from a model: given the system
//! instruction and the conversation so far, return exactly one step.

mod openrouter;

use async_trait::async_trait;
use thiserror::Error;

use crate::agent::{Message, Step};

pub use openrouter::{OpenRouterClient, DEFAULT_BASE_URL};

/// Failure to obtain a well-formed step from the model.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Model returned an empty response")]
    EmptyResponse,

    #[error("Malformed step ({reason}): {raw}")]
    MalformedStep { raw: String, reason: String },
}

impl From<reqwest::Error> for CompletionError {
    fn from(e: reqwest::Error) -> Self {
        CompletionError::Transport(e.to_string())
    }
}

/// A model that produces one structured step per call.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// `conversation` excludes the system message, which is passed separately.
    async fn complete(
        &self,
        system_instruction: &str,
        conversation: &[Message],
    ) -> Result<Step, CompletionError>;
}
