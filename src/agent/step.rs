//! Step types returned by the model on every call.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm::CompletionError;

/// Step kind without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StepKind {
    /// Informational restatement of the user input
    Start,
    /// One reasoning step
    Plan,
    /// Request to invoke a tool
    Tool,
    /// Final answer, ends the turn
    Output,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::Start => "START",
            StepKind::Plan => "PLAN",
            StepKind::Tool => "TOOL",
            StepKind::Output => "OUTPUT",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "START" => Some(StepKind::Start),
            "PLAN" => Some(StepKind::Plan),
            "TOOL" => Some(StepKind::Tool),
            "OUTPUT" => Some(StepKind::Output),
            _ => None,
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One structured step. Payload fields are checked when the step is built,
/// so a `Tool` always carries a tool name and `Plan`/`Output` always carry content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Start { content: Option<String> },
    Plan { content: String },
    Tool { name: String, input: String },
    Output { content: String },
}

/// Wire form of a step: `{"step": "PLAN", "content": "...", "tool": "...", "input": "..."}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStep {
    pub step: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidStep {
    #[error("unknown step kind: {0:?}")]
    UnknownKind(String),

    #[error("{0} step is missing its content")]
    MissingContent(StepKind),

    #[error("TOOL step is missing a tool name")]
    MissingToolName,
}

impl Step {
    pub fn start(content: impl Into<String>) -> Self {
        Step::Start {
            content: Some(content.into()),
        }
    }

    pub fn plan(content: impl Into<String>) -> Self {
        Step::Plan {
            content: content.into(),
        }
    }

    pub fn tool(name: impl Into<String>, input: impl Into<String>) -> Self {
        Step::Tool {
            name: name.into(),
            input: input.into(),
        }
    }

    pub fn output(content: impl Into<String>) -> Self {
        Step::Output {
            content: content.into(),
        }
    }

    pub fn kind(&self) -> StepKind {
        match self {
            Step::Start { .. } => StepKind::Start,
            Step::Plan { .. } => StepKind::Plan,
            Step::Tool { .. } => StepKind::Tool,
            Step::Output { .. } => StepKind::Output,
        }
    }

    /// Text content, if this kind carries any.
    pub fn content(&self) -> Option<&str> {
        match self {
            Step::Start { content } => content.as_deref(),
            Step::Plan { content } | Step::Output { content } => Some(content),
            Step::Tool { .. } => None,
        }
    }

    /// Parse the model's JSON reply into a validated step.
    ///
    /// Models sometimes wrap JSON in a markdown fence; the fence is stripped first.
    pub fn from_json(raw: &str) -> Result<Self, CompletionError> {
        let body = strip_code_fence(raw);
        let parsed: RawStep =
            serde_json::from_str(body).map_err(|e| CompletionError::MalformedStep {
                raw: raw.to_string(),
                reason: e.to_string(),
            })?;

        Step::try_from(parsed).map_err(|e| CompletionError::MalformedStep {
            raw: raw.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn to_raw(&self) -> RawStep {
        let mut raw = RawStep {
            step: self.kind().as_str().to_string(),
            ..RawStep::default()
        };
        match self {
            Step::Start { content } => raw.content = content.clone(),
            Step::Plan { content } | Step::Output { content } => {
                raw.content = Some(content.clone())
            }
            Step::Tool { name, input } => {
                raw.tool = Some(name.clone());
                raw.input = Some(input.clone());
            }
        }
        raw
    }

    /// Render the wire form, as stored in assistant echoes.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.to_raw()).unwrap_or_default()
    }
}

impl TryFrom<RawStep> for Step {
    type Error = InvalidStep;

    fn try_from(raw: RawStep) -> Result<Self, Self::Error> {
        let kind = StepKind::parse(&raw.step).ok_or_else(|| InvalidStep::UnknownKind(raw.step))?;

        match kind {
            StepKind::Start => Ok(Step::Start {
                content: raw.content,
            }),
            StepKind::Plan => raw
                .content
                .map(|content| Step::Plan { content })
                .ok_or(InvalidStep::MissingContent(kind)),
            StepKind::Output => raw
                .content
                .map(|content| Step::Output { content })
                .ok_or(InvalidStep::MissingContent(kind)),
            StepKind::Tool => {
                let name = raw
                    .tool
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .ok_or(InvalidStep::MissingToolName)?;
                Ok(Step::Tool {
                    name,
                    input: raw.input.unwrap_or_default(),
                })
            }
        }
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
