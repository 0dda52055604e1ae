//! Core agent loop implementation.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::Config;
use crate::llm::{CompletionService, OpenRouterClient};
use crate::tools::ToolRegistry;

use super::error::{AgentError, TurnError};
use super::prompt::build_system_prompt;
use super::step::Step;
use super::transcript::{Message, Observation, Transcript};

/// Live progress of a turn, for callers that display steps as they arrive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentEvent {
    /// The model returned a step.
    Step { turn_id: Uuid, step: Step },
    /// A tool finished; `success` is false when its error became the output.
    ToolResult {
        turn_id: Uuid,
        observation: Observation,
        success: bool,
    },
}

/// Per-turn knobs that are not part of the agent configuration.
#[derive(Debug, Clone, Default)]
pub struct TurnOptions {
    /// Checked between steps; a cancelled turn returns its partial transcript.
    pub cancel: Option<CancellationToken>,

    /// Receives an event for every step and tool result.
    pub events: Option<mpsc::UnboundedSender<AgentEvent>>,
}

impl TurnOptions {
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn with_events(mut self, tx: mpsc::UnboundedSender<AgentEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|t| t.is_cancelled())
    }

    fn emit(&self, event: AgentEvent) {
        if let Some(tx) = &self.events {
            // A dropped receiver only means nobody is watching.
            let _ = tx.send(event);
        }
    }
}

/// Result of a turn that reached an OUTPUT step.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub turn_id: Uuid,

    /// Content of the OUTPUT step
    pub content: String,

    /// Input transcript plus everything appended during the turn
    pub transcript: Transcript,

    /// Number of model calls made
    pub steps: usize,
}

/// The step-structured agent.
///
/// Holds no per-turn state: the transcript is passed in and handed back,
/// so one agent can serve many independent sessions at once.
pub struct Agent {
    config: Config,
    llm: Arc<dyn CompletionService>,
    tools: Arc<ToolRegistry>,
}

impl Agent {
    /// Create an agent from explicit collaborators.
    pub fn new(config: Config, llm: Arc<dyn CompletionService>, tools: Arc<ToolRegistry>) -> Self {
        Self { config, llm, tools }
    }

    /// Create an agent backed by OpenRouter with the built-in tools.
    pub fn from_config(config: Config) -> Self {
        let llm = Arc::new(OpenRouterClient::with_base_url(
            config.api_key.clone(),
            config.model.clone(),
            config.base_url.clone(),
        ));
        let tools = Arc::new(ToolRegistry::with_defaults(&config.weather_url));

        Self { config, llm, tools }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// System prompt describing the step protocol and this agent's tools.
    pub fn system_prompt(&self) -> String {
        build_system_prompt(&self.tools)
    }

    /// Fresh transcript seeded with [`Agent::system_prompt`].
    pub fn new_transcript(&self) -> Transcript {
        Transcript::new(self.system_prompt())
    }

    /// Run one user query to its OUTPUT step.
    pub async fn run_turn(
        &self,
        transcript: Transcript,
        user_query: &str,
    ) -> Result<TurnOutcome, TurnError> {
        self.run_turn_with(transcript, user_query, &TurnOptions::default())
            .await
    }

    /// Run one user query with cancellation and/or live events.
    pub async fn run_turn_with(
        &self,
        transcript: Transcript,
        user_query: &str,
        options: &TurnOptions,
    ) -> Result<TurnOutcome, TurnError> {
        let turn_id = Uuid::new_v4();
        let span = tracing::info_span!("turn", %turn_id);

        self.drive_turn(turn_id, transcript, user_query, options)
            .instrument(span)
            .await
    }

    async fn drive_turn(
        &self,
        turn_id: Uuid,
        mut transcript: Transcript,
        user_query: &str,
        options: &TurnOptions,
    ) -> Result<TurnOutcome, TurnError> {
        if user_query.trim().is_empty() {
            return Err(TurnError::new(turn_id, AgentError::EmptyQuery, transcript));
        }
        let system_instruction = match transcript.system_instruction() {
            Some(s) => s.to_string(),
            None => {
                return Err(TurnError::new(
                    turn_id,
                    AgentError::MissingSystemMessage,
                    transcript,
                ))
            }
        };

        transcript.push(Message::user(user_query));
        let mut steps = 0usize;

        loop {
            if options.is_cancelled() {
                tracing::info!("Turn cancelled after {} steps", steps);
                return Err(TurnError::new(turn_id, AgentError::Cancelled, transcript));
            }
            if let Some(limit) = self.config.max_steps {
                if steps >= limit {
                    tracing::warn!("Step limit ({}) reached without OUTPUT", limit);
                    return Err(TurnError::new(
                        turn_id,
                        AgentError::StepLimitExceeded { limit },
                        transcript,
                    ));
                }
            }

            steps += 1;
            tracing::debug!("Agent step {}", steps);

            let step = match self
                .llm
                .complete(&system_instruction, transcript.conversation())
                .await
            {
                Ok(step) => step,
                Err(e) => {
                    tracing::warn!("Completion failed at step {}: {}", steps, e);
                    return Err(TurnError::new(turn_id, e.into(), transcript));
                }
            };

            tracing::debug!("Received {} step", step.kind());
            options.emit(AgentEvent::Step {
                turn_id,
                step: step.clone(),
            });

            match &step {
                Step::Start { .. } | Step::Plan { .. } => {
                    transcript.push(Message::assistant_step(&step));
                }
                Step::Tool { name, input } => {
                    if self.config.echo_tool_steps {
                        transcript.push(Message::assistant_step(&step));
                    }

                    let Some(tool) = self.tools.lookup(name) else {
                        tracing::warn!("Model requested unknown tool: {}", name);
                        return Err(TurnError::new(
                            turn_id,
                            AgentError::UnknownTool { name: name.clone() },
                            transcript,
                        ));
                    };

                    tracing::info!("Calling tool: {} with input: {}", name, input);
                    let (output, success) = match tool.execute(input).await {
                        Ok(output) => (output, true),
                        Err(e) => {
                            tracing::warn!("Tool {} failed: {:#}", name, e);
                            (format!("Error: {:#}", e), false)
                        }
                    };
                    tracing::debug!("Tool {} returned: {}", name, truncate_for_log(&output, 1000));

                    let observation = Observation {
                        tool: name.clone(),
                        input: input.clone(),
                        output,
                    };
                    transcript.push(Message::observation(&observation));
                    options.emit(AgentEvent::ToolResult {
                        turn_id,
                        observation,
                        success,
                    });
                }
                Step::Output { content } => {
                    transcript.push(Message::assistant_step(&step));
                    tracing::info!("Turn completed in {} steps", steps);
                    return Ok(TurnOutcome {
                        turn_id,
                        content: content.clone(),
                        transcript,
                        steps,
                    });
                }
            }
        }
    }
}

/// Truncate a string for logging purposes.
fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... [truncated]", &s[..end])
}
