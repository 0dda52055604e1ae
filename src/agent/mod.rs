//! Agent module - the step-structured turn controller.
//!
//! The agent follows a "one step per call" pattern:
//! 1. Append the user query to the transcript
//! 2. Ask the model for exactly one step
//! 3. Echo reasoning steps, run the tool for a TOOL step and record the observation
//! 4. Repeat until the model produces an OUTPUT step or the step limit is reached

mod agent_loop;
mod error;
mod prompt;
mod step;
mod transcript;

pub use agent_loop::{Agent, AgentEvent, TurnOptions, TurnOutcome};
pub use error::{AgentError, TurnError};
pub use prompt::build_system_prompt;
pub use step::{InvalidStep, RawStep, Step, StepKind};
pub use transcript::{render_messages, Message, Observation, Role, Transcript};
