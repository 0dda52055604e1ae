//! # Step Agent
//!
//! A small agent loop that drives a language model through structured
//! reasoning steps and dispatches tool calls on its behalf.
//!
//! This library provides:
//! - A turn controller that runs one user query to completion
//! - A tool registry with a string-in/string-out tool contract
//! - Integration with OpenRouter for LLM access
//!
//! ## Architecture
//!
//! Every model call returns exactly one step:
//! 1. `START` / `PLAN` steps are echoed into the transcript
//! 2. A `TOOL` step runs one tool and records its observation
//! 3. The next model call sees the real observation
//! 4. An `OUTPUT` step ends the turn
//!
//! ## Example
//!
//! ```rust,ignore
//! use step_agent::{agent::{Agent, Transcript}, config::Config};
//!
//! let config = Config::from_env()?;
//! let agent = Agent::from_config(config);
//! let transcript = Transcript::new(agent.system_prompt());
//! let outcome = agent.run_turn(transcript, "What is the weather in Lisbon?").await?;
//! println!("{}", outcome.content);
//! ```

pub mod agent;
pub mod config;
pub mod llm;
pub mod tools;

pub use config::Config;
