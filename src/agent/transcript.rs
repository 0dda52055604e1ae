//! Conversation transcript: the ordered message history replayed to the model.

use serde::{Deserialize, Serialize};

use super::step::Step;

/// Message role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
    ToolObservation,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::System => "SYSTEM",
            Role::User => "USER",
            Role::Assistant => "ASSISTANT",
            Role::ToolObservation => "OBSERVE",
        }
    }
}

/// A single transcript entry. Fields are private so a message can't change after it is built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    role: Role,
    content: String,
}

/// Record of one tool invocation, stored as the content of a `ToolObservation` message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Observation {
    pub tool: String,
    pub input: String,
    pub output: String,
}

#[derive(Serialize, Deserialize)]
struct ObservationRecord {
    step: String,
    #[serde(flatten)]
    observation: Observation,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Assistant echo of a step, stored in the step's wire form.
    pub fn assistant_step(step: &Step) -> Self {
        Self {
            role: Role::Assistant,
            content: step.to_json(),
        }
    }

    pub fn observation(observation: &Observation) -> Self {
        let record = ObservationRecord {
            step: "OBSERVE".to_string(),
            observation: observation.clone(),
        };
        Self {
            role: Role::ToolObservation,
            content: serde_json::to_string(&record).unwrap_or_default(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Decode the observation record, if this is a tool observation.
    pub fn as_observation(&self) -> Option<Observation> {
        if self.role != Role::ToolObservation {
            return None;
        }
        serde_json::from_str::<ObservationRecord>(&self.content)
            .ok()
            .map(|r| r.observation)
    }

    /// Decode the echoed step, if this is an assistant echo.
    pub fn as_step(&self) -> Option<Step> {
        if self.role != Role::Assistant {
            return None;
        }
        Step::from_json(&self.content).ok()
    }
}

/// Append-only message history for one session.
///
/// The first message is always the system instruction. Only the agent loop
/// appends to a transcript; callers can read it, keep it between turns, or
/// persist it with serde.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new(system_instruction: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system_instruction)],
        }
    }

    pub(crate) fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Everything after the leading system message.
    pub fn conversation(&self) -> &[Message] {
        match self.messages.first() {
            Some(m) if m.role == Role::System => &self.messages[1..],
            _ => &self.messages,
        }
    }

    pub fn system_instruction(&self) -> Option<&str> {
        self.messages
            .first()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn observations(&self) -> Vec<Observation> {
        self.messages
            .iter()
            .filter_map(Message::as_observation)
            .collect()
    }

    /// Render as `ROLE: content` lines, one per message.
    pub fn render_text(&self) -> String {
        render_messages(&self.messages)
    }
}

/// Render any message slice as `ROLE: content` lines.
pub fn render_messages(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.role.label(), m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_transcript_starts_with_system_message() {
        let transcript = Transcript::new("math-only assistant");
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.system_instruction(), Some("math-only assistant"));
        assert!(transcript.conversation().is_empty());
    }

    #[test]
    fn observation_round_trips_through_message() {
        let observation = Observation {
            tool: "get_weather".to_string(),
            input: "Lisbon".to_string(),
            output: "sunny, 20C".to_string(),
        };
        let message = Message::observation(&observation);

        assert_eq!(message.role(), Role::ToolObservation);
        assert!(message.content().contains(r#""step":"OBSERVE""#));
        assert_eq!(message.as_observation(), Some(observation));
        assert_eq!(Message::user("hi").as_observation(), None);
    }

    #[test]
    fn assistant_echo_decodes_to_step() {
        let message = Message::assistant_step(&Step::plan("compute"));
        assert_eq!(message.as_step(), Some(Step::plan("compute")));
    }

    #[test]
    fn render_text_prefixes_roles() {
        let mut transcript = Transcript::new("sys");
        transcript.push(Message::user("2+2?"));
        transcript.push(Message::assistant_step(&Step::output("4")));

        assert_eq!(
            transcript.render_text(),
            "SYSTEM: sys\nUSER: 2+2?\nASSISTANT: {\"step\":\"OUTPUT\",\"content\":\"4\"}"
        );
        assert_eq!(
            render_messages(transcript.conversation()),
            "USER: 2+2?\nASSISTANT: {\"step\":\"OUTPUT\",\"content\":\"4\"}"
        );
    }

    #[test]
    fn conversation_without_system_message_is_whole_history() {
        let transcript: Transcript =
            serde_json::from_str(r#"{"messages":[{"role":"user","content":"hi"}]}"#).unwrap();
        assert_eq!(transcript.system_instruction(), None);
        assert_eq!(transcript.conversation().len(), 1);
    }
}
