//! Conversational agent capability and turn orchestration
//!
//! The agent itself is a black box behind `ConversationalAgent`: given a
//! session-scoped thread and a message, it streams text fragments and tool
//! activity. `ChatAgent` is the real implementation over an OpenAI-style
//! chat-completions API; `ConversationalTurnManager` bridges finalized
//! transcripts and control directives onto the agent and demultiplexes its
//! output into outward events.

mod chat;
mod tools;
mod turn;

use anyhow::Result;
use serde_json::Value;

use crate::events::EventQueue;

pub use chat::{ChatAgent, SYSTEM_PROMPT};
pub use tools::{InterviewToolbox, SaveFeedbackArgs, SaveQuestionArgs};
pub use turn::ConversationalTurnManager;

/// One message out of the agent's stream for a single turn. Ordering is the
/// agent's emission order; a `ToolResult` always follows its `ToolCall` and
/// carries the same id.
#[derive(Debug, Clone)]
pub enum AgentMessage {
    Text(String),
    ToolCall {
        id: String,
        name: String,
        args: Value,
    },
    ToolResult {
        tool_call_id: String,
        name: String,
        result: String,
    },
}

/// Per-session conversation history. Owned by the session pipeline and
/// discarded with it; nothing about a conversation is process-global.
pub struct AgentThread {
    pub id: String,
    pub(crate) messages: Vec<Value>,
}

impl AgentThread {
    /// Create a thread seeded with the interviewer system prompt.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            messages: vec![serde_json::json!({
                "role": "system",
                "content": SYSTEM_PROMPT,
            })],
        }
    }

    /// Number of messages in the history, including the system prompt.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// The conversational-agent capability: runs one turn against the thread,
/// pushing messages into `events` as they are produced. The caller owns the
/// queue and decides whether the turn's output is visible.
#[async_trait::async_trait]
pub trait ConversationalAgent: Send + Sync {
    async fn run_turn(
        &self,
        thread: &mut AgentThread,
        user_text: &str,
        events: &EventQueue<AgentMessage>,
    ) -> Result<()>;
}
