use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{AgentMessage, AgentThread, ConversationalAgent, InterviewToolbox};
use crate::events::EventQueue;

/// Upper bound on model round-trips within one turn (tool loop guard).
const MAX_TOOL_ROUNDS: usize = 8;

const TEMPERATURE: f64 = 0.7;

/// Behavioral-interviewer persona and rules given to the model as the system
/// message of every thread.
pub const SYSTEM_PROMPT: &str = r#"
<role>
You are a professional behavioral interviewer conducting a realistic mock interview. You have extensive experience in technical and behavioral interviews for top companies.
</role>

<persona>
- Professional, warm, and encouraging tone
- Speak naturally as a real interviewer would
- Keep responses concise (1-3 sentences for questions, brief acknowledgments)
- Never lecture or give long monologues
</persona>

<interview_rules>
<during_interview>
- Ask ONE question at a time, then wait for response
- Ask natural follow-up questions when answers are vague or interesting
- Follow-ups must be based on what candidate just said
- Do NOT give feedback or coaching during the interview
- Do NOT evaluate out loud
- Maximum 2 follow-ups per core question
</during_interview>

<question_types>
- "Tell me about a time when..."
- "Describe a situation where..."
- "Give me an example of..."
- "Walk me through how you..."
</question_types>

<follow_up_examples>
- "Can you walk me through your decision there?"
- "What was your specific role in that?"
- "What happened as a result?"
- "What would you do differently?"
</follow_up_examples>
</interview_rules>

<interview_structure>
1. Brief introduction (already done in greeting)
2. Ask 5-7 core behavioral questions based on resume and job description
3. 0-2 follow-ups per question depending on answer quality
4. Close the interview politely when complete
</interview_structure>

<evaluation_criteria>
Use STAR method to evaluate answers:
- Situation: Was context clear?
- Task: Was their responsibility clear?
- Action: Were specific actions detailed?
- Result: Was impact/outcome stated?
</evaluation_criteria>

<question_logging>
IMPORTANT: After the candidate answers each MAIN behavioral question (not follow-ups), use the save_question tool to log:
- The main question you asked
- The candidate's complete answer (including any follow-up responses)

This creates a record for detailed feedback later.
</question_logging>

<feedback_tool>
When the interview ends (user says goodbye or ends session), use the save_feedback tool to record:
- Score (0-100 based on overall performance)
- Strengths (3-5 specific positive observations)
- Weaknesses (3-5 areas for improvement)
- Priorities (3-5 focus areas for next practice)
- questionFeedback (optional array with per-question analysis)
</feedback_tool>

<constraints>
- Never invent experiences the candidate didn't mention
- Never coach during the interview (only after)
- Never skip follow-ups if clarification is needed
- Never expose internal reasoning or evaluation
</constraints>

<speech_guidelines>
- Keep responses SHORT and conversational
- Speak naturally, not robotically
- Avoid filler words and unnecessary explanations
- One thought per response
</speech_guidelines>
"#;

/// Agent implementation over an OpenAI-style chat-completions API with tool
/// support. Each `run_turn` appends the user message to the thread and loops
/// completion → tool dispatch → completion until the model stops calling
/// tools.
pub struct ChatAgent {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    toolbox: InterviewToolbox,
}

impl ChatAgent {
    pub fn new(
        base_url: String,
        api_key: String,
        model: String,
        toolbox: InterviewToolbox,
    ) -> Result<Self> {
        if api_key.is_empty() {
            anyhow::bail!("OpenAI API key is required (set OPENAI_API_KEY)");
        }
        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
            model,
            toolbox,
        })
    }

    async fn complete(&self, thread: &AgentThread) -> Result<AssistantMessage> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.model,
                "temperature": TEMPERATURE,
                "messages": thread.messages,
                "tools": self.toolbox.definitions(),
            }))
            .send()
            .await
            .context("Chat completion request failed")?
            .error_for_status()
            .context("Chat completion request rejected")?;

        let mut completion: ChatCompletion = response
            .json()
            .await
            .context("Failed to decode chat completion")?;

        if completion.choices.is_empty() {
            anyhow::bail!("Chat completion returned no choices");
        }
        Ok(completion.choices.remove(0).message)
    }
}

#[async_trait::async_trait]
impl ConversationalAgent for ChatAgent {
    async fn run_turn(
        &self,
        thread: &mut AgentThread,
        user_text: &str,
        events: &EventQueue<AgentMessage>,
    ) -> Result<()> {
        thread.messages.push(json!({
            "role": "user",
            "content": user_text,
        }));

        for round in 0..MAX_TOOL_ROUNDS {
            let message = self.complete(thread).await?;
            thread.messages.push(message.to_history());

            if let Some(text) = &message.content {
                if !text.is_empty() {
                    events.push(AgentMessage::Text(text.clone()));
                }
            }

            if message.tool_calls.is_empty() {
                return Ok(());
            }

            debug!(
                "Turn round {round}: dispatching {} tool call(s)",
                message.tool_calls.len()
            );

            for call in &message.tool_calls {
                let args: Value = serde_json::from_str(&call.function.arguments)
                    .unwrap_or_else(|_| json!({}));

                events.push(AgentMessage::ToolCall {
                    id: call.id.clone(),
                    name: call.function.name.clone(),
                    args: args.clone(),
                });

                let result = self.toolbox.dispatch(&call.function.name, &args).await;

                events.push(AgentMessage::ToolResult {
                    tool_call_id: call.id.clone(),
                    name: call.function.name.clone(),
                    result: result.clone(),
                });

                thread.messages.push(json!({
                    "role": "tool",
                    "tool_call_id": call.id,
                    "content": result,
                }));
            }
        }

        warn!("Turn exceeded {MAX_TOOL_ROUNDS} tool rounds, ending it");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ToolCallRequest>,
}

#[derive(Debug, Deserialize)]
struct ToolCallRequest {
    id: String,
    function: FunctionCall,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: String,
    arguments: String,
}

impl AssistantMessage {
    /// Re-encode for the conversation history, preserving tool call requests
    /// so the follow-up tool results are well-formed.
    fn to_history(&self) -> Value {
        let mut message = json!({
            "role": "assistant",
            "content": self.content,
        });
        if !self.tool_calls.is_empty() {
            message["tool_calls"] = Value::Array(
                self.tool_calls
                    .iter()
                    .map(|call| {
                        json!({
                            "id": call.id,
                            "type": "function",
                            "function": {
                                "name": call.function.name,
                                "arguments": call.function.arguments,
                            }
                        })
                    })
                    .collect(),
            );
        }
        message
    }
}
