use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::session::{FeedbackPayload, QuestionFeedback, SessionStore};

/// The two tool capabilities the interviewer agent can invoke: logging a
/// question/answer pair during the interview, and writing the final evaluation
/// when it ends. Both write through the session store; failures are returned
/// to the agent as error text and never terminate the session.
pub struct InterviewToolbox {
    store: Arc<dyn SessionStore>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveQuestionArgs {
    pub session_id: String,
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveFeedbackArgs {
    pub session_id: String,
    pub score: u8,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub priorities: Vec<String>,
    #[serde(default)]
    pub question_feedback: Option<Vec<QuestionFeedback>>,
}

impl InterviewToolbox {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Tool schemas advertised to the chat-completions API.
    pub fn definitions(&self) -> Vec<Value> {
        vec![
            json!({
                "type": "function",
                "function": {
                    "name": "save_question",
                    "description": "Log a question and the candidate's answer during the interview for later analysis.",
                    "parameters": {
                        "type": "object",
                        "properties": {
                            "sessionId": { "type": "string", "description": "The UUID of the current session" },
                            "question": { "type": "string", "description": "The behavioral question you asked" },
                            "answer": { "type": "string", "description": "The candidate's answer to the question" }
                        },
                        "required": ["sessionId", "question", "answer"]
                    }
                }
            }),
            json!({
                "type": "function",
                "function": {
                    "name": "save_feedback",
                    "description": "Save final interview feedback, score, and analysis to the database.",
                    "parameters": {
                        "type": "object",
                        "properties": {
                            "sessionId": { "type": "string", "description": "The UUID of the current session" },
                            "score": { "type": "integer", "minimum": 0, "maximum": 100, "description": "Role fit score from 0-100" },
                            "strengths": { "type": "array", "items": { "type": "string" }, "description": "List of candidate strengths" },
                            "weaknesses": { "type": "array", "items": { "type": "string" }, "description": "List of areas for improvement" },
                            "priorities": { "type": "array", "items": { "type": "string" }, "description": "List of priority focus areas" },
                            "questionFeedback": {
                                "type": "array",
                                "description": "Optional per-question feedback array, in order asked",
                                "items": {
                                    "type": "object",
                                    "properties": {
                                        "feedback": { "type": "array", "items": { "type": "string" } },
                                        "score": { "type": "integer", "minimum": 0, "maximum": 100 }
                                    },
                                    "required": ["feedback", "score"]
                                }
                            }
                        },
                        "required": ["sessionId", "score", "strengths", "weaknesses", "priorities"]
                    }
                }
            }),
        ]
    }

    /// Execute a tool invocation. Always resolves to a textual result; errors
    /// come back as text for the agent to read, not as a failed turn.
    pub async fn dispatch(&self, name: &str, args: &Value) -> String {
        match name {
            "save_question" => self.save_question(args).await,
            "save_feedback" => self.save_feedback(args).await,
            other => format!("Unknown tool: {other}"),
        }
    }

    async fn save_question(&self, args: &Value) -> String {
        let args: SaveQuestionArgs = match serde_json::from_value(args.clone()) {
            Ok(a) => a,
            Err(e) => return format!("Error logging question: {e}"),
        };

        match self
            .store
            .append_question(&args.session_id, &args.question, &args.answer)
            .await
        {
            Ok(()) => {
                info!("Logged question for session {}", args.session_id);
                "Question logged successfully.".to_string()
            }
            Err(e) => format!("Error logging question: {e:#}"),
        }
    }

    async fn save_feedback(&self, args: &Value) -> String {
        let args: SaveFeedbackArgs = match serde_json::from_value(args.clone()) {
            Ok(a) => a,
            Err(e) => return format!("Error saving feedback: {e}"),
        };

        let payload = FeedbackPayload {
            score: args.score,
            strengths: args.strengths,
            weaknesses: args.weaknesses,
            priorities: args.priorities,
            question_feedback: args.question_feedback,
        };

        match self.store.save_feedback(&args.session_id, payload).await {
            Ok(()) => {
                info!("Saved feedback for session {}", args.session_id);
                "Feedback saved successfully.".to_string()
            }
            Err(e) => format!("Error saving feedback: {e:#}"),
        }
    }
}
