use std::collections::HashMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// The fields of a persisted interview session the pipeline reads at
/// connection open. The surrounding web application creates the record (and
/// authenticates the user) before the socket connects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub resume_text: Option<String>,
    pub job_description: Option<String>,
}

/// One logged question/answer pair, with feedback filled in at interview end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionEntry {
    pub content: String,
    pub answer: String,
    pub feedback: Option<Vec<String>>,
    pub score: Option<u8>,
}

/// Per-question evaluation supplied with the final feedback, in the order the
/// questions were asked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionFeedback {
    pub feedback: Vec<String>,
    pub score: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackSummary {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub priorities: Vec<String>,
}

/// Final evaluation written when the interview ends.
#[derive(Debug, Clone)]
pub struct FeedbackPayload {
    pub score: u8,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub priorities: Vec<String>,
    pub question_feedback: Option<Vec<QuestionFeedback>>,
}

/// The only persistence operations the voice pipeline needs: read a session
/// by id, append to its question log, and write the final feedback.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    async fn load_session(&self, session_id: &str) -> Result<Option<SessionRecord>>;

    async fn append_question(&self, session_id: &str, question: &str, answer: &str) -> Result<()>;

    async fn save_feedback(&self, session_id: &str, payload: FeedbackPayload) -> Result<()>;
}

/// Interview duration recorded with the feedback, in seconds.
const RECORDED_DURATION_SECS: u32 = 300;

#[derive(Debug, Clone)]
struct StoredSession {
    record: SessionRecord,
    questions: Vec<QuestionEntry>,
    score: Option<u8>,
    duration_secs: Option<u32>,
    feedback_summary: Option<FeedbackSummary>,
}

/// In-memory store. Durable storage belongs to the web application; this
/// implementation carries the contract for local runs and tests.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, StoredSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and register a fresh session, for local runs where no web
    /// application has created one.
    pub async fn create_session(
        &self,
        resume_text: Option<String>,
        job_description: Option<String>,
    ) -> SessionRecord {
        let record = SessionRecord {
            id: uuid::Uuid::new_v4().to_string(),
            resume_text,
            job_description,
        };
        self.insert_session(record.clone()).await;
        record
    }

    /// Register a session record, as the web application would have.
    pub async fn insert_session(&self, record: SessionRecord) {
        let mut sessions = self.sessions.write().await;
        sessions.insert(
            record.id.clone(),
            StoredSession {
                record,
                questions: Vec::new(),
                score: None,
                duration_secs: None,
                feedback_summary: None,
            },
        );
    }

    pub async fn questions(&self, session_id: &str) -> Vec<QuestionEntry> {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)
            .map(|s| s.questions.clone())
            .unwrap_or_default()
    }

    pub async fn score(&self, session_id: &str) -> Option<u8> {
        let sessions = self.sessions.read().await;
        sessions.get(session_id).and_then(|s| s.score)
    }

    pub async fn feedback_summary(&self, session_id: &str) -> Option<FeedbackSummary> {
        let sessions = self.sessions.read().await;
        sessions.get(session_id).and_then(|s| s.feedback_summary.clone())
    }
}

#[async_trait::async_trait]
impl SessionStore for MemorySessionStore {
    async fn load_session(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session_id).map(|s| s.record.clone()))
    }

    async fn append_question(&self, session_id: &str, question: &str, answer: &str) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| anyhow::anyhow!("Session {session_id} not found"))?;

        session.questions.push(QuestionEntry {
            content: question.to_string(),
            answer: answer.to_string(),
            feedback: None,
            score: None,
        });

        Ok(())
    }

    async fn save_feedback(&self, session_id: &str, payload: FeedbackPayload) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| anyhow::anyhow!("Session {session_id} not found"))?;

        session.score = Some(payload.score);
        session.duration_secs = Some(RECORDED_DURATION_SECS);
        session.feedback_summary = Some(FeedbackSummary {
            strengths: payload.strengths,
            weaknesses: payload.weaknesses,
            priorities: payload.priorities,
        });

        if let Some(per_question) = payload.question_feedback {
            for (entry, feedback) in session.questions.iter_mut().zip(per_question) {
                entry.feedback = Some(feedback.feedback);
                entry.score = Some(feedback.score);
            }
        }

        Ok(())
    }
}
