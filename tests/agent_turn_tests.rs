// Turn lifecycle: echo and visibility rules for transcripts and control
// directives, and ordering of forwarded tool activity.

mod common;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use common::{collect_events, EchoAgent};
use interview_agent::agent::{
    AgentMessage, AgentThread, ConversationalAgent, ConversationalTurnManager, InterviewToolbox,
};
use interview_agent::events::{
    channel, ControlDirective, EventQueue, PipelineInput, TranscriptEvent, VoiceEvent,
};
use interview_agent::session::{MemorySessionStore, SessionRecord, SessionStore};
use serde_json::json;

#[test]
fn test_new_thread_is_seeded_with_the_system_message() {
    let thread = AgentThread::new("thread-1");

    assert_eq!(thread.id, "thread-1");
    assert!(!thread.is_empty());
    assert_eq!(thread.len(), 1, "history starts with the persona message");
}

#[tokio::test]
async fn test_final_transcript_runs_a_visible_turn() {
    let (input, input_rx) = channel();
    let (out, out_rx) = channel();

    let manager = ConversationalTurnManager::new(Arc::new(EchoAgent), "thread-1");
    let task = tokio::spawn(manager.run(input_rx, out));

    input.push(PipelineInput::Transcript(TranscriptEvent::finalized(
        "I led a team of five",
    )));
    input.cancel();

    let events = collect_events(out_rx).await;
    task.await.unwrap();

    assert_eq!(events.len(), 3);
    assert!(
        matches!(&events[0], VoiceEvent::SttOutput { transcript, .. } if transcript == "I led a team of five")
    );
    assert!(
        matches!(&events[1], VoiceEvent::AgentChunk { text, .. } if text == "You said I led a team of five")
    );
    assert!(matches!(events[2], VoiceEvent::AgentEnd { .. }));
}

#[tokio::test]
async fn test_interim_transcripts_do_not_start_turns() {
    let (input, input_rx) = channel();
    let (out, out_rx) = channel();

    let manager = ConversationalTurnManager::new(Arc::new(EchoAgent), "thread-1");
    tokio::spawn(manager.run(input_rx, out));

    input.push(PipelineInput::Transcript(TranscriptEvent::interim("I led")));
    input.cancel();

    let events = collect_events(out_rx).await;

    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], VoiceEvent::SttChunk { transcript, .. } if transcript == "I led"));
}

#[tokio::test]
async fn test_priming_turn_is_fully_suppressed() {
    let (input, input_rx) = channel();
    let (out, out_rx) = channel();

    let manager = ConversationalTurnManager::new(Arc::new(EchoAgent), "thread-1");
    tokio::spawn(manager.run(input_rx, out));

    input.push(PipelineInput::Control(ControlDirective::PrimeSession {
        prompt: "SYSTEM CONTEXT ...".into(),
    }));
    input.push(PipelineInput::Transcript(TranscriptEvent::finalized(
        "Hello",
    )));
    input.cancel();

    let events = collect_events(out_rx).await;

    // Nothing from the priming turn; the first event belongs to the
    // transcript that followed it.
    assert!(matches!(&events[0], VoiceEvent::SttOutput { transcript, .. } if transcript == "Hello"));
    assert_eq!(events.len(), 3);
}

#[tokio::test]
async fn test_end_interview_turn_is_not_echoed() {
    let (input, input_rx) = channel();
    let (out, out_rx) = channel();

    let manager = ConversationalTurnManager::new(Arc::new(EchoAgent), "thread-1");
    tokio::spawn(manager.run(input_rx, out));

    input.push(PipelineInput::Control(ControlDirective::EndInterview {
        prompt: "<system_command>...</system_command>".into(),
    }));
    input.cancel();

    let events = collect_events(out_rx).await;

    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], VoiceEvent::AgentChunk { .. }));
    assert!(matches!(events[1], VoiceEvent::AgentEnd { .. }));
    assert!(!events
        .iter()
        .any(|e| matches!(e, VoiceEvent::SttOutput { .. })));
}

/// Agent that logs the answer through the question tool before replying.
struct NoteTakingAgent {
    toolbox: InterviewToolbox,
    session_id: String,
}

#[async_trait]
impl ConversationalAgent for NoteTakingAgent {
    async fn run_turn(
        &self,
        _thread: &mut AgentThread,
        user_text: &str,
        events: &EventQueue<AgentMessage>,
    ) -> Result<()> {
        let args = json!({
            "sessionId": self.session_id,
            "question": "Tell me about yourself",
            "answer": user_text,
        });

        events.push(AgentMessage::ToolCall {
            id: "call-1".into(),
            name: "save_question".into(),
            args: args.clone(),
        });
        let result = self.toolbox.dispatch("save_question", &args).await;
        events.push(AgentMessage::ToolResult {
            tool_call_id: "call-1".into(),
            name: "save_question".into(),
            result,
        });

        events.push(AgentMessage::Text("Thanks. Next question.".into()));
        Ok(())
    }
}

#[tokio::test]
async fn test_tool_activity_is_forwarded_in_order() {
    let store = Arc::new(MemorySessionStore::new());
    store
        .insert_session(SessionRecord {
            id: "sess-1".into(),
            resume_text: None,
            job_description: None,
        })
        .await;

    let agent = NoteTakingAgent {
        toolbox: InterviewToolbox::new(Arc::clone(&store) as Arc<dyn SessionStore>),
        session_id: "sess-1".into(),
    };

    let (input, input_rx) = channel();
    let (out, out_rx) = channel();
    let manager = ConversationalTurnManager::new(Arc::new(agent), "sess-1");
    tokio::spawn(manager.run(input_rx, out));

    input.push(PipelineInput::Transcript(TranscriptEvent::finalized(
        "I am a backend engineer",
    )));
    input.cancel();

    let events = collect_events(out_rx).await;

    assert_eq!(events.len(), 5);
    assert!(matches!(events[0], VoiceEvent::SttOutput { .. }));
    assert!(
        matches!(&events[1], VoiceEvent::ToolCall { id, name, .. } if id == "call-1" && name == "save_question")
    );
    assert!(
        matches!(&events[2], VoiceEvent::ToolResult { tool_call_id, result, .. }
            if tool_call_id == "call-1" && result == "Question logged successfully.")
    );
    assert!(matches!(events[3], VoiceEvent::AgentChunk { .. }));
    assert!(matches!(events[4], VoiceEvent::AgentEnd { .. }));

    let questions = store.questions("sess-1").await;
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].answer, "I am a backend engineer");
}

/// Agent whose turn always fails.
struct BrokenAgent;

#[async_trait]
impl ConversationalAgent for BrokenAgent {
    async fn run_turn(
        &self,
        _thread: &mut AgentThread,
        _user_text: &str,
        _events: &EventQueue<AgentMessage>,
    ) -> Result<()> {
        anyhow::bail!("model unavailable")
    }
}

#[tokio::test]
async fn test_failed_turn_still_ends_exactly_once() {
    let (input, input_rx) = channel();
    let (out, out_rx) = channel();

    let manager = ConversationalTurnManager::new(Arc::new(BrokenAgent), "thread-1");
    tokio::spawn(manager.run(input_rx, out));

    input.push(PipelineInput::Transcript(TranscriptEvent::finalized(
        "Hello",
    )));
    input.cancel();

    let events = collect_events(out_rx).await;

    let ends = events
        .iter()
        .filter(|e| matches!(e, VoiceEvent::AgentEnd { .. }))
        .count();
    assert_eq!(ends, 1, "a failed turn still closes");
}
