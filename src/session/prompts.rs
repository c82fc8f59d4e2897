//! Fixed prompt payloads injected by the orchestrator.
//!
//! None of these ever appear in the client-facing transcript log: the
//! greeting is spoken directly, and the priming/end payloads travel as
//! control directives that the turn manager never echoes.

use super::SessionRecord;

pub const GREETING_FULL_CONTEXT: &str = "Hello! I've reviewed your resume and the job description. I'm ready to begin your mock interview. Let's start with you telling me a bit about yourself and why you're interested in this role.";

pub const GREETING_RESUME_ONLY: &str = "Hello! I've reviewed your resume. Let's begin with you telling me about yourself and what kind of role you're looking for.";

pub const GREETING_DEFAULT: &str = "Hello! I'm your AI interviewer. Let's begin with you telling me a bit about yourself.";

/// Demo line for the unauthenticated voice-preview endpoint.
pub const VOICE_SAMPLE_TEXT: &str = "Hello, I am ready to conduct your interview.";

/// Opening line, varying with how much context the session record carries.
/// A job description without a resume gets the default greeting.
pub fn greeting_for(record: &SessionRecord) -> &'static str {
    match (&record.resume_text, &record.job_description) {
        (Some(_), Some(_)) => GREETING_FULL_CONTEXT,
        (Some(_), None) => GREETING_RESUME_ONLY,
        _ => GREETING_DEFAULT,
    }
}

/// Hidden priming turn injected at session start when the record carries a
/// resume or job description.
pub fn prime_context(record: &SessionRecord) -> String {
    format!(
        "SYSTEM CONTEXT
<session_id>{}</session_id>

<candidate_resume>
{}
</candidate_resume>

<job_description>
{}
</job_description>

<instructions>
You now have the candidate's resume and the target job description. The interview has begun.
- Do NOT ask for resume or job description - you already have them
- Start by asking a behavioral question relevant to the role
- Use the resume to personalize questions about their specific experiences
- Use the job description to focus on relevant competencies
</instructions>",
        record.id,
        record.resume_text.as_deref().unwrap_or("No resume provided"),
        record
            .job_description
            .as_deref()
            .unwrap_or("No job description provided"),
    )
}

/// Hidden command turn injected when the client ends the session. Instructs
/// the agent to evaluate the transcript (not the resume) and persist feedback
/// through the save_feedback tool before saying goodbye.
pub fn end_interview_command(session_id: &str) -> String {
    format!(
        "<system_command>
<action>end_interview</action>
<session_id>{session_id}</session_id>
<instructions>
The candidate has ended the interview. You must now:
1. ANALYZE THE TRANSCRIPT of the conversation. Do NOT use the resume for feedback - evaluate only what the candidate actually said.
2. Use the save_feedback tool to record your evaluation.
3. Strengths: List 3-5 specific things the candidate did well in their verbal answers (e.g. \"Good use of STAR method in the leadership example\").
4. Weaknesses: List 3-5 specific gaps in their answers (e.g. \"Failed to quantify results in the project management question\").
5. Priorities: List 3-5 actionable communication improvements for next time.
6. Score: 0-100 based strictly on the quality of their spoken answers.
7. questionFeedback: For each main question asked, provide an array with:
   - feedback: 2-3 specific observations about their answer to that question
   - score: 0-100 score for that specific question based on STAR completeness
8. After saving, briefly thank the candidate and say goodbye.
Do NOT speak the JSON data - just confirm feedback is saved.
</instructions>
</system_command>"
    )
}
