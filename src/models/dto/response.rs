use serde::Serialize;
use uuid::Uuid;

use crate::models::domain::{
    quiz_session::{Progress, ScoreSummary, SessionState},
    ExportRecord, Question, QuizSession,
};

#[derive(Debug, Clone, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
}

/// A question as shown to the user; the correct answer stays server-side.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub number: usize,
    pub text: String,
    pub options: Vec<String>,
}

impl QuestionView {
    fn new(index: usize, question: &Question) -> Self {
        Self {
            number: index + 1,
            text: question.text().to_string(),
            options: question.options().to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub state: SessionState,
    pub topic: Option<String>,
    pub total_questions: usize,
    pub current_index: usize,
    pub progress: Progress,
    pub score: usize,
    pub current_question: Option<QuestionView>,
}

impl From<&QuizSession> for SessionView {
    fn from(session: &QuizSession) -> Self {
        SessionView {
            session_id: session.id,
            state: session.state(),
            topic: session.topic().map(str::to_string),
            total_questions: session.questions().len(),
            current_index: session.current_index(),
            progress: session.progress(),
            score: session.score(),
            current_question: session
                .current_question()
                .map(|question| QuestionView::new(session.current_index(), question)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Shortfall {
    pub generated: usize,
    pub requested: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateQuizResponse {
    pub session: SessionView,
    pub requested: usize,
    pub generated: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortfall: Option<Shortfall>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultsResponse {
    pub session_id: Uuid,
    pub topic: Option<String>,
    pub summary: ScoreSummary,
    pub performance_message: &'static str,
    pub breakdown: Vec<ExportRecord>,
}

#[derive(Debug, Serialize)]
pub struct DeleteSessionResponse {
    pub message: String,
}
