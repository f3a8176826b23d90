use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{
        export_record::ExportRecord,
        question::{Question, OPTION_COUNT},
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Empty,
    InProgress,
    Complete,
}

/// One browser session's quiz. Owned per session id; never shared.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizSession {
    pub id: Uuid,
    topic: Option<String>,
    questions: Vec<Question>,
    current_index: usize,
    answers: BTreeMap<usize, usize>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AnswerFeedback {
    pub question_index: usize,
    pub selected_index: usize,
    pub correct_index: usize,
    pub correct: bool,
    pub explanation: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Progress {
    pub answered: usize,
    pub total: usize,
    /// 1-based question number for display, clamped to `total`.
    pub position: usize,
    pub ratio: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Performance {
    Outstanding,
    Great,
    Good,
    KeepLearning,
}

impl Performance {
    pub fn from_percentage(percentage: u32) -> Self {
        if percentage >= 90 {
            Performance::Outstanding
        } else if percentage >= 70 {
            Performance::Great
        } else if percentage >= 50 {
            Performance::Good
        } else {
            Performance::KeepLearning
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Performance::Outstanding => "Outstanding! You're clearly an expert on this topic!",
            Performance::Great => "Great job! You have a solid understanding!",
            Performance::Good => "Good effort! A bit more study and you'll master this!",
            Performance::KeepLearning => {
                "Keep learning! Everyone starts somewhere - practice makes perfect!"
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ScoreSummary {
    pub total: usize,
    pub answered: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub unanswered: usize,
    pub percentage: u32,
    pub performance: Performance,
}

impl QuizSession {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            topic: None,
            questions: Vec::new(),
            current_index: 0,
            answers: BTreeMap::new(),
            created_at: now,
            modified_at: now,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.questions.is_empty() {
            SessionState::Empty
        } else if self.current_index < self.questions.len() {
            SessionState::InProgress
        } else {
            SessionState::Complete
        }
    }

    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn answers(&self) -> &BTreeMap<usize, usize> {
        &self.answers
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    pub fn load(&mut self, topic: impl Into<String>, questions: Vec<Question>) -> AppResult<()> {
        if self.state() != SessionState::Empty {
            return Err(AppError::InvalidState(
                "a quiz is already loaded; reset the session first".to_string(),
            ));
        }
        if questions.is_empty() {
            return Err(AppError::InvalidState(
                "cannot load a quiz without questions".to_string(),
            ));
        }

        self.topic = Some(topic.into());
        self.questions = questions;
        self.current_index = 0;
        self.answers.clear();
        self.touch();
        Ok(())
    }

    /// Records the answer for the current question. Re-submitting before
    /// [`advance`](Self::advance) replaces the earlier choice.
    pub fn submit_answer(&mut self, selected_index: usize) -> AppResult<AnswerFeedback> {
        self.require_in_progress("submit an answer")?;

        if selected_index >= OPTION_COUNT {
            return Err(AppError::InvalidInput(format!(
                "selected option {} is out of range 0..={}",
                selected_index,
                OPTION_COUNT - 1
            )));
        }

        let question_index = self.current_index;
        let question = &self.questions[question_index];
        let feedback = AnswerFeedback {
            question_index,
            selected_index,
            correct_index: question.correct_index(),
            correct: selected_index == question.correct_index(),
            explanation: question.explanation().to_string(),
        };

        self.answers.insert(question_index, selected_index);
        self.touch();
        Ok(feedback)
    }

    /// Moves to the next question; an unanswered question stays absent from
    /// the answers and counts as skipped.
    pub fn advance(&mut self) -> AppResult<SessionState> {
        self.require_in_progress("advance")?;
        self.current_index += 1;
        self.touch();
        Ok(self.state())
    }

    pub fn score(&self) -> usize {
        self.answers
            .iter()
            .filter(|(index, selected)| {
                self.questions
                    .get(**index)
                    .is_some_and(|question| question.correct_index() == **selected)
            })
            .count()
    }

    pub fn reset(&mut self) {
        self.topic = None;
        self.questions.clear();
        self.current_index = 0;
        self.answers.clear();
        self.touch();
    }

    pub fn progress(&self) -> Progress {
        let total = self.questions.len();
        let answered = self.answers.len();
        let ratio = if total == 0 {
            0.0
        } else {
            (answered as f64 / total as f64).clamp(0.0, 1.0)
        };

        Progress {
            answered,
            total,
            position: (self.current_index + 1).min(total),
            ratio,
        }
    }

    pub fn score_summary(&self) -> ScoreSummary {
        let total = self.questions.len();
        let answered = self.answers.len();
        let correct = self.score();
        let percentage = if total == 0 {
            0
        } else {
            ((correct as f64 / total as f64) * 100.0).round() as u32
        };

        ScoreSummary {
            total,
            answered,
            correct,
            incorrect: answered - correct,
            unanswered: total - answered,
            percentage,
            performance: Performance::from_percentage(percentage),
        }
    }

    pub fn export_records(&self) -> AppResult<Vec<ExportRecord>> {
        if self.state() != SessionState::Complete {
            return Err(AppError::Export(format!(
                "quiz is not complete ({} of {} questions done)",
                self.current_index,
                self.questions.len()
            )));
        }

        Ok(self
            .questions
            .iter()
            .enumerate()
            .map(|(index, question)| {
                ExportRecord::new(index, question, self.answers.get(&index).copied())
            })
            .collect())
    }

    fn require_in_progress(&self, action: &str) -> AppResult<()> {
        match self.state() {
            SessionState::InProgress => Ok(()),
            SessionState::Empty => Err(AppError::InvalidState(format!(
                "cannot {} before a quiz is loaded",
                action
            ))),
            SessionState::Complete => Err(AppError::InvalidState(format!(
                "cannot {} after the quiz is complete",
                action
            ))),
        }
    }

    fn touch(&mut self) {
        self.modified_at = Utc::now();
    }
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}
