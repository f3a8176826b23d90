use serde::Serialize;

use crate::models::domain::question::{Question, OPTION_COUNT};

/// Read-only projection of one answered (or skipped) question of a finished
/// quiz.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExportRecord {
    /// 1-based question number.
    pub number: usize,
    pub question: String,
    pub options: [String; OPTION_COUNT],
    pub chosen_answer: Option<String>,
    pub correct_answer: String,
    pub is_correct: bool,
    pub explanation: String,
}

impl ExportRecord {
    pub fn new(index: usize, question: &Question, selected_index: Option<usize>) -> Self {
        Self {
            number: index + 1,
            question: question.text().to_string(),
            options: question.options().clone(),
            chosen_answer: selected_index
                .and_then(|selected| question.option(selected))
                .map(str::to_string),
            correct_answer: question.correct_answer().to_string(),
            is_correct: selected_index == Some(question.correct_index()),
            explanation: question.explanation().to_string(),
        }
    }
}
