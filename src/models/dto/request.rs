use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GenerateQuizRequest {
    #[validate(length(min = 1, max = 200), custom(function = "validate_not_blank"))]
    pub topic: String,

    /// Bounds come from `QUIZ_MIN_QUESTIONS`/`QUIZ_MAX_QUESTIONS` and are
    /// enforced by the question generator.
    pub question_count: usize,

    /// Accept fewer questions than requested instead of failing with a
    /// shortfall error.
    #[serde(default)]
    pub allow_partial: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitAnswerRequest {
    #[validate(range(max = 3))]
    pub selected_index: usize,
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}
