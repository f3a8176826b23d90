use serde::Serialize;
use thiserror::Error;

pub const OPTION_COUNT: usize = 4;

/// A validated multiple-choice question. Only constructible through
/// [`Question::new`], so every instance has four distinct, non-blank options
/// and a correct index inside them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Question {
    text: String,
    options: [String; OPTION_COUNT],
    correct_index: usize,
    explanation: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum QuestionDefect {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("expected 4 options, got {0}")]
    WrongOptionCount(usize),

    #[error("option {0} is blank")]
    BlankOption(usize),

    #[error("option `{0}` appears more than once")]
    DuplicateOption(String),

    #[error("correct answer index {0} is out of range")]
    CorrectIndexOutOfRange(i64),

    #[error("correct answer `{0}` is not one of the options")]
    CorrectAnswerNotInOptions(String),

    #[error("malformed record: {0}")]
    Malformed(String),
}

impl Question {
    pub fn new(
        text: impl Into<String>,
        options: Vec<String>,
        correct_index: usize,
        explanation: impl Into<String>,
    ) -> Result<Self, QuestionDefect> {
        let text = required(text.into(), "question")?;
        let explanation = required(explanation.into(), "explanation")?;

        if options.len() != OPTION_COUNT {
            return Err(QuestionDefect::WrongOptionCount(options.len()));
        }

        let options: Vec<String> = options.into_iter().map(|o| o.trim().to_string()).collect();
        for (position, option) in options.iter().enumerate() {
            if option.is_empty() {
                return Err(QuestionDefect::BlankOption(position));
            }
            if options[..position]
                .iter()
                .any(|earlier| same_option(earlier, option))
            {
                return Err(QuestionDefect::DuplicateOption(option.clone()));
            }
        }

        if correct_index >= OPTION_COUNT {
            return Err(QuestionDefect::CorrectIndexOutOfRange(correct_index as i64));
        }

        let options: [String; OPTION_COUNT] = options
            .try_into()
            .map_err(|rest: Vec<String>| QuestionDefect::WrongOptionCount(rest.len()))?;

        Ok(Self {
            text,
            options,
            correct_index,
            explanation,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn options(&self) -> &[String; OPTION_COUNT] {
        &self.options
    }

    pub fn option(&self, index: usize) -> Option<&str> {
        self.options.get(index).map(String::as_str)
    }

    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    pub fn correct_answer(&self) -> &str {
        &self.options[self.correct_index]
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

}

/// Position of `answer` among `options`: an exact match wins, otherwise the
/// first option equal under [`same_option`].
pub fn find_option(options: &[String], answer: &str) -> Option<usize> {
    let answer = answer.trim();
    if answer.is_empty() {
        return None;
    }
    options
        .iter()
        .position(|option| option.trim() == answer)
        .or_else(|| options.iter().position(|option| same_option(option, answer)))
}

/// Options compare equal ignoring surrounding whitespace and letter case
/// (Unicode lowercase folding).
pub fn same_option(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

fn required(value: String, field: &'static str) -> Result<String, QuestionDefect> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(QuestionDefect::MissingField(field));
    }
    Ok(trimmed.to_string())
}
