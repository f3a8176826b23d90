use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::models::domain::question::{find_option, Question, QuestionDefect, OPTION_COUNT};

static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)```").expect("FENCED_BLOCK is a valid regex pattern")
});

static JSON_ARRAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\[\s*\{.*\}\s*\]").expect("JSON_ARRAY is a valid regex pattern")
});

static TRAILING_COMMA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r",(\s*[\]}])").expect("TRAILING_COMMA is a valid regex pattern")
});

/// Result of parsing one model response: the records that passed validation
/// and, for every other record, why it was dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedQuestions {
    pub questions: Vec<Question>,
    pub rejected: Vec<RejectedQuestion>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedQuestion {
    /// 0-based position of the record in the model's array.
    pub position: usize,
    pub defect: QuestionDefect,
}

#[derive(Debug, Deserialize)]
struct RawQuestion {
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    options: Option<Vec<String>>,
    #[serde(default)]
    correct_answer: Option<CorrectMarker>,
    #[serde(default)]
    explanation: Option<String>,
}

/// Models occasionally mark the answer by index instead of by text; both are
/// accepted and checked.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CorrectMarker {
    Index(i64),
    Text(String),
}

/// Extracts question records from raw model text. Returns `None` when no
/// JSON array of records can be located at all.
pub fn parse_questions(raw: &str) -> Option<ParsedQuestions> {
    let records = locate_records(raw)?;

    let mut parsed = ParsedQuestions::default();
    for (position, record) in records.into_iter().enumerate() {
        match validate_record(record) {
            Ok(question) => parsed.questions.push(question),
            Err(defect) => {
                log::warn!("Dropping generated question {}: {}", position + 1, defect);
                parsed.rejected.push(RejectedQuestion { position, defect });
            }
        }
    }
    Some(parsed)
}

fn locate_records(raw: &str) -> Option<Vec<serde_json::Value>> {
    let trimmed = raw.trim();
    if let Some(records) = records_from_json(trimmed) {
        return Some(records);
    }

    if let Some(records) = FENCED_BLOCK
        .captures_iter(trimmed)
        .filter_map(|captures| captures.get(1))
        .find_map(|body| records_from_json(body.as_str().trim()))
    {
        return Some(records);
    }

    let array = JSON_ARRAY.find(trimmed)?;
    records_from_json(array.as_str())
}

/// Accepts `{"questions": [...]}` or a bare array. Text that is not valid
/// JSON as sent gets one more try with trailing commas before closing
/// brackets removed.
fn records_from_json(text: &str) -> Option<Vec<serde_json::Value>> {
    let value = serde_json::from_str::<serde_json::Value>(text)
        .or_else(|_| {
            serde_json::from_str::<serde_json::Value>(&TRAILING_COMMA.replace_all(text, "$1"))
        })
        .ok()?;
    match value {
        serde_json::Value::Array(records) => Some(records),
        serde_json::Value::Object(mut object) => match object.remove("questions")? {
            serde_json::Value::Array(records) => Some(records),
            _ => None,
        },
        _ => None,
    }
}

fn validate_record(record: serde_json::Value) -> Result<Question, QuestionDefect> {
    let raw: RawQuestion =
        serde_json::from_value(record).map_err(|e| QuestionDefect::Malformed(e.to_string()))?;

    let text = raw.question.ok_or(QuestionDefect::MissingField("question"))?;
    let options = raw.options.ok_or(QuestionDefect::MissingField("options"))?;
    let marker = raw
        .correct_answer
        .ok_or(QuestionDefect::MissingField("correct_answer"))?;
    let explanation = raw
        .explanation
        .ok_or(QuestionDefect::MissingField("explanation"))?;

    if options.len() != OPTION_COUNT {
        return Err(QuestionDefect::WrongOptionCount(options.len()));
    }

    let correct_index = match marker {
        CorrectMarker::Index(index) if (0..OPTION_COUNT as i64).contains(&index) => index as usize,
        CorrectMarker::Index(index) => return Err(QuestionDefect::CorrectIndexOutOfRange(index)),
        CorrectMarker::Text(answer) => find_option(&options, &answer)
            .ok_or(QuestionDefect::CorrectAnswerNotInOptions(answer))?,
    };

    Question::new(text, options, correct_index, explanation)
}
