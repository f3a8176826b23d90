use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The JSON document the model is asked to produce. Its schema is sent as the
/// response format, and worked examples in the prompt are serialized from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct QuizPayload {
    pub questions: Vec<QuestionPayload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct QuestionPayload {
    /// The question text.
    pub question: String,
    /// Exactly four distinct answer options.
    pub options: Vec<String>,
    /// The correct option, copied verbatim from `options`.
    pub correct_answer: String,
    /// A concise explanation of why the answer is correct.
    pub explanation: String,
}

impl QuestionPayload {
    pub fn new(question: &str, options: [&str; 4], correct_answer: &str, explanation: &str) -> Self {
        Self {
            question: question.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_answer: correct_answer.to_string(),
            explanation: explanation.to_string(),
        }
    }
}

/// JSON schema of [`QuizPayload`], without the `$schema` meta key that some
/// OpenAI-compatible endpoints refuse.
pub fn quiz_payload_schema() -> serde_json::Value {
    let mut schema = serde_json::to_value(schemars::schema_for!(QuizPayload))
        .unwrap_or_else(|_| serde_json::json!({ "type": "object" }));
    if let Some(object) = schema.as_object_mut() {
        object.remove("$schema");
    }
    schema
}
