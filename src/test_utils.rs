#[cfg(test)]
pub mod fixtures {
    use crate::models::{
        domain::{question::OPTION_COUNT, Question},
        dto::generation::{QuestionPayload, QuizPayload},
    };

    /// A valid question whose correct answer rotates through the four
    /// positions with `index`.
    pub fn sample_question(index: usize) -> Question {
        Question::new(
            format!("Sample question {}?", index + 1),
            (0..OPTION_COUNT)
                .map(|option| format!("Answer {}-{}", index + 1, option + 1))
                .collect(),
            index % OPTION_COUNT,
            format!("Explanation for question {}.", index + 1),
        )
        .expect("fixture question is valid")
    }

    pub fn sample_questions(count: usize) -> Vec<Question> {
        (0..count).map(sample_question).collect()
    }

    fn payload(index: usize) -> QuestionPayload {
        let question = sample_question(index);
        QuestionPayload {
            question: question.text().to_string(),
            options: question.options().to_vec(),
            correct_answer: question.correct_answer().to_string(),
            explanation: question.explanation().to_string(),
        }
    }

    /// A well-formed model response holding `count` questions.
    pub fn quiz_response_json(count: usize) -> String {
        let payload = QuizPayload {
            questions: (0..count).map(payload).collect(),
        };
        serde_json::to_string(&payload).expect("fixture payload serializes")
    }

    /// A model response with `valid` usable records followed by `broken`
    /// records that each have only three options.
    pub fn response_with_valid_and_broken(valid: usize, broken: usize) -> String {
        let mut records: Vec<serde_json::Value> = (0..valid)
            .map(|index| serde_json::to_value(payload(index)).expect("fixture payload serializes"))
            .collect();
        records.extend((0..broken).map(|index| {
            serde_json::json!({
                "question": format!("Broken question {}?", index + 1),
                "options": ["a", "b", "c"],
                "correct_answer": "a",
                "explanation": "Only three options."
            })
        }));
        serde_json::json!({ "questions": records }).to_string()
    }
}

#[cfg(test)]
pub mod test_helpers {
    use actix_web::http::StatusCode;

    /// Asserts that a status code represents an error (4xx or 5xx)
    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }

    /// Asserts that a status code represents success (2xx)
    pub fn assert_success_status(status: StatusCode) {
        assert!(
            status.is_success(),
            "Expected success status, got: {}",
            status
        );
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use crate::services::response_parser::parse_questions;

    #[test]
    fn test_sample_questions_rotate_correct_index() {
        let questions = sample_questions(5);
        let indices: Vec<usize> = questions.iter().map(|q| q.correct_index()).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 0]);
    }

    #[test]
    fn test_quiz_response_json_parses_fully() {
        let parsed = parse_questions(&quiz_response_json(4)).unwrap();
        assert_eq!(parsed.questions, sample_questions(4));
        assert!(parsed.rejected.is_empty());
    }

    #[test]
    fn test_mixed_response_counts() {
        let parsed = parse_questions(&response_with_valid_and_broken(2, 3)).unwrap();
        assert_eq!(parsed.questions.len(), 2);
        assert_eq!(parsed.rejected.len(), 3);
    }
}
