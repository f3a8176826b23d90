use crate::models::dto::generation::{QuestionPayload, QuizPayload};

pub const QUIZ_SYSTEM_PROMPT: &str = "You are an expert quiz author who writes accurate, unambiguous multiple-choice questions for learners.

### Output Contract:

- Respond with a single JSON object of the form {\"questions\": [...]} and nothing else.
- Do not wrap the JSON in markdown fences and do not add any prose before or after it.
- Every question object has exactly the keys \"question\", \"options\", \"correct_answer\" and \"explanation\".
- \"options\" holds exactly 4 distinct, non-empty strings.
- \"correct_answer\" is copied verbatim from \"options\".
- \"explanation\" is one or two sentences explaining why the correct answer is right.

### Quality Requirements:

- Every question is relevant to the requested topic and unique within the quiz.
- Difficulty varies across easy, medium and challenging.
- Exactly one option is correct; the other three are plausible but clearly wrong.
- Vary the position of the correct answer across the four options.";

const MAX_EXAMPLES: usize = 5;

fn example_questions() -> Vec<QuestionPayload> {
    vec![
        QuestionPayload::new(
            "What is the capital of France?",
            ["London", "Paris", "Rome", "Berlin"],
            "Paris",
            "Paris is the largest city and capital of France, known for its art, fashion, and culture.",
        ),
        QuestionPayload::new(
            "Which planet is known as the Red Planet?",
            ["Earth", "Mars", "Jupiter", "Venus"],
            "Mars",
            "Mars is often called the Red Planet due to its reddish appearance, caused by iron oxide on its surface.",
        ),
        QuestionPayload::new(
            "Who painted the Mona Lisa?",
            ["Vincent van Gogh", "Pablo Picasso", "Leonardo da Vinci", "Claude Monet"],
            "Leonardo da Vinci",
            "Leonardo da Vinci was an Italian polymath who created the Mona Lisa, one of the most famous paintings in the world.",
        ),
        QuestionPayload::new(
            "What is the largest ocean on Earth?",
            ["Atlantic Ocean", "Indian Ocean", "Arctic Ocean", "Pacific Ocean"],
            "Pacific Ocean",
            "The Pacific Ocean is the largest and deepest of Earth's oceanic divisions, covering about a third of the surface.",
        ),
        QuestionPayload::new(
            "Which of these is a primate?",
            ["Bear", "Elephant", "Monkey", "Kangaroo"],
            "Monkey",
            "Monkeys are a diverse group of primates, typically having tails and living in trees or on the ground.",
        ),
    ]
}

/// Builds the user prompt for `count` questions about `topic`. At most five
/// worked examples are shown, fewer when fewer questions are requested.
pub fn build_quiz_prompt(topic: &str, count: usize) -> String {
    let topic = sanitize_topic(topic);
    let examples = QuizPayload {
        questions: example_questions()
            .into_iter()
            .take(count.min(MAX_EXAMPLES))
            .collect(),
    };
    let examples_json =
        serde_json::to_string_pretty(&examples).unwrap_or_else(|_| "{\"questions\": []}".to_string());

    format!(
        "Generate exactly {count} multiple-choice questions about \"{topic}\".
Each question must have 4 options and clearly indicate the correct answer.
Also provide a concise explanation for the correct answer.

Make sure the questions are:
- Relevant to the topic \"{topic}\"
- Varied in difficulty (a mix of easy, medium, and challenging)
- Clear and unambiguous
- Answerable by exactly one of the 4 options

Format the output exclusively as a JSON object like this example:
{examples_json}

IMPORTANT:
- Generate exactly {count} questions
- Do not include any conversational text or markdown formatting outside the JSON itself
- Ensure the JSON is valid
- Each question must be unique and relevant to \"{topic}\""
    )
}

fn sanitize_topic(topic: &str) -> String {
    topic
        .trim()
        .chars()
        .map(|c| if c == '"' { '\'' } else { c })
        .filter(|c| !c.is_control())
        .collect()
}
