use std::{sync::Arc, time::Duration};

use crate::{
    config::Config,
    constants::quiz_prompt::build_quiz_prompt,
    errors::{AppError, AppResult},
    models::{domain::Question, dto::response::Shortfall},
    services::{completion_client::CompletionClient, response_parser::parse_questions},
};

const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Questions produced for one generation request.
#[derive(Debug, Clone)]
pub struct GeneratedQuiz {
    pub topic: String,
    pub questions: Vec<Question>,
    pub requested: usize,
    pub rejected: usize,
    pub attempts: u32,
}

impl GeneratedQuiz {
    pub fn shortfall(&self) -> Option<Shortfall> {
        (self.questions.len() < self.requested).then_some(Shortfall {
            generated: self.questions.len(),
            requested: self.requested,
        })
    }
}

pub struct QuestionGenerator {
    client: Arc<dyn CompletionClient>,
    timeout: Duration,
    max_attempts: u32,
    retry_delay: Duration,
    min_questions: usize,
    max_questions: usize,
}

enum AttemptOutcome {
    Questions { questions: Vec<Question>, rejected: usize },
    Retry(String),
}

impl QuestionGenerator {
    pub fn new(client: Arc<dyn CompletionClient>, config: &Config) -> Self {
        Self {
            client,
            timeout: config.request_timeout(),
            max_attempts: config.max_attempts.max(1),
            retry_delay: DEFAULT_RETRY_DELAY,
            min_questions: config.min_questions,
            max_questions: config.max_questions,
        }
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Generates `count` questions about `topic`.
    ///
    /// Transport failures, timeouts and responses without a single usable
    /// question are retried up to the configured attempt budget. A response
    /// with some but too few usable questions is not retried: it fails with
    /// [`AppError::PartialGeneration`] unless `allow_partial` is set, in which
    /// case the short quiz is returned and [`GeneratedQuiz::shortfall`] reports
    /// the gap.
    pub async fn generate(
        &self,
        topic: &str,
        count: usize,
        allow_partial: bool,
    ) -> AppResult<GeneratedQuiz> {
        let topic = self.validate(topic, count)?;
        let prompt = build_quiz_prompt(&topic, count);

        let mut last_failure = String::new();
        for attempt in 1..=self.max_attempts {
            if attempt > 1 && !self.retry_delay.is_zero() {
                tokio::time::sleep(self.retry_delay).await;
            }

            log::info!(
                "Generating {} questions about '{}' (attempt {}/{})",
                count,
                topic,
                attempt,
                self.max_attempts
            );

            match self.attempt(&prompt).await? {
                AttemptOutcome::Retry(reason) => {
                    log::warn!("Generation attempt {} failed: {}", attempt, reason);
                    last_failure = reason;
                }
                AttemptOutcome::Questions {
                    mut questions,
                    rejected,
                } => {
                    questions.truncate(count);
                    let quiz = GeneratedQuiz {
                        topic,
                        questions,
                        requested: count,
                        rejected,
                        attempts: attempt,
                    };
                    return self.finish(quiz, allow_partial);
                }
            }
        }

        Err(AppError::Generation(format!(
            "no questions generated after {} attempt(s): {}",
            self.max_attempts, last_failure
        )))
    }

    fn validate(&self, topic: &str, count: usize) -> AppResult<String> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(AppError::InvalidInput("topic must not be empty".to_string()));
        }
        if count < self.min_questions || count > self.max_questions {
            return Err(AppError::InvalidInput(format!(
                "question count must be between {} and {}, got {}",
                self.min_questions, self.max_questions, count
            )));
        }
        Ok(topic.to_string())
    }

    async fn attempt(&self, prompt: &str) -> AppResult<AttemptOutcome> {
        let raw = match tokio::time::timeout(self.timeout, self.client.complete(prompt)).await {
            Err(_) => {
                return Ok(AttemptOutcome::Retry(format!(
                    "no response within {:?}",
                    self.timeout
                )))
            }
            Ok(Err(err)) if !err.is_transient() => {
                log::error!("Generation service refused the request: {}", err);
                return Err(AppError::Generation(err.to_string()));
            }
            Ok(Err(err)) => return Ok(AttemptOutcome::Retry(err.to_string())),
            Ok(Ok(raw)) => raw,
        };

        log::debug!("Raw model response:\n{}", raw);

        let Some(parsed) = parse_questions(&raw) else {
            return Ok(AttemptOutcome::Retry(
                "response did not contain a JSON array of questions".to_string(),
            ));
        };

        if parsed.questions.is_empty() {
            return Ok(AttemptOutcome::Retry(format!(
                "none of the {} generated records were valid",
                parsed.rejected.len()
            )));
        }

        Ok(AttemptOutcome::Questions {
            questions: parsed.questions,
            rejected: parsed.rejected.len(),
        })
    }

    fn finish(&self, quiz: GeneratedQuiz, allow_partial: bool) -> AppResult<GeneratedQuiz> {
        match quiz.shortfall() {
            None => {
                log::info!(
                    "Generated {} questions about '{}' ({} rejected)",
                    quiz.questions.len(),
                    quiz.topic,
                    quiz.rejected
                );
                Ok(quiz)
            }
            Some(shortfall) if allow_partial => {
                log::warn!(
                    "Accepting partial quiz about '{}': generated {} of {}",
                    quiz.topic,
                    shortfall.generated,
                    shortfall.requested
                );
                Ok(quiz)
            }
            Some(shortfall) => {
                log::warn!(
                    "Shortfall for '{}': generated {} of {}",
                    quiz.topic,
                    shortfall.generated,
                    shortfall.requested
                );
                Err(AppError::PartialGeneration {
                    generated: shortfall.generated,
                    requested: shortfall.requested,
                })
            }
        }
    }
}
