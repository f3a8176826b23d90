use std::sync::Arc;

use crate::{
    config::Config,
    repositories::{InMemorySessionRepository, SessionRepository},
    services::{
        completion_client::{CompletionClient, OpenAiCompletionClient},
        question_generator::QuestionGenerator,
        quiz_session_service::QuizSessionService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub session_service: Arc<QuizSessionService>,
    pub session_repository: Arc<dyn SessionRepository>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let client = Arc::new(OpenAiCompletionClient::new(&config));
        Self::with_client(config, client)
    }

    /// Wires the state around an arbitrary completion backend.
    pub fn with_client(config: Config, client: Arc<dyn CompletionClient>) -> Self {
        let generator = Arc::new(QuestionGenerator::new(client, &config));
        let session_repository: Arc<dyn SessionRepository> =
            Arc::new(InMemorySessionRepository::with_ttl(config.session_ttl()));
        let session_service = Arc::new(QuizSessionService::new(
            Arc::clone(&session_repository),
            generator,
        ));

        Self {
            session_service,
            session_repository,
            config: Arc::new(config),
        }
    }
}
