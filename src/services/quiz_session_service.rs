use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{quiz_session::AnswerFeedback, QuizSession},
        dto::{
            request::{GenerateQuizRequest, SubmitAnswerRequest},
            response::{GenerateQuizResponse, ResultsResponse, SessionView},
        },
    },
    repositories::SessionRepository,
    services::{
        export_service::{ExportService, CSV_CONTENT_TYPE, DOCX_CONTENT_TYPE},
        question_generator::QuestionGenerator,
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub body: Vec<u8>,
    pub file_name: String,
    pub content_type: &'static str,
    pub etag: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Docx,
}

pub struct QuizSessionService {
    repository: Arc<dyn SessionRepository>,
    generator: Arc<QuestionGenerator>,
}

impl QuizSessionService {
    pub fn new(repository: Arc<dyn SessionRepository>, generator: Arc<QuestionGenerator>) -> Self {
        Self {
            repository,
            generator,
        }
    }

    pub async fn create_session(&self) -> AppResult<QuizSession> {
        self.repository.create(QuizSession::new()).await
    }

    pub async fn get_session(&self, id: &Uuid) -> AppResult<QuizSession> {
        let session = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Session with id '{}' not found", id)))?;

        Ok(session)
    }

    pub async fn delete_session(&self, id: &Uuid) -> AppResult<()> {
        self.repository.delete(id).await
    }

    /// Generates a quiz and swaps it into the session. The session is only
    /// touched once generation has succeeded, so a failed attempt leaves any
    /// quiz in progress as it was.
    pub async fn generate_quiz(
        &self,
        id: &Uuid,
        request: GenerateQuizRequest,
    ) -> AppResult<GenerateQuizResponse> {
        request.validate()?;
        self.get_session(id).await?;

        let quiz = self
            .generator
            .generate(&request.topic, request.question_count, request.allow_partial)
            .await?;
        let shortfall = quiz.shortfall();
        let generated = quiz.questions.len();

        let session = self
            .mutate(id, move |session| {
                session.reset();
                session.load(quiz.topic, quiz.questions)
            })
            .await?;

        Ok(GenerateQuizResponse {
            session: SessionView::from(&session),
            requested: request.question_count,
            generated,
            shortfall,
        })
    }

    pub async fn submit_answer(
        &self,
        id: &Uuid,
        request: SubmitAnswerRequest,
    ) -> AppResult<AnswerFeedback> {
        request.validate()?;

        let mut feedback = None;
        self.mutate(id, |session| {
            feedback = Some(session.submit_answer(request.selected_index)?);
            Ok(())
        })
        .await?;

        feedback.ok_or_else(|| AppError::InternalError("answer was not recorded".to_string()))
    }

    pub async fn advance(&self, id: &Uuid) -> AppResult<SessionView> {
        let session = self.mutate(id, |session| session.advance().map(|_| ())).await?;
        Ok(SessionView::from(&session))
    }

    pub async fn reset(&self, id: &Uuid) -> AppResult<SessionView> {
        let session = self
            .mutate(id, |session| {
                session.reset();
                Ok(())
            })
            .await?;
        Ok(SessionView::from(&session))
    }

    pub async fn results(&self, id: &Uuid) -> AppResult<ResultsResponse> {
        let session = self.get_session(id).await?;
        let breakdown = session.export_records()?;
        let summary = session.score_summary();

        Ok(ResultsResponse {
            session_id: session.id,
            topic: session.topic().map(str::to_string),
            summary,
            performance_message: summary.performance.message(),
            breakdown,
        })
    }

    pub async fn export(&self, id: &Uuid, format: ExportFormat) -> AppResult<ExportFile> {
        let session = self.get_session(id).await?;

        let (body, extension, content_type) = match format {
            ExportFormat::Csv => (ExportService::to_csv(&session)?, "csv", CSV_CONTENT_TYPE),
            ExportFormat::Docx => (ExportService::to_docx(&session)?, "docx", DOCX_CONTENT_TYPE),
        };

        Ok(ExportFile {
            etag: ExportService::etag(&body),
            file_name: ExportService::file_name(session.topic(), extension),
            content_type,
            body,
        })
    }

    /// Applies `change` to a copy of the stored session and saves it only if
    /// the change succeeded.
    async fn mutate<F>(&self, id: &Uuid, change: F) -> AppResult<QuizSession>
    where
        F: FnOnce(&mut QuizSession) -> AppResult<()>,
    {
        let mut session = self.get_session(id).await?;
        change(&mut session)?;
        self.repository.update(session).await
    }
}
