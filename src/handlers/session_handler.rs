use actix_web::{delete, get, post, web, HttpRequest, HttpResponse};
use uuid::Uuid;

use crate::{
    app_state::AppState,
    errors::AppError,
    middleware::get_request_id,
    models::dto::{
        request::{GenerateQuizRequest, SubmitAnswerRequest},
        response::{CreateSessionResponse, DeleteSessionResponse, SessionView},
    },
    services::{
        http_helpers::{created_json, download, success_json},
        quiz_session_service::ExportFormat,
    },
};

#[post("/api/sessions")]
pub async fn create_session(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let session = state.session_service.create_session().await?;
    Ok(created_json(CreateSessionResponse {
        session_id: session.id,
    }))
}

#[get("/api/sessions/{id}")]
pub async fn get_session(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let session = state.session_service.get_session(&id).await?;
    Ok(success_json(SessionView::from(&session)))
}

#[delete("/api/sessions/{id}")]
pub async fn delete_session(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    state.session_service.delete_session(&id).await?;
    Ok(success_json(DeleteSessionResponse {
        message: format!("Session '{}' deleted successfully", id),
    }))
}

#[post("/api/sessions/{id}/quiz")]
pub async fn generate_quiz(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    request: web::Json<GenerateQuizRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    log::info!(
        "Generating {} questions on '{}' for session {} [{}]",
        request.question_count,
        request.topic,
        id,
        get_request_id(&req).unwrap_or_default()
    );

    let response = state.session_service.generate_quiz(&id, request).await?;
    Ok(success_json(response))
}

#[post("/api/sessions/{id}/answer")]
pub async fn submit_answer(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    request: web::Json<SubmitAnswerRequest>,
) -> Result<HttpResponse, AppError> {
    let feedback = state
        .session_service
        .submit_answer(&id, request.into_inner())
        .await?;
    Ok(success_json(feedback))
}

#[post("/api/sessions/{id}/advance")]
pub async fn advance(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let view = state.session_service.advance(&id).await?;
    Ok(success_json(view))
}

#[post("/api/sessions/{id}/reset")]
pub async fn reset(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let view = state.session_service.reset(&id).await?;
    Ok(success_json(view))
}

#[get("/api/sessions/{id}/results")]
pub async fn results(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let results = state.session_service.results(&id).await?;
    Ok(success_json(results))
}

#[get("/api/sessions/{id}/export/csv")]
pub async fn export_csv(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let file = state.session_service.export(&id, ExportFormat::Csv).await?;
    Ok(download(&req, file))
}

#[get("/api/sessions/{id}/export/docx")]
pub async fn export_docx(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let file = state.session_service.export(&id, ExportFormat::Docx).await?;
    Ok(download(&req, file))
}
