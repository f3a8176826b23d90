use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use actix_web::{http::StatusCode, test, web, App};
use async_trait::async_trait;
use quizmaster_server::{
    app_state::AppState,
    config::{Config, MAX_QUESTIONS, MIN_QUESTIONS},
    handlers,
    middleware::{RequestIdMiddleware, REQUEST_ID_HEADER},
    services::completion_client::{CompletionClient, CompletionError},
};
use secrecy::SecretString;
use serde_json::{json, Value};

/// Replays canned completions in order and counts how often it was asked.
struct ScriptedClient {
    replies: Mutex<VecDeque<Result<String, CompletionError>>>,
    calls: AtomicUsize,
}

impl ScriptedClient {
    fn new(replies: Vec<Result<String, CompletionError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(CompletionError::EmptyResponse))
    }
}

fn config() -> Config {
    Config {
        api_key: SecretString::from("integration-key".to_string()),
        api_base: "http://127.0.0.1:9".to_string(),
        model: "integration-model".to_string(),
        temperature: 0.0,
        max_tokens: 1024,
        request_timeout_secs: 2,
        max_attempts: 1,
        min_questions: MIN_QUESTIONS,
        max_questions: MAX_QUESTIONS,
        web_server_host: "127.0.0.1".to_string(),
        web_server_port: 8080,
        cors_allowed_origin: "http://localhost:5173".to_string(),
        session_ttl_secs: 3600,
    }
}

/// Roman Empire questions whose correct answer sits at position `i % 4`.
fn roman_question(i: usize) -> Value {
    let options: Vec<String> = (0..4)
        .map(|o| format!("Emperor {}-{}", i + 1, o + 1))
        .collect();
    json!({
        "question": format!("Roman Empire question {}?", i + 1),
        "correct_answer": options[i % 4].clone(),
        "options": options,
        "explanation": format!("Because of reason {}.", i + 1),
    })
}

fn roman_quiz(count: usize) -> String {
    let questions: Vec<Value> = (0..count).map(roman_question).collect();
    json!({ "questions": questions }).to_string()
}

fn mixed_quiz(valid: usize, broken: usize) -> String {
    let mut questions: Vec<Value> = (0..valid).map(roman_question).collect();
    questions.extend((0..broken).map(|i| {
        json!({
            "question": format!("Broken question {}?", i + 1),
            "options": ["only", "three", "options"],
            "correct_answer": "only",
            "explanation": "Too few options.",
        })
    }));
    json!({ "questions": questions }).to_string()
}

macro_rules! app {
    ($client:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::with_client(config(), $client)))
                .wrap(RequestIdMiddleware)
                .configure(handlers::configure),
        )
        .await
    };
}

macro_rules! create_session {
    ($app:expr) => {{
        let req = test::TestRequest::post().uri("/api/sessions").to_request();
        let body: Value = test::call_and_read_body_json(&$app, req).await;
        body["session_id"].as_str().unwrap().to_string()
    }};
}

#[actix_web::test]
async fn test_roman_empire_quiz_end_to_end() {
    let client = ScriptedClient::new(vec![Ok(roman_quiz(5))]);
    let app = app!(client.clone());
    let id = create_session!(app);

    let req = test::TestRequest::post()
        .uri(&format!("/api/sessions/{}/quiz", id))
        .set_json(json!({"topic": "Roman Empire", "question_count": 5}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key(REQUEST_ID_HEADER));
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["generated"], 5);
    assert_eq!(body["session"]["progress"]["total"], 5);

    for i in 0..5 {
        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{}/answer", id))
            .set_json(json!({"selected_index": i % 4}))
            .to_request();
        let feedback: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(feedback["correct"], true, "question {}", i + 1);

        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{}/advance", id))
            .to_request();
        let view: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(view["score"], i + 1);
    }

    let req = test::TestRequest::get()
        .uri(&format!("/api/sessions/{}/results", id))
        .to_request();
    let results: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(results["summary"]["correct"], 5);
    assert_eq!(results["summary"]["percentage"], 100);
    assert_eq!(results["breakdown"].as_array().unwrap().len(), 5);

    let req = test::TestRequest::get()
        .uri(&format!("/api/sessions/{}/export/csv", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let disposition = resp
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("quiz_roman_empire.csv"));
    let etag = resp.headers().get("etag").unwrap().clone();
    let csv = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert_eq!(csv.lines().count(), 6);
    assert!(csv.lines().skip(1).all(|line| line.contains(",true,")));

    let req = test::TestRequest::get()
        .uri(&format!("/api/sessions/{}/export/csv", id))
        .insert_header(("if-none-match", etag))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);

    let req = test::TestRequest::get()
        .uri(&format!("/api/sessions/{}/export/docx", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let docx = test::read_body(resp).await;
    assert!(docx.starts_with(b"PK"));

    assert_eq!(client.calls(), 1);
}

#[actix_web::test]
async fn test_partial_generation_requires_consent() {
    let client = ScriptedClient::new(vec![Ok(mixed_quiz(2, 3)), Ok(mixed_quiz(2, 3))]);
    let app = app!(client.clone());
    let id = create_session!(app);

    let req = test::TestRequest::post()
        .uri(&format!("/api/sessions/{}/quiz", id))
        .set_json(json!({"topic": "Roman Empire", "question_count": 5}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["kind"], "PARTIAL_GENERATION");

    let req = test::TestRequest::get()
        .uri(&format!("/api/sessions/{}", id))
        .to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view["state"], "empty");

    let req = test::TestRequest::post()
        .uri(&format!("/api/sessions/{}/quiz", id))
        .set_json(json!({"topic": "Roman Empire", "question_count": 5, "allow_partial": true}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["generated"], 2);
    assert_eq!(body["shortfall"], json!({"generated": 2, "requested": 5}));
    assert_eq!(body["session"]["total_questions"], 2);

    assert_eq!(client.calls(), 2);
}

#[actix_web::test]
async fn test_export_before_completion_conflicts() {
    let client = ScriptedClient::new(vec![Ok(roman_quiz(3))]);
    let app = app!(client);
    let id = create_session!(app);

    let req = test::TestRequest::post()
        .uri(&format!("/api/sessions/{}/quiz", id))
        .set_json(json!({"topic": "Roman Empire", "question_count": 3}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    for format in ["csv", "docx"] {
        let req = test::TestRequest::get()
            .uri(&format!("/api/sessions/{}/export/{}", id, format))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["kind"], "EXPORT_ERROR");
    }
}

#[actix_web::test]
async fn test_rejected_credentials_surface_as_bad_gateway() {
    let client = ScriptedClient::new(vec![Err(CompletionError::Unauthorized(
        "API key not valid".to_string(),
    ))]);
    let app = app!(client.clone());
    let id = create_session!(app);

    let req = test::TestRequest::post()
        .uri(&format!("/api/sessions/{}/quiz", id))
        .set_json(json!({"topic": "Roman Empire", "question_count": 5}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["kind"], "GENERATION_ERROR");
    assert_eq!(client.calls(), 1);
}

#[actix_web::test]
async fn test_sessions_do_not_share_progress() {
    let client = ScriptedClient::new(vec![Ok(roman_quiz(3))]);
    let app = app!(client);
    let first = create_session!(app);
    let second = create_session!(app);

    let req = test::TestRequest::post()
        .uri(&format!("/api/sessions/{}/quiz", first))
        .set_json(json!({"topic": "Roman Empire", "question_count": 3}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/api/sessions/{}", second))
        .to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view["state"], "empty");
    assert!(view["topic"].is_null());
}
