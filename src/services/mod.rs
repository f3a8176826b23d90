pub mod completion_client;
pub mod export_service;
pub mod http_helpers;
pub mod question_generator;
pub mod quiz_session_service;
pub mod response_parser;
