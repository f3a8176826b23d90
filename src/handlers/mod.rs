use actix_web::web;

use crate::errors::AppError;

pub mod health_handler;
pub mod session_handler;

pub use health_handler::{health_check, health_check_ready};
pub use session_handler::{
    advance, create_session, delete_session, export_csv, export_docx, generate_quiz, get_session,
    reset, results, submit_answer,
};

/// Registers every route plus extractor settings that turn malformed paths
/// and bodies into [`AppError::InvalidInput`].
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::InvalidInput(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::InvalidInput(err.to_string()).into()),
    )
    .service(health_check)
    .service(health_check_ready)
    .service(create_session)
    .service(get_session)
    .service(delete_session)
    .service(generate_quiz)
    .service(submit_answer)
    .service(advance)
    .service(reset)
    .service(results)
    .service(export_csv)
    .service(export_docx);
}
