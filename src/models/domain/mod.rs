pub mod export_record;
pub mod question;
pub mod quiz_session;
pub use export_record::ExportRecord;
pub use question::Question;
pub use quiz_session::QuizSession;
