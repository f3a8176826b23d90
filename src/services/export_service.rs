use std::io::Cursor;

use docx_rs::{BreakType, Docx, Paragraph, Run};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::{
    errors::{AppError, AppResult},
    models::domain::{ExportRecord, QuizSession},
};

pub const CSV_HEADER: [&str; 5] = [
    "question",
    "your answer",
    "correct answer",
    "correct",
    "explanation",
];

pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Word-document layout of a finished quiz, independent of the file format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportDocument {
    pub title: String,
    pub subtitle: String,
    pub sections: Vec<DocumentSection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSection {
    pub heading: String,
    pub paragraphs: Vec<String>,
}

impl From<&ExportRecord> for DocumentSection {
    fn from(record: &ExportRecord) -> Self {
        DocumentSection {
            heading: format!("Question {}: {}", record.number, record.question),
            paragraphs: vec![
                format!("Options: {}", record.options.join(", ")),
                format!(
                    "Your Answer: {}",
                    record.chosen_answer.as_deref().unwrap_or("(not answered)")
                ),
                format!("Correct Answer: {}", record.correct_answer),
                format!(
                    "Result: {}",
                    if record.is_correct { "Correct" } else { "Incorrect" }
                ),
                format!("Explanation: {}", record.explanation),
            ],
        }
    }
}

pub struct ExportService;

impl ExportService {
    /// CSV with a header row and one row per question.
    pub fn to_csv(session: &QuizSession) -> AppResult<Vec<u8>> {
        let records = session.export_records()?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(CSV_HEADER)?;
        for record in &records {
            writer.write_record([
                record.question.as_str(),
                record.chosen_answer.as_deref().unwrap_or(""),
                record.correct_answer.as_str(),
                if record.is_correct { "true" } else { "false" },
                record.explanation.as_str(),
            ])?;
        }

        writer
            .into_inner()
            .map_err(|e| AppError::Export(format!("Failed to flush CSV: {}", e)))
    }

    pub fn to_document(session: &QuizSession) -> AppResult<ExportDocument> {
        let records = session.export_records()?;
        let summary = session.score_summary();

        Ok(ExportDocument {
            title: "Quiz Results".to_string(),
            subtitle: format!(
                "Topic: {} | Score: {}/{} ({}%)",
                session.topic().unwrap_or_default(),
                summary.correct,
                summary.total,
                summary.percentage
            ),
            sections: records.iter().map(DocumentSection::from).collect(),
        })
    }

    /// Renders the document as `.docx` bytes, one question per page.
    pub fn to_docx(session: &QuizSession) -> AppResult<Vec<u8>> {
        let document = Self::to_document(session)?;
        Self::render_docx(&document)
    }

    pub fn render_docx(document: &ExportDocument) -> AppResult<Vec<u8>> {
        let mut docx = Docx::new()
            .add_paragraph(
                Paragraph::new().add_run(Run::new().add_text(document.title.as_str()).bold().size(40)),
            )
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text(document.subtitle.as_str())));

        for section in &document.sections {
            docx = docx.add_paragraph(
                Paragraph::new().add_run(Run::new().add_text(section.heading.as_str()).bold().size(28)),
            );
            for paragraph in &section.paragraphs {
                docx = docx.add_paragraph(
                    Paragraph::new().add_run(Run::new().add_text(paragraph.as_str())),
                );
            }
            docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_break(BreakType::Page)));
        }

        let mut buffer = Cursor::new(Vec::new());
        docx.build()
            .pack(&mut buffer)
            .map_err(|e| AppError::Export(format!("Failed to write Word document: {}", e)))?;
        Ok(buffer.into_inner())
    }

    /// `quiz_<topic>.<extension>` with the topic lowercased, spaces turned
    /// into underscores and anything else outside `[a-z0-9_-]` dropped.
    pub fn file_name(topic: Option<&str>, extension: &str) -> String {
        let slug: String = topic
            .unwrap_or_default()
            .trim()
            .to_lowercase()
            .replace(' ', "_")
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
            .collect();

        if slug.is_empty() {
            format!("quiz.{}", extension)
        } else {
            format!("quiz_{}.{}", slug, extension)
        }
    }

    /// Strong entity tag over the exported bytes.
    pub fn etag(body: &[u8]) -> String {
        format!("\"{:x}\"", Sha256::digest(body))
    }
}
