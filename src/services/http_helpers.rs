use actix_web::{
    http::header::{self, ContentDisposition, DispositionParam, DispositionType, EntityTag},
    HttpRequest, HttpResponse,
};

use crate::services::quiz_session_service::ExportFile;

/// Creates a success JSON response
pub fn success_json<T: serde::Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(data)
}

/// Creates a created JSON response
pub fn created_json<T: serde::Serialize>(data: T) -> HttpResponse {
    HttpResponse::Created().json(data)
}

/// Serves an exported file as an attachment. Answers `304 Not Modified` when
/// the client already holds the same bytes.
pub fn download(req: &HttpRequest, file: ExportFile) -> HttpResponse {
    if is_unchanged(req, &file.etag) {
        return HttpResponse::NotModified()
            .insert_header((header::ETAG, file.etag))
            .finish();
    }

    HttpResponse::Ok()
        .content_type(file.content_type)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(file.file_name)],
        })
        .insert_header((header::ETAG, file.etag))
        .body(file.body)
}

fn is_unchanged(req: &HttpRequest, etag: &str) -> bool {
    let Ok(current) = etag.parse::<EntityTag>() else {
        return false;
    };

    req.headers()
        .get(header::IF_NONE_MATCH)
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            value.split(',').any(|candidate| {
                let candidate = candidate.trim();
                candidate == "*"
                    || candidate
                        .parse::<EntityTag>()
                        .map(|tag| tag.weak_eq(&current))
                        .unwrap_or(false)
            })
        })
        .unwrap_or(false)
}
