use crate::classifier::{ClassifyError, Classifier};
use crate::config::UPLOAD_FIELD;
use actix_cors::Cors;
use actix_multipart::MultipartError;
use actix_web::error::{BlockingError, InternalError, JsonPayloadError};
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use protocol::{ErrorBody, ValidationErrors};
use std::sync::Arc;
use thiserror::Error;

pub mod protocol;
pub mod routes;

/// Everything the routes need, shared read-only by all workers
#[derive(Debug)]
pub struct AppState {
    pub classifier: Arc<Classifier>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(classifier: Classifier, max_upload_bytes: usize) -> Self {
        AppState {
            classifier: Arc::new(classifier),
            max_upload_bytes,
        }
    }
}

#[derive(Debug, Error)]
pub enum WebError {
    #[error("Error processing image: {0}")]
    Processing(#[from] ClassifyError),

    #[error("Error processing image: {0}")]
    Blocking(#[from] BlockingError),

    #[error("invalid multipart upload: {0}")]
    Upload(#[from] MultipartError),

    #[error("field required: `{}`", UPLOAD_FIELD)]
    MissingUpload,

    #[error("upload is larger than {limit} bytes")]
    PayloadTooLarge { limit: usize },
}

impl actix_web::error::ResponseError for WebError {
    fn error_response(&self) -> HttpResponse {
        let mut res = HttpResponse::build(self.status_code());
        match self {
            WebError::Upload(_) => res.json(ValidationErrors::single(
                vec!["body"],
                self.to_string(),
                "multipart_invalid",
            )),
            WebError::MissingUpload => res.json(ValidationErrors::single(
                vec!["body", UPLOAD_FIELD],
                self.to_string(),
                "missing",
            )),
            _ => res.json(ErrorBody {
                error: self.to_string(),
            }),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            WebError::Processing(_) | WebError::Blocking(_) => StatusCode::INTERNAL_SERVER_ERROR,
            WebError::Upload(_) | WebError::MissingUpload => StatusCode::UNPROCESSABLE_ENTITY,
            WebError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }
}

/// JSON extractor settings: malformed bodies are answered with 422 and a
/// list of field errors
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error)
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let (kind, msg) = match &err {
        JsonPayloadError::Deserialize(e) if e.is_data() => ("value_error", e.to_string()),
        JsonPayloadError::Deserialize(e) => ("json_invalid", e.to_string()),
        JsonPayloadError::ContentType => ("content_type", err.to_string()),
        _ => ("payload_error", err.to_string()),
    };
    let body = ValidationErrors::single(vec!["body"], msg, kind);
    InternalError::from_response(err, HttpResponse::UnprocessableEntity().json(body)).into()
}

/// Wide-open cross-origin policy: any origin, method and header
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
}
