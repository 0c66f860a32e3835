//! The user-facing JSON web server. `/transcribe` runs the uploaded image
//! through the classifier; the other routes are static.

use super::protocol::{self, Acknowledgement, ContactForm, Message, Transcription};
use super::{AppState, WebError};
use crate::config::UPLOAD_FIELD;
use actix_multipart::Multipart;
use actix_web::{get, post, web, Responder};
use futures_util::TryStreamExt;
use tracing::{debug, info, warn};

type Result<T> = std::result::Result<T, WebError>;

/// Register every route and the JSON extractor settings
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(super::json_config())
        .service(root)
        .service(about)
        .service(contact)
        .service(transcribe);
}

/// Liveness check. Does not touch the model.
#[get("/")]
pub async fn root() -> impl Responder {
    web::Json(Message {
        message: protocol::HEALTH_MESSAGE,
    })
}

#[get("/about")]
pub async fn about() -> impl Responder {
    web::Json(&protocol::ABOUT)
}

/// Contact form submissions are only logged
#[post("/contact")]
pub async fn contact(form: web::Json<ContactForm>) -> impl Responder {
    let form = form.into_inner();
    info!(
        name = %form.name,
        email = %form.email,
        subject = %form.subject,
        message = %form.message,
        "received contact form submission"
    );

    web::Json(Acknowledgement {
        status: protocol::SUCCESS,
        message: protocol::CONTACT_ACK,
    })
}

#[post("/transcribe")]
pub async fn transcribe(mut payload: Multipart, state: web::Data<AppState>) -> Result<impl Responder> {
    let image = read_upload(&mut payload, state.max_upload_bytes).await?;
    debug!(bytes = image.len(), "received image upload");

    // Decoding and the forward pass are CPU bound, keep them off the workers
    let classifier = state.classifier.clone();
    let prediction = web::block(move || classifier.classify(&image).map(str::to_owned)).await?;

    let predicted_class = prediction.map_err(|err| {
        warn!(%err, "failed to classify upload");
        err
    })?;
    info!(%predicted_class, "finished serving inference request");

    Ok(web::Json(Transcription {
        status: protocol::SUCCESS,
        predicted_class,
    }))
}

/// Read the bytes of the upload field, skipping any other form fields
async fn read_upload(payload: &mut Multipart, limit: usize) -> Result<Vec<u8>> {
    while let Some(mut field) = payload.try_next().await? {
        if field.content_disposition().get_name() != Some(UPLOAD_FIELD) {
            while field.try_next().await?.is_some() {}
            continue;
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            if bytes.len() + chunk.len() > limit {
                return Err(WebError::PayloadTooLarge { limit });
            }
            bytes.extend_from_slice(&chunk);
        }
        return Ok(bytes);
    }

    Err(WebError::MissingUpload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Classifier;
    use crate::config::LABELS;
    use crate::util::test::{get_test_image, StubModel};
    use actix_web::http::{header, Method, StatusCode};
    use actix_web::{test, App};
    use serde_json::{json, Value};

    const BOUNDARY: &str = "----setu-test-boundary";

    fn state(scores: &[f32], max_upload_bytes: usize) -> web::Data<AppState> {
        let labels = LABELS.iter().map(|l| l.to_string()).collect();
        let classifier = Classifier::new(StubModel::new(scores), labels).unwrap();
        web::Data::new(AppState::new(classifier, max_upload_bytes))
    }

    fn upload(field: &str, bytes: &[u8]) -> test::TestRequest {
        let mut body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"frame.jpg\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        test::TestRequest::post()
            .uri("/transcribe")
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(body)
    }

    #[actix_web::test]
    async fn test_root_without_model() {
        let app = test::init_service(App::new().configure(configure)).await;

        let req = test::TestRequest::get().uri("/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({ "message": "Setu Backend API is running!" }));
    }

    #[actix_web::test]
    async fn test_about_is_stable() {
        let app = test::init_service(App::new().configure(configure)).await;

        let first = test::call_and_read_body(&app, test::TestRequest::get().uri("/about").to_request()).await;
        let second = test::call_and_read_body(&app, test::TestRequest::get().uri("/about").to_request()).await;
        assert_eq!(first, second);

        let about: Value = serde_json::from_slice(&first).unwrap();
        assert_eq!(about["title"], "About Setu");
        assert_eq!(about["team"].as_array().unwrap().len(), 4);
        assert_eq!(about["team"][0]["role"], "Machine Learning");
    }

    #[actix_web::test]
    async fn test_contact_accepts_form() {
        let app = test::init_service(App::new().configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/contact")
            .set_json(json!({
                "name": "Ram",
                "email": "ram@example.com",
                "subject": "Hello",
                "message": "Namaskaar!"
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            body,
            json!({
                "status": "success",
                "message": "Your message has been received. We'll get back to you soon!"
            })
        );
    }

    #[actix_web::test]
    async fn test_contact_rejects_missing_field() {
        let app = test::init_service(App::new().configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/contact")
            .set_json(json!({ "name": "Ram", "email": "ram@example.com", "subject": "Hello" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["detail"][0]["type"], "value_error");
        assert!(body["detail"][0]["msg"].as_str().unwrap().contains("message"));
    }

    #[actix_web::test]
    async fn test_contact_rejects_wrong_type() {
        let app = test::init_service(App::new().configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/contact")
            .set_json(json!({ "name": 5, "email": "e", "subject": "s", "message": "m" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[actix_web::test]
    async fn test_transcribe_returns_label() {
        let app = test::init_service(
            App::new()
                .app_data(state(&[0.1, 0.9, 0.05, 0.0], 1 << 20))
                .configure(configure),
        )
        .await;

        let req = upload(UPLOAD_FIELD, &get_test_image()).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({ "status": "success", "predicted_class": "Ghar" }));
    }

    #[actix_web::test]
    async fn test_transcribe_rejects_non_image() {
        let app = test::init_service(
            App::new()
                .app_data(state(&[0.1, 0.9, 0.05, 0.0], 1 << 20))
                .configure(configure),
        )
        .await;

        for bytes in [&b"hello, this is not an image"[..], &b""[..]] {
            let res = test::call_service(&app, upload(UPLOAD_FIELD, bytes).to_request()).await;
            assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

            let body: Value = test::read_body_json(res).await;
            assert!(body.get("predicted_class").is_none());
            assert!(body["error"]
                .as_str()
                .unwrap()
                .starts_with("Error processing image: "));
        }
    }

    #[actix_web::test]
    async fn test_transcribe_requires_file_field() {
        let app = test::init_service(
            App::new()
                .app_data(state(&[0.1, 0.9, 0.05, 0.0], 1 << 20))
                .configure(configure),
        )
        .await;

        let res = test::call_service(&app, upload("image", &get_test_image()).to_request()).await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["detail"][0]["loc"], json!(["body", "file"]));
    }

    #[actix_web::test]
    async fn test_transcribe_rejects_large_upload() {
        let app = test::init_service(
            App::new()
                .app_data(state(&[0.1, 0.9, 0.05, 0.0], 16))
                .configure(configure),
        )
        .await;

        let res = test::call_service(&app, upload(UPLOAD_FIELD, &get_test_image()).to_request()).await;
        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[actix_web::test]
    async fn test_cors_preflight_allows_any_origin() {
        let app = test::init_service(
            App::new()
                .wrap(crate::server::cors())
                .app_data(state(&[0.1, 0.9, 0.05, 0.0], 1 << 20))
                .configure(configure),
        )
        .await;

        let origin = "http://localhost:3000";
        let req = test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/transcribe")
            .insert_header((header::ORIGIN, origin))
            .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "POST"))
            .insert_header((header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert!(res.status().is_success());

        let headers = res.headers();
        assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), origin);
        assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(), "true");
        let methods = headers
            .get(header::ACCESS_CONTROL_ALLOW_METHODS)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(methods.contains("POST"));
    }

    #[actix_web::test]
    async fn test_cors_headers_on_simple_request() {
        let app = test::init_service(App::new().wrap(crate::server::cors()).configure(configure)).await;

        let origin = "https://setu.example.org";
        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((header::ORIGIN, origin))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), origin);
    }
}
