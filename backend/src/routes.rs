use actix_files::Files;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Scope};
use futures::{StreamExt, TryStreamExt};
use log::{info, warn};
use std::io::Write;

use shared::{AnalyzeResponse, DebugInfo, WakeResponse};

use crate::classifier::ClassifierClient;
use crate::error::{timestamp_now, ApiError};
use crate::fetch;
use crate::normalize::{self, CaptureRotation, NormalizeConfig};
use crate::verdict;

pub fn configure_routes(cfg: &mut web::ServiceConfig, frontend_dir: String) {
    cfg.service(api_scope())
        .service(Files::new("/", frontend_dir).index_file("index.html"));
}

pub(crate) fn api_scope() -> Scope {
    web::scope("/api")
        .service(web::resource("/analyze").route(web::post().to(handle_analyze)))
        .service(web::resource("/wake").route(web::post().to(handle_wake)))
}

#[derive(Default)]
struct AnalyzeForm {
    image: Option<Vec<u8>>,
    image_mime: Option<String>,
    image_url: Option<String>,
    rotation: CaptureRotation,
}

async fn read_form(mut payload: Multipart) -> Result<AnalyzeForm, ApiError> {
    let mut form = AnalyzeForm::default();

    while let Ok(Some(mut field)) = payload.try_next().await {
        let name = field.name().unwrap_or("").to_string();
        let mime = field.content_type().map(|m| m.to_string());

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let bytes = chunk?;
            data.write_all(&bytes)
                .map_err(|e| ApiError::Upload(e.to_string()))?;
        }

        match name.as_str() {
            "image" => {
                if !data.is_empty() {
                    form.image = Some(data);
                    form.image_mime = mime;
                }
            }
            "image_url" => {
                form.image_url = Some(String::from_utf8_lossy(&data).into_owned());
            }
            "rotation" => {
                form.rotation = CaptureRotation::from_field(&String::from_utf8_lossy(&data));
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn handle_analyze(
    classifier: web::Data<ClassifierClient>,
    http: web::Data<reqwest::Client>,
    config: web::Data<NormalizeConfig>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let form = read_form(payload).await?;

    let (bytes, mime) = match (form.image, form.image_url) {
        (Some(bytes), _) => {
            let mime = form
                .image_mime
                .unwrap_or_else(|| "application/octet-stream".to_string());
            (bytes, mime)
        }
        (None, Some(url)) => {
            info!("fetching dropped URL for analysis");
            let fetched = fetch::fetch_image_url(&http, &url).await?;
            (fetched.bytes, fetched.content_type)
        }
        (None, None) => return Err(ApiError::NoImage),
    };

    let normalized = normalize::normalize(&bytes, &mime, form.rotation, &config)?;
    info!(
        "normalized image to {}x{} ({} bytes)",
        normalized.width,
        normalized.height,
        normalized.bytes.len()
    );

    let predictions = classifier.classify(&normalized).await?;
    let verdict = verdict::derive_verdict(&predictions);
    info!(
        "verdict: is_hot_dog={} confidence={:.3}",
        verdict.is_hot_dog, verdict.confidence
    );

    Ok(HttpResponse::Ok().json(AnalyzeResponse {
        is_hot_dog: verdict.is_hot_dog,
        confidence: verdict.confidence,
        debug: DebugInfo {
            top3_predictions: verdict::top_predictions(&predictions, 3),
            image_size: normalized.bytes.len() as u64,
            timestamp: timestamp_now(),
        },
    }))
}

async fn handle_wake(classifier: web::Data<ClassifierClient>) -> HttpResponse {
    match classifier.wake().await {
        Ok(response) => HttpResponse::Ok().json(WakeResponse {
            status: "API check completed".to_string(),
            response,
        }),
        Err(e) => {
            warn!("wake-up call failed: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({ "error": e.to_string() }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{ClassifierClient, ClassifierConfig};
    use crate::retry::RetryPolicy;
    use actix_web::{test, App};
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use shared::{ErrorCode, ErrorResponse};
    use std::io::Cursor;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    macro_rules! test_app {
        ($classifier:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($classifier))
                    .app_data(web::Data::new(reqwest::Client::new()))
                    .app_data(web::Data::new(NormalizeConfig::default()))
                    .service(api_scope()),
            )
            .await
        };
    }

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([200, 120, 40]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    fn classifier_for(api_url: String, token: Option<&str>) -> ClassifierClient {
        ClassifierClient::new(
            reqwest::Client::new(),
            ClassifierConfig {
                api_url,
                api_token: token.map(str::to_string),
                timeout: Duration::from_secs(5),
                retry: RetryPolicy {
                    max_attempts: 2,
                    base_delay: Duration::from_millis(1),
                    max_delay: Duration::from_millis(2),
                    jitter: Duration::ZERO,
                },
            },
        )
    }

    const BOUNDARY: &str = "------------------------test-boundary";

    fn file_part(name: &str, filename: &str, content_type: &str, bytes: &[u8]) -> Vec<u8> {
        let mut part = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .into_bytes();
        part.extend_from_slice(bytes);
        part.extend_from_slice(b"\r\n");
        part
    }

    fn text_part(name: &str, value: &str) -> Vec<u8> {
        format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
            .into_bytes()
    }

    fn multipart_body(parts: Vec<Vec<u8>>) -> Vec<u8> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(&part);
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn analyze_request(body: Vec<u8>) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/api/analyze")
            .insert_header((
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(body)
    }

    #[actix_web::test]
    async fn analyze_detects_a_hot_dog() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "label": "Hot Dog", "score": 0.92 },
                { "label": "bun", "score": 0.05 }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let app = test_app!(classifier_for(server.uri(), Some("test-token")));
        let body =
            multipart_body(vec![file_part("image", "food.png", "image/png", &png_bytes(32, 32))]);
        let response: AnalyzeResponse =
            test::call_and_read_body_json(&app, analyze_request(body).to_request()).await;

        assert!(response.is_hot_dog);
        assert_eq!(response.confidence, 0.92);
        assert_eq!(
            response.debug.top3_predictions,
            vec!["Hot Dog: 92.0%", "bun: 5.0%"]
        );
        assert!(response.debug.image_size > 0);
    }

    #[actix_web::test]
    async fn analyze_reports_negative_verdicts_with_zero_confidence() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "label": "pizza", "score": 0.7 }
            ])))
            .mount(&server)
            .await;

        let app = test_app!(classifier_for(server.uri(), Some("test-token")));
        let body =
            multipart_body(vec![file_part("image", "food.png", "image/png", &png_bytes(16, 16))]);
        let response: AnalyzeResponse =
            test::call_and_read_body_json(&app, analyze_request(body).to_request()).await;

        assert!(!response.is_hot_dog);
        assert_eq!(response.confidence, 0.0);
    }

    #[actix_web::test]
    async fn analyze_without_any_image_is_a_no_image_error() {
        let server = MockServer::start().await;
        let app = test_app!(classifier_for(server.uri(), Some("test-token")));

        let body = multipart_body(vec![text_part("rotation", "0")]);
        let response = test::call_service(&app, analyze_request(body).to_request()).await;

        assert_eq!(response.status(), 400);
        let error: ErrorResponse = test::read_body_json(response).await;
        assert_eq!(error.code, ErrorCode::NoImage);
        assert_eq!(error.error, "Please select an image to analyze.");
    }

    #[actix_web::test]
    async fn analyze_rejects_non_image_uploads() {
        let server = MockServer::start().await;
        let app = test_app!(classifier_for(server.uri(), Some("test-token")));

        let body = multipart_body(vec![file_part(
            "image",
            "notes.txt",
            "text/plain",
            b"just text",
        )]);
        let response = test::call_service(&app, analyze_request(body).to_request()).await;

        assert_eq!(response.status(), 400);
        let error: ErrorResponse = test::read_body_json(response).await;
        assert_eq!(error.code, ErrorCode::NoImage);
    }

    #[actix_web::test]
    async fn analyze_without_credential_is_a_config_error_and_never_calls_the_remote() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let app = test_app!(classifier_for(server.uri(), None));
        let body =
            multipart_body(vec![file_part("image", "food.png", "image/png", &png_bytes(8, 8))]);
        let response = test::call_service(&app, analyze_request(body).to_request()).await;

        assert_eq!(response.status(), 500);
        let error: ErrorResponse = test::read_body_json(response).await;
        assert_eq!(error.code, ErrorCode::ConfigError);
        assert_eq!(error.details, "API configuration error");
    }

    #[actix_web::test]
    async fn analyze_fetches_dropped_urls_server_side() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/dog.png"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/png")
                    .set_body_bytes(png_bytes(24, 24)),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "label": "hotdog", "score": 0.88 }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let app = test_app!(classifier_for(server.uri(), Some("test-token")));
        let body =
            multipart_body(vec![text_part("image_url", &format!("{}/dog.png", server.uri()))]);
        let response: AnalyzeResponse =
            test::call_and_read_body_json(&app, analyze_request(body).to_request()).await;

        assert!(response.is_hot_dog);
        assert_eq!(response.confidence, 0.88);
    }

    #[actix_web::test]
    async fn analyze_surfaces_url_fetch_failures_without_classifying() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let app = test_app!(classifier_for(server.uri(), Some("test-token")));
        let body =
            multipart_body(vec![text_part("image_url", &format!("{}/gone.png", server.uri()))]);
        let response = test::call_service(&app, analyze_request(body).to_request()).await;

        assert_eq!(response.status(), 400);
        let error: ErrorResponse = test::read_body_json(response).await;
        assert_eq!(error.code, ErrorCode::NoImage);
        assert!(error.error.contains("Could not load the image URL"));
    }

    #[actix_web::test]
    async fn analyze_maps_remote_retry_exhaustion_to_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .expect(2)
            .mount(&server)
            .await;

        let app = test_app!(classifier_for(server.uri(), Some("test-token")));
        let body =
            multipart_body(vec![file_part("image", "food.png", "image/png", &png_bytes(8, 8))]);
        let response = test::call_service(&app, analyze_request(body).to_request()).await;

        assert_eq!(response.status(), 500);
        let error: ErrorResponse = test::read_body_json(response).await;
        assert_eq!(error.code, ErrorCode::ApiError);
        assert_eq!(error.error, "Error connecting to AI service. Please try again.");
    }

    #[actix_web::test]
    async fn analyze_accepts_a_rotation_hint_alongside_the_capture() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "label": "hotdog", "score": 0.5 }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let app = test_app!(classifier_for(server.uri(), Some("test-token")));
        let body = multipart_body(vec![
            file_part("image", "camera-photo.jpg", "image/png", &png_bytes(40, 20)),
            text_part("rotation", "90"),
        ]);
        let response: AnalyzeResponse =
            test::call_and_read_body_json(&app, analyze_request(body).to_request()).await;

        assert!(response.is_hot_dog);
        assert!(response.debug.image_size > 0);
    }

    #[actix_web::test]
    async fn wake_relays_the_probe_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "loaded": true })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let app = test_app!(classifier_for(server.uri(), Some("test-token")));
        let request = test::TestRequest::post().uri("/api/wake").to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), 200);
        let body: WakeResponse = test::read_body_json(response).await;
        assert_eq!(body.status, "API check completed");
        assert_eq!(body.response, serde_json::json!({ "loaded": true }));
    }

    #[actix_web::test]
    async fn wake_failures_are_reported_but_not_fatal() {
        // Nothing listens on the discard port in the test environment.
        let app = test_app!(classifier_for("http://127.0.0.1:9".to_string(), Some("t")));
        let request = test::TestRequest::post().uri("/api/wake").to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), 500);
        let body: serde_json::Value = test::read_body_json(response).await;
        assert!(body.get("error").is_some());
    }
}
