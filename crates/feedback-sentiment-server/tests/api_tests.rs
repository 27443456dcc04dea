//! Router tests for the sentiment service
//!
//! Requests are driven in-process through `tower::ServiceExt::oneshot`
//! against mock classifiers, so no model or network access is needed.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use feedback_sentiment_classifiers::{
    ClassificationResult, Classifier, ClassifierBackend, ClassifierConfig,
};
use feedback_sentiment_core::{Error, Result};
use feedback_sentiment_server::{build_app, AppState, CorsConfig};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

/// Returns a fixed result and counts calls
struct MockClassifier {
    label: &'static str,
    score: f32,
    call_count: AtomicU32,
}

impl MockClassifier {
    fn new(label: &'static str, score: f32) -> Arc<Self> {
        Arc::new(Self {
            label,
            score,
            call_count: AtomicU32::new(0),
        })
    }

    fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Classifier for MockClassifier {
    async fn classify(&self, _text: &str) -> Result<ClassificationResult> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        Ok(ClassificationResult::new(self.label, self.score))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// A classifier that always fails - for testing the fallback path
struct FailingClassifier;

#[async_trait]
impl Classifier for FailingClassifier {
    async fn classify(&self, _text: &str) -> Result<ClassificationResult> {
        Err(Error::classifier("Simulated inference failure"))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Fails on empty input, like a model that cannot score zero tokens
struct EmptyRejectingClassifier;

#[async_trait]
impl Classifier for EmptyRejectingClassifier {
    async fn classify(&self, text: &str) -> Result<ClassificationResult> {
        if text.is_empty() {
            return Err(Error::classifier("empty input"));
        }
        Ok(ClassificationResult::new("POSITIVE", 0.75))
    }

    fn name(&self) -> &str {
        "empty-rejecting"
    }
}

/// A classifier that panics - for testing the panic boundary
struct PanickingClassifier;

#[async_trait]
impl Classifier for PanickingClassifier {
    async fn classify(&self, _text: &str) -> Result<ClassificationResult> {
        panic!("Simulated classifier panic");
    }

    fn name(&self) -> &str {
        "panicking"
    }
}

fn app_with(classifier: Arc<dyn Classifier>) -> Router {
    build_app(AppState::new(classifier), &CorsConfig::default()).unwrap()
}

fn analyze_request(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/analyze")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn test_root_reports_running() {
    let app = app_with(MockClassifier::new("POSITIVE", 0.9));

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "message": "FastAPI Sentiment Analysis Server is running!" })
    );
}

#[tokio::test]
async fn test_analyze_returns_classification() {
    let classifier = MockClassifier::new("POSITIVE", 0.9998);
    let app = app_with(classifier.clone());

    let (status, body) = send(&app, analyze_request(r#"{"text": "I love this product!"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["label"], "POSITIVE");
    let score = body["score"].as_f64().unwrap();
    assert!((score - 0.9998).abs() < 1e-6);
    assert_eq!(classifier.call_count(), 1);
}

#[tokio::test]
async fn test_classifier_error_returns_fallback() {
    let app = app_with(Arc::new(FailingClassifier));

    let (status, body) = send(&app, analyze_request(r#"{"text": "anything"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "label": "NEUTRAL", "score": 0.5 }));
}

#[tokio::test]
async fn test_classifier_panic_returns_fallback() {
    let app = app_with(Arc::new(PanickingClassifier));

    let (status, body) = send(&app, analyze_request(r#"{"text": "anything"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "label": "NEUTRAL", "score": 0.5 }));

    // The service keeps answering after a panic
    let (status, _) = send(&app, analyze_request(r#"{"text": "again"}"#)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_empty_text_is_answered() {
    let app = app_with(Arc::new(EmptyRejectingClassifier));

    let (status, body) = send(&app, analyze_request(r#"{"text": ""}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "label": "NEUTRAL", "score": 0.5 }));

    let (status, body) = send(&app, analyze_request(r#"{"text": "fine"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["label"], "POSITIVE");
}

#[tokio::test]
async fn test_missing_text_is_unprocessable() {
    let classifier = MockClassifier::new("POSITIVE", 0.9);
    let app = app_with(classifier.clone());

    let (status, body) = send(&app, analyze_request(r#"{"message": "hi"}"#)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["loc"], json!(["body"]));
    assert_eq!(body["detail"][0]["type"], "json_data");
    assert!(body["detail"][0]["msg"].as_str().unwrap().contains("text"));
    assert_eq!(classifier.call_count(), 0);
}

#[tokio::test]
async fn test_invalid_bodies_are_unprocessable() {
    let classifier = MockClassifier::new("POSITIVE", 0.9);
    let app = app_with(classifier.clone());

    for body in [r#"{"text": 42}"#, r#"{"text": null}"#, r#"{"text": "#, "[]"] {
        let (status, _) = send(&app, analyze_request(body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "body: {body}");
    }

    let no_content_type = Request::builder()
        .method(Method::POST)
        .uri("/analyze")
        .body(Body::from(r#"{"text": "hi"}"#))
        .unwrap();
    let (status, body) = send(&app, no_content_type).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["type"], "content_type");

    assert_eq!(classifier.call_count(), 0);
}

#[tokio::test]
async fn test_repeated_calls_are_identical() {
    let app = app_with(MockClassifier::new("NEGATIVE", 0.987));

    let (_, first) = send(&app, analyze_request(r#"{"text": "This is terrible."}"#)).await;
    let (_, second) = send(&app, analyze_request(r#"{"text": "This is terrible."}"#)).await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = app_with(MockClassifier::new("POSITIVE", 0.9));

    let request = Request::builder().uri("/predict").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "detail": "Not Found" }));
}

#[tokio::test]
async fn test_allowed_origin_gets_cors_headers() {
    let app = app_with(MockClassifier::new("POSITIVE", 0.9));

    let mut request = analyze_request(r#"{"text": "hello"}"#);
    request
        .headers_mut()
        .insert(header::ORIGIN, "http://localhost:3000".parse().unwrap());
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:3000"
    );
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
}

#[tokio::test]
async fn test_preflight_from_allowed_origin() {
    let classifier = MockClassifier::new("POSITIVE", 0.9);
    let app = app_with(classifier.clone());

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/analyze")
        .header(header::ORIGIN, "http://127.0.0.1:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type,x-client")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://127.0.0.1:3000"
    );
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "POST");
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
        "content-type,x-client"
    );
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    assert_eq!(classifier.call_count(), 0);
}

#[tokio::test]
async fn test_preflight_from_disallowed_origin() {
    let classifier = MockClassifier::new("POSITIVE", 0.9);
    let app = app_with(classifier.clone());

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/analyze")
        .header(header::ORIGIN, "http://evil.example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
    assert_eq!(classifier.call_count(), 0);
}

#[tokio::test]
async fn test_lexicon_backend_end_to_end() {
    let config = ClassifierConfig {
        backend: ClassifierBackend::Lexicon,
        ..Default::default()
    };
    let state = AppState::from_config(&config).await.unwrap();
    let app = build_app(state, &CorsConfig::default()).unwrap();

    let (status, body) = send(&app, analyze_request(r#"{"text": "I love this product!"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["label"], "POSITIVE");

    let (status, body) = send(&app, analyze_request(r#"{"text": "This is terrible."}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["label"], "NEGATIVE");
    let score = body["score"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&score));
}

#[tokio::test]
async fn test_large_body_is_classified() {
    let config = ClassifierConfig {
        backend: ClassifierBackend::Lexicon,
        ..Default::default()
    };
    let state = AppState::from_config(&config).await.unwrap();
    let app = build_app(state, &CorsConfig::default()).unwrap();

    // ~3 MB, above axum's default body limit
    let body = json!({ "text": "good ".repeat(600_000) }).to_string();
    assert!(body.len() > 2 * 1024 * 1024);

    let (status, body) = send(&app, analyze_request(&body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "label": "POSITIVE", "score": 1.0 }));
}

#[tokio::test]
async fn test_large_body_failure_returns_fallback() {
    let app = app_with(Arc::new(FailingClassifier));

    let body = json!({ "text": "x".repeat(3 * 1024 * 1024) }).to_string();
    let (status, body) = send(&app, analyze_request(&body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "label": "NEUTRAL", "score": 0.5 }));
}

#[tokio::test]
async fn test_model_load_failure_is_fatal() {
    let config = ClassifierConfig {
        backend: ClassifierBackend::Distilbert,
        model: feedback_sentiment_classifiers::ModelConfig::from_local("/definitely/not/here"),
    };
    assert!(AppState::from_config(&config).await.is_err());
}
