//! HTTP routes and handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use feedback_sentiment_classifiers::Classifier;
use feedback_sentiment_core::{AnalysisResult, FeedbackRequest};
use futures::FutureExt;
use serde_json::json;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Instant;
use tracing::{error, info};

use crate::state::AppState;
use crate::telemetry::{CLASSIFICATION_LATENCY_US, FALLBACKS_TOTAL, REQUESTS_TOTAL};

/// Body of `GET /`, kept verbatim for existing clients
pub const ROOT_MESSAGE: &str = "FastAPI Sentiment Analysis Server is running!";

pub async fn root() -> impl IntoResponse {
    Json(json!({ "message": ROOT_MESSAGE }))
}

/// `POST /analyze`
///
/// Always answers 200 once the body passes schema validation. Classifier
/// failures are logged and replaced by the neutral fallback.
pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> Result<Json<AnalysisResult>, ValidationError> {
    let Json(request) = payload?;
    Ok(Json(analyze_text(state.classifier.as_ref(), &request.text).await))
}

/// Classify `text`, converting any error or panic into the fallback result
pub async fn analyze_text(classifier: &dyn Classifier, text: &str) -> AnalysisResult {
    info!(text = %text, "Received text for analysis");
    metrics::counter!(REQUESTS_TOTAL).increment(1);

    let start = Instant::now();
    let outcome = AssertUnwindSafe(classifier.classify(text))
        .catch_unwind()
        .await;
    metrics::histogram!(CLASSIFICATION_LATENCY_US).record(start.elapsed().as_micros() as f64);

    match outcome {
        Ok(Ok(classification)) => {
            let result = AnalysisResult::from(classification);
            info!(label = %result.label, score = result.score, "Analysis result");
            result
        }
        Ok(Err(e)) => {
            error!(error = %e, "Error in sentiment analysis");
            metrics::counter!(FALLBACKS_TOTAL, "reason" => "error").increment(1);
            AnalysisResult::fallback()
        }
        Err(panic) => {
            error!(panic = %panic_message(panic.as_ref()), "Classifier panicked during sentiment analysis");
            metrics::counter!(FALLBACKS_TOTAL, "reason" => "panic").increment(1);
            AnalysisResult::fallback()
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not Found" })))
}

/// Request body failed schema validation
#[derive(Debug)]
pub struct ValidationError {
    kind: &'static str,
    message: String,
}

impl From<JsonRejection> for ValidationError {
    fn from(rejection: JsonRejection) -> Self {
        let kind = match &rejection {
            JsonRejection::JsonDataError(_) => "json_data",
            JsonRejection::JsonSyntaxError(_) => "json_invalid",
            JsonRejection::MissingJsonContentType(_) => "content_type",
            _ => "body",
        };

        Self {
            kind,
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        info!(kind = self.kind, "Rejected analyze request: {}", self.message);

        let body = json!({
            "detail": [{
                "loc": ["body"],
                "msg": self.message,
                "type": self.kind,
            }]
        });

        (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
    }
}
