use crate::infra::AppState;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use bunk_ai::prediction::{
    PredictionInput, PredictionResult, PredictionService, MODEL_VERSION,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

const REQUIRED_FIELDS: [&str; 4] = [
    "attendance_percentage",
    "exam_proximity",
    "syllabus_completion",
    "past_performance",
];

const MAX_BATCH_ITEMS: usize = 100;

/// Core prediction API. Handlers receive the service through axum state;
/// there is no mutable process-wide predictor.
pub(crate) fn prediction_router(service: Arc<PredictionService>) -> Router {
    Router::new()
        .route("/", get(index_endpoint))
        .route("/predict", post(predict_endpoint))
        .route("/batch-predict", post(batch_predict_endpoint))
        .route("/model-info", get(model_info_endpoint))
        .route("/health", get(health_endpoint))
        .route("/retrain", post(retrain_endpoint))
        .fallback(missing_endpoint)
        .with_state(service)
}

/// Prediction routes plus the operational endpoints served from `AppState`.
pub(crate) fn with_service_routes(service: Arc<PredictionService>) -> Router {
    prediction_router(service)
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

/// Rejections produced before the core is invoked. Field-level detail is
/// preserved so callers can see exactly what was wrong.
#[derive(Debug)]
enum RequestRejection {
    NotAnObject,
    MissingFields(Vec<&'static str>),
    InvalidValue(String),
}

impl RequestRejection {
    fn message(&self) -> String {
        match self {
            RequestRejection::NotAnObject => "prediction must be a JSON object".to_string(),
            RequestRejection::MissingFields(fields) => {
                format!("missing fields: {}", fields.join(", "))
            }
            RequestRejection::InvalidValue(message) => message.clone(),
        }
    }
}

impl IntoResponse for RequestRejection {
    fn into_response(self) -> Response {
        let body = match &self {
            RequestRejection::NotAnObject => json!({
                "error": "No data provided",
                "message": "request body must be a JSON object",
            }),
            RequestRejection::MissingFields(fields) => json!({
                "error": "Missing required fields",
                "missing_fields": fields,
                "required_fields": REQUIRED_FIELDS,
            }),
            RequestRejection::InvalidValue(message) => json!({
                "error": "Invalid input values",
                "message": message,
            }),
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

struct ParsedPrediction {
    input: PredictionInput,
    subject: String,
    user_id: String,
}

fn parse_prediction(payload: &Value) -> Result<ParsedPrediction, RequestRejection> {
    let object = payload.as_object().ok_or(RequestRejection::NotAnObject)?;

    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| !object.contains_key(*field))
        .collect();
    if !missing.is_empty() {
        return Err(RequestRejection::MissingFields(missing));
    }

    let mut values = [0.0_f64; 4];
    for (slot, field) in values.iter_mut().zip(REQUIRED_FIELDS) {
        *slot = object
            .get(field)
            .and_then(Value::as_f64)
            .ok_or_else(|| RequestRejection::InvalidValue(format!("{field} must be a number")))?;
    }

    let input = PredictionInput::new(values[0], values[1], values[2], values[3])
        .map_err(|err| RequestRejection::InvalidValue(err.to_string()))?;

    let subject = object
        .get("subject")
        .and_then(Value::as_str)
        .unwrap_or("Unknown")
        .to_string();
    let user_id = object
        .get("user_id")
        .and_then(Value::as_str)
        .unwrap_or("anonymous")
        .to_string();

    Ok(ParsedPrediction {
        input,
        subject,
        user_id,
    })
}

#[derive(Debug, Serialize)]
struct PredictResponse {
    #[serde(flatten)]
    result: PredictionResult,
    metadata: RequestMetadata,
}

#[derive(Debug, Serialize)]
struct RequestMetadata {
    subject: String,
    user_id: String,
    model_version: &'static str,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct BatchResponse {
    results: Vec<BatchItemResponse>,
    errors: Vec<BatchItemError>,
    total_processed: usize,
    total_errors: usize,
}

#[derive(Debug, Serialize)]
struct BatchItemResponse {
    #[serde(flatten)]
    result: PredictionResult,
    metadata: BatchItemMetadata,
}

#[derive(Debug, Serialize)]
struct BatchItemMetadata {
    index: usize,
    subject: String,
    user_id: String,
}

#[derive(Debug, Serialize)]
struct BatchItemError {
    index: usize,
    error: String,
}

async fn index_endpoint() -> Json<Value> {
    Json(json!({
        "service": "Should I Bunk ML Service",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": {
            "/health": "Health check",
            "/predict": "Get bunk prediction",
            "/batch-predict": "Get batch predictions",
            "/model-info": "Get model information",
        },
    }))
}

async fn predict_endpoint(
    State(service): State<Arc<PredictionService>>,
    Json(payload): Json<Value>,
) -> Response {
    let parsed = match parse_prediction(&payload) {
        Ok(parsed) => parsed,
        Err(rejection) => return rejection.into_response(),
    };

    let result = service.predict(&parsed.input);
    info!(
        user_id = %parsed.user_id,
        subject = %parsed.subject,
        recommendation = result.recommendation.label(),
        "prediction served"
    );

    let response = PredictResponse {
        result,
        metadata: RequestMetadata {
            subject: parsed.subject,
            user_id: parsed.user_id,
            model_version: MODEL_VERSION,
            timestamp: Utc::now(),
        },
    };
    (StatusCode::OK, Json(response)).into_response()
}

async fn batch_predict_endpoint(
    State(service): State<Arc<PredictionService>>,
    Json(payload): Json<Value>,
) -> Response {
    let Some(items) = payload.get("predictions").and_then(Value::as_array) else {
        let body = json!({
            "error": "Invalid request format",
            "message": "request must contain a \"predictions\" array",
        });
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    };

    if items.is_empty() {
        let body = json!({
            "error": "Invalid predictions format",
            "message": "predictions must be a non-empty array",
        });
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    }

    if items.len() > MAX_BATCH_ITEMS {
        let body = json!({
            "error": "Batch size too large",
            "message": format!("maximum {MAX_BATCH_ITEMS} predictions per batch"),
        });
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    }

    let mut results = Vec::new();
    let mut errors = Vec::new();

    // One bad item never invalidates the batch; it is recorded and the
    // remaining items proceed in input order.
    for (index, item) in items.iter().enumerate() {
        match parse_prediction(item) {
            Ok(parsed) => {
                let result = service.predict(&parsed.input);
                results.push(BatchItemResponse {
                    result,
                    metadata: BatchItemMetadata {
                        index,
                        subject: parsed.subject,
                        user_id: parsed.user_id,
                    },
                });
            }
            Err(rejection) => errors.push(BatchItemError {
                index,
                error: rejection.message(),
            }),
        }
    }

    let total_processed = results.len();
    let total_errors = errors.len();
    let response = BatchResponse {
        results,
        errors,
        total_processed,
        total_errors,
    };
    (StatusCode::OK, Json(response)).into_response()
}

async fn model_info_endpoint(State(service): State<Arc<PredictionService>>) -> Response {
    (StatusCode::OK, Json(service.model_info())).into_response()
}

async fn health_endpoint(State(service): State<Arc<PredictionService>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "Should I Bunk ML Service",
        "initialized": true,
        "backend": service.mode().label(),
        "timestamp": Utc::now(),
    }))
}

async fn retrain_endpoint() -> Response {
    let body = json!({
        "message": "Model retraining not implemented yet",
        "note": "this endpoint will retrain the classifier once feedback collection lands",
    });
    (StatusCode::NOT_IMPLEMENTED, Json(body)).into_response()
}

async fn missing_endpoint() -> Response {
    let body = json!({
        "error": "Endpoint not found",
        "message": "the requested endpoint does not exist",
    });
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use std::path::Path;
    use tower::ServiceExt;

    fn rule_only_router() -> Router {
        let service = Arc::new(PredictionService::initialize(Path::new(
            "/no/such/model.json",
        )));
        prediction_router(service)
    }

    fn json_request(method: &str, path: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(body).expect("serializes")))
            .expect("request builds")
    }

    async fn read_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        serde_json::from_slice(&bytes).expect("body is json")
    }

    fn valid_item() -> Value {
        json!({
            "attendance_percentage": 89.0,
            "exam_proximity": 1.0,
            "syllabus_completion": 100.0,
            "past_performance": 85.0,
            "subject": "Databases",
            "user_id": "stu-42",
        })
    }

    #[tokio::test]
    async fn predict_returns_the_enriched_result() {
        let response = rule_only_router()
            .oneshot(json_request("POST", "/predict", &valid_item()))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json(response).await;

        assert_eq!(payload["recommendation"], json!("Safe to Bunk"));
        assert_eq!(payload["risk_level"], json!("low"));
        assert_eq!(payload["factors"]["exam_proximity"], json!(0.0));
        assert_eq!(payload["metadata"]["subject"], json!("Databases"));
        assert_eq!(payload["metadata"]["user_id"], json!("stu-42"));
        assert_eq!(payload["metadata"]["model_version"], json!("1.0"));
        assert!(payload.get("probability_safe").is_none());
    }

    #[tokio::test]
    async fn predict_lists_missing_fields() {
        let body = json!({ "attendance_percentage": 80.0 });
        let response = rule_only_router()
            .oneshot(json_request("POST", "/predict", &body))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let payload = read_json(response).await;
        assert_eq!(payload["error"], json!("Missing required fields"));
        let missing = payload["missing_fields"].as_array().expect("array");
        assert_eq!(missing.len(), 3);
        assert!(missing.contains(&json!("exam_proximity")));
    }

    #[tokio::test]
    async fn predict_rejects_out_of_range_values_before_the_core() {
        let mut body = valid_item();
        body["attendance_percentage"] = json!(150.0);
        let response = rule_only_router()
            .oneshot(json_request("POST", "/predict", &body))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let payload = read_json(response).await;
        assert_eq!(payload["error"], json!("Invalid input values"));
        assert!(payload["message"]
            .as_str()
            .expect("message present")
            .contains("attendance_percentage"));
    }

    #[tokio::test]
    async fn predict_rejects_non_numeric_values() {
        let mut body = valid_item();
        body["syllabus_completion"] = json!("most of it");
        let response = rule_only_router()
            .oneshot(json_request("POST", "/predict", &body))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let payload = read_json(response).await;
        assert_eq!(payload["error"], json!("Invalid input values"));
    }

    #[tokio::test]
    async fn batch_isolates_per_item_failures() {
        let body = json!({
            "predictions": [
                valid_item(),
                { "attendance_percentage": 80.0 },
                {
                    "attendance_percentage": 70.0,
                    "exam_proximity": 0.5,
                    "syllabus_completion": 55.0,
                    "past_performance": 60.0,
                },
            ],
        });

        let response = rule_only_router()
            .oneshot(json_request("POST", "/batch-predict", &body))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json(response).await;

        assert_eq!(payload["total_processed"], json!(2));
        assert_eq!(payload["total_errors"], json!(1));

        let results = payload["results"].as_array().expect("results array");
        assert_eq!(results[0]["metadata"]["index"], json!(0));
        assert_eq!(results[1]["metadata"]["index"], json!(2));

        let errors = payload["errors"].as_array().expect("errors array");
        assert_eq!(errors[0]["index"], json!(1));
        assert!(errors[0]["error"]
            .as_str()
            .expect("error message")
            .contains("missing fields"));
    }

    #[tokio::test]
    async fn batch_requires_a_predictions_array() {
        let response = rule_only_router()
            .oneshot(json_request("POST", "/batch-predict", &json!({})))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = rule_only_router()
            .oneshot(json_request(
                "POST",
                "/batch-predict",
                &json!({ "predictions": [] }),
            ))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn batch_caps_at_one_hundred_items() {
        let items: Vec<Value> = (0..101).map(|_| valid_item()).collect();
        let response = rule_only_router()
            .oneshot(json_request(
                "POST",
                "/batch-predict",
                &json!({ "predictions": items }),
            ))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let payload = read_json(response).await;
        assert_eq!(payload["error"], json!("Batch size too large"));
    }

    #[tokio::test]
    async fn model_info_reports_the_serving_backend() {
        let response = rule_only_router()
            .oneshot(
                Request::get("/model-info")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json(response).await;
        assert_eq!(payload["model_type"], json!("Rule-based Logic"));
        assert_eq!(
            payload["output_classes"],
            json!(["Safe to Bunk", "Moderate Risk", "Not Safe"])
        );
        assert!(payload.get("feature_importance").is_none());
    }

    #[tokio::test]
    async fn retrain_is_explicitly_unimplemented() {
        let response = rule_only_router()
            .oneshot(json_request("POST", "/retrain", &json!({})))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    }

    #[tokio::test]
    async fn health_reports_the_backend_mode() {
        let response = rule_only_router()
            .oneshot(
                Request::get("/health")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json(response).await;
        assert_eq!(payload["status"], json!("healthy"));
        assert_eq!(payload["initialized"], json!(true));
        assert_eq!(payload["backend"], json!("rule-based"));
    }

    #[tokio::test]
    async fn unknown_endpoints_return_structured_404() {
        let response = rule_only_router()
            .oneshot(
                Request::get("/nope")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let payload = read_json(response).await;
        assert_eq!(payload["error"], json!("Endpoint not found"));
    }
}
