use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;
use term_deposit_predictor::config::ArtifactsConfig;
use term_deposit_predictor::error::{ArtifactError, ArtifactKind, ClassifierError};
use term_deposit_predictor::feature_aligner::{all_column_names, EncodedRecord, FeatureSchema};
use term_deposit_predictor::metrics::ServiceMetrics;
use term_deposit_predictor::models::{ArtifactLoader, Classifier, PredictionEngine};
use term_deposit_predictor::web::{router, AppState};
use tower::ServiceExt;

const STUDENT_FORM: &str = "age=30&job=student&marital=single&education=tertiary&default=no\
&balance=0&housing=no&loan=no&contact=cellular&day=15&month=may&duration=120\
&campaign=1&pdays=-1&previous=0&poutcome=unknown";

/// Returns class 0 with [0.7, 0.3] when `job_student` is hot, otherwise fails
struct StudentOnlyClassifier;

impl Classifier for StudentOnlyClassifier {
    fn name(&self) -> &str {
        "student_only"
    }

    fn predict(&self, row: &EncodedRecord) -> Result<i64, ClassifierError> {
        match row.get("job_student") {
            Some(v) if v == 1.0 => Ok(0),
            _ => Err(ClassifierError::Backend("unexpected row".to_string())),
        }
    }

    fn predict_proba(&self, _row: &EncodedRecord) -> Result<Vec<f64>, ClassifierError> {
        Ok(vec![0.7, 0.3])
    }
}

fn ready_app() -> (Router, Arc<ServiceMetrics>) {
    let schema = Arc::new(FeatureSchema::new(all_column_names()).unwrap());
    let engine = PredictionEngine::from_parts(Arc::new(StudentOnlyClassifier), schema);
    let metrics = Arc::new(ServiceMetrics::new());
    (router(AppState::ready(engine, metrics.clone())), metrics)
}

fn unavailable_app() -> Router {
    let error = ArtifactError::Missing {
        kind: ArtifactKind::Model,
        path: PathBuf::from("final_model.json"),
    };
    router(AppState::unavailable(&error, Arc::new(ServiceMetrics::new())))
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn form_post(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn json_post(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn index_renders_form() {
    let (app, _) = ready_app();
    let response = app.oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Bank Term Deposit Prediction"));
    assert!(html.contains("<form method=\"post\""));
    assert!(html.contains("name=\"poutcome\""));
}

#[tokio::test]
async fn missing_artifact_shows_error_without_form() {
    let response = unavailable_app().oneshot(get("/")).await.unwrap();
    let html = body_text(response).await;
    assert!(html.contains("Model file &#39;final_model.json&#39; not found."));
    assert!(!html.contains("<form"));

    let response = unavailable_app().oneshot(form_post(STUDENT_FORM)).await.unwrap();
    let html = body_text(response).await;
    assert!(!html.contains("Prediction probabilities"));

    let response = unavailable_app().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn form_submission_renders_prediction() {
    let (app, metrics) = ready_app();
    let response = app.oneshot(form_post(STUDENT_FORM)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("notice warning"));
    assert!(html.contains("The client is not likely to subscribe to the term deposit."));
    assert!(html.contains("Prediction probabilities: [0.7, 0.3]"));
    // The form is shown again with the submitted values
    assert!(html.contains("<option value=\"student\" selected>student</option>"));
    assert_eq!(metrics.snapshot().unlikely, 1);
}

#[tokio::test]
async fn prediction_failure_keeps_form_usable() {
    let (app, metrics) = ready_app();
    let response = app.oneshot(form_post("job=retired")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("An error occurred during prediction: unexpected row"));
    assert!(html.contains("<form method=\"post\""));
    assert_eq!(metrics.snapshot().failures, 1);
}

#[tokio::test]
async fn invalid_choice_is_rejected() {
    let (app, metrics) = ready_app();
    let response = app
        .oneshot(form_post("job=student&duration=120&education=doctorate"))
        .await
        .unwrap();

    let html = body_text(response).await;
    assert!(html.contains("notice error"));
    assert!(html.contains("education: &#39;doctorate&#39; is not one of the available options"));
    // Valid values survive for the retry
    assert!(html.contains("<option value=\"student\" selected>student</option>"));
    assert!(html.contains("name=\"duration\" min=\"0\" max=\"5000\" step=\"1\" value=\"120\""));
    assert_eq!(metrics.snapshot().rejected, 1);
}

#[tokio::test]
async fn api_predict_returns_json() {
    let (app, _) = ready_app();
    let response = app
        .oneshot(json_post(r#"{"job": "student", "duration": 120}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["label"], 0);
    assert_eq!(json["outcome"], "unlikely");
    assert_eq!(json["probabilities"], serde_json::json!([0.7, 0.3]));
    assert!(json["prediction_id"].as_str().is_some());
}

#[tokio::test]
async fn api_predict_status_codes() {
    let (app, _) = ready_app();
    let response = app
        .clone()
        .oneshot(json_post(r#"{"job": "astronaut"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = app.oneshot(json_post(r#"{"job": "retired"}"#)).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = unavailable_app()
        .oneshot(json_post(r#"{"job": "student"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn api_predict_rejects_mistyped_body_as_json() {
    let (app, metrics) = ready_app();
    let response = app
        .oneshot(json_post(r#"{"age": "thirty"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    let error = json["error"].as_str().unwrap();
    assert!(error.contains("age"), "{error}");
    assert_eq!(metrics.snapshot().rejected, 1);
}

#[tokio::test]
async fn metrics_endpoint_reports_counts() {
    let (app, _) = ready_app();
    app.clone().oneshot(form_post(STUDENT_FORM)).await.unwrap();

    let response = app.oneshot(get("/metrics")).await.unwrap();
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["submissions"], 1);
    assert_eq!(json["unlikely"], 1);
}

#[tokio::test]
async fn end_to_end_with_artifact_files() {
    let dir = tempfile::tempdir().unwrap();
    let names = all_column_names();

    // Only call duration and a previous success move the score.
    let weights: Vec<f64> = names
        .iter()
        .map(|n| match n.as_str() {
            "duration" => 0.01,
            "poutcome_success" => 2.0,
            _ => 0.0,
        })
        .collect();
    std::fs::write(
        dir.path().join("feature_names.json"),
        serde_json::to_string(&names).unwrap(),
    )
    .unwrap();
    std::fs::write(
        dir.path().join("final_model.json"),
        serde_json::json!({"model_name": "bank_lr", "weights": weights, "bias": -3.0}).to_string(),
    )
    .unwrap();

    let config = ArtifactsConfig {
        model_path: dir.path().join("final_model.json"),
        feature_names_path: dir.path().join("feature_names.json"),
        onnx_threads: 1,
    };
    let artifacts = ArtifactLoader::new().load(&config).unwrap();
    let app = router(AppState::ready(
        PredictionEngine::new(artifacts),
        Arc::new(ServiceMetrics::new()),
    ));

    let response = app
        .clone()
        .oneshot(form_post("duration=300&poutcome=success"))
        .await
        .unwrap();
    let html = body_text(response).await;
    assert!(html.contains("The client is likely to subscribe to the term deposit."));

    let response = app.oneshot(form_post(STUDENT_FORM)).await.unwrap();
    let html = body_text(response).await;
    assert!(html.contains("The client is not likely to subscribe to the term deposit."));
}
