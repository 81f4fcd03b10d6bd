//! Request handlers

use super::page::{self, Notice};
use super::{AppState, ServiceState};
use crate::form;
use crate::types::client::ClientRecord;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{info, warn};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    match state.service.as_ref() {
        ServiceState::Ready(_) => Html(page::render_form(&ClientRecord::default(), None)),
        ServiceState::Unavailable(message) => Html(page::render_unavailable(message)),
    }
}

/// Form submission: collect, align, predict, render
pub async fn submit(
    State(state): State<AppState>,
    Form(fields): Form<HashMap<String, String>>,
) -> Html<String> {
    let engine = match state.service.as_ref() {
        ServiceState::Ready(engine) => engine,
        ServiceState::Unavailable(message) => return Html(page::render_unavailable(message)),
    };

    let start = Instant::now();
    let record = match form::collect(&fields) {
        Ok(record) => record,
        Err(e) => {
            state.metrics.record_rejected();
            warn!(error = %e, "Rejected form submission");
            let notice = Notice::Error(e.to_string());
            return Html(page::render_form(&form::prefill(&fields), Some(&notice)));
        }
    };

    match engine.score(&record) {
        Ok(prediction) => {
            let processing_time = start.elapsed();
            state.metrics.record_prediction(&prediction, processing_time);
            info!(
                prediction_id = %prediction.prediction_id,
                outcome = ?prediction.outcome,
                processing_time_us = processing_time.as_micros(),
                "Form prediction rendered"
            );
            Html(page::render_form(&record, Some(&Notice::Prediction(&prediction))))
        }
        Err(e) => {
            state.metrics.record_failure(start.elapsed());
            Html(page::render_form(&record, Some(&Notice::Error(e.to_string()))))
        }
    }
}

/// JSON prediction endpoint. Missing fields take the form defaults.
pub async fn api_predict(
    State(state): State<AppState>,
    payload: Result<Json<ClientRecord>, JsonRejection>,
) -> Response {
    let engine = match state.service.as_ref() {
        ServiceState::Ready(engine) => engine,
        ServiceState::Unavailable(message) => {
            return error_response(StatusCode::SERVICE_UNAVAILABLE, message.clone())
        }
    };

    let Json(record) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            state.metrics.record_rejected();
            warn!(error = %rejection, "Rejected malformed API body");
            return error_response(rejection.status(), rejection.body_text());
        }
    };

    let start = Instant::now();
    let record = match form::normalize(record) {
        Ok(record) => record,
        Err(e) => {
            state.metrics.record_rejected();
            warn!(error = %e, "Rejected API submission");
            return error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string());
        }
    };

    match engine.score(&record) {
        Ok(prediction) => {
            state.metrics.record_prediction(&prediction, start.elapsed());
            (StatusCode::OK, Json(prediction)).into_response()
        }
        Err(e) => {
            state.metrics.record_failure(start.elapsed());
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, String) {
    match state.service.as_ref() {
        ServiceState::Ready(_) => (StatusCode::OK, "ok".to_string()),
        ServiceState::Unavailable(message) => (StatusCode::SERVICE_UNAVAILABLE, message.clone()),
    }
}

pub async fn metrics(State(state): State<AppState>) -> Json<crate::metrics::MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}
