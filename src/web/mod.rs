//! HTTP surface: the form page, a JSON prediction endpoint, health and metrics

pub mod handlers;
pub mod page;

use crate::error::ArtifactError;
use crate::metrics::ServiceMetrics;
use crate::models::predictor::PredictionEngine;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Whether the artifacts loaded at startup
pub enum ServiceState {
    Ready(PredictionEngine),
    /// Artifacts failed to load; the message is shown instead of the form
    Unavailable(String),
}

/// Shared, read-only request state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ServiceState>,
    pub metrics: Arc<ServiceMetrics>,
}

impl AppState {
    pub fn ready(engine: PredictionEngine, metrics: Arc<ServiceMetrics>) -> Self {
        Self {
            service: Arc::new(ServiceState::Ready(engine)),
            metrics,
        }
    }

    pub fn unavailable(error: &ArtifactError, metrics: Arc<ServiceMetrics>) -> Self {
        Self {
            service: Arc::new(ServiceState::Unavailable(error.to_string())),
            metrics,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.service, ServiceState::Ready(_))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index).post(handlers::submit))
        .route("/api/predict", post(handlers::api_predict))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
