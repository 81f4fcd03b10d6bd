//! Term Deposit Predictor - Main Entry Point
//!
//! Loads the classifier and its feature schema, then serves the prediction form.

use anyhow::Result;
use std::sync::Arc;
use term_deposit_predictor::{
    config::{AppConfig, LogFormat, LoggingConfig},
    metrics::{MetricsReporter, ServiceMetrics},
    models::{loader::ArtifactLoader, predictor::PredictionEngine},
    web::{self, AppState},
};
use tracing::{error, info};

fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(format!("term_deposit_predictor={}", config.level).parse()?)
        .add_directive(format!("tower_http={}", config.level).parse()?);

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match config.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Optional config path as the first argument
    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };

    init_logging(&config.logging)?;

    info!("Starting Term Deposit Predictor");

    let metrics = Arc::new(ServiceMetrics::new());

    let loader = ArtifactLoader::with_threads(config.artifacts.onnx_threads);
    let state = match loader.load(&config.artifacts) {
        Ok(artifacts) => {
            let engine = PredictionEngine::new(artifacts);
            info!(
                model = %engine.model_name(),
                features = engine.feature_count(),
                "Artifacts loaded"
            );
            AppState::ready(engine, metrics.clone())
        }
        Err(e) => {
            // Fail closed: the page shows the error and no form.
            error!(error = %e, "Failed to load artifacts, predictions are disabled");
            AppState::unavailable(&e, metrics.clone())
        }
    };

    if config.metrics.report_interval_secs > 0 {
        let reporter = MetricsReporter::new(metrics.clone(), config.metrics.report_interval_secs);
        tokio::spawn(reporter.start());
    }

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, web::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down...");
    metrics.print_summary();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
