//! Sample Client Generator
//!
//! Generates random client records within the form constraints and scores them
//! against the configured artifacts. Without artifacts it prints the records.

use rand::Rng;
use std::time::Instant;
use term_deposit_predictor::{
    config::AppConfig,
    form::{CONTACT, EDUCATION, JOBS, MARITAL, MONTHS, YES_NO},
    metrics::ServiceMetrics,
    models::{loader::ArtifactLoader, predictor::PredictionEngine},
    ClientRecord,
};
use tracing::{info, warn};

/// Random client generator
struct ClientGenerator {
    rng: rand::rngs::ThreadRng,
}

impl ClientGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }

    /// A client drawn uniformly from the form's vocabulary
    fn generate_typical(&mut self) -> ClientRecord {
        ClientRecord {
            age: self.rng.gen_range(18..=100),
            job: self.random_choice(JOBS).to_string(),
            marital: self.random_choice(MARITAL).to_string(),
            education: self.random_choice(EDUCATION).to_string(),
            default: self.random_choice(YES_NO).to_string(),
            balance: self.rng.gen_range(-2000..=20_000),
            housing: self.random_choice(YES_NO).to_string(),
            loan: self.random_choice(YES_NO).to_string(),
            contact: self.random_choice(CONTACT).to_string(),
            day: self.rng.gen_range(1..=31),
            month: self.random_choice(MONTHS).to_string(),
            duration: self.rng.gen_range(0..=600),
            campaign: self.rng.gen_range(1..=10),
            pdays: -1,
            previous: 0,
            poutcome: "unknown".to_string(),
        }
    }

    /// A client with the traits that usually go with a subscription
    fn generate_promising(&mut self) -> ClientRecord {
        ClientRecord {
            age: self.rng.gen_range(25..=70),
            job: self.random_choice(&["student", "retired", "management"]).to_string(),
            education: "tertiary".to_string(),
            default: "no".to_string(),
            balance: self.rng.gen_range(1_000..=50_000),
            housing: "no".to_string(),
            loan: "no".to_string(),
            contact: "cellular".to_string(),
            month: self.random_choice(&["mar", "sep", "oct", "dec"]).to_string(),
            duration: self.rng.gen_range(400..=2000), // Long last call
            campaign: self.rng.gen_range(1..=2),
            pdays: self.rng.gen_range(30..=200),
            previous: self.rng.gen_range(1..=5),
            poutcome: "success".to_string(),
            ..self.generate_typical()
        }
    }

    fn random_choice<'a>(&mut self, choices: &[&'a str]) -> &'a str {
        choices[self.rng.gen_range(0..choices.len())]
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sample_clients=info".parse()?)
                .add_directive("term_deposit_predictor=info".parse()?),
        )
        .init();

    info!("Starting Sample Client Generator");

    // Arguments: count, promising rate, config path
    let args: Vec<String> = std::env::args().collect();
    let count: u64 = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(20);
    let promising_rate: f64 = args
        .get(2)
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.2)
        .clamp(0.0, 1.0);
    let config = match args.get(3) {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };

    info!(count, promising_rate, "Configuration loaded");

    let loader = ArtifactLoader::with_threads(config.artifacts.onnx_threads);
    let engine = match loader.load(&config.artifacts) {
        Ok(artifacts) => PredictionEngine::new(artifacts),
        Err(e) => {
            warn!(error = %e, "Artifacts unavailable. Running in dry-run mode.");
            return run_dry_mode(count, promising_rate);
        }
    };

    let mut generator = ClientGenerator::new();
    let mut rng = rand::thread_rng();
    let metrics = ServiceMetrics::new();

    for i in 0..count {
        let record = if rng.gen_bool(promising_rate) {
            generator.generate_promising()
        } else {
            generator.generate_typical()
        };

        let start = Instant::now();
        match engine.score(&record) {
            Ok(prediction) => {
                metrics.record_prediction(&prediction, start.elapsed());
                info!(
                    client = i + 1,
                    job = %record.job,
                    duration = record.duration,
                    poutcome = %record.poutcome,
                    outcome = ?prediction.outcome,
                    probabilities = %prediction.probabilities_display(),
                    "Scored client"
                );
            }
            Err(e) => {
                metrics.record_failure(start.elapsed());
                warn!(client = i + 1, error = %e, "Scoring failed");
            }
        }
    }

    metrics.print_summary();
    Ok(())
}

fn run_dry_mode(count: u64, promising_rate: f64) -> anyhow::Result<()> {
    let mut generator = ClientGenerator::new();
    let mut rng = rand::thread_rng();

    for _ in 0..count {
        let record = if rng.gen_bool(promising_rate) {
            generator.generate_promising()
        } else {
            generator.generate_typical()
        };
        println!("{}", serde_json::to_string(&record)?);
    }

    Ok(())
}
